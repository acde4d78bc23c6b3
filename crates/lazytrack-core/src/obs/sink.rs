//! Event sink boundary.
//!
//! Engine logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through TrackEvent and EventSink.
use crate::{config, obs::metrics};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn EventSink>> = const { RefCell::new(None) };
}

///
/// TrackEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrackEvent {
    TrackingStarted {
        path: &'static str,
        nodes: u64,
        compare_old_value: bool,
    },
    TrackingStopped {
        path: &'static str,
        nodes: u64,
    },
    Checkpoint {
        path: &'static str,
        nodes: u64,
    },
    DirtyChecked {
        path: &'static str,
        dirty: bool,
    },
    LazyResolved {
        owner: &'static str,
        attribute: &'static str,
    },
    LazySkippedNew {
        owner: &'static str,
        attribute: &'static str,
    },
    FlagsInherited {
        owner: &'static str,
        attribute: &'static str,
        objects: u64,
    },
    EntriesLoaded {
        container: &'static str,
        entries: u64,
    },
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: TrackEvent);
}

/// GlobalEventSink
/// Default sink that writes into the thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalEventSink;

impl EventSink for GlobalEventSink {
    fn record(&self, event: TrackEvent) {
        metrics::with_state_mut(|m| match event {
            TrackEvent::TrackingStarted { path, nodes, .. } => {
                m.ops.tracking_starts = m.ops.tracking_starts.saturating_add(1);
                m.ops.nodes_started = m.ops.nodes_started.saturating_add(nodes);
                let entry = metrics::type_entry(m, path);
                entry.tracking_starts = entry.tracking_starts.saturating_add(1);
            }

            TrackEvent::TrackingStopped { path, nodes } => {
                m.ops.tracking_stops = m.ops.tracking_stops.saturating_add(1);
                m.ops.nodes_stopped = m.ops.nodes_stopped.saturating_add(nodes);
                let entry = metrics::type_entry(m, path);
                entry.tracking_stops = entry.tracking_stops.saturating_add(1);
            }

            TrackEvent::Checkpoint { path, nodes } => {
                m.ops.checkpoints = m.ops.checkpoints.saturating_add(1);
                m.ops.nodes_checkpointed = m.ops.nodes_checkpointed.saturating_add(nodes);
                let entry = metrics::type_entry(m, path);
                entry.checkpoints = entry.checkpoints.saturating_add(1);
            }

            TrackEvent::DirtyChecked { path, dirty } => {
                let hit = u64::from(dirty);
                m.ops.dirty_checks = m.ops.dirty_checks.saturating_add(1);
                m.ops.dirty_hits = m.ops.dirty_hits.saturating_add(hit);
                let entry = metrics::type_entry(m, path);
                entry.dirty_checks = entry.dirty_checks.saturating_add(1);
                entry.dirty_hits = entry.dirty_hits.saturating_add(hit);
            }

            TrackEvent::LazyResolved { owner, .. } => {
                m.ops.lazy_resolutions = m.ops.lazy_resolutions.saturating_add(1);
                let entry = metrics::type_entry(m, owner);
                entry.lazy_resolutions = entry.lazy_resolutions.saturating_add(1);
            }

            TrackEvent::LazySkippedNew { owner, .. } => {
                m.ops.lazy_skips_new = m.ops.lazy_skips_new.saturating_add(1);
                let entry = metrics::type_entry(m, owner);
                entry.lazy_skips_new = entry.lazy_skips_new.saturating_add(1);
            }

            TrackEvent::FlagsInherited { objects, .. } => {
                m.ops.flags_inherited = m.ops.flags_inherited.saturating_add(objects);
            }

            TrackEvent::EntriesLoaded { container, entries } => {
                m.ops.entries_loaded = m.ops.entries_loaded.saturating_add(entries);
                let entry = metrics::type_entry(m, container);
                entry.entries_loaded = entry.entries_loaded.saturating_add(entries);
            }
        });
    }
}

pub(crate) const GLOBAL_EVENT_SINK: GlobalEventSink = GlobalEventSink;

/// Route an event to the active sink, unless events are disabled for this
/// thread.
pub(crate) fn record(event: TrackEvent) {
    if !config::current().emit_events {
        return;
    }

    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // Preconditions:
        // - `ptr` was produced from a valid `&dyn EventSink` in `with_event_sink`.
        // - `with_event_sink` always restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        //
        // Aliasing:
        // - Only a shared reference is materialized, matching the shared borrow
        //   used to install the override.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_EVENT_SINK.record(event);
    }
}

/// Snapshot this thread's counters.
#[must_use]
pub fn events_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset this thread's counters.
pub fn events_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary sink override on this thread.
pub fn with_event_sink<T>(sink: &dyn EventSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn EventSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // Preconditions:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` always restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    //
    // What would break this:
    // - Any deferred use of `sink_ptr` beyond this scope.
    // - Any path that bypasses Guard restoration.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn EventSink, *const dyn EventSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

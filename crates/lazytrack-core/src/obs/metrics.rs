use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for engine operations on this thread.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub types: BTreeMap<String, TypeCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Graph passes
    pub tracking_starts: u64,
    pub tracking_stops: u64,
    pub checkpoints: u64,
    pub nodes_started: u64,
    pub nodes_stopped: u64,
    pub nodes_checkpointed: u64,

    // Dirty checks
    pub dirty_checks: u64,
    pub dirty_hits: u64,

    // Lazy materialization
    pub lazy_resolutions: u64,
    pub lazy_skips_new: u64,
    pub flags_inherited: u64,
    pub entries_loaded: u64,
}

///
/// TypeCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeCounters {
    pub tracking_starts: u64,
    pub tracking_stops: u64,
    pub checkpoints: u64,
    pub dirty_checks: u64,
    pub dirty_hits: u64,
    pub lazy_resolutions: u64,
    pub lazy_skips_new: u64,
    pub entries_loaded: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow event state immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow event state mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Counters for one type path, created on first use.
pub(crate) fn type_entry<'a>(m: &'a mut EventState, path: &str) -> &'a mut TypeCounters {
    m.types.entry(path.to_string()).or_default()
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Totals across all types.
    pub ops: EventOps,
    /// Per-type counters, most lazily-loaded types first.
    pub types: Vec<TypeSummary>,
}

///
/// TypeSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeSummary {
    pub path: String,
    pub tracking_starts: u64,
    pub tracking_stops: u64,
    pub checkpoints: u64,
    pub dirty_checks: u64,
    pub dirty_hits: u64,
    pub dirty_hit_rate: f64,
    pub lazy_resolutions: u64,
    pub lazy_skips_new: u64,
    pub entries_loaded: u64,
}

/// Build a report from the in-memory counters.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut types: Vec<TypeSummary> = snap
        .types
        .iter()
        .map(|(path, c)| TypeSummary {
            path: path.clone(),
            tracking_starts: c.tracking_starts,
            tracking_stops: c.tracking_stops,
            checkpoints: c.checkpoints,
            dirty_checks: c.dirty_checks,
            dirty_hits: c.dirty_hits,
            dirty_hit_rate: if c.dirty_checks > 0 {
                c.dirty_hits as f64 / c.dirty_checks as f64
            } else {
                0.0
            },
            lazy_resolutions: c.lazy_resolutions,
            lazy_skips_new: c.lazy_skips_new,
            entries_loaded: c.entries_loaded,
        })
        .collect();

    types.sort_by(|a, b| {
        let loads_a = a.lazy_resolutions.saturating_add(a.entries_loaded);
        let loads_b = b.lazy_resolutions.saturating_add(b.entries_loaded);

        match loads_b.cmp(&loads_a) {
            Ordering::Equal => a.path.cmp(&b.path),
            other => other,
        }
    });

    EventReport {
        ops: snap.ops,
        types,
    }
}

///
/// TESTS
///

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reset_all_clears_state() {
        with_state_mut(|m| {
            m.ops.lazy_resolutions = 3;
            type_entry(m, "alpha").dirty_checks = 1;
        });

        reset_all();

        with_state(|m| {
            assert_eq!(m.ops.lazy_resolutions, 0);
            assert!(m.types.is_empty());
        });
    }

    #[test]
    fn report_orders_types_by_load_volume_then_path() {
        reset_all();
        with_state_mut(|m| {
            type_entry(m, "gamma").lazy_resolutions = 1;
            type_entry(m, "alpha").entries_loaded = 1;
            let beta = type_entry(m, "beta");
            beta.lazy_resolutions = 2;
            beta.dirty_checks = 4;
            beta.dirty_hits = 1;
        });

        let report = report();
        let paths: Vec<_> = report.types.iter().map(|t| t.path.as_str()).collect();

        assert_eq!(paths, ["beta", "alpha", "gamma"]);
        assert_eq!(report.types[0].dirty_hit_rate, 0.25);
        assert_eq!(report.types[1].dirty_hit_rate, 0.0);
    }
}

//! Observability: engine events and the sink they flow through.
//!
//! Walker, lazy engine and containers never touch counters directly.
//! All instrumentation flows through `TrackEvent` and `EventSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, TypeCounters, TypeSummary};
pub use sink::{EventSink, TrackEvent, events_report, events_reset_all, with_event_sink};

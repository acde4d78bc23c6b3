use lazytrack::{
    config::{TrackConfig, with_config},
    obs::{EventSink, TrackEvent, with_event_sink},
};
use lazytrack_testing_model_tests::prelude::*;
use std::cell::RefCell;

#[derive(Default)]
struct Capture(RefCell<Vec<TrackEvent>>);

impl EventSink for Capture {
    fn record(&self, event: TrackEvent) {
        self.0.borrow_mut().push(event);
    }
}

impl Capture {
    fn events(&self) -> Vec<TrackEvent> {
        self.0.borrow().clone()
    }
}

#[test]
fn start_and_resolution_are_reported_in_order() {
    let store = LineStore::new(10, 3);
    let mut invoice = Invoice::new(7, &store);
    let capture = Capture::default();

    with_event_sink(&capture, || {
        invoice
            .start_tracking_changes_in_state_with(true, false)
            .expect("start should succeed");
        invoice.lines().expect("resolution should succeed");
    });

    let events = capture.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(
        events[0],
        TrackEvent::TrackingStarted { path, compare_old_value: false, .. } if path.ends_with("::Invoice")
    ));
    assert!(matches!(
        events[1],
        TrackEvent::FlagsInherited { attribute: "lines", objects: 3, .. }
    ));
    assert!(matches!(
        events[2],
        TrackEvent::LazyResolved { attribute: "lines", .. }
    ));
}

#[test]
fn skipped_resolution_on_a_new_owner_is_reported() {
    let mut customer = Customer::new("Ada");
    customer.set_new();
    let capture = Capture::default();

    with_event_sink(&capture, || {
        customer.address().expect("resolution should succeed");
    });

    assert_eq!(
        capture.events(),
        vec![TrackEvent::LazySkippedNew {
            owner: Customer::default().model().path,
            attribute: "address",
        }]
    );
}

#[test]
fn disabled_events_stay_silent() {
    let config = TrackConfig::from_toml_str("emit_events = false").expect("config should parse");
    let mut line = Line::new("a", 1);
    let capture = Capture::default();

    with_config(config, || {
        with_event_sink(&capture, || {
            line.start_tracking_changes_in_state_with(false, false)
                .expect("start should succeed");
            line.is_dirty().expect("dirty check should succeed");
        });
    });

    assert!(capture.events().is_empty());
}

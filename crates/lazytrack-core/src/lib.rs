//! Core runtime for lazytrack: per-object tracking status, the trackable
//! capability, the hierarchy walker, lazy materialization and the
//! partially loaded containers, plus the ergonomics exported via the
//! `prelude`.
#![warn(unreachable_pub)]

#[macro_use]
pub mod traits;

// public exports are one module level down
pub mod adapter;
pub mod collection;
pub mod config;
pub mod error;
pub mod lazy;
pub mod model;
pub mod obs;
pub mod status;
pub mod track;
pub mod walk;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Domain vocabulary only. Walker internals, sinks and configuration stay
/// one module level down.
///

pub mod prelude {
    pub use crate::{
        adapter::Tracked,
        collection::{LazyList, LazyMap},
        error::{SupplyError, TrackError},
        lazy::{Lazy, Supplier, SupplierFactory},
        status::{TrackingFlags, TrackingStatus},
        traits::{Node as _, Trackable},
    };
}

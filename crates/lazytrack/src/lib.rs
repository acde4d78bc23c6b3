//! ## Crate layout
//! - `core`: runtime status, capability traits, walker, lazy engine and
//!   partially loaded containers.
//! - `derive`: `#[derive(Node)]` and `#[derive(Trackable)]`.
//!
//! The `prelude` module mirrors what model code needs day to day; the core
//! modules are re-exported at the root so derive output can name them as
//! `::lazytrack::<module>`.

pub use lazytrack_core as core;
pub use lazytrack_derive as derive;

pub use lazytrack_core::{
    adapter, collection, config, error, lazy, model, obs, status, track, traits, walk,
};

/// re-exports
///
/// derive output and downstream macros can use these without naming the
/// crates in their own Cargo.toml
pub mod __reexports {
    pub use lazytrack_core;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use lazytrack_derive::{Node, Trackable};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        Node, Trackable,
        core::{
            adapter::Tracked,
            collection::{LazyList, LazyMap},
            error::{SupplyError, TrackError},
            lazy::{Lazy, Supplier, SupplierFactory},
            status::{TrackingFlags, TrackingStatus},
            traits::{Node as _, Trackable},
        },
    };
}

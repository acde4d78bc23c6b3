#[macro_use]
mod macros;
mod capability;
mod node;

pub use capability::*;
pub use node::*;

use crate::{
    config,
    error::TrackError,
    status::{TrackingFlags, TrackingStatus},
    track,
};
use std::any::Any;

// ============================================================================
// TRACKABLE CAPABILITY
// ============================================================================
//
// The surface persistence collaborators use to decide whether to write an
// object and to checkpoint it afterwards.
//

///
/// Trackable
///
/// Implemented natively by `#[derive(Trackable)]` types and by delegation
/// through `adapter::Tracked<T>`.
///
/// Graph-level operations (`is_dirty`, the start/stop family) walk the
/// reachable hierarchy; everything else touches only this object's status.
/// Mutators return `&mut Self` for chaining.
///

pub trait Trackable: Node {
    fn tracking_status(&self) -> &TrackingStatus;

    fn tracking_status_mut(&mut self) -> &mut TrackingStatus;

    /// The plain value behind the capability. Natively tracked types return
    /// themselves; delegating adapters return the wrapped value.
    fn wrapped_object(&self) -> &dyn Any;

    fn is_this_dirty(&self) -> bool {
        self.tracking_status().is_dirty()
    }

    fn is_this_new(&self) -> bool {
        self.tracking_status().is_new()
    }

    fn is_tracking(&self) -> bool {
        self.tracking_status().is_tracking()
    }

    fn compares_old_value(&self) -> bool {
        self.tracking_status().compares_old_value()
    }

    fn tracking_flags(&self) -> TrackingFlags {
        self.tracking_status().flags()
    }

    /// Dirty if this object or any descendant reachable through composition
    /// attributes is dirty.
    fn is_dirty(&self) -> Result<bool, TrackError>
    where
        Self: Sized,
    {
        track::is_dirty(self)
    }

    fn touch(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.tracking_status_mut().touch();
        self
    }

    fn set_new(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.tracking_status_mut().set_new();
        self
    }

    fn reset_dirty(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.tracking_status_mut().reset_dirty();
        self
    }

    /// Start tracking with the configured compare-old-value policy.
    fn start_tracking_changes_in_state(&mut self, recurse: bool) -> Result<&mut Self, TrackError>
    where
        Self: Sized,
    {
        let compare_old_value = config::current().compare_old_value;

        self.start_tracking_changes_in_state_with(recurse, compare_old_value)
    }

    fn start_tracking_changes_in_state_with(
        &mut self,
        recurse: bool,
        compare_old_value: bool,
    ) -> Result<&mut Self, TrackError>
    where
        Self: Sized,
    {
        track::start_tracking(self, recurse, compare_old_value)?;

        Ok(self)
    }

    fn stop_tracking_changes_in_state(&mut self, recurse: bool) -> Result<&mut Self, TrackError>
    where
        Self: Sized,
    {
        track::stop_tracking(self, recurse)?;

        Ok(self)
    }
}

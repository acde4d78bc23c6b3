use crate::{
    model::NodeModel,
    status::{TrackingFlags, TrackingStatus},
    traits::{Node, Trackable},
    walk::{AttributeSlot, Children, ChildrenMut},
};
use derive_more::Deref;
use std::any::Any;

///
/// Tracked
///
/// Delegate capability for plain values that carry no tracking state of
/// their own. The status lives next to the value; reads go through `Deref`
/// and writes through `assign` or `update` so they reach the status.
///

#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Tracked<T> {
    #[deref]
    inner: T,
    status: TrackingStatus,
}

impl<T> Tracked<T> {
    #[must_use]
    pub const fn new(inner: T) -> Self {
        Self {
            inner,
            status: TrackingStatus::new(),
        }
    }

    #[must_use]
    pub const fn get(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Write `value` into the field selected by `project`, recording the
    /// write on the adapter's status.
    pub fn assign<V: PartialEq>(
        &mut self,
        project: impl FnOnce(&mut T) -> &mut V,
        value: V,
    ) -> &mut Self {
        let field = project(&mut self.inner);
        self.status.record_write(field, &value);
        *field = value;

        self
    }

    /// Mutate the value in ways a projection cannot express. Always counts
    /// as a change, since the old value is not observable.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> &mut Self {
        f(&mut self.inner);
        self.status.record_change(|| true);

        self
    }
}

impl<T> From<T> for Tracked<T> {
    fn from(inner: T) -> Self {
        Self::new(inner)
    }
}

impl<T: Node> Node for Tracked<T> {
    fn model(&self) -> &'static NodeModel {
        self.inner.model()
    }

    fn children(&self, index: usize) -> Option<Children<'_>> {
        self.inner.children(index)
    }

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>> {
        self.inner.children_mut(index)
    }

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        Some(self)
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        Some(self)
    }

    fn remember_container_flags(&mut self, flags: TrackingFlags) {
        self.inner.remember_container_flags(flags);
    }
}

impl<T: Node> Trackable for Tracked<T> {
    fn tracking_status(&self) -> &TrackingStatus {
        &self.status
    }

    fn tracking_status_mut(&mut self) -> &mut TrackingStatus {
        &mut self.status
    }

    fn wrapped_object(&self) -> &dyn Any {
        &self.inner
    }
}

impl<T: Node> AttributeSlot for Tracked<T> {
    fn slot(&self) -> Children<'_> {
        Children::Single(self)
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        ChildrenMut::Single(self)
    }
}

///
/// TESTS
///

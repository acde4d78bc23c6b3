use crate::{
    model::NodeModel,
    status::TrackingFlags,
    traits::Trackable,
    walk::{Children, ChildrenMut},
};
use std::any::Any;

///
/// Node
///
/// Generic traversal contract for any value that can appear in a tracked
/// graph. `children*` map a declaration index from `model().attributes` to
/// a view of that attribute's current value; `None` means the index is not
/// readable on this type.
///
/// Implemented by `#[derive(Node)]`, `#[derive(Trackable)]`, the lazy
/// containers, and as a leaf for primitives and std containers.
///

pub trait Node: Any {
    fn model(&self) -> &'static NodeModel;

    fn children(&self, index: usize) -> Option<Children<'_>>;

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>>;

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        None
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        None
    }

    /// Overwrite tracking flags on this value (if trackable) with a parent's.
    /// Returns the number of objects whose flags changed.
    ///
    /// Containers forward to their loaded entries and remember the flags
    /// for entries materialized later.
    fn inherit_tracking(&mut self, flags: TrackingFlags) -> usize {
        match self.as_trackable_mut() {
            Some(trackable) => usize::from(trackable.tracking_status_mut().inherit(flags)),
            None => 0,
        }
    }

    /// Hand this node's tracking flags to the partially materialized
    /// containers among its attributes, for entries they load later.
    fn remember_container_flags(&mut self, _flags: TrackingFlags) {}
}

impl<'a> dyn Node + 'a {
    /// Fully-qualified type path of the concrete node.
    #[must_use]
    pub fn type_path(&self) -> &'static str {
        self.model().path
    }
}

// ============================================================================
// LEAF IMPLEMENTATIONS
// ============================================================================

impl_leaf_node!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    ()
);

// An empty `Option` is a leaf; a present one is its value.
impl<T: Node> Node for Option<T> {
    fn model(&self) -> &'static NodeModel {
        static EMPTY: NodeModel = NodeModel::leaf("core::option::Option");

        self.as_ref().map_or(&EMPTY, Node::model)
    }

    fn children(&self, index: usize) -> Option<Children<'_>> {
        self.as_ref().and_then(|value| value.children(index))
    }

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>> {
        self.as_mut().and_then(|value| value.children_mut(index))
    }

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        self.as_ref().and_then(Node::as_trackable)
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        self.as_mut().and_then(Node::as_trackable_mut)
    }

    fn inherit_tracking(&mut self, flags: TrackingFlags) -> usize {
        self.as_mut().map_or(0, |value| value.inherit_tracking(flags))
    }

    fn remember_container_flags(&mut self, flags: TrackingFlags) {
        if let Some(value) = self {
            value.remember_container_flags(flags);
        }
    }
}

impl<T: Node> Node for Box<T> {
    fn model(&self) -> &'static NodeModel {
        (**self).model()
    }

    fn children(&self, index: usize) -> Option<Children<'_>> {
        (**self).children(index)
    }

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>> {
        (**self).children_mut(index)
    }

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        (**self).as_trackable()
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        (**self).as_trackable_mut()
    }

    fn inherit_tracking(&mut self, flags: TrackingFlags) -> usize {
        (**self).inherit_tracking(flags)
    }

    fn remember_container_flags(&mut self, flags: TrackingFlags) {
        (**self).remember_container_flags(flags);
    }
}

impl<T: Node> Node for Vec<T> {
    fn model(&self) -> &'static NodeModel {
        static MODEL: NodeModel = NodeModel::leaf("alloc::vec::Vec");
        &MODEL
    }

    fn children(&self, _: usize) -> Option<Children<'_>> {
        None
    }

    fn children_mut(&mut self, _: usize) -> Option<ChildrenMut<'_>> {
        None
    }

    fn inherit_tracking(&mut self, flags: TrackingFlags) -> usize {
        self.iter_mut()
            .map(|value| value.inherit_tracking(flags))
            .sum()
    }
}

impl<K: 'static, V: Node> Node for std::collections::BTreeMap<K, V> {
    fn model(&self) -> &'static NodeModel {
        static MODEL: NodeModel = NodeModel::leaf("alloc::collections::BTreeMap");
        &MODEL
    }

    fn children(&self, _: usize) -> Option<Children<'_>> {
        None
    }

    fn children_mut(&mut self, _: usize) -> Option<ChildrenMut<'_>> {
        None
    }

    fn inherit_tracking(&mut self, flags: TrackingFlags) -> usize {
        self.values_mut()
            .map(|value| value.inherit_tracking(flags))
            .sum()
    }
}

impl<K: 'static, V: Node, S: 'static> Node for std::collections::HashMap<K, V, S> {
    fn model(&self) -> &'static NodeModel {
        static MODEL: NodeModel = NodeModel::leaf("std::collections::HashMap");
        &MODEL
    }

    fn children(&self, _: usize) -> Option<Children<'_>> {
        None
    }

    fn children_mut(&mut self, _: usize) -> Option<ChildrenMut<'_>> {
        None
    }

    fn inherit_tracking(&mut self, flags: TrackingFlags) -> usize {
        self.values_mut()
            .map(|value| value.inherit_tracking(flags))
            .sum()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::Folder;

    #[test]
    fn leaves_have_no_attributes_and_no_capability() {
        let mut value = 42_u32;
        let node: &mut dyn Node = &mut value;

        assert_eq!(node.type_path(), "u32");
        assert!(node.model().attributes.is_empty());
        assert!(node.children(0).is_none());
        assert!(node.as_trackable().is_none());
        assert_eq!(node.inherit_tracking(TrackingFlags::tracking(true)), 0);
    }

    #[test]
    fn present_option_exposes_the_inner_attributes() {
        let mut folder = Some(Folder::with_notes(2));
        let node: &mut dyn Node = &mut folder;

        assert!(node.type_path().ends_with("test_fixtures::Folder"));
        assert!(!node.model().attributes.is_empty());
        assert!(matches!(node.children(0), Some(Children::Loaded(notes)) if notes.len() == 2));
        assert!(matches!(node.children_mut(0), Some(ChildrenMut::Loaded(_))));
    }

    #[test]
    fn empty_option_is_a_leaf() {
        let empty: Option<Folder> = None;
        let node: &dyn Node = &empty;

        assert_eq!(node.type_path(), "core::option::Option");
        assert!(node.model().attributes.is_empty());
        assert!(node.children(0).is_none());
        assert!(node.as_trackable().is_none());
    }
}

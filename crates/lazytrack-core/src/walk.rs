//! Hierarchy walker: generic traversal of a node graph by capability.
//!
//! Nodes expose each declared attribute as a tagged `Children` view. The
//! walker validates every view against the attribute's declared `Shape`,
//! applies a pass to nodes carrying the target capability, and descends
//! only through attributes the model marks traversable.

use crate::{
    error::{ConfigError, TrackError},
    model::{AttributeModel, NodeModel, Shape},
    status::TrackingFlags,
    traits::{Capability, Node},
};
use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    ops::ControlFlow,
};

// ============================================================================
// Children views
// ============================================================================

///
/// ChildrenKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChildrenKind {
    Absent,
    Single,
    Loaded,
    Array,
}

impl ChildrenKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Single => "single value",
            Self::Loaded => "loaded entries",
            Self::Array => "array elements",
        }
    }

    /// Whether a view of this kind is valid for the declared shape.
    /// An absent value fits every shape.
    #[must_use]
    pub const fn fits(self, shape: Shape) -> bool {
        match self {
            Self::Absent => true,
            Self::Single => matches!(shape, Shape::Single),
            Self::Loaded => shape.supports_partial_load(),
            Self::Array => matches!(shape, Shape::FixedArray),
        }
    }
}

///
/// Children
///
/// Read-only view of one attribute's current value. Partially materialized
/// containers yield only their loaded entries.
///

pub enum Children<'a> {
    Absent,
    Single(&'a dyn Node),
    Loaded(Vec<&'a dyn Node>),
    Array(Vec<&'a dyn Node>),
}

impl<'a> Children<'a> {
    #[must_use]
    pub const fn kind(&self) -> ChildrenKind {
        match self {
            Self::Absent => ChildrenKind::Absent,
            Self::Single(_) => ChildrenKind::Single,
            Self::Loaded(_) => ChildrenKind::Loaded,
            Self::Array(_) => ChildrenKind::Array,
        }
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<&'a dyn Node> {
        match self {
            Self::Absent => Vec::new(),
            Self::Single(node) => vec![node],
            Self::Loaded(nodes) | Self::Array(nodes) => nodes,
        }
    }
}

///
/// ChildrenMut
///

pub enum ChildrenMut<'a> {
    Absent,
    Single(&'a mut dyn Node),
    Loaded(Vec<&'a mut dyn Node>),
    Array(Vec<&'a mut dyn Node>),
}

impl<'a> ChildrenMut<'a> {
    #[must_use]
    pub const fn kind(&self) -> ChildrenKind {
        match self {
            Self::Absent => ChildrenKind::Absent,
            Self::Single(_) => ChildrenKind::Single,
            Self::Loaded(_) => ChildrenKind::Loaded,
            Self::Array(_) => ChildrenKind::Array,
        }
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<&'a mut dyn Node> {
        match self {
            Self::Absent => Vec::new(),
            Self::Single(node) => vec![node],
            Self::Loaded(nodes) | Self::Array(nodes) => nodes,
        }
    }
}

// ============================================================================
// AttributeSlot
// ============================================================================

///
/// AttributeSlot
///
/// How a field value presents itself to the walker. Derived node types
/// present themselves as a single value; wrappers forward to their
/// contents; containers present their loaded entries.
///

pub trait AttributeSlot {
    fn slot(&self) -> Children<'_>;

    fn slot_mut(&mut self) -> ChildrenMut<'_>;

    /// Remember the owner's tracking flags for entries loaded later.
    /// Only partially materialized containers keep them.
    fn remember_flags(&mut self, _flags: TrackingFlags) {}
}

impl<T: AttributeSlot> AttributeSlot for Option<T> {
    fn slot(&self) -> Children<'_> {
        self.as_ref().map_or(Children::Absent, AttributeSlot::slot)
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        self.as_mut().map_or(ChildrenMut::Absent, AttributeSlot::slot_mut)
    }

    fn remember_flags(&mut self, flags: TrackingFlags) {
        if let Some(value) = self {
            value.remember_flags(flags);
        }
    }
}

impl<T: AttributeSlot> AttributeSlot for Box<T> {
    fn slot(&self) -> Children<'_> {
        (**self).slot()
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        (**self).slot_mut()
    }

    fn remember_flags(&mut self, flags: TrackingFlags) {
        (**self).remember_flags(flags);
    }
}

impl<T: Node> AttributeSlot for Vec<T> {
    fn slot(&self) -> Children<'_> {
        Children::Loaded(self.iter().map(|v| v as &dyn Node).collect())
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        ChildrenMut::Loaded(self.iter_mut().map(|v| v as &mut dyn Node).collect())
    }
}

impl<T: Node> AttributeSlot for VecDeque<T> {
    fn slot(&self) -> Children<'_> {
        Children::Loaded(self.iter().map(|v| v as &dyn Node).collect())
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        ChildrenMut::Loaded(self.iter_mut().map(|v| v as &mut dyn Node).collect())
    }
}

impl<T: Node, const N: usize> AttributeSlot for [T; N] {
    fn slot(&self) -> Children<'_> {
        Children::Array(self.iter().map(|v| v as &dyn Node).collect())
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        ChildrenMut::Array(self.iter_mut().map(|v| v as &mut dyn Node).collect())
    }
}

impl<K, V: Node> AttributeSlot for BTreeMap<K, V> {
    fn slot(&self) -> Children<'_> {
        Children::Loaded(self.values().map(|v| v as &dyn Node).collect())
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        ChildrenMut::Loaded(self.values_mut().map(|v| v as &mut dyn Node).collect())
    }
}

impl<K, V: Node, S> AttributeSlot for HashMap<K, V, S> {
    fn slot(&self) -> Children<'_> {
        Children::Loaded(self.values().map(|v| v as &dyn Node).collect())
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        ChildrenMut::Loaded(self.values_mut().map(|v| v as &mut dyn Node).collect())
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Attribute filter that excludes nothing.
#[must_use]
pub const fn exclude_none(_: &AttributeModel) -> bool {
    false
}

/// Attribute filter that keeps only composition attributes.
#[must_use]
pub const fn exclude_non_composition(attribute: &AttributeModel) -> bool {
    !attribute.is_composition()
}

/// Apply `mutation` to `root` and, when `recurse` is set, to every reachable
/// node carrying capability `C`.
///
/// Attributes are processed in declaration order. Descent stops at values
/// that lack the capability. An absent root is a no-op.
pub fn apply_to_hierarchy<C: Capability>(
    root: Option<&mut dyn Node>,
    mutation: &mut dyn FnMut(&mut C::Target),
    recurse: bool,
    exclude: &dyn Fn(&AttributeModel) -> bool,
) -> Result<(), TrackError> {
    let Some(root) = root else {
        return Ok(());
    };

    apply_node::<C>(root, mutation, recurse, exclude)
}

fn apply_node<C: Capability>(
    node: &mut dyn Node,
    mutation: &mut dyn FnMut(&mut C::Target),
    recurse: bool,
    exclude: &dyn Fn(&AttributeModel) -> bool,
) -> Result<(), TrackError> {
    if let Some(target) = C::query_mut(node) {
        mutation(target);
    }
    if !recurse {
        return Ok(());
    }

    let model = node.model();
    for (index, attribute) in model.attributes.iter().enumerate() {
        if !attribute.is_traversable() || exclude(attribute) {
            continue;
        }

        let children = node
            .children_mut(index)
            .ok_or_else(|| unreadable_attribute(model, attribute, index))?;
        check_shape(model, attribute, children.kind())?;

        for child in children.into_nodes() {
            if C::query(&*child).is_some() {
                apply_node::<C>(child, mutation, recurse, exclude)?;
            }
        }
    }

    Ok(())
}

/// Read-only counterpart of `apply_to_hierarchy`.
///
/// The visitor may return `ControlFlow::Break` to end the walk early; the
/// break is returned to the caller.
pub fn visit_hierarchy<C: Capability>(
    root: Option<&dyn Node>,
    visit: &mut dyn FnMut(&C::Target) -> ControlFlow<()>,
    recurse: bool,
    exclude: &dyn Fn(&AttributeModel) -> bool,
) -> Result<ControlFlow<()>, TrackError> {
    let Some(root) = root else {
        return Ok(ControlFlow::Continue(()));
    };

    visit_node::<C>(root, visit, recurse, exclude)
}

fn visit_node<C: Capability>(
    node: &dyn Node,
    visit: &mut dyn FnMut(&C::Target) -> ControlFlow<()>,
    recurse: bool,
    exclude: &dyn Fn(&AttributeModel) -> bool,
) -> Result<ControlFlow<()>, TrackError> {
    if let Some(target) = C::query(node)
        && visit(target).is_break()
    {
        return Ok(ControlFlow::Break(()));
    }
    if !recurse {
        return Ok(ControlFlow::Continue(()));
    }

    let model = node.model();
    for (index, attribute) in model.attributes.iter().enumerate() {
        if !attribute.is_traversable() || exclude(attribute) {
            continue;
        }

        let children = node
            .children(index)
            .ok_or_else(|| unreadable_attribute(model, attribute, index))?;
        check_shape(model, attribute, children.kind())?;

        for child in children.into_nodes() {
            if C::query(child).is_some()
                && visit_node::<C>(child, visit, recurse, exclude)?.is_break()
            {
                return Ok(ControlFlow::Break(()));
            }
        }
    }

    Ok(ControlFlow::Continue(()))
}

fn unreadable_attribute(
    model: &NodeModel,
    attribute: &AttributeModel,
    index: usize,
) -> TrackError {
    ConfigError::UnreadableAttribute {
        owner: model.path,
        attribute: attribute.name,
        index,
    }
    .into()
}

fn check_shape(
    model: &NodeModel,
    attribute: &AttributeModel,
    found: ChildrenKind,
) -> Result<(), TrackError> {
    if found.fits(attribute.shape) {
        return Ok(());
    }

    Err(ConfigError::ShapeMismatch {
        owner: model.path,
        attribute: attribute.name,
        declared: attribute.shape,
        found: found.name(),
    }
    .into())
}

///
/// TESTS
///

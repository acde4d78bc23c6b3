//! Registration-time description of node shapes.
//!
//! Models are emitted once per type by `#[derive(Node)]` / `#[derive(Trackable)]`
//! and are never rebuilt during traversal.

use derive_more::Display;

///
/// NodeModel
/// Minimal, macro-generated runtime model for one node type.
///

#[derive(Debug)]
pub struct NodeModel {
    /// Fully-qualified Rust type path (for dispatch and diagnostics).
    pub path: &'static str,
    /// Declared attributes, in declaration order.
    pub attributes: &'static [AttributeModel],
}

impl NodeModel {
    /// Model for a type with no traversable attributes.
    #[must_use]
    pub const fn leaf(path: &'static str) -> Self {
        Self {
            path,
            attributes: &[],
        }
    }

    /// Look up an attribute and its declaration index by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<(usize, &'static AttributeModel)> {
        self.attributes
            .iter()
            .enumerate()
            .find(|(_, attribute)| attribute.name == name)
    }

    /// Attribute at a declaration index.
    #[must_use]
    pub fn attribute_at(&self, index: usize) -> Option<&'static AttributeModel> {
        self.attributes.get(index)
    }

    /// Iterate the lazily-loaded attributes.
    pub fn lazy_attributes(&self) -> impl Iterator<Item = &'static AttributeModel> {
        self.attributes.iter().filter(|attribute| attribute.is_lazy())
    }
}

///
/// AttributeModel
/// Declared facts about one attribute of a node.
///

#[derive(Debug)]
pub struct AttributeModel {
    /// Field name as declared on the owner.
    pub name: &'static str,
    /// Container shape resolved at registration.
    pub shape: Shape,
    /// Whether the value can hold nodes at all.
    pub value: ValueKind,
    /// Declarative markers.
    pub modifiers: Modifiers,
    /// Present when the attribute is resolved on first access.
    pub lazy: Option<LazyModel>,
}

impl AttributeModel {
    /// Whether the walker may read and descend into this attribute.
    ///
    /// Transient attributes are skipped unless forced trackable; shared and
    /// cycle-breaking attributes are always skipped, as are immutable values.
    #[must_use]
    pub const fn is_traversable(&self) -> bool {
        let m = &self.modifiers;

        if m.transient && !m.force_trackable {
            return false;
        }
        if m.shared || m.no_traverse {
            return false;
        }

        matches!(self.value, ValueKind::Node)
    }

    #[must_use]
    pub const fn is_composition(&self) -> bool {
        self.modifiers.composition
    }

    #[must_use]
    pub const fn is_lazy(&self) -> bool {
        self.lazy.is_some()
    }
}

///
/// Shape
///
/// Closed set of attribute shapes the walker understands.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Shape {
    #[display("single value")]
    Single,
    #[display("keyed mapping")]
    KeyedMapping,
    #[display("ordered collection")]
    OrderedCollection,
    #[display("fixed array")]
    FixedArray,
}

impl Shape {
    /// Whether the shape can hold a partially materialized value.
    #[must_use]
    pub const fn supports_partial_load(self) -> bool {
        matches!(self, Self::KeyedMapping | Self::OrderedCollection)
    }
}

///
/// ValueKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    /// Primitive or known-immutable value; never traversed.
    Immutable,
    /// Value is (or contains) nodes.
    Node,
}

///
/// Modifiers
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
    pub transient: bool,
    pub force_trackable: bool,
    pub shared: bool,
    pub no_traverse: bool,
    pub composition: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        transient: false,
        force_trackable: false,
        shared: false,
        no_traverse: false,
        composition: false,
    };
}

///
/// LazyModel
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LazyModel {
    /// Shape the supplier must produce.
    pub shape: LazyShape,
    /// Declared factory type path.
    pub factory: &'static str,
}

///
/// LazyShape
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum LazyShape {
    #[display("single-value")]
    Single,
    #[display("keyed-mapping")]
    KeyedMapping,
}

///
/// TESTS
///

//! Hand-written node types for unit tests.
//!
//! These implement `Node` the same way `#[derive(Trackable)]` output does,
//! so runtime modules can be tested without the proc-macro crate.

use crate::{
    collection::LazyMap,
    error::{SupplyError, TrackError},
    lazy::{Lazy, Supplier, SupplierFactory, resolve},
    model::{AttributeModel, LazyModel, LazyShape, Modifiers, NodeModel, Shape, ValueKind},
    status::{TrackingFlags, TrackingStatus},
    traits::{Node, Trackable},
    walk::{AttributeSlot, Children, ChildrenMut},
};
use std::{any::Any, cell::Cell, collections::BTreeMap, rc::Rc};

const COMPOSITION: Modifiers = Modifiers {
    composition: true,
    ..Modifiers::NONE
};

const fn attribute(
    name: &'static str,
    shape: Shape,
    value: ValueKind,
    modifiers: Modifiers,
    lazy: Option<LazyModel>,
) -> AttributeModel {
    AttributeModel {
        name,
        shape,
        value,
        modifiers,
        lazy,
    }
}

macro_rules! impl_fixture_capability {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Trackable for $ty {
                fn tracking_status(&self) -> &TrackingStatus {
                    &self.status
                }

                fn tracking_status_mut(&mut self) -> &mut TrackingStatus {
                    &mut self.status
                }

                fn wrapped_object(&self) -> &dyn Any {
                    self
                }
            }

            impl AttributeSlot for $ty {
                fn slot(&self) -> Children<'_> {
                    Children::Single(self)
                }

                fn slot_mut(&mut self) -> ChildrenMut<'_> {
                    ChildrenMut::Single(self)
                }
            }
        )*
    };
}

impl_fixture_capability!(Note, Folder, Broken, Shelf, Catalog);

// ============================================================================
// Note
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Note {
    status: TrackingStatus,
    pub value: u32,
}

impl Note {
    pub fn with_value(value: u32) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn set_value(&mut self, value: u32) -> &mut Self {
        self.status.record_write(&self.value, &value);
        self.value = value;
        self
    }
}

static NOTE_ATTRIBUTES: [AttributeModel; 1] = [attribute(
    "value",
    Shape::Single,
    ValueKind::Immutable,
    Modifiers::NONE,
    None,
)];

static NOTE_MODEL: NodeModel = NodeModel {
    path: concat!(module_path!(), "::Note"),
    attributes: &NOTE_ATTRIBUTES,
};

impl Node for Note {
    fn model(&self) -> &'static NodeModel {
        &NOTE_MODEL
    }

    fn children(&self, index: usize) -> Option<Children<'_>> {
        (index == 0).then_some(Children::Absent)
    }

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>> {
        (index == 0).then_some(ChildrenMut::Absent)
    }

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        Some(self)
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        Some(self)
    }
}

// ============================================================================
// Folder
// ============================================================================

#[derive(Debug, Default)]
pub struct Folder {
    status: TrackingStatus,
    pub notes: Vec<Note>,
    pub pinned: [Note; 2],
    pub child: Option<Box<Folder>>,
    pub parent_hint: Option<Box<Note>>,
    pub scratch: Option<Note>,
}

impl Folder {
    pub fn with_notes(count: u32) -> Self {
        Self {
            notes: (0..count).map(Note::with_value).collect(),
            ..Self::default()
        }
    }
}

static FOLDER_ATTRIBUTES: [AttributeModel; 5] = [
    attribute(
        "notes",
        Shape::OrderedCollection,
        ValueKind::Node,
        COMPOSITION,
        None,
    ),
    attribute(
        "pinned",
        Shape::FixedArray,
        ValueKind::Node,
        Modifiers::NONE,
        None,
    ),
    attribute("child", Shape::Single, ValueKind::Node, COMPOSITION, None),
    attribute(
        "parent_hint",
        Shape::Single,
        ValueKind::Node,
        Modifiers {
            no_traverse: true,
            ..Modifiers::NONE
        },
        None,
    ),
    attribute(
        "scratch",
        Shape::Single,
        ValueKind::Node,
        Modifiers {
            transient: true,
            ..Modifiers::NONE
        },
        None,
    ),
];

static FOLDER_MODEL: NodeModel = NodeModel {
    path: concat!(module_path!(), "::Folder"),
    attributes: &FOLDER_ATTRIBUTES,
};

impl Node for Folder {
    fn model(&self) -> &'static NodeModel {
        &FOLDER_MODEL
    }

    fn children(&self, index: usize) -> Option<Children<'_>> {
        match index {
            0 => Some(self.notes.slot()),
            1 => Some(self.pinned.slot()),
            2 => Some(self.child.slot()),
            3 => Some(self.parent_hint.slot()),
            4 => Some(self.scratch.slot()),
            _ => None,
        }
    }

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>> {
        match index {
            0 => Some(self.notes.slot_mut()),
            1 => Some(self.pinned.slot_mut()),
            2 => Some(self.child.slot_mut()),
            3 => Some(self.parent_hint.slot_mut()),
            4 => Some(self.scratch.slot_mut()),
            _ => None,
        }
    }

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        Some(self)
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        Some(self)
    }
}

// ============================================================================
// Broken
// ============================================================================

/// Declares a collection but yields a single value, and declares an
/// attribute it cannot read.
#[derive(Debug, Default)]
pub struct Broken {
    status: TrackingStatus,
    notes: Note,
}

static BROKEN_ATTRIBUTES: [AttributeModel; 2] = [
    attribute(
        "notes",
        Shape::OrderedCollection,
        ValueKind::Node,
        Modifiers::NONE,
        None,
    ),
    attribute("extra", Shape::Single, ValueKind::Node, Modifiers::NONE, None),
];

static BROKEN_MODEL: NodeModel = NodeModel {
    path: concat!(module_path!(), "::Broken"),
    attributes: &BROKEN_ATTRIBUTES,
};

impl Node for Broken {
    fn model(&self) -> &'static NodeModel {
        &BROKEN_MODEL
    }

    fn children(&self, index: usize) -> Option<Children<'_>> {
        (index == 0).then(|| Children::Single(&self.notes))
    }

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>> {
        (index == 0).then(|| ChildrenMut::Single(&mut self.notes))
    }

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        Some(self)
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        Some(self)
    }
}

// ============================================================================
// Shelf
// ============================================================================

///
/// ShelfSupplies
/// Shared handle counting supplier calls made on behalf of a `Shelf`.
///

#[derive(Clone, Default)]
pub struct ShelfSupplies(Rc<SuppliesState>);

struct SuppliesState {
    featured: Cell<Option<u32>>,
    featured_calls: Cell<usize>,
    fail_next: Cell<bool>,
}

impl Default for SuppliesState {
    fn default() -> Self {
        Self {
            featured: Cell::new(Some(7)),
            featured_calls: Cell::new(0),
            fail_next: Cell::new(false),
        }
    }
}

impl ShelfSupplies {
    pub fn featured_calls(&self) -> usize {
        self.0.featured_calls.get()
    }

    pub fn set_featured(&self, value: Option<u32>) {
        self.0.featured.set(value);
    }

    pub fn fail_next(&self) {
        self.0.fail_next.set(true);
    }

    fn next_featured(&self) -> Result<Option<Note>, SupplyError> {
        self.0.featured_calls.set(self.featured_calls() + 1);
        if self.0.fail_next.replace(false) {
            return Err("shelf store offline".into());
        }

        Ok(self.0.featured.get().map(Note::with_value))
    }
}

pub struct Shelf {
    status: TrackingStatus,
    supplies: ShelfSupplies,
    pub title: u32,
    pub featured: Lazy<Note>,
    pub archive: Lazy<BTreeMap<u32, Note>>,
    pub draft: Lazy<Note>,
}

impl Shelf {
    pub fn new(supplies: &ShelfSupplies) -> Self {
        Self {
            status: TrackingStatus::new(),
            supplies: supplies.clone(),
            title: 0,
            featured: Lazy::new(),
            archive: Lazy::new(),
            draft: Lazy::new(),
        }
    }

    pub fn featured(&mut self) -> Result<Option<&mut Note>, TrackError> {
        resolve::<Self, Self, Note>(self, 1, |shelf| &mut shelf.featured)
    }

    pub fn archive(&mut self) -> Result<Option<&mut BTreeMap<u32, Note>>, TrackError> {
        resolve::<Self, ArchiveFactory, BTreeMap<u32, Note>>(self, 2, |shelf| &mut shelf.archive)
    }

    pub fn draft(&mut self) -> Result<Option<&mut Note>, TrackError> {
        resolve::<Self, DraftFactory, Note>(self, 3, |shelf| &mut shelf.draft)
    }
}

static SHELF_ATTRIBUTES: [AttributeModel; 4] = [
    attribute(
        "title",
        Shape::Single,
        ValueKind::Immutable,
        Modifiers::NONE,
        None,
    ),
    attribute(
        "featured",
        Shape::Single,
        ValueKind::Node,
        COMPOSITION,
        Some(LazyModel {
            shape: LazyShape::Single,
            factory: "Shelf",
        }),
    ),
    attribute(
        "archive",
        Shape::KeyedMapping,
        ValueKind::Node,
        COMPOSITION,
        Some(LazyModel {
            shape: LazyShape::KeyedMapping,
            factory: "ArchiveFactory",
        }),
    ),
    attribute(
        "draft",
        Shape::Single,
        ValueKind::Node,
        Modifiers::NONE,
        Some(LazyModel {
            shape: LazyShape::Single,
            factory: "DraftFactory",
        }),
    ),
];

static SHELF_MODEL: NodeModel = NodeModel {
    path: concat!(module_path!(), "::Shelf"),
    attributes: &SHELF_ATTRIBUTES,
};

impl Node for Shelf {
    fn model(&self) -> &'static NodeModel {
        &SHELF_MODEL
    }

    fn children(&self, index: usize) -> Option<Children<'_>> {
        match index {
            0 => Some(Children::Absent),
            1 => Some(self.featured.slot()),
            2 => Some(self.archive.slot()),
            3 => Some(self.draft.slot()),
            _ => None,
        }
    }

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>> {
        match index {
            0 => Some(ChildrenMut::Absent),
            1 => Some(self.featured.slot_mut()),
            2 => Some(self.archive.slot_mut()),
            3 => Some(self.draft.slot_mut()),
            _ => None,
        }
    }

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        Some(self)
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        Some(self)
    }
}

impl SupplierFactory<Self, Note> for Shelf {
    fn supplier(&self, attribute: &'static AttributeModel) -> Option<Supplier<'_, Self, Note>> {
        (attribute.name == "featured")
            .then(|| Supplier::single(|shelf: &Self| shelf.supplies.next_featured()))
    }

    fn instantiate() -> Option<Self> {
        None
    }
}

/// Produces a single-value supplier for a keyed-mapping attribute.
pub struct ArchiveFactory;

impl SupplierFactory<Shelf, BTreeMap<u32, Note>> for ArchiveFactory {
    fn supplier(
        &self,
        _: &'static AttributeModel,
    ) -> Option<Supplier<'_, Shelf, BTreeMap<u32, Note>>> {
        Some(Supplier::single(|_: &Shelf| Ok(Some(BTreeMap::new()))))
    }

    fn instantiate() -> Option<Self> {
        Some(Self)
    }
}

/// Knows no attributes.
pub struct DraftFactory;

impl SupplierFactory<Shelf, Note> for DraftFactory {
    fn supplier(&self, _: &'static AttributeModel) -> Option<Supplier<'_, Shelf, Note>> {
        None
    }

    fn instantiate() -> Option<Self> {
        Some(Self)
    }
}

// ============================================================================
// Catalog
// ============================================================================

pub struct Catalog {
    status: TrackingStatus,
    pub notes: LazyMap<u32, Note>,
}

impl Catalog {
    pub fn new(notes: LazyMap<u32, Note>) -> Self {
        Self {
            status: TrackingStatus::new(),
            notes,
        }
    }
}

static CATALOG_ATTRIBUTES: [AttributeModel; 1] = [attribute(
    "notes",
    Shape::KeyedMapping,
    ValueKind::Node,
    COMPOSITION,
    None,
)];

static CATALOG_MODEL: NodeModel = NodeModel {
    path: concat!(module_path!(), "::Catalog"),
    attributes: &CATALOG_ATTRIBUTES,
};

impl Node for Catalog {
    fn model(&self) -> &'static NodeModel {
        &CATALOG_MODEL
    }

    fn children(&self, index: usize) -> Option<Children<'_>> {
        (index == 0).then(|| self.notes.slot())
    }

    fn children_mut(&mut self, index: usize) -> Option<ChildrenMut<'_>> {
        (index == 0).then(|| self.notes.slot_mut())
    }

    fn as_trackable(&self) -> Option<&(dyn Trackable + 'static)> {
        Some(self)
    }

    fn as_trackable_mut(&mut self) -> Option<&mut (dyn Trackable + 'static)> {
        Some(self)
    }

    fn remember_container_flags(&mut self, flags: TrackingFlags) {
        self.notes.remember_flags(flags);
    }
}

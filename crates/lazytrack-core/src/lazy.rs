//! Lazy materialization of attributes on first access.

use crate::{
    error::{ConfigError, SupplyError, TrackError},
    model::{AttributeModel, LazyShape},
    obs::{self, TrackEvent},
    status::TrackingFlags,
    traits::Node,
    walk::{AttributeSlot, Children, ChildrenMut},
};
use std::{any::Any, fmt};

// ============================================================================
// Lazy slot
// ============================================================================

///
/// Lazy
///
/// Attribute slot that starts unresolved and holds the materialized value
/// (or the knowledge that there is none) once resolved.
///

#[derive(Clone, PartialEq)]
pub struct Lazy<T> {
    state: LazyState<T>,
}

#[derive(Clone, PartialEq)]
enum LazyState<T> {
    Unresolved,
    Resolved(Option<T>),
}

impl<T> Lazy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LazyState::Unresolved,
        }
    }

    /// A slot that is already materialized.
    #[must_use]
    pub const fn resolved(value: Option<T>) -> Self {
        Self {
            state: LazyState::Resolved(value),
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.state, LazyState::Resolved(_))
    }

    /// The materialized value, without triggering resolution.
    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match &self.state {
            LazyState::Resolved(value) => value.as_ref(),
            LazyState::Unresolved => None,
        }
    }

    pub const fn loaded_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            LazyState::Resolved(value) => value.as_mut(),
            LazyState::Unresolved => None,
        }
    }

    /// Store a value directly. Never records a change on the owner.
    pub fn set(&mut self, value: Option<T>) {
        self.state = LazyState::Resolved(value);
    }

    /// Forget the materialized value so the next access resolves again.
    pub fn invalidate(&mut self) {
        self.state = LazyState::Unresolved;
    }
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            LazyState::Unresolved => f.write_str("Lazy(<unresolved>)"),
            LazyState::Resolved(value) => f.debug_tuple("Lazy").field(value).finish(),
        }
    }
}

impl<T: AttributeSlot> AttributeSlot for Lazy<T> {
    fn slot(&self) -> Children<'_> {
        self.loaded().map_or(Children::Absent, AttributeSlot::slot)
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        self.loaded_mut()
            .map_or(ChildrenMut::Absent, AttributeSlot::slot_mut)
    }

    fn remember_flags(&mut self, flags: TrackingFlags) {
        if let Some(value) = self.loaded_mut() {
            value.remember_flags(flags);
        }
    }
}

// ============================================================================
// Suppliers
// ============================================================================

/// Boxed supplier body: produces the value for an owner.
pub type SupplyFn<'a, O, T> = Box<dyn Fn(&O) -> Result<Option<T>, SupplyError> + 'a>;

///
/// Supplier
///
/// Produces the real value of one lazy attribute, with the owner as
/// context. The variant must match the attribute's declared `LazyShape`.
///

pub enum Supplier<'a, O, T> {
    Single(SupplyFn<'a, O, T>),
    KeyedMapping(SupplyFn<'a, O, T>),
}

impl<'a, O, T> Supplier<'a, O, T> {
    pub fn single(f: impl Fn(&O) -> Result<Option<T>, SupplyError> + 'a) -> Self {
        Self::Single(Box::new(f))
    }

    pub fn keyed_mapping(f: impl Fn(&O) -> Result<Option<T>, SupplyError> + 'a) -> Self {
        Self::KeyedMapping(Box::new(f))
    }

    #[must_use]
    pub const fn shape(&self) -> LazyShape {
        match self {
            Self::Single(_) => LazyShape::Single,
            Self::KeyedMapping(_) => LazyShape::KeyedMapping,
        }
    }

    pub fn supply(&self, owner: &O) -> Result<Option<T>, SupplyError> {
        match self {
            Self::Single(f) | Self::KeyedMapping(f) => f(owner),
        }
    }
}

///
/// SupplierFactory
///
/// Pluggable strategy producing suppliers for the lazy attributes of `O`
/// whose value type is `T`. An owner type may act as its own factory.
///

pub trait SupplierFactory<O, T>: Any {
    /// Supplier for `attribute`, or `None` if this factory has none.
    fn supplier(&self, attribute: &'static AttributeModel) -> Option<Supplier<'_, O, T>>;

    /// A standalone instance, used when the owner is not itself the
    /// factory. `None` for factories that only work as the owner.
    fn instantiate() -> Option<Self>
    where
        Self: Sized;
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the lazy attribute at `index` on `owner`.
///
/// An already materialized slot is returned as is. Owners marked new never
/// consult a supplier. A freshly supplied value inherits the owner's
/// tracking flags and is written through `slot` without recording a change.
pub fn resolve<'o, O, F, T>(
    owner: &'o mut O,
    index: usize,
    slot: fn(&mut O) -> &mut Lazy<T>,
) -> Result<Option<&'o mut T>, TrackError>
where
    O: Node,
    F: SupplierFactory<O, T>,
    T: Node,
{
    if slot(owner).is_resolved() {
        return Ok(slot(owner).loaded_mut());
    }

    let model = owner.model();
    let attribute = model
        .attribute_at(index)
        .ok_or(ConfigError::UnknownAttribute {
            owner: model.path,
            index,
            declared: model.attributes.len(),
        })?;
    let lazy = attribute.lazy.ok_or(ConfigError::NotLazy {
        owner: model.path,
        attribute: attribute.name,
    })?;

    if owner.as_trackable().is_some_and(|t| t.is_this_new()) {
        obs::sink::record(TrackEvent::LazySkippedNew {
            owner: model.path,
            attribute: attribute.name,
        });

        return Ok(None);
    }

    let missing = || ConfigError::MissingSupplier {
        owner: model.path,
        attribute: attribute.name,
        factory: lazy.factory,
    };

    let supplied = {
        let instance;
        let factory: &F = match (&*owner as &dyn Any).downcast_ref::<F>() {
            Some(factory) => factory,
            None => {
                instance = F::instantiate().ok_or_else(missing)?;
                &instance
            }
        };

        let supplier = factory.supplier(attribute).ok_or_else(missing)?;
        if supplier.shape() != lazy.shape {
            return Err(ConfigError::SupplierShapeMismatch {
                owner: model.path,
                attribute: attribute.name,
                factory: lazy.factory,
                expected: lazy.shape,
                found: supplier.shape(),
            }
            .into());
        }

        supplier.supply(owner).map_err(|source| {
            TrackError::supply(format!("{}.{}", model.path, attribute.name), source)
        })?
    };

    let mut value = supplied;
    if let (Some(flags), Some(value)) = (
        owner.as_trackable().map(|t| t.tracking_flags()),
        value.as_mut(),
    ) {
        let objects = value.inherit_tracking(flags);
        if objects > 0 {
            obs::sink::record(TrackEvent::FlagsInherited {
                owner: model.path,
                attribute: attribute.name,
                objects: objects as u64,
            });
        }
    }

    let slot = slot(owner);
    slot.set(value);
    obs::sink::record(TrackEvent::LazyResolved {
        owner: model.path,
        attribute: attribute.name,
    });

    Ok(slot.loaded_mut())
}

///
/// TESTS
///

use crate::prelude::*;
use lazytrack::model::AttributeModel;
use std::cell::Cell;

thread_local! {
    static ADDRESS_LOOKUPS: Cell<usize> = const { Cell::new(0) };
}

/// Address lookups made on this thread.
#[must_use]
pub fn address_lookups() -> usize {
    ADDRESS_LOOKUPS.with(Cell::get)
}

///
/// Customer
///

#[derive(Debug, Default, Trackable)]
pub struct Customer {
    #[track(status)]
    status: TrackingStatus,

    pub name: String,

    #[track(lazy = "AddressBook", composition)]
    pub address: Lazy<Address>,

    /// Order lines keyed by order number, fetched on demand.
    #[track(composition, no_setter)]
    pub orders: LazyMap<u64, crate::billing::Line>,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

///
/// Address
///

#[derive(Clone, Debug, Default, PartialEq, Trackable)]
pub struct Address {
    #[track(status)]
    status: TrackingStatus,
    pub city: String,
}

///
/// AddressBook
/// Standalone factory; customers are not their own address supplier.
///

#[derive(Default)]
pub struct AddressBook;

impl SupplierFactory<Customer, Address> for AddressBook {
    fn supplier(
        &self,
        attribute: &'static AttributeModel,
    ) -> Option<Supplier<'_, Customer, Address>> {
        (attribute.name == "address").then(|| {
            Supplier::single(|customer: &Customer| {
                ADDRESS_LOOKUPS.with(|lookups| lookups.set(lookups.get() + 1));

                Ok((!customer.name.is_empty()).then(|| Address {
                    city: format!("{} city", customer.name),
                    ..Address::default()
                }))
            })
        })
    }

    fn instantiate() -> Option<Self> {
        Some(Self)
    }
}

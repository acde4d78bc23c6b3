//! Model fixtures for end-to-end tracking tests: invoices with lazily
//! loaded lines, customers with lazily resolved addresses, and plain
//! payment terms held through the delegate adapter.

pub mod billing;
pub mod customer;

pub mod prelude {
    pub use crate::{
        billing::{Invoice, Line, LineStore, StoreError, Terms},
        customer::{Address, AddressBook, Customer, address_lookups},
    };
    pub use lazytrack::prelude::*;
}

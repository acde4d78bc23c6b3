//! Partially materialized containers.
//!
//! Both containers know their full index or key space up front and fetch
//! entries on demand. Bulk passes (walker, flag inheritance) only ever see
//! the loaded subset; `load_all` is the explicit force-load view.

mod lazy_list;
mod lazy_map;

pub use lazy_list::*;
pub use lazy_map::*;

///
/// Entry
///

#[derive(Clone, Debug, Eq, PartialEq)]
enum Entry<T> {
    Pending,
    Loaded(T),
}

impl<T> Entry<T> {
    const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Pending => None,
        }
    }

    const fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Pending => None,
        }
    }

    fn into_loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Pending => None,
        }
    }
}

use crate::{customer::Customer, prelude::*};
use lazytrack::model::AttributeModel;
use std::{cell::Cell, collections::BTreeMap, rc::Rc};
use thiserror::Error as ThisError;

///
/// Line
///

#[derive(Clone, Debug, Default, PartialEq, Trackable)]
pub struct Line {
    #[track(status)]
    status: TrackingStatus,
    pub sku: String,
    pub amount: u64,
}

impl Line {
    pub fn new(sku: impl Into<String>, amount: u64) -> Self {
        Self {
            sku: sku.into(),
            amount,
            ..Self::default()
        }
    }
}

///
/// Terms
/// Plain value with no tracking state of its own; invoices hold it through
/// the `Tracked` adapter.
///

#[derive(Clone, Debug, Default, Node, PartialEq)]
pub struct Terms {
    pub days: u32,
    #[track(composition)]
    pub penalty: Option<Line>,
}

///
/// Invoice
///

#[derive(Trackable)]
pub struct Invoice {
    #[track(status)]
    status: TrackingStatus,

    pub id: u64,

    #[track(no_setter)]
    pub customer: Option<Rc<Customer>>,

    #[track(lazy = "Self", composition)]
    pub lines: Lazy<LazyList<Line>>,

    #[track(lazy = "Self", composition)]
    pub adjustments: Lazy<BTreeMap<u32, Line>>,

    #[track(composition)]
    pub terms: Tracked<Terms>,

    #[track(transient)]
    pub preview: Option<Line>,

    #[track(transient, force, composition)]
    pub draft: Option<Line>,

    #[track(skip, no_setter)]
    pub previous: Option<Box<Invoice>>,

    #[track(immutable, no_setter)]
    store: LineStore,
}

impl Invoice {
    pub fn new(id: u64, store: &LineStore) -> Self {
        Self {
            status: TrackingStatus::new(),
            id,
            customer: None,
            lines: Lazy::new(),
            adjustments: Lazy::new(),
            terms: Tracked::default(),
            preview: None,
            draft: None,
            previous: None,
            store: store.clone(),
        }
    }
}

impl SupplierFactory<Self, LazyList<Line>> for Invoice {
    fn supplier(&self, attribute: &'static AttributeModel) -> Option<Supplier<'_, Self, LazyList<Line>>> {
        (attribute.name == "lines").then(|| {
            Supplier::single(|invoice: &Self| invoice.store.lines(invoice.id).map(Some))
        })
    }

    fn instantiate() -> Option<Self> {
        None
    }
}

impl SupplierFactory<Self, BTreeMap<u32, Line>> for Invoice {
    fn supplier(
        &self,
        attribute: &'static AttributeModel,
    ) -> Option<Supplier<'_, Self, BTreeMap<u32, Line>>> {
        (attribute.name == "adjustments").then(|| {
            Supplier::keyed_mapping(|invoice: &Self| Ok(invoice.store.adjustments()))
        })
    }

    fn instantiate() -> Option<Self> {
        None
    }
}

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("line store is offline")]
    Offline,
}

///
/// LineStore
///
/// In-memory stand-in for the persistence layer behind invoice lines.
/// Handles are cheap to clone and share their counters.
///

#[derive(Clone, Default)]
pub struct LineStore(Rc<StoreState>);

#[derive(Default)]
struct StoreState {
    total: usize,
    preloaded: usize,
    offline: Cell<bool>,
    list_supplies: Cell<usize>,
    line_fetches: Cell<usize>,
}

impl LineStore {
    /// A store holding `total` lines per invoice, of which the first
    /// `preloaded` arrive with the list.
    #[must_use]
    pub fn new(total: usize, preloaded: usize) -> Self {
        Self(Rc::new(StoreState {
            total,
            preloaded,
            ..StoreState::default()
        }))
    }

    #[must_use]
    pub fn list_supplies(&self) -> usize {
        self.0.list_supplies.get()
    }

    #[must_use]
    pub fn line_fetches(&self) -> usize {
        self.0.line_fetches.get()
    }

    pub fn set_offline(&self, offline: bool) {
        self.0.offline.set(offline);
    }

    fn lines(&self, invoice: u64) -> Result<LazyList<Line>, SupplyError> {
        if self.0.offline.get() {
            return Err(StoreError::Offline.into());
        }
        self.0.list_supplies.set(self.list_supplies() + 1);

        let preloaded = (0..self.0.preloaded.min(self.0.total))
            .map(|index| line(invoice, index))
            .collect::<Result<Vec<_>, _>>()?;
        let state = Rc::clone(&self.0);

        Ok(LazyList::partially_loaded(
            self.0.total,
            preloaded,
            move |index: usize| -> Result<Line, SupplyError> {
                if state.offline.get() {
                    return Err(StoreError::Offline.into());
                }
                state.line_fetches.set(state.line_fetches.get() + 1);

                line(invoice, index)
            },
        ))
    }

    fn adjustments(&self) -> Option<BTreeMap<u32, Line>> {
        (self.0.total > 0).then(|| BTreeMap::from([(1, Line::new("discount", 5))]))
    }
}

fn line(invoice: u64, index: usize) -> Result<Line, SupplyError> {
    Ok(Line::new(format!("{invoice}-{index}"), 10 * u64::try_from(index)?))
}

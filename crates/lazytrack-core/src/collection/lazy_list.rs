use super::Entry;
use crate::{
    error::{SupplyError, TrackError},
    model::NodeModel,
    obs::{TrackEvent, sink::record},
    status::TrackingFlags,
    traits::Node,
    walk::{AttributeSlot, Children, ChildrenMut},
};
use std::fmt;

///
/// ElementSource
///
/// Fetches one element of a `LazyList` by position.
///

pub trait ElementSource<T> {
    fn fetch(&self, index: usize) -> Result<T, SupplyError>;
}

impl<T, F> ElementSource<T> for F
where
    F: Fn(usize) -> Result<T, SupplyError>,
{
    fn fetch(&self, index: usize) -> Result<T, SupplyError> {
        self(index)
    }
}

///
/// LazyList
///
/// Ordered collection with a fixed index space whose elements are fetched
/// from an `ElementSource` on first access.
///
/// Elements loaded after the list inherited tracking flags receive those
/// flags as they are fetched.
///

pub struct LazyList<T> {
    entries: Vec<Entry<T>>,
    source: Option<Box<dyn ElementSource<T>>>,
    inherited: Option<TrackingFlags>,
}

impl<T> LazyList<T> {
    pub const PATH: &'static str = "lazytrack::collection::LazyList";

    /// Create an empty, fully loaded list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            source: None,
            inherited: None,
        }
    }

    /// Build a fully loaded list from an existing vector.
    #[must_use]
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            entries: values.into_iter().map(Entry::Loaded).collect(),
            source: None,
            inherited: None,
        }
    }

    /// A list of `len` elements, none of them loaded yet.
    pub fn with_source(len: usize, source: impl ElementSource<T> + 'static) -> Self {
        Self::partially_loaded(len, Vec::new(), source)
    }

    /// A list of `len` elements whose leading elements are already loaded.
    /// Extra `loaded` values beyond `len` extend the list.
    pub fn partially_loaded(
        len: usize,
        loaded: impl IntoIterator<Item = T>,
        source: impl ElementSource<T> + 'static,
    ) -> Self {
        let mut entries: Vec<Entry<T>> = loaded.into_iter().map(Entry::Loaded).collect();
        if entries.len() < len {
            entries.resize_with(len, || Entry::Pending);
        }

        Self {
            entries,
            source: Some(Box::new(source)),
            inherited: None,
        }
    }

    /// Total number of elements, loaded or not.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of elements already loaded.
    #[must_use]
    pub fn loaded_len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_pending()).count()
    }

    #[must_use]
    pub fn is_fully_loaded(&self) -> bool {
        self.entries.iter().all(|e| !e.is_pending())
    }

    #[must_use]
    pub fn is_loaded(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| !e.is_pending())
    }

    /// The element at `index` if it is loaded. Never fetches.
    #[must_use]
    pub fn get_loaded(&self, index: usize) -> Option<&T> {
        self.entries.get(index).and_then(Entry::loaded)
    }

    pub fn get_loaded_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).and_then(Entry::loaded_mut)
    }

    /// Iterate loaded elements in index order.
    pub fn loaded_values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(Entry::loaded)
    }

    pub fn loaded_values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().filter_map(Entry::loaded_mut)
    }
}

impl<T: Node> LazyList<T> {
    /// The element at `index`, fetching it if needed.
    /// `None` if `index` is out of bounds.
    pub fn get(&mut self, index: usize) -> Result<Option<&mut T>, TrackError> {
        let pending = match self.entries.get(index) {
            None => return Ok(None),
            Some(entry) => entry.is_pending(),
        };

        if pending {
            let value = self.fetch(index)?;
            if let Some(entry) = self.entries.get_mut(index) {
                *entry = Entry::Loaded(value);
            }
            record(TrackEvent::EntriesLoaded {
                container: Self::PATH,
                entries: 1,
            });
        }

        Ok(self.get_loaded_mut(index))
    }

    /// Append a loaded element.
    pub fn push(&mut self, mut value: T) {
        if let Some(flags) = self.inherited {
            value.inherit_tracking(flags);
        }
        self.entries.push(Entry::Loaded(value));
    }

    /// Fetch every pending element. Returns how many were fetched.
    pub fn load_all(&mut self) -> Result<usize, TrackError> {
        let mut fetched = 0;

        for index in 0..self.entries.len() {
            if !self.entries[index].is_pending() {
                continue;
            }
            let value = self.fetch(index)?;
            self.entries[index] = Entry::Loaded(value);
            fetched += 1;
        }

        if fetched > 0 {
            record(TrackEvent::EntriesLoaded {
                container: Self::PATH,
                entries: fetched as u64,
            });
        }

        Ok(fetched)
    }

    fn fetch(&self, index: usize) -> Result<T, TrackError> {
        let source = self.source.as_ref().ok_or_else(|| {
            TrackError::supply(
                format!("{}[{index}]", Self::PATH),
                "no element source".into(),
            )
        })?;

        let mut value = source
            .fetch(index)
            .map_err(|err| TrackError::supply(format!("{}[{index}]", Self::PATH), err))?;
        if let Some(flags) = self.inherited {
            value.inherit_tracking(flags);
        }

        Ok(value)
    }
}

impl<T> Default for LazyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for LazyList<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyList")
            .field("len", &self.len())
            .field("loaded", &self.loaded_values().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<T: PartialEq> PartialEq for LazyList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T: Node> Node for LazyList<T> {
    fn model(&self) -> &'static NodeModel {
        static MODEL: NodeModel = NodeModel::leaf("lazytrack::collection::LazyList");
        &MODEL
    }

    fn children(&self, _: usize) -> Option<Children<'_>> {
        None
    }

    fn children_mut(&mut self, _: usize) -> Option<ChildrenMut<'_>> {
        None
    }

    fn inherit_tracking(&mut self, flags: TrackingFlags) -> usize {
        self.inherited = Some(flags);
        self.loaded_values_mut()
            .map(|value| value.inherit_tracking(flags))
            .sum()
    }
}

impl<T: Node> AttributeSlot for LazyList<T> {
    fn slot(&self) -> Children<'_> {
        Children::Loaded(self.loaded_values().map(|v| v as &dyn Node).collect())
    }

    fn slot_mut(&mut self) -> ChildrenMut<'_> {
        ChildrenMut::Loaded(
            self.loaded_values_mut()
                .map(|v| v as &mut dyn Node)
                .collect(),
        )
    }

    fn remember_flags(&mut self, flags: TrackingFlags) {
        self.inherited = Some(flags);
    }
}

///
/// TESTS
///

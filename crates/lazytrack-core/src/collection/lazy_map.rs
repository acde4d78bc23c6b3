use super::Entry;
use crate::{
    error::{SupplyError, TrackError},
    model::NodeModel,
    obs::{TrackEvent, sink::record},
    status::TrackingFlags,
    traits::Node,
    walk::{AttributeSlot, Children, ChildrenMut},
};
use std::{collections::BTreeMap, fmt};

///
/// EntrySource
///
/// Fetches one value of a `LazyMap` by key. `None` means the key no longer
/// exists at the source.
///

pub trait EntrySource<K, V> {
    fn fetch(&self, key: &K) -> Result<Option<V>, SupplyError>;
}

impl<K, V, F> EntrySource<K, V> for F
where
    F: Fn(&K) -> Result<Option<V>, SupplyError>,
{
    fn fetch(&self, key: &K) -> Result<Option<V>, SupplyError> {
        self(key)
    }
}

///
/// LazyMap
///
/// Keyed mapping whose key space is known up front and whose values are
/// fetched from an `EntrySource` on first access. Keys iterate in order.
///

pub struct LazyMap<K, V> {
    entries: BTreeMap<K, Entry<V>>,
    source: Option<Box<dyn EntrySource<K, V>>>,
    inherited: Option<TrackingFlags>,
}

impl<K: Ord, V> LazyMap<K, V> {
    pub const PATH: &'static str = "lazytrack::collection::LazyMap";

    /// Create an empty, fully loaded map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            source: None,
            inherited: None,
        }
    }

    /// A map over `keys` with no value loaded yet.
    pub fn with_source(
        keys: impl IntoIterator<Item = K>,
        source: impl EntrySource<K, V> + 'static,
    ) -> Self {
        Self {
            entries: keys.into_iter().map(|key| (key, Entry::Pending)).collect(),
            source: Some(Box::new(source)),
            inherited: None,
        }
    }

    /// Number of keys, loaded or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn loaded_len(&self) -> usize {
        self.entries.values().filter(|e| !e.is_pending()).count()
    }

    #[must_use]
    pub fn is_fully_loaded(&self) -> bool {
        self.entries.values().all(|e| !e.is_pending())
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// The value for `key` if it is loaded. Never fetches.
    #[must_use]
    pub fn get_loaded(&self, key: &K) -> Option<&V> {
        self.entries.get(key).and_then(Entry::loaded)
    }

    pub fn get_loaded_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key).and_then(Entry::loaded_mut)
    }

    /// Iterate loaded values in key order.
    pub fn loaded_values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().filter_map(Entry::loaded)
    }

    pub fn loaded_values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut().filter_map(Entry::loaded_mut)
    }

    /// Iterate loaded entries in key order.
    pub fn loaded_entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| entry.loaded().map(|value| (key, value)))
    }

    /// Remove `key`, returning its value if it was loaded.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).and_then(Entry::into_loaded)
    }
}

impl<K: Ord + fmt::Debug, V: Node> LazyMap<K, V> {
    /// Build a fully loaded map.
    pub fn from_loaded(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut map = Self::new();
        for (key, value) in entries {
            map.insert(key, value);
        }

        map
    }

    /// The value for `key`, fetching it if needed. A key the source no
    /// longer knows is dropped from the key space.
    pub fn get(&mut self, key: &K) -> Result<Option<&mut V>, TrackError> {
        let pending = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) => entry.is_pending(),
        };

        if pending {
            match self.fetch(key)? {
                Some(value) => {
                    if let Some(entry) = self.entries.get_mut(key) {
                        *entry = Entry::Loaded(value);
                    }
                    record(TrackEvent::EntriesLoaded {
                        container: Self::PATH,
                        entries: 1,
                    });
                }
                None => {
                    self.entries.remove(key);
                    return Ok(None);
                }
            }
        }

        Ok(self.get_loaded_mut(key))
    }

    /// Insert a loaded value, returning the previous one if it was loaded.
    pub fn insert(&mut self, key: K, mut value: V) -> Option<V> {
        if let Some(flags) = self.inherited {
            value.inherit_tracking(flags);
        }

        self.entries
            .insert(key, Entry::Loaded(value))
            .and_then(Entry::into_loaded)
    }

    fn fetch(&self, key: &K) -> Result<Option<V>, TrackError> {
        let target = || format!("{}[{key:?}]", Self::PATH);
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| TrackError::supply(target(), "no entry source".into()))?;

        let mut value = source
            .fetch(key)
            .map_err(|err| TrackError::supply(target(), err))?;
        if let (Some(flags), Some(value)) = (self.inherited, value.as_mut()) {
            value.inherit_tracking(flags);
        }

        Ok(value)
    }
}

impl<K: Ord + Clone + fmt::Debug, V: Node> LazyMap<K, V> {
    /// Fetch every pending value. Returns how many were fetched; keys the
    /// source no longer knows are dropped.
    pub fn load_all(&mut self) -> Result<usize, TrackError> {
        let pending: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_pending())
            .map(|(key, _)| key.clone())
            .collect();

        let mut fetched = 0;
        for key in pending {
            match self.fetch(&key)? {
                Some(value) => {
                    self.entries.insert(key, Entry::Loaded(value));
                    fetched += 1;
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }

        if fetched > 0 {
            record(TrackEvent::EntriesLoaded {
                container: Self::PATH,
                entries: fetched as u64,
            });
        }

        Ok(fetched)
    }
}

impl<K: Ord, V> Default for LazyMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for LazyMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyMap")
            .field("len", &self.len())
            .field("loaded", &self.loaded_entries().collect::<BTreeMap<_, _>>())
            .finish_non_exhaustive()
    }
}

impl<K: Ord, V: PartialEq> PartialEq for LazyMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Ord + 'static, V: Node> Node for LazyMap<K, V> {
    fn model(&self) -> &'static NodeModel {
        static MODEL: NodeModel = NodeModel::leaf("lazytrack::collection::LazyMap");
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

impl<K: Ord, V: Node> AttributeSlot for LazyMap<K, V> {
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

//! Region model: the grid's named, map-like data containers.
//!
//! Two shapes of target flow through the engine: a [`RegionPlan`] (a
//! construction request that can still be mutated before the real region
//! exists) and a live [`Region`] (already active, where only the eviction
//! maximum can still be adjusted). Both carry [`EvictionAttributes`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::GridError;
use crate::hooks::pre_init::HookState;
use crate::policy::PolicyError;
use crate::sizer::{ObjectSizer, SerializedSizeSizer};

/// Native default maximum for entry-count eviction (entries).
pub const DEFAULT_ENTRY_COUNT_MAXIMUM: u32 = 900;

/// Native default maximum for entry-size eviction (megabytes).
pub const DEFAULT_ENTRY_SIZE_MAXIMUM_MB: u32 = 10;

/// Eviction algorithm governing when entries are removed under pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvictionAlgorithm {
    /// Evict once the region holds more than `maximum` entries
    EntryCount,
    /// Evict once the region's entries exceed `maximum` megabytes
    EntrySize,
    /// Evict under global heap pressure; carries no per-region maximum
    HeapPercentage,
}

impl EvictionAlgorithm {
    /// The native default maximum a freshly created region carries for this
    /// algorithm. Heap-percentage eviction has no per-region maximum.
    #[must_use]
    pub fn native_default_maximum(&self) -> Option<u32> {
        match self {
            Self::EntryCount => Some(DEFAULT_ENTRY_COUNT_MAXIMUM),
            Self::EntrySize => Some(DEFAULT_ENTRY_SIZE_MAXIMUM_MB),
            Self::HeapPercentage => None,
        }
    }
}

impl FromStr for EvictionAlgorithm {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENTRY_COUNT" => Ok(Self::EntryCount),
            "ENTRY_SIZE" => Ok(Self::EntrySize),
            "HEAP_PERCENTAGE" => Ok(Self::HeapPercentage),
            other => Err(PolicyError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for EvictionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EntryCount => "ENTRY_COUNT",
            Self::EntrySize => "ENTRY_SIZE",
            Self::HeapPercentage => "HEAP_PERCENTAGE",
        };
        f.write_str(s)
    }
}

/// What happens to an entry chosen for eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvictionAction {
    /// Remove the entry from the region outright
    Evict,
    /// Move the entry's value to disk, keeping the key in memory
    OverflowToDisk,
}

impl FromStr for EvictionAction {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EVICT" => Ok(Self::Evict),
            "OVERFLOW_TO_DISK" => Ok(Self::OverflowToDisk),
            other => Err(PolicyError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for EvictionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Evict => "EVICT",
            Self::OverflowToDisk => "OVERFLOW_TO_DISK",
        };
        f.write_str(s)
    }
}

/// The concrete eviction attribute bundle carried by a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionAttributes {
    pub algorithm: EvictionAlgorithm,
    /// Threshold in algorithm units; `None` for heap-percentage eviction
    pub maximum: Option<u32>,
    pub action: EvictionAction,
}

impl EvictionAttributes {
    /// The native unmodified default: entry-count LRU at the default maximum.
    /// Every storage-bearing region starts with these attributes.
    #[must_use]
    pub fn entry_count_lru() -> Self {
        Self {
            algorithm: EvictionAlgorithm::EntryCount,
            maximum: Some(DEFAULT_ENTRY_COUNT_MAXIMUM),
            action: EvictionAction::Evict,
        }
    }

    /// True while `maximum` still equals the native default for the current
    /// algorithm. Once anything has written a different maximum the bundle no
    /// longer counts as unmodified.
    #[must_use]
    pub fn is_at_native_default_maximum(&self) -> bool {
        self.maximum == self.algorithm.native_default_maximum()
    }
}

impl Default for EvictionAttributes {
    fn default() -> Self {
        Self::entry_count_lru()
    }
}

/// Region topology shortcut. Proxy shortcuts hold no local entries and are
/// therefore not eviction-capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionShortcut {
    Partition,
    PartitionProxy,
    Replicate,
    ReplicateProxy,
    Local,
}

impl RegionShortcut {
    /// Whether regions of this shortcut store entries locally.
    #[must_use]
    pub fn has_local_storage(&self) -> bool {
        !matches!(self, Self::PartitionProxy | Self::ReplicateProxy)
    }
}

/// A not-yet-built region: the mutable construction request intercepted by
/// the pre-init hook before the live [`Region`] is created.
///
/// The name may still be unresolved at interception time, which is why policy
/// applicability works off a lazily-supplied name.
#[derive(Clone)]
pub struct RegionPlan {
    name: Option<String>,
    shortcut: RegionShortcut,
    eviction: Option<EvictionAttributes>,
    sizer: Option<Arc<dyn ObjectSizer>>,
    pub(crate) hook_state: HookState,
}

impl RegionPlan {
    #[must_use]
    pub fn new(name: impl Into<String>, shortcut: RegionShortcut) -> Self {
        Self {
            name: Some(name.into()),
            shortcut,
            eviction: None,
            sizer: None,
            hook_state: HookState::Unintercepted,
        }
    }

    /// A plan whose final name is not known yet. Targeted policies never match
    /// an unnamed plan; wildcard policies still apply.
    #[must_use]
    pub fn anonymous(shortcut: RegionShortcut) -> Self {
        Self {
            name: None,
            shortcut,
            eviction: None,
            sizer: None,
            hook_state: HookState::Unintercepted,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn shortcut(&self) -> RegionShortcut {
        self.shortcut
    }

    #[must_use]
    pub fn eviction(&self) -> Option<EvictionAttributes> {
        self.eviction
    }

    pub fn set_eviction(&mut self, attributes: EvictionAttributes) {
        self.eviction = Some(attributes);
    }

    pub fn set_sizer(&mut self, sizer: Option<Arc<dyn ObjectSizer>>) {
        self.sizer = sizer;
    }

    #[must_use]
    pub fn hook_state(&self) -> HookState {
        self.hook_state
    }

    /// Build the live region. Storage-bearing plans with no explicit bundle
    /// receive the native default attributes.
    pub fn build(self) -> Result<Region, GridError> {
        let name = self.name.ok_or(GridError::UnnamedPlan)?;
        let eviction = if self.shortcut.has_local_storage() {
            Some(self.eviction.unwrap_or_default())
        } else {
            None
        };
        Ok(Region {
            name,
            shortcut: self.shortcut,
            eviction: RwLock::new(eviction),
            sizer: self.sizer,
            entries: DashMap::new(),
        })
    }
}

impl fmt::Debug for RegionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionPlan")
            .field("name", &self.name)
            .field("shortcut", &self.shortcut)
            .field("eviction", &self.eviction)
            .field("has_sizer", &self.sizer.is_some())
            .field("hook_state", &self.hook_state)
            .finish()
    }
}

/// A live, named, map-like data container.
///
/// # Example
///
/// ```
/// use eviction_engine::{Region, RegionShortcut, DEFAULT_ENTRY_COUNT_MAXIMUM};
/// use serde_json::json;
///
/// let region = Region::new("Orders", RegionShortcut::Partition);
/// region.put("order-1", json!({"total": 12.50}));
///
/// assert_eq!(region.len(), 1);
/// // Freshly created regions carry the native default eviction attributes
/// let eviction = region.eviction().unwrap();
/// assert_eq!(eviction.maximum, Some(DEFAULT_ENTRY_COUNT_MAXIMUM));
/// ```
pub struct Region {
    name: String,
    shortcut: RegionShortcut,
    eviction: RwLock<Option<EvictionAttributes>>,
    sizer: Option<Arc<dyn ObjectSizer>>,
    entries: DashMap<String, Value>,
}

impl Region {
    /// Create a region with the native default attributes for its shortcut.
    #[must_use]
    pub fn new(name: impl Into<String>, shortcut: RegionShortcut) -> Self {
        let eviction = shortcut.has_local_storage().then(EvictionAttributes::entry_count_lru);
        Self {
            name: name.into(),
            shortcut,
            eviction: RwLock::new(eviction),
            sizer: None,
            entries: DashMap::new(),
        }
    }

    /// Create a region carrying explicit (possibly customized) eviction
    /// attributes, as a natively declared region would.
    #[must_use]
    pub fn with_eviction(
        name: impl Into<String>,
        shortcut: RegionShortcut,
        eviction: EvictionAttributes,
    ) -> Self {
        Self {
            name: name.into(),
            shortcut,
            eviction: RwLock::new(Some(eviction)),
            sizer: None,
            entries: DashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn shortcut(&self) -> RegionShortcut {
        self.shortcut
    }

    /// Whether this region can carry eviction attributes at all.
    #[must_use]
    pub fn is_eviction_capable(&self) -> bool {
        self.shortcut.has_local_storage()
    }

    /// Current eviction attributes; `None` for proxy regions.
    #[must_use]
    pub fn eviction(&self) -> Option<EvictionAttributes> {
        *self.eviction.read()
    }

    /// Overwrite the eviction maximum only while it still sits at the native
    /// default for the region's current algorithm.
    ///
    /// This check-and-set is the guard that keeps a late policy pass from
    /// clobbering a maximum something else already customized. Returns true
    /// if the write happened.
    pub fn replace_default_maximum(&self, maximum: u32) -> bool {
        let mut guard = self.eviction.write();
        match guard.as_mut() {
            Some(attributes) if attributes.is_at_native_default_maximum() => {
                attributes.maximum = Some(maximum);
                true
            }
            _ => false,
        }
    }

    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated size of one entry, using the attached sizer when a policy
    /// supplied one and falling back to serialized length otherwise.
    #[must_use]
    pub fn estimate_entry_size(&self, key: &str) -> Option<usize> {
        let value = self.entries.get(key)?;
        let size = match &self.sizer {
            Some(sizer) => sizer.size_of(key, value.value()),
            None => SerializedSizeSizer.size_of(key, value.value()),
        };
        Some(size)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("name", &self.name)
            .field("shortcut", &self.shortcut)
            .field("eviction", &self.eviction.read())
            .field("entries", &self.entries.len())
            .finish()
    }
}

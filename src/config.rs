//! Eviction policy declarations.
//!
//! # Example
//!
//! ```
//! use eviction_engine::{EvictionConfig, PolicyDeclaration};
//!
//! // No declarations (engine falls back to the native default policy)
//! let config = EvictionConfig::default();
//! assert!(config.policies.is_empty());
//!
//! // Declarations, typically deserialized from JSON or TOML
//! let config: EvictionConfig = serde_json::from_value(serde_json::json!({
//!     "policies": [
//!         {"type": "ENTRY_COUNT", "maximum": 1000, "action": "OVERFLOW_TO_DISK"},
//!         {"type": "ENTRY_COUNT", "maximum": 50, "action": "EVICT", "regionNames": ["Orders"]}
//!     ]
//! })).unwrap();
//! assert_eq!(config.policies.len(), 2);
//! assert_eq!(config.policies[1].region_names, vec!["Orders"]);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::policy::PolicyError;

/// One declared eviction policy, as a raw attribute block.
///
/// This is the shape handed over by the upstream declaration layer: keys use
/// the external camelCase spellings and all property/environment overrides
/// have already been folded in. The block is *not* validated here; validation
/// (unknown algorithm/action values, threshold rules) happens when the block
/// is turned into a [`PolicyDescriptor`](crate::policy::PolicyDescriptor).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDeclaration {
    /// Eviction algorithm name ("ENTRY_COUNT", "ENTRY_SIZE", "HEAP_PERCENTAGE")
    #[serde(rename = "type", default = "default_type")]
    pub r#type: String,

    /// Eviction threshold (entries for ENTRY_COUNT, megabytes for ENTRY_SIZE).
    /// Ignored for HEAP_PERCENTAGE. None means "use the native default".
    #[serde(default)]
    pub maximum: Option<u32>,

    /// Action taken on evicted entries ("EVICT" or "OVERFLOW_TO_DISK")
    #[serde(default = "default_action")]
    pub action: String,

    /// Name of a registered object sizer; an unknown name degrades to "no sizer"
    #[serde(default)]
    pub object_sizer_name: Option<String>,

    /// Regions this policy targets; empty = wildcard (all regions)
    #[serde(default)]
    pub region_names: Vec<String>,
}

fn default_type() -> String {
    "ENTRY_COUNT".to_string()
}

fn default_action() -> String {
    "EVICT".to_string()
}

impl Default for PolicyDeclaration {
    fn default() -> Self {
        Self {
            r#type: default_type(),
            maximum: None,
            action: default_action(),
            object_sizer_name: None,
            region_names: Vec::new(),
        }
    }
}

impl PolicyDeclaration {
    /// Parse a declaration from an untyped attribute map.
    ///
    /// A map that does not fit the declaration shape is an authoring error and
    /// surfaces as [`PolicyError::Malformed`].
    pub fn from_value(value: Value) -> Result<Self, PolicyError> {
        serde_json::from_value(value).map_err(|e| PolicyError::Malformed(e.to_string()))
    }
}

/// Configuration for the eviction engine: the ordered declaration sequence.
///
/// Declaration order matters: later declarations are applied after earlier
/// ones and win ties for regions matched by both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvictionConfig {
    #[serde(default)]
    pub policies: Vec<PolicyDeclaration>,
}

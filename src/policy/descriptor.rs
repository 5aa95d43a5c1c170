//! Parsed, validated form of one eviction policy declaration.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::config::PolicyDeclaration;
use crate::region::{EvictionAction, EvictionAlgorithm, EvictionAttributes, Region, RegionPlan};
use crate::sizer::{ObjectSizer, SizerRegistry};

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("unrecognized eviction algorithm '{0}'")]
    UnknownAlgorithm(String),
    #[error("unrecognized eviction action '{0}'")]
    UnknownAction(String),
    #[error("malformed policy declaration: {0}")]
    Malformed(String),
}

/// One declared eviction policy, immutable after parse.
///
/// An empty `region_names` set is the wildcard: the policy applies to every
/// region. The sizer reference is resolved once, at parse time; unknown sizer
/// names degrade to "no sizer" because the sizer is optional at the native
/// layer too.
#[derive(Clone)]
pub struct PolicyDescriptor {
    algorithm: EvictionAlgorithm,
    threshold: Option<u32>,
    action: EvictionAction,
    sizer: Option<Arc<dyn ObjectSizer>>,
    region_names: HashSet<String>,
}

impl PolicyDescriptor {
    /// Parse a raw declaration, resolving the sizer reference.
    ///
    /// Unknown algorithm or action spellings are authoring errors and abort
    /// registry construction. A threshold supplied alongside HEAP_PERCENTAGE
    /// is dropped: heap eviction is governed by global heap thresholds, never
    /// a per-region maximum.
    pub fn from_declaration(
        declaration: &PolicyDeclaration,
        sizers: &SizerRegistry,
    ) -> Result<Self, PolicyError> {
        let algorithm: EvictionAlgorithm = declaration.r#type.parse()?;
        let action = declaration.action.parse()?;

        let threshold = match algorithm {
            EvictionAlgorithm::HeapPercentage => {
                if declaration.maximum.is_some() {
                    debug!(
                        maximum = ?declaration.maximum,
                        "Ignoring maximum on HEAP_PERCENTAGE policy (governed by global heap thresholds)"
                    );
                }
                None
            }
            _ => declaration.maximum,
        };

        let sizer = declaration
            .object_sizer_name
            .as_deref()
            .and_then(|name| sizers.resolve(name));

        Ok(Self {
            algorithm,
            threshold,
            action,
            sizer,
            region_names: declaration.region_names.iter().cloned().collect(),
        })
    }

    /// The policy used when nothing is declared: entry-count LRU at the
    /// native default maximum, applied to every region.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self {
            algorithm: EvictionAlgorithm::EntryCount,
            threshold: None,
            action: EvictionAction::Evict,
            sizer: None,
            region_names: HashSet::new(),
        }
    }

    /// Whether this policy applies to the target identified by the lazily
    /// supplied name.
    ///
    /// Wildcard policies accept without ever invoking the supplier, so a
    /// construction request whose final name is still unresolved can be
    /// matched. A targeted policy never matches an unresolvable name.
    pub fn accepts<F>(&self, name: F) -> bool
    where
        F: FnOnce() -> Option<String>,
    {
        if self.region_names.is_empty() {
            return true;
        }
        match name() {
            Some(name) => self.region_names.contains(&name),
            None => false,
        }
    }

    /// The concrete attribute bundle this policy resolves to; an unspecified
    /// threshold falls back to the algorithm's native default maximum.
    #[must_use]
    pub fn resolved_attributes(&self) -> EvictionAttributes {
        EvictionAttributes {
            algorithm: self.algorithm,
            maximum: self.threshold.or(self.algorithm.native_default_maximum()),
            action: self.action,
        }
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.region_names.is_empty()
    }

    #[must_use]
    pub fn sizer(&self) -> Option<Arc<dyn ObjectSizer>> {
        self.sizer.clone()
    }

    /// Set the resolved bundle on a construction request. Applicability is
    /// gated by the registry, so this overwrites unconditionally; that is
    /// what gives overlapping declarations their last-writer-wins order.
    pub fn apply_to_plan(&self, plan: &mut RegionPlan) {
        trace!(
            region = ?plan.name(),
            algorithm = %self.algorithm,
            "Applying eviction policy to region plan"
        );
        plan.set_eviction(self.resolved_attributes());
        plan.set_sizer(self.sizer.clone());
    }

    /// Adjust a live region's eviction maximum.
    ///
    /// Only the maximum can still change on a live region (the native layer
    /// fixes algorithm and action at creation), and only while it sits at the
    /// native default. Non-eviction-capable regions and guarded maxima are a
    /// silent pass-through, not an error. Returns true if the region changed.
    pub fn apply_to_region(&self, region: &Region) -> bool {
        if !region.is_eviction_capable() {
            trace!(region = %region.name(), "Region is not eviction-capable, skipping");
            return false;
        }
        let Some(maximum) = self.resolved_attributes().maximum else {
            return false;
        };
        let changed = region.replace_default_maximum(maximum);
        if changed {
            debug!(region = %region.name(), maximum, "Updated live region eviction maximum");
        } else {
            trace!(
                region = %region.name(),
                "Live region maximum already customized, leaving it alone"
            );
        }
        changed
    }
}

impl fmt::Debug for PolicyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyDescriptor")
            .field("algorithm", &self.algorithm)
            .field("threshold", &self.threshold)
            .field("action", &self.action)
            .field("has_sizer", &self.sizer.is_some())
            .field("region_names", &self.region_names)
            .finish()
    }
}

//! The resolved policy registry: every declared policy, in declaration order.

use tracing::{debug, info};

use crate::config::{EvictionConfig, PolicyDeclaration};
use crate::region::{Region, RegionPlan};
use crate::sizer::SizerRegistry;

use super::descriptor::{PolicyDescriptor, PolicyError};

/// All declared eviction policies, composed once at configuration time and
/// consulted by both lifecycle hooks.
///
/// Policies are held as an ordered sequence and applied as a left fold in
/// declaration order, so for overlapping declarations the later one writes
/// last and wins. On the live-region path the per-region guard (skip any
/// maximum no longer at its native default) means the first matching policy's
/// write blocks later ones; see [`PolicyDescriptor::apply_to_region`].
#[derive(Debug)]
pub struct PolicyRegistry {
    descriptors: Vec<PolicyDescriptor>,
}

impl PolicyRegistry {
    /// Build the registry from an ordered declaration sequence.
    ///
    /// An empty sequence is not an error: it resolves to the single default
    /// policy (entry-count LRU, native maximum, wildcard). Any individually
    /// invalid declaration aborts construction, since an unresolvable policy
    /// declaration is an authoring error, not a runtime condition to tolerate.
    pub fn from_declarations(
        declarations: &[PolicyDeclaration],
        sizers: &SizerRegistry,
    ) -> Result<Self, PolicyError> {
        let descriptors = if declarations.is_empty() {
            debug!("No eviction policies declared, using the native default policy");
            vec![PolicyDescriptor::from_defaults()]
        } else {
            declarations
                .iter()
                .map(|d| PolicyDescriptor::from_declaration(d, sizers))
                .collect::<Result<Vec<_>, _>>()?
        };

        info!(policies = descriptors.len(), "Eviction policy registry built");
        crate::metrics::set_registered_policies(descriptors.len());
        Ok(Self { descriptors })
    }

    /// Convenience wrapper over [`Self::from_declarations`].
    pub fn from_config(config: &EvictionConfig, sizers: &SizerRegistry) -> Result<Self, PolicyError> {
        Self::from_declarations(&config.policies, sizers)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Apply every accepting policy to a construction request, in declaration
    /// order. Returns the number of policies that applied.
    pub fn apply_to_plan(&self, plan: &mut RegionPlan) -> usize {
        let mut applied = 0;
        for descriptor in &self.descriptors {
            if descriptor.accepts(|| plan.name().map(str::to_string)) {
                descriptor.apply_to_plan(plan);
                applied += 1;
            }
        }
        applied
    }

    /// Apply every accepting policy to a live region, in declaration order.
    /// Returns true if any policy changed the region.
    pub fn apply_to_region(&self, region: &Region) -> bool {
        let mut changed = false;
        for descriptor in &self.descriptors {
            if descriptor.accepts(|| Some(region.name().to_string())) {
                changed |= descriptor.apply_to_region(region);
            }
        }
        changed
    }
}

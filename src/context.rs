//! The grid context: an explicit registry of live regions plus the two
//! policy injection points.
//!
//! This stands in for the surrounding container integration: regions created
//! through [`GridContext::create_region`] pass through the pre-init hook
//! before they are built, while [`GridContext::attach_region`] registers an
//! externally built region (the natively declared case) that only the
//! post-init sweep will ever see.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use crate::hooks::{PostInitSweep, PreInitHook};
use crate::policy::PolicyRegistry;
use crate::region::{Region, RegionPlan};

#[derive(Error, Debug)]
pub enum GridError {
    #[error("region plan has no name")]
    UnnamedPlan,
    #[error("a region named '{0}' already exists")]
    DuplicateRegion(String),
}

/// Registry of live regions, wired to the resolved eviction policies.
pub struct GridContext {
    regions: DashMap<String, Arc<Region>>,
    pre_init: PreInitHook,
    post_init: PostInitSweep,
}

impl GridContext {
    #[must_use]
    pub fn new(policies: Arc<PolicyRegistry>) -> Self {
        Self {
            regions: DashMap::new(),
            pre_init: PreInitHook::new(policies.clone()),
            post_init: PostInitSweep::new(policies),
        }
    }

    /// Create a region through the engine's factory path: the plan is
    /// intercepted by the pre-init hook, built, and registered.
    pub fn create_region(&self, mut plan: RegionPlan) -> Result<Arc<Region>, GridError> {
        self.pre_init.before_init(&mut plan);
        let region = plan.build()?;
        self.register(region)
    }

    /// Register a region built outside the factory path.
    ///
    /// No pre-init pass runs for it; the post-init sweep is what eventually
    /// applies any matching policies.
    pub fn attach_region(&self, region: Region) -> Result<Arc<Region>, GridError> {
        debug!(region = %region.name(), "Attaching natively declared region");
        self.register(region)
    }

    fn register(&self, region: Region) -> Result<Arc<Region>, GridError> {
        let name = region.name().to_string();
        let region = Arc::new(region);
        match self.regions.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(GridError::DuplicateRegion(name)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(region.clone());
                Ok(region)
            }
        }
    }

    /// Fire the post-init sweep over every live region. Only the first call
    /// does anything; the engine holds no further obligations afterwards.
    pub fn refresh(&self) {
        let regions: Vec<Arc<Region>> = self.regions.iter().map(|e| e.value().clone()).collect();
        self.post_init.sweep(regions.iter().map(Arc::as_ref));
    }

    #[must_use]
    pub fn region(&self, name: &str) -> Option<Arc<Region>> {
        self.regions.get(name).map(|e| e.value().clone())
    }

    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn has_refreshed(&self) -> bool {
        self.post_init.has_fired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{EvictionAttributes, RegionShortcut};
    use crate::sizer::SizerRegistry;
    use serde_json::json;

    fn context(policies: serde_json::Value) -> GridContext {
        let declarations: Vec<crate::config::PolicyDeclaration> =
            serde_json::from_value(policies).unwrap();
        let registry = PolicyRegistry::from_declarations(&declarations, &SizerRegistry::new()).unwrap();
        GridContext::new(Arc::new(registry))
    }

    #[test]
    fn test_create_region_runs_pre_init() {
        let ctx = context(json!([{"maximum": 1000, "action": "OVERFLOW_TO_DISK"}]));
        let region = ctx
            .create_region(RegionPlan::new("Orders", RegionShortcut::Partition))
            .unwrap();

        assert_eq!(region.eviction().unwrap().maximum, Some(1000));
        assert_eq!(ctx.region_count(), 1);
    }

    #[test]
    fn test_duplicate_region_name_is_an_error() {
        let ctx = context(json!([]));
        ctx.create_region(RegionPlan::new("Orders", RegionShortcut::Partition)).unwrap();

        let result = ctx.create_region(RegionPlan::new("Orders", RegionShortcut::Partition));
        assert!(matches!(result, Err(GridError::DuplicateRegion(_))));
        assert_eq!(ctx.region_count(), 1);
    }

    #[test]
    fn test_unnamed_plan_is_an_error() {
        let ctx = context(json!([]));
        let result = ctx.create_region(RegionPlan::anonymous(RegionShortcut::Partition));
        assert!(matches!(result, Err(GridError::UnnamedPlan)));
    }

    #[test]
    fn test_attached_region_bypasses_pre_init_until_refresh() {
        let ctx = context(json!([{"maximum": 1000}]));
        let region = ctx
            .attach_region(Region::new("Native", RegionShortcut::Replicate))
            .unwrap();

        // Untouched until the sweep runs
        assert!(region.eviction().unwrap().is_at_native_default_maximum());

        ctx.refresh();
        assert_eq!(region.eviction().unwrap().maximum, Some(1000));
    }

    #[test]
    fn test_refresh_fires_once() {
        let ctx = context(json!([{"maximum": 1000}]));
        ctx.refresh();
        assert!(ctx.has_refreshed());

        // A region attached after refresh is never swept
        let late = ctx
            .attach_region(Region::new("Late", RegionShortcut::Partition))
            .unwrap();
        ctx.refresh();
        assert!(late.eviction().unwrap().is_at_native_default_maximum());
    }

    #[test]
    fn test_attached_customized_region_keeps_its_maximum() {
        let ctx = context(json!([{"maximum": 1000}]));
        let mut custom = EvictionAttributes::entry_count_lru();
        custom.maximum = Some(500);
        let region = ctx
            .attach_region(Region::with_eviction("Tuned", RegionShortcut::Partition, custom))
            .unwrap();

        ctx.refresh();
        assert_eq!(region.eviction().unwrap().maximum, Some(500));
    }
}

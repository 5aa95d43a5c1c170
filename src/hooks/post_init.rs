//! One-shot whole-context sweep after startup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::policy::PolicyRegistry;
use crate::region::Region;

/// Sweeps every live region once the whole grid context is wired.
///
/// The sweep is the only chance to pick up regions that never went through
/// the engine's factory path (natively attached ones). Ordering among regions
/// is irrelevant: each region's applicability and bundle depend only on its
/// own name. The sweep fires at most once; later invocations are no-ops.
#[derive(Debug)]
pub struct PostInitSweep {
    policies: Arc<PolicyRegistry>,
    fired: AtomicBool,
}

impl PostInitSweep {
    #[must_use]
    pub fn new(policies: Arc<PolicyRegistry>) -> Self {
        Self {
            policies,
            fired: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Sweep all live regions, applying the registry to each.
    ///
    /// Returns the number of regions the sweep changed, or `None` if the
    /// sweep had already fired.
    pub fn sweep<'a, I>(&self, regions: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a Region>,
    {
        if self.fired.swap(true, Ordering::AcqRel) {
            debug!("Post-init sweep already fired, skipping");
            return None;
        }

        let mut seen = 0usize;
        let mut changed = 0usize;
        for region in regions {
            seen += 1;
            if self.policies.apply_to_region(region) {
                changed += 1;
            }
        }

        crate::metrics::record_sweep(seen, changed);
        info!(regions = seen, changed, "Post-init eviction sweep complete");
        Some(changed)
    }
}

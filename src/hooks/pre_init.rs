//! Construction-time interception of region plans.

use std::sync::Arc;

use tracing::trace;

use crate::policy::PolicyRegistry;
use crate::region::RegionPlan;

/// Pre-init progress for one construction request.
///
/// Plans that are not eviction-capable stay `Unintercepted`; `Applied` is
/// terminal, the hook never revisits an instance it has already processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Unintercepted,
    Intercepted,
    Applied,
}

/// Intercepts not-yet-built region plans before their build step and applies
/// the resolved eviction policies to them.
#[derive(Debug, Clone)]
pub struct PreInitHook {
    policies: Arc<PolicyRegistry>,
}

impl PreInitHook {
    #[must_use]
    pub fn new(policies: Arc<PolicyRegistry>) -> Self {
        Self { policies }
    }

    /// Run the hook against one plan.
    ///
    /// Plans whose shortcut has no local storage pass through untouched (no
    /// state change, no side effect), and a plan already in `Applied` is never
    /// reprocessed. Returns the number of policies applied.
    pub fn before_init(&self, plan: &mut RegionPlan) -> usize {
        if plan.hook_state != HookState::Unintercepted {
            trace!(region = ?plan.name(), state = ?plan.hook_state, "Plan already intercepted, skipping");
            return 0;
        }
        if !plan.shortcut().has_local_storage() {
            trace!(region = ?plan.name(), shortcut = ?plan.shortcut(), "Plan is not eviction-capable");
            return 0;
        }

        plan.hook_state = HookState::Intercepted;
        let applied = self.policies.apply_to_plan(plan);
        plan.hook_state = HookState::Applied;

        crate::metrics::record_policies_applied("pre_init", applied);
        trace!(region = ?plan.name(), applied, "Pre-init policy application complete");
        applied
    }
}

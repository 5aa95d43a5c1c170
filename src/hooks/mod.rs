//! The two lifecycle application points.
//!
//! Policies resolve once, but apply at two different moments of grid startup:
//!
//! ```text
//! declarations ──▶ PolicyRegistry (built once)
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!   Pre-Init Hook                Post-Init Sweep
//!   (per RegionPlan, before     (once, after the whole
//!    the region is built)        context is wired)
//! ```
//!
//! The pre-init hook covers regions created through the engine's own factory
//! path; the post-init sweep is the only chance to catch regions attached from
//! outside that path (natively declared ones). Both consult the same registry;
//! only the iteration context differs.

pub mod post_init;
pub mod pre_init;

pub use post_init::PostInitSweep;
pub use pre_init::{HookState, PreInitHook};

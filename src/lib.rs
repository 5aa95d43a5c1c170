//! # Eviction Engine
//!
//! A configuration-time engine that resolves declared eviction policies for a
//! data grid's named Regions and applies them during container startup.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Declaration Layer                        │
//! │  • PolicyDeclaration attribute blocks (already resolved)   │
//! │  • EvictionConfig: the ordered declaration sequence        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (parse + validate, once)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PolicyRegistry                          │
//! │  • One PolicyDescriptor per declaration, in order          │
//! │  • Left fold: later declarations overwrite earlier ones    │
//! │  • Sizer references resolved against the SizerRegistry     │
//! └─────────────────────────────────────────────────────────────┘
//!                   │                        │
//!                   ▼                        ▼
//! ┌──────────────────────────┐  ┌───────────────────────────────┐
//! │       Pre-Init Hook      │  │       Post-Init Sweep         │
//! │  Mutates RegionPlans     │  │  One pass over every live     │
//! │  before they are built   │  │  Region after full startup    │
//! └──────────────────────────┘  └───────────────────────────────┘
//! ```
//!
//! The engine runs once, synchronously, on the startup thread; after the
//! post-init sweep it holds no further obligations. Applicability is decided
//! per region name (empty target set = wildcard) and non-matching or
//! non-eviction-capable targets pass through silently. The only fatal path is
//! a structurally invalid declaration, which aborts registry construction.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use eviction_engine::{
//!     EvictionConfig, GridContext, PolicyRegistry, Region, RegionPlan,
//!     RegionShortcut, SizerRegistry,
//! };
//!
//! let config: EvictionConfig = serde_json::from_value(serde_json::json!({
//!     "policies": [
//!         {"type": "ENTRY_COUNT", "maximum": 1000, "action": "OVERFLOW_TO_DISK"},
//!         {"type": "ENTRY_COUNT", "maximum": 50, "action": "EVICT", "regionNames": ["Orders"]}
//!     ]
//! })).unwrap();
//!
//! let sizers = SizerRegistry::new();
//! let policies = Arc::new(PolicyRegistry::from_config(&config, &sizers).unwrap());
//! let grid = GridContext::new(policies);
//!
//! // Factory path: intercepted pre-build, both policies match, last one wins
//! let orders = grid.create_region(RegionPlan::new("Orders", RegionShortcut::Partition)).unwrap();
//! assert_eq!(orders.eviction().unwrap().maximum, Some(50));
//!
//! // Native path: only the post-init sweep ever sees this region
//! let native = grid.attach_region(Region::new("Customers", RegionShortcut::Replicate)).unwrap();
//! grid.refresh();
//! assert_eq!(native.eviction().unwrap().maximum, Some(1000));
//! ```
//!
//! ## Modules
//!
//! - [`config`]: raw policy declarations
//! - [`policy`]: descriptor parsing and the resolved registry
//! - [`region`]: region plans, live regions, eviction attributes
//! - [`hooks`]: the two lifecycle application points
//! - [`context`]: the explicit region registry wiring it all together
//! - [`sizer`]: named object sizers for size-based eviction

pub mod config;
pub mod context;
pub mod hooks;
pub mod metrics;
pub mod policy;
pub mod region;
pub mod sizer;

pub use config::{EvictionConfig, PolicyDeclaration};
pub use context::{GridContext, GridError};
pub use hooks::{HookState, PostInitSweep, PreInitHook};
pub use policy::{PolicyDescriptor, PolicyError, PolicyRegistry};
pub use region::{
    EvictionAction, EvictionAlgorithm, EvictionAttributes, Region, RegionPlan, RegionShortcut,
    DEFAULT_ENTRY_COUNT_MAXIMUM, DEFAULT_ENTRY_SIZE_MAXIMUM_MB,
};
pub use sizer::{ObjectSizer, SerializedSizeSizer, SizerRegistry};

//! Eviction policy resolution.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Policy Module                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  descriptor.rs  - One declared policy, parsed and validated  │
//! │  └─ PolicyDescriptor: algorithm + threshold + action + sizer │
//! │  └─ accepts(): name-based filter, empty target set = all     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  registry.rs    - All declared policies, in order            │
//! │  └─ PolicyRegistry: ordered fold, later declarations win     │
//! │  └─ apply_to_plan() / apply_to_region(): the two lifecycle   │
//! │     application paths                                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The registry is built exactly once at configuration time and consulted by
//! both lifecycle hooks; see [`crate::hooks`].

pub mod descriptor;
pub mod registry;

pub use descriptor::{PolicyDescriptor, PolicyError};
pub use registry::PolicyRegistry;

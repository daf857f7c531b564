//! Orchestration layer for fork republishing
//!
//! This module provides the high-level pipeline that drives cloning,
//! descriptor rewriting, and publishing in a fixed sequential order.

pub mod republisher;

// Re-export main types for convenience
pub use republisher::{RepublishOptions, RepublishReport, Republisher};

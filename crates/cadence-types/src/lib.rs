//! Core type definitions for the Cadence orchestration engine.
//!
//! This crate provides the shared value types. No orchestration logic — just types.
//! Every Cadence crate depends on this crate.

pub mod ids;
pub mod phase;
pub mod principal;
pub mod result;

// Re-export primary types at crate root for ergonomic use.
pub use ids::RunId;
pub use phase::Phase;
pub use principal::Principal;
pub use result::RunResult;

//! Cadence orchestration engine.
//!
//! Executes named business rules ("scenarios"), grouped into flag-gateable
//! "features", against a single request context in a fixed four-phase order:
//! `Initialize`, `Before`, `On`, `After`. The first terminal result
//! short-circuits the run; failures are contained at the scenario boundary;
//! domain events appended by completed scenarios are flushed to a publisher
//! once per run.
//!
//! The engine is an in-process library. Routing, persistence, and the
//! feature-flag backend are collaborators supplied by the caller:
//! - build a [`RunContext`] from the inbound request,
//! - supply an ordered list of [`Feature`]s,
//! - invoke [`Runner::run`],
//! - translate the returned [`RunResult`] into a response.

pub mod context;
pub mod error;
pub mod mocks;
pub mod plan;
pub mod runner;
pub mod state;
pub mod traits;

pub use context::RunContext;
pub use error::EngineError;
pub use plan::{PlannedScenario, RunPlan};
pub use runner::{Runner, RunnerConfig};
pub use state::StateBag;
pub use traits::{EventPublisher, Feature, FlagService, Scenario};

// Re-export the shared value types so callers can depend on one crate.
pub use cadence_types::{Phase, Principal, RunId, RunResult};

//! Contracts between the engine, rule authors, and external collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use cadence_types::{Phase, RunResult};

use crate::context::RunContext;
use crate::error::EngineError;

/// A single business rule: phase selection, a guard, and an action.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Display name, required at construction. Appears in every log scope
    /// the runner opens for this scenario.
    fn name(&self) -> &str;

    /// Which phase (if any) this scenario belongs to for this run.
    ///
    /// Queried exactly once per run, before any phase executes, to build the
    /// static plan. Must not depend on state written by other scenarios'
    /// actions — at plan time no action has run yet.
    fn phase(&self, ctx: &RunContext) -> Option<Phase>;

    /// Should the action run? Evaluated immediately before execution, within
    /// the scenario's phase, so it can observe state written by earlier
    /// phases. A false guard skips the scenario silently.
    fn guard(&self, _ctx: &RunContext) -> bool {
        true
    }

    /// The unit of work. May read and write context state, may append
    /// events, must produce a [`RunResult`] (terminal or not). An error
    /// escaping here is contained by the runner and ends the run with the
    /// configured failure code.
    async fn execute(&self, ctx: &mut RunContext) -> Result<RunResult, EngineError>;
}

/// A named, flag-gateable grouping of scenarios for one request capability.
#[async_trait]
pub trait Feature: Send + Sync {
    /// Identity for flag lookups and logging.
    fn name(&self) -> &str;

    /// Gates whether any of this feature's scenarios participate in the run.
    /// Evaluated once per run, after the flag check, before any scenario.
    async fn applicable(&self, _ctx: &RunContext) -> bool {
        true
    }

    /// Scenarios in execution order.
    fn scenarios(&self) -> Vec<Arc<dyn Scenario>>;
}

/// Feature-flag backend consulted by feature name before a run.
///
/// Absence of a configured service means all features are enabled.
#[async_trait]
pub trait FlagService: Send + Sync {
    async fn is_enabled(&self, feature: &str) -> bool;
}

/// Event-publishing transport invoked at most once per run, only when the
/// run's event log is non-empty.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, events: Vec<Value>) -> anyhow::Result<()>;
}

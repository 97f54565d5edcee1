//! Configurable test doubles for the engine's contracts.
//!
//! Used by this crate's own tests and by downstream crates exercising
//! features end to end without real collaborators.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;

use cadence_types::{Phase, RunResult};

use crate::context::RunContext;
use crate::error::EngineError;
use crate::traits::{EventPublisher, Feature, FlagService, Scenario};

/// Flag service backed by a fixed set of disabled names.
///
/// Everything is enabled unless explicitly disabled.
pub struct StaticFlags {
    disabled: HashSet<String>,
}

impl StaticFlags {
    pub fn new() -> Self {
        Self {
            disabled: HashSet::new(),
        }
    }

    pub fn disable(mut self, feature: impl Into<String>) -> Self {
        self.disabled.insert(feature.into());
        self
    }
}

impl Default for StaticFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlagService for StaticFlags {
    async fn is_enabled(&self, feature: &str) -> bool {
        !self.disabled.contains(feature)
    }
}

/// Publisher that records every batch it receives.
pub struct RecordingPublisher {
    batches: Mutex<Vec<Vec<Value>>>,
    reject: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            reject: false,
        }
    }

    /// A publisher whose `publish` always fails, for delivery-error paths.
    pub fn rejecting() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    /// Batches received so far, one entry per `publish` invocation.
    pub fn batches(&self) -> Vec<Vec<Value>> {
        self.batches.lock().expect("publisher mutex poisoned").clone()
    }
}

impl Default for RecordingPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, events: Vec<Value>) -> anyhow::Result<()> {
        if self.reject {
            return Err(anyhow!("publisher unavailable"));
        }
        self.batches
            .lock()
            .expect("publisher mutex poisoned")
            .push(events);
        Ok(())
    }
}

/// Shared execution counter handed out by [`StubScenario::executions`].
#[derive(Clone)]
pub struct ExecutionCount(Arc<AtomicUsize>);

impl ExecutionCount {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

enum StubOutcome {
    Produce(RunResult),
    Fail(String),
    Panic,
}

/// Scripted scenario with a fixed phase, guard verdict, and outcome.
pub struct StubScenario {
    name: String,
    phase: Option<Phase>,
    pass_guard: bool,
    outcome: StubOutcome,
    executions: Arc<AtomicUsize>,
}

impl StubScenario {
    /// A stub that passes its guard and returns a plain non-terminal result.
    pub fn new(name: impl Into<String>, phase: Option<Phase>) -> Self {
        Self {
            name: name.into(),
            phase,
            pass_guard: true,
            outcome: StubOutcome::Produce(RunResult::advance()),
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the guard report false, so the action never runs.
    pub fn guarded_off(mut self) -> Self {
        self.pass_guard = false;
        self
    }

    /// Fix the result the action returns.
    pub fn returning(mut self, result: RunResult) -> Self {
        self.outcome = StubOutcome::Produce(result);
        self
    }

    /// Make the action fail with the given message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.outcome = StubOutcome::Fail(message.into());
        self
    }

    /// Make the action panic, for containment-boundary tests.
    pub fn panicking(mut self) -> Self {
        self.outcome = StubOutcome::Panic;
        self
    }

    /// Handle to assert how many times the action ran.
    pub fn executions(&self) -> ExecutionCount {
        ExecutionCount(self.executions.clone())
    }
}

#[async_trait]
impl Scenario for StubScenario {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self, _ctx: &RunContext) -> Option<Phase> {
        self.phase
    }

    fn guard(&self, _ctx: &RunContext) -> bool {
        self.pass_guard
    }

    async fn execute(&self, _ctx: &mut RunContext) -> Result<RunResult, EngineError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            StubOutcome::Produce(result) => Ok(result.clone()),
            StubOutcome::Fail(message) => Err(EngineError::Action(anyhow!(message.clone()))),
            StubOutcome::Panic => panic!("stub scenario panic"),
        }
    }
}

/// Feature holding an explicit scenario list and a fixed applicability.
pub struct StubFeature {
    name: String,
    applicable: bool,
    scenarios: Vec<Arc<dyn Scenario>>,
}

impl StubFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            applicable: true,
            scenarios: Vec::new(),
        }
    }

    pub fn with_scenario(mut self, scenario: Arc<dyn Scenario>) -> Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn not_applicable(mut self) -> Self {
        self.applicable = false;
        self
    }
}

#[async_trait]
impl Feature for StubFeature {
    fn name(&self) -> &str {
        &self.name
    }

    async fn applicable(&self, _ctx: &RunContext) -> bool {
        self.applicable
    }

    fn scenarios(&self) -> Vec<Arc<dyn Scenario>> {
        self.scenarios.clone()
    }
}

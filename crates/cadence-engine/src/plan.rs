use std::sync::Arc;

use tracing::debug;

use cadence_types::Phase;

use crate::context::RunContext;
use crate::traits::{Feature, FlagService, Scenario};

/// One scenario admitted to the plan, with its owning feature's name for
/// log scoping.
pub struct PlannedScenario {
    pub feature: String,
    pub scenario: Arc<dyn Scenario>,
}

/// The static phase assignment computed once per run, before any action
/// executes.
///
/// Plan-time decisions (which phase, whether to run at all) are fixed for
/// the whole run; only guards are re-evaluated at execution time. Feature
/// order is preserved, then scenario order within each feature.
pub struct RunPlan {
    buckets: [Vec<PlannedScenario>; 4],
}

impl RunPlan {
    /// Resolve flag gating, applicability, and phase membership.
    ///
    /// 1. Consult the flag service by feature name (flag-off is equivalent
    ///    to applicability-false).
    /// 2. Evaluate `applicable` once per surviving feature.
    /// 3. Query `phase` exactly once per scenario; discard `None`.
    pub async fn resolve(
        ctx: &RunContext,
        features: &[Arc<dyn Feature>],
        flags: Option<&dyn FlagService>,
    ) -> RunPlan {
        let mut buckets: [Vec<PlannedScenario>; 4] = Default::default();

        for feature in features {
            if let Some(flags) = flags {
                if !flags.is_enabled(feature.name()).await {
                    debug!(feature = feature.name(), "feature disabled by flag");
                    continue;
                }
            }

            if !feature.applicable(ctx).await {
                debug!(feature = feature.name(), "feature not applicable");
                continue;
            }

            for scenario in feature.scenarios() {
                if let Some(phase) = scenario.phase(ctx) {
                    buckets[phase.index()].push(PlannedScenario {
                        feature: feature.name().to_string(),
                        scenario,
                    });
                }
            }
        }

        RunPlan { buckets }
    }

    /// Scenarios assigned to `phase`, in plan order.
    pub fn for_phase(&self, phase: Phase) -> &[PlannedScenario] {
        &self.buckets[phase.index()]
    }

    /// Total number of planned scenarios across all phases.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// An empty plan is the deliberate "no rule matched" outcome.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

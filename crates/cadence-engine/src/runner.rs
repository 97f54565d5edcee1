use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, info_span, warn, Instrument};

use cadence_types::{Phase, RunResult};

use crate::context::RunContext;
use crate::plan::RunPlan;
use crate::traits::{EventPublisher, Feature, FlagService};

/// Outcome-code policy for runs.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Code of the terminal result synthesized when the plan is empty
    /// (default: 404).
    pub not_handled_code: u16,
    /// Code of the terminal result synthesized when an action fails
    /// (default: 500).
    pub failure_code: u16,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            not_handled_code: 404,
            failure_code: 500,
        }
    }
}

/// Orchestrates features against one context.
///
/// Stateless across runs: holds only the outcome-code policy and `Arc`
/// references to collaborators, so one runner may serve any number of
/// concurrent runs provided each run owns its own [`RunContext`].
pub struct Runner {
    flags: Option<Arc<dyn FlagService>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            flags: None,
            publisher: None,
            config,
        }
    }

    pub fn with_flags(mut self, flags: Arc<dyn FlagService>) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute one run: resolve the plan, walk the phases, flush events.
    ///
    /// Every run yields exactly one [`RunResult`]; errors and panics raised
    /// by scenario actions are contained at the scenario boundary and never
    /// reach the caller.
    pub async fn run(
        &self,
        ctx: &mut RunContext,
        features: &[Arc<dyn Feature>],
    ) -> RunResult {
        let span = info_span!(
            "run",
            run_id = %ctx.run_id(),
            operation = ctx.operation().unwrap_or_default(),
            resource = ctx.resource().unwrap_or_default(),
        );

        async {
            let plan = RunPlan::resolve(ctx, features, self.flags.as_deref()).await;

            if plan.is_empty() {
                info!("no rule matched the request");
                ctx.apply(RunResult::halt(self.config.not_handled_code));
            } else {
                debug!(scenarios = plan.len(), "plan resolved");
                self.walk_phases(ctx, &plan).await;
            }

            self.flush_events(ctx).await;

            ctx.result().cloned().unwrap_or_else(RunResult::advance)
        }
        .instrument(span)
        .await
    }

    /// Walk the phases strictly in order, stopping at the first terminal
    /// result.
    async fn walk_phases(&self, ctx: &mut RunContext, plan: &RunPlan) {
        'phases: for phase in Phase::ALL {
            // A terminal result skips all remaining phases entirely.
            if ctx.is_terminal() {
                break;
            }

            for planned in plan.for_phase(phase) {
                let scenario = planned.scenario.as_ref();

                if !scenario.guard(ctx) {
                    continue;
                }

                let span = info_span!(
                    "scenario",
                    phase = phase.label(),
                    feature = planned.feature.as_str(),
                    scenario = scenario.name(),
                );

                let terminal = async {
                    info!("scenario begin");

                    match AssertUnwindSafe(scenario.execute(ctx)).catch_unwind().await {
                        Ok(Ok(result)) => {
                            info!(terminal = result.is_terminal(), "scenario end");
                            ctx.apply(result);
                        }
                        Ok(Err(err)) => {
                            error!(error = %err, "scenario failed");
                            ctx.apply(RunResult::halt(self.config.failure_code));
                        }
                        Err(panic) => {
                            error!(error = %panic_detail(&panic), "scenario panicked");
                            ctx.apply(RunResult::halt(self.config.failure_code));
                        }
                    }

                    ctx.is_terminal()
                }
                .instrument(span)
                .await;

                if terminal {
                    break 'phases;
                }
            }
        }
    }

    /// Deliver appended events once per run, whether the run completed
    /// naturally or was short-circuited. Events appended by completed
    /// actions are committed facts.
    async fn flush_events(&self, ctx: &RunContext) {
        let Some(publisher) = &self.publisher else {
            return;
        };
        if ctx.events().is_empty() {
            return;
        }

        match publisher.publish(ctx.events().to_vec()).await {
            Ok(()) => debug!(count = ctx.events().len(), "events published"),
            Err(err) => warn!(error = %err, "event publication failed"),
        }
    }
}

fn panic_detail(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

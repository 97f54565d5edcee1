//! The `submit-enrollment` feature: one scenario per engine phase.
//!
//! `Initialize` publishes the product rules, the `Before` scenarios guard
//! validation and authorization, `On` persists through the injected store,
//! and `After` records the audit trail event.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use cadence_engine::{EngineError, Feature, Phase, RunContext, RunResult, Scenario};

use crate::store::ApplicationStore;
use crate::types::{ApplicationRecord, EnrollmentApplication, EnrollmentEvent, ProductRules};

/// State tag under which `Initialize` publishes the [`ProductRules`].
pub const PRODUCT_RULES_SLOT: &str = "product-rules";

/// State tag under which `On` publishes the stored application id.
pub const APPLICATION_ID_SLOT: &str = "application-id";

/// The enrollment submission feature.
pub struct SubmitEnrollment {
    rules: ProductRules,
    store: Arc<dyn ApplicationStore>,
}

impl SubmitEnrollment {
    pub fn new(rules: ProductRules, store: Arc<dyn ApplicationStore>) -> Self {
        Self { rules, store }
    }
}

#[async_trait]
impl Feature for SubmitEnrollment {
    fn name(&self) -> &str {
        "submit-enrollment"
    }

    /// The feature accepts only inputs shaped like an enrollment application.
    async fn applicable(&self, ctx: &RunContext) -> bool {
        ctx.input_as::<EnrollmentApplication>().is_ok()
    }

    fn scenarios(&self) -> Vec<Arc<dyn Scenario>> {
        vec![
            Arc::new(LoadProductRules {
                rules: self.rules.clone(),
            }),
            Arc::new(RequireFullName),
            Arc::new(MinimumAge),
            Arc::new(MembersOnly),
            Arc::new(StoreApplication {
                store: self.store.clone(),
            }),
            Arc::new(RecordAuditTrail),
        ]
    }
}

/// Publishes the product rules so every later guard can read them.
struct LoadProductRules {
    rules: ProductRules,
}

#[async_trait]
impl Scenario for LoadProductRules {
    fn name(&self) -> &str {
        "load-product-rules"
    }

    fn phase(&self, _ctx: &RunContext) -> Option<Phase> {
        Some(Phase::Initialize)
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<RunResult, EngineError> {
        ctx.put(PRODUCT_RULES_SLOT, self.rules.clone())?;
        Ok(RunResult::advance())
    }
}

/// Rejects applications without both name parts.
struct RequireFullName;

#[async_trait]
impl Scenario for RequireFullName {
    fn name(&self) -> &str {
        "require-full-name"
    }

    fn phase(&self, _ctx: &RunContext) -> Option<Phase> {
        Some(Phase::Before)
    }

    fn guard(&self, ctx: &RunContext) -> bool {
        ctx.input_as::<EnrollmentApplication>()
            .map(|app| !app.has_full_name())
            .unwrap_or(true)
    }

    async fn execute(&self, _ctx: &mut RunContext) -> Result<RunResult, EngineError> {
        Ok(RunResult::halt(400).with_message("First and last name required"))
    }
}

/// Rejects applicants below the product's minimum age. A missing age counts
/// as below the minimum: the rule cannot be verified without it.
struct MinimumAge;

#[async_trait]
impl Scenario for MinimumAge {
    fn name(&self) -> &str {
        "minimum-age"
    }

    fn phase(&self, _ctx: &RunContext) -> Option<Phase> {
        Some(Phase::Before)
    }

    fn guard(&self, ctx: &RunContext) -> bool {
        let Some(rules) = ctx.try_get::<ProductRules>(PRODUCT_RULES_SLOT) else {
            return false;
        };
        ctx.input_as::<EnrollmentApplication>()
            .map(|app| app.age.map_or(true, |age| age < rules.minimum_age))
            .unwrap_or(true)
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<RunResult, EngineError> {
        let rules = ctx.get::<ProductRules>(PRODUCT_RULES_SLOT)?;
        Ok(RunResult::halt(400).with_message(format!("Minimum age {}", rules.minimum_age)))
    }
}

/// Rejects unauthenticated callers when the product is members-only.
struct MembersOnly;

#[async_trait]
impl Scenario for MembersOnly {
    fn name(&self) -> &str {
        "members-only"
    }

    fn phase(&self, _ctx: &RunContext) -> Option<Phase> {
        Some(Phase::Before)
    }

    fn guard(&self, ctx: &RunContext) -> bool {
        let Some(rules) = ctx.try_get::<ProductRules>(PRODUCT_RULES_SLOT) else {
            return false;
        };
        let authenticated = ctx
            .principal()
            .map(|p| p.is_authenticated())
            .unwrap_or(false);
        rules.existing_members_only && !authenticated
    }

    async fn execute(&self, _ctx: &mut RunContext) -> Result<RunResult, EngineError> {
        Ok(RunResult::halt(401))
    }
}

/// Persists the application and publishes the generated id.
struct StoreApplication {
    store: Arc<dyn ApplicationStore>,
}

#[async_trait]
impl Scenario for StoreApplication {
    fn name(&self) -> &str {
        "store-application"
    }

    fn phase(&self, _ctx: &RunContext) -> Option<Phase> {
        Some(Phase::On)
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<RunResult, EngineError> {
        let app: EnrollmentApplication = ctx.input_as()?;
        let product = ctx.get::<ProductRules>(PRODUCT_RULES_SLOT)?.product.clone();
        let submitted_by = ctx.principal().map(|p| p.display_name().to_string());

        let record = ApplicationRecord {
            id: Uuid::new_v4(),
            product,
            first_name: app.first_name.unwrap_or_default(),
            last_name: app.last_name.unwrap_or_default(),
            age: app.age.unwrap_or_default(),
            submitted_by,
            submitted_at: Utc::now(),
        };
        let id = record.id;

        self.store.insert(record).await.map_err(anyhow::Error::from)?;
        tracing::debug!(application_id = %id, "application stored");
        ctx.put(APPLICATION_ID_SLOT, id)?;

        Ok(RunResult::advance().with_code(200).with_output(json!(id)))
    }
}

/// Appends the submission audit event once an application was stored.
struct RecordAuditTrail;

#[async_trait]
impl Scenario for RecordAuditTrail {
    fn name(&self) -> &str {
        "record-audit-trail"
    }

    fn phase(&self, _ctx: &RunContext) -> Option<Phase> {
        Some(Phase::After)
    }

    fn guard(&self, ctx: &RunContext) -> bool {
        ctx.try_get::<Uuid>(APPLICATION_ID_SLOT).is_some()
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<RunResult, EngineError> {
        let application_id = *ctx.get::<Uuid>(APPLICATION_ID_SLOT)?;
        let product = ctx.get::<ProductRules>(PRODUCT_RULES_SLOT)?.product.clone();
        let submitted_by = ctx.principal().map(|p| p.display_name().to_string());

        ctx.emit(EnrollmentEvent::ApplicationSubmitted {
            application_id,
            product,
            submitted_by,
        })?;

        Ok(RunResult::advance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryApplicationStore;
    use cadence_engine::mocks::{RecordingPublisher, StaticFlags};
    use cadence_engine::{Principal, Runner, RunnerConfig};
    use serde_json::Value;

    struct Harness {
        runner: Runner,
        store: Arc<InMemoryApplicationStore>,
        publisher: Arc<RecordingPublisher>,
        features: Vec<Arc<dyn Feature>>,
    }

    fn harness(rules: ProductRules) -> Harness {
        let store = Arc::new(InMemoryApplicationStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let runner = Runner::new(RunnerConfig::default()).with_publisher(publisher.clone());
        let features: Vec<Arc<dyn Feature>> =
            vec![Arc::new(SubmitEnrollment::new(rules, store.clone()))];
        Harness {
            runner,
            store,
            publisher,
            features,
        }
    }

    fn standard_rules() -> ProductRules {
        ProductRules::new("standard", 18)
    }

    fn application(first: Option<&str>, last: Option<&str>, age: Option<u32>) -> Value {
        json!({
            "first_name": first,
            "last_name": last,
            "age": age,
        })
    }

    #[tokio::test]
    async fn missing_first_name_is_rejected_before_storage() {
        let h = harness(standard_rules());
        let mut ctx = RunContext::new(application(None, Some("Doe"), Some(30)))
            .with_operation("submit")
            .with_resource("enrollments");

        let result = h.runner.run(&mut ctx, &h.features).await;

        assert!(result.is_terminal());
        assert_eq!(result.code, Some(400));
        assert_eq!(result.messages, vec!["First and last name required"]);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn underage_applicant_is_rejected() {
        let h = harness(standard_rules());
        let mut ctx = RunContext::new(application(Some("Jane"), Some("Doe"), Some(15)));

        let result = h.runner.run(&mut ctx, &h.features).await;

        assert!(result.is_terminal());
        assert_eq!(result.code, Some(400));
        assert_eq!(result.messages, vec!["Minimum age 18"]);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn members_only_product_rejects_anonymous_callers() {
        let h = harness(standard_rules().members_only());
        let mut ctx = RunContext::new(application(Some("Jane"), Some("Doe"), Some(30)))
            .with_principal(Principal::anonymous());

        let result = h.runner.run(&mut ctx, &h.features).await;

        assert!(result.is_terminal());
        assert_eq!(result.code, Some(401));
        assert!(result.messages.is_empty());
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn valid_submission_stores_and_audits() {
        let h = harness(standard_rules().members_only());
        let mut ctx = RunContext::new(application(Some("Jane"), Some("Doe"), Some(30)))
            .with_principal(Principal::authenticated("jane"));

        let result = h.runner.run(&mut ctx, &h.features).await;

        assert!(!result.is_terminal());
        assert_eq!(result.code, Some(200));

        let id: Uuid = serde_json::from_value(result.output.clone().unwrap()).unwrap();
        let stored = h.store.fetch(id).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Jane");
        assert_eq!(stored.product, "standard");
        assert_eq!(stored.submitted_by.as_deref(), Some("jane"));

        let batches = h.publisher.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0]["kind"], "application_submitted");
        assert_eq!(batches[0][0]["application_id"], json!(id));
    }

    #[tokio::test]
    async fn anonymous_caller_allowed_on_open_products() {
        let h = harness(standard_rules());
        let mut ctx = RunContext::new(application(Some("Jane"), Some("Doe"), Some(30)));

        let result = h.runner.run(&mut ctx, &h.features).await;

        assert_eq!(result.code, Some(200));
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn disabled_flag_leaves_the_request_unhandled() {
        let h = harness(standard_rules());
        let runner = Runner::new(RunnerConfig::default())
            .with_flags(Arc::new(StaticFlags::new().disable("submit-enrollment")));
        let mut ctx = RunContext::new(application(Some("Jane"), Some("Doe"), Some(30)));

        let result = runner.run(&mut ctx, &h.features).await;

        assert!(result.is_terminal());
        assert_eq!(result.code, Some(404));
        assert!(h.store.is_empty().await);
        assert!(h.publisher.batches().is_empty());
    }

    #[tokio::test]
    async fn mismatched_input_shape_is_unhandled() {
        let h = harness(standard_rules());
        let mut ctx = RunContext::new(json!({"age": "thirty"}));

        let result = h.runner.run(&mut ctx, &h.features).await;

        assert!(result.is_terminal());
        assert_eq!(result.code, Some(404));
    }

    #[tokio::test]
    async fn missing_age_cannot_clear_the_minimum() {
        let h = harness(standard_rules());
        let mut ctx = RunContext::new(application(Some("Jane"), Some("Doe"), None));

        let result = h.runner.run(&mut ctx, &h.features).await;

        assert_eq!(result.code, Some(400));
        assert_eq!(result.messages, vec!["Minimum age 18"]);
    }
}

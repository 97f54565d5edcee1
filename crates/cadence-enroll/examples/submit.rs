//! # Enrollment Submission Example
//!
//! Demonstrates the caller contract end to end:
//! - build a `RunContext` from an inbound payload
//! - supply the feature list
//! - invoke the runner
//! - translate the final result into a response
//!
//! Run with: `cargo run --example submit`

use std::sync::Arc;

use serde_json::json;

use cadence_engine::mocks::RecordingPublisher;
use cadence_engine::{Feature, Principal, RunContext, Runner, RunnerConfig};
use cadence_enroll::{InMemoryApplicationStore, ProductRules, SubmitEnrollment};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let store = Arc::new(InMemoryApplicationStore::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let runner = Runner::new(RunnerConfig::default()).with_publisher(publisher.clone());

    let rules = ProductRules::new("standard", 18).members_only();
    let features: Vec<Arc<dyn Feature>> =
        vec![Arc::new(SubmitEnrollment::new(rules, store.clone()))];

    // A rejected submission: the applicant is under the product minimum.
    let mut ctx = RunContext::new(json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "age": 15,
    }))
    .with_principal(Principal::authenticated("jane"))
    .with_operation("submit")
    .with_resource("enrollments");

    let rejected = runner.run(&mut ctx, &features).await;
    println!(
        "rejected: code={:?} messages={:?}",
        rejected.code, rejected.messages
    );

    // An accepted submission.
    let mut ctx = RunContext::new(json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "age": 30,
    }))
    .with_principal(Principal::authenticated("jane"))
    .with_operation("submit")
    .with_resource("enrollments");

    let accepted = runner.run(&mut ctx, &features).await;
    println!(
        "accepted: code={:?} application={}",
        accepted.code,
        accepted.output.unwrap_or_default()
    );
    println!("stored applications: {}", store.len().await);
    println!("audit batches delivered: {}", publisher.batches().len());
}

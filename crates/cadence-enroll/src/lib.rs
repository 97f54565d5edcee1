//! Reference domain for the Cadence engine: product enrollment submission.
//!
//! One feature, `submit-enrollment`, decomposed into a scenario per phase:
//! product rules load in `Initialize`, validation and authorization guards in
//! `Before`, persistence in `On`, and the audit trail in `After`. The
//! application store is an injected repository; the in-memory implementation
//! here is the test/demo backend.

pub mod error;
pub mod feature;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use feature::{SubmitEnrollment, APPLICATION_ID_SLOT, PRODUCT_RULES_SLOT};
pub use store::{ApplicationStore, InMemoryApplicationStore};
pub use types::{ApplicationRecord, EnrollmentApplication, EnrollmentEvent, ProductRules};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The inbound payload: what the caller submits for enrollment.
///
/// Every field is optional at the boundary; validation scenarios decide what
/// a missing field means for the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnrollmentApplication {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<u32>,
}

impl EnrollmentApplication {
    /// Both name parts present and non-blank.
    pub fn has_full_name(&self) -> bool {
        let filled = |part: &Option<String>| {
            part.as_deref().map(str::trim).is_some_and(|s| !s.is_empty())
        };
        filled(&self.first_name) && filled(&self.last_name)
    }
}

/// Per-product enrollment policy, loaded in the `Initialize` phase and
/// published through the run's state bag for later guards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductRules {
    pub product: String,
    pub minimum_age: u32,
    pub existing_members_only: bool,
}

impl ProductRules {
    pub fn new(product: impl Into<String>, minimum_age: u32) -> Self {
        Self {
            product: product.into(),
            minimum_age,
            existing_members_only: false,
        }
    }

    pub fn members_only(mut self) -> Self {
        self.existing_members_only = true;
        self
    }
}

/// A stored enrollment application.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub product: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Domain events appended to the run's event log.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrollmentEvent {
    ApplicationSubmitted {
        application_id: Uuid,
        product: String,
        submitted_by: Option<String>,
    },
}

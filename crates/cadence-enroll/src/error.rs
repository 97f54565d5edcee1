use thiserror::Error;
use uuid::Uuid;

/// Errors from the application store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("application {0} already stored")]
    Duplicate(Uuid),

    #[error("store backend unavailable: {0}")]
    Unavailable(String),
}

use thiserror::Error;

/// Errors surfaced to scenario actions and contained by the runner.
///
/// A run never propagates these to the caller: the runner converts any
/// error escaping an action into a terminal failure result. The variants
/// exist so scenario code can use `?` on state access and serialization
/// and still produce a precise log record when something goes wrong.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("state slot '{0}' already holds a value")]
    SlotOccupied(&'static str),

    #[error("state slot '{0}' has no value")]
    SlotEmpty(String),

    #[error("state slot '{0}' holds a value of a different type")]
    SlotType(String),

    #[error("input payload did not match the expected shape: {0}")]
    Input(String),

    #[error("event serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Action(#[from] anyhow::Error),
}

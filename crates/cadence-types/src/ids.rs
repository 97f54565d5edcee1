use serde::{Deserialize, Serialize};

/// Correlation identifier for a single run.
///
/// Generated once when the context is built and carried through every log
/// scope opened during that run. Never reused across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_uniqueness() {
        let a = RunId::new();
        let b = RunId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn run_id_serialization() {
        let id = RunId::new();
        let json = serde_json::to_string(&id).unwrap();
        let restored: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn display_format() {
        let id = RunId::new();
        assert!(format!("{}", id).starts_with("run:"));
    }
}

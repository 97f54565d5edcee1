use serde::{Deserialize, Serialize};

/// Caller identity attached to a run by the entry-point collaborator.
///
/// Read-only inside a run: scenarios consult it, never mutate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    name: String,
    authenticated: bool,
}

impl Principal {
    /// An authenticated caller with the given display name.
    pub fn authenticated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authenticated: true,
        }
    }

    /// An anonymous, unauthenticated caller.
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".into(),
            authenticated: false,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_principal() {
        let principal = Principal::authenticated("jane");
        assert!(principal.is_authenticated());
        assert_eq!(principal.display_name(), "jane");
    }

    #[test]
    fn anonymous_principal() {
        let principal = Principal::anonymous();
        assert!(!principal.is_authenticated());
    }
}

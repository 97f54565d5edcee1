use serde::{Deserialize, Serialize};

/// Execution phase of a scenario within a run.
///
/// Phases form a fixed total order: `Initialize < Before < On < After`.
/// The runner walks them strictly in that order, so state published by an
/// `Initialize` action is visible to every `Before` guard, and a `Before`
/// denial prevents `On` side effects from ever running.
///
/// A scenario that does not take part in a run reports no phase at all
/// (`Option::<Phase>::None` at the contract edge) rather than a sentinel
/// variant here.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Reference-data lookups and other state seeding.
    Initialize,
    /// Validation and authorization ahead of side effects.
    Before,
    /// The side-effecting work itself.
    On,
    /// Follow-up work after the main effect (audit, notification).
    After,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 4] = [Phase::Initialize, Phase::Before, Phase::On, Phase::After];

    /// Stable label used in log fields and serialized events.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Initialize => "initialize",
            Phase::Before => "before",
            Phase::On => "on",
            Phase::After => "after",
        }
    }

    /// Position of this phase within [`Phase::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Phase::Initialize => 0,
            Phase::Before => 1,
            Phase::On => 2,
            Phase::After => 3,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_totally_ordered() {
        assert!(Phase::Initialize < Phase::Before);
        assert!(Phase::Before < Phase::On);
        assert!(Phase::On < Phase::After);
    }

    #[test]
    fn all_is_sorted_in_execution_order() {
        let mut sorted = Phase::ALL;
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
    }

    #[test]
    fn index_matches_position_in_all() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn label_round_trips_through_serde() {
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.label()));
            let restored: Phase = serde_json::from_str(&json).unwrap();
            assert_eq!(restored, phase);
        }
    }
}

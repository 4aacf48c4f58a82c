//! Structured operation outcomes for caller-branched rejections.

use serde::{Deserialize, Serialize};

/// Result of a domain mutation the caller branches on.
///
/// Invariant-preserving rejections (target already on a project, duplicate
/// vote, leader removal with members remaining) are ordinary outcomes, not
/// raised errors: the boundary layer renders `message` to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the mutation was applied.
    pub success: bool,
    /// Human-readable explanation, suitable for direct display.
    pub message: String,
}

impl Outcome {
    /// A successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A rejected outcome. The mutation was not applied.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        let ok = Outcome::ok("member added");
        assert!(ok.success);
        assert_eq!(ok.message, "member added");

        let no = Outcome::rejected("already on a project");
        assert!(!no.success);
    }
}

//! Feature-request build pipeline states.
//!
//! Feature requests are picked up by an external coding worker which moves
//! them through `processing` and `building`; staff review the result.

pub mod state_machine {
    pub const PENDING: &str = "pending";
    pub const PROCESSING: &str = "processing";
    pub const BUILDING: &str = "building";
    pub const REVIEW: &str = "review";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const CANCELLED: &str = "cancelled";

    pub const ALL: &[&str] = &[
        PENDING, PROCESSING, BUILDING, REVIEW, COMPLETED, FAILED, CANCELLED,
    ];

    /// Statuses reachable from `from`. Completed and cancelled are terminal;
    /// a failed request may be retried.
    pub fn valid_transitions(from: &str) -> &'static [&'static str] {
        match from {
            PENDING => &[PROCESSING, CANCELLED],
            PROCESSING => &[BUILDING, FAILED, CANCELLED],
            BUILDING => &[REVIEW, FAILED, CANCELLED],
            REVIEW => &[COMPLETED, PENDING, CANCELLED],
            FAILED => &[PENDING, CANCELLED],
            COMPLETED | CANCELLED => &[],
            _ => &[],
        }
    }

    pub fn can_transition(from: &str, to: &str) -> bool {
        valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
        if !ALL.contains(&to) {
            return Err(format!(
                "Invalid feature request status '{to}'. Must be one of: {}",
                ALL.join(", ")
            ));
        }
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!("Invalid transition: {from} -> {to}"))
        }
    }

    pub fn is_terminal(status: &str) -> bool {
        valid_transitions(status).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::state_machine::*;

    #[test]
    fn happy_path() {
        assert!(can_transition(PENDING, PROCESSING));
        assert!(can_transition(PROCESSING, BUILDING));
        assert!(can_transition(BUILDING, REVIEW));
        assert!(can_transition(REVIEW, COMPLETED));
    }

    #[test]
    fn review_can_send_back() {
        assert!(can_transition(REVIEW, PENDING));
    }

    #[test]
    fn failed_can_retry() {
        assert!(can_transition(FAILED, PENDING));
        assert!(!can_transition(FAILED, BUILDING));
    }

    #[test]
    fn terminal_states() {
        assert!(is_terminal(COMPLETED));
        assert!(is_terminal(CANCELLED));
        assert!(!is_terminal(FAILED));
    }

    #[test]
    fn cannot_skip_stages() {
        let err = validate_transition(PENDING, BUILDING).unwrap_err();
        assert_eq!(err, "Invalid transition: pending -> building");
    }

    #[test]
    fn unknown_status_rejected() {
        assert!(validate_transition(PENDING, "deployed")
            .unwrap_err()
            .contains("Must be one of"));
    }
}

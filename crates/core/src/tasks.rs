//! Staff task statuses, priorities and overdue detection.

use crate::error::CoreError;
use crate::types::Date;

pub const TASK_OPEN: &str = "open";
pub const TASK_IN_PROGRESS: &str = "in_progress";
pub const TASK_BLOCKED: &str = "blocked";
pub const TASK_DONE: &str = "done";
pub const TASK_CANCELLED: &str = "cancelled";

pub const VALID_TASK_STATUSES: &[&str] = &[
    TASK_OPEN,
    TASK_IN_PROGRESS,
    TASK_BLOCKED,
    TASK_DONE,
    TASK_CANCELLED,
];

/// Highest (most urgent) priority.
pub const PRIORITY_MIN: i16 = 1;
/// Lowest priority.
pub const PRIORITY_MAX: i16 = 4;
/// Priority assigned when none is given.
pub const PRIORITY_DEFAULT: i16 = 3;

/// Statuses reachable from `from`. Done tasks may be reopened.
pub fn valid_transitions(from: &str) -> &'static [&'static str] {
    match from {
        TASK_OPEN => &[TASK_IN_PROGRESS, TASK_BLOCKED, TASK_DONE, TASK_CANCELLED],
        TASK_IN_PROGRESS => &[TASK_OPEN, TASK_BLOCKED, TASK_DONE, TASK_CANCELLED],
        TASK_BLOCKED => &[TASK_OPEN, TASK_IN_PROGRESS, TASK_CANCELLED],
        TASK_DONE => &[TASK_OPEN],
        TASK_CANCELLED => &[TASK_OPEN],
        _ => &[],
    }
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_TASK_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid task status '{status}'. Must be one of: {}",
            VALID_TASK_STATUSES.join(", ")
        )))
    }
}

pub fn validate_transition(from: &str, to: &str) -> Result<(), CoreError> {
    validate_status(to)?;
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid task transition: {from} -> {to}"
        )))
    }
}

pub fn validate_priority(priority: i16) -> Result<(), CoreError> {
    if (PRIORITY_MIN..=PRIORITY_MAX).contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Priority must be between {PRIORITY_MIN} and {PRIORITY_MAX}"
        )))
    }
}

/// A task is overdue when it is still actionable and its due date has passed.
pub fn is_overdue(status: &str, due_date: Option<Date>, today: Date) -> bool {
    let actionable = matches!(status, TASK_OPEN | TASK_IN_PROGRESS | TASK_BLOCKED);
    actionable && due_date.is_some_and(|due| due < today)
}

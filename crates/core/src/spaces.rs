//! Space validation: names, rates and the parent hierarchy.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::fees::validate_amount;
use crate::types::{Cents, DbId};

/// Maximum length of a space name.
pub const MAX_NAME_LENGTH: usize = 120;

/// Validate a space name: non-blank and within the length limit.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Space name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Space name exceeds maximum length of {MAX_NAME_LENGTH}"
        )));
    }
    Ok(())
}

/// Validate optional rate fields; any present rate must be a valid amount.
pub fn validate_rates(rates: &[(&str, Option<Cents>)]) -> Result<(), CoreError> {
    for (field, value) in rates {
        if let Some(v) = value {
            validate_amount(field, *v)?;
        }
    }
    Ok(())
}

/// Validate that giving `space_id` the parent `new_parent` keeps the hierarchy a forest.
///
/// `parents` maps every existing space to its current parent. `space_id` is
/// `None` for a space that does not exist yet (which cannot close a cycle).
pub fn validate_parent(
    space_id: Option<DbId>,
    new_parent: Option<DbId>,
    parents: &HashMap<DbId, Option<DbId>>,
) -> Result<(), CoreError> {
    let Some(parent) = new_parent else {
        return Ok(());
    };
    if !parents.contains_key(&parent) {
        return Err(CoreError::Validation(format!(
            "Parent space {parent} does not exist"
        )));
    }
    let Some(id) = space_id else {
        return Ok(());
    };
    if id == parent {
        return Err(CoreError::Validation(
            "A space cannot be its own parent".into(),
        ));
    }

    // Walk up from the proposed parent; reaching `id` would close a loop.
    let mut seen = HashSet::new();
    let mut cursor = Some(parent);
    while let Some(current) = cursor {
        if current == id {
            return Err(CoreError::Validation(format!(
                "Setting parent {parent} would create a cycle"
            )));
        }
        if !seen.insert(current) {
            break;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    Ok(())
}

//! Availability-window derivation for spaces.
//!
//! A window describes who occupies a space today, from when it becomes free,
//! and until when it stays free before the next booked occupant arrives.
//! Everything here is pure: the caller loads spaces and their assignments
//! and passes them in, the same way `readiness` evaluates pre-loaded rows.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Date, DbId};

// ---------------------------------------------------------------------------
// Assignment status
// ---------------------------------------------------------------------------

pub const STATUS_PROSPECT: &str = "prospect";
pub const STATUS_PENDING_CONTRACT: &str = "pending_contract";
pub const STATUS_CONTRACT_SENT: &str = "contract_sent";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid assignment status strings.
pub const VALID_ASSIGNMENT_STATUSES: &[&str] = &[
    STATUS_PROSPECT,
    STATUS_PENDING_CONTRACT,
    STATUS_CONTRACT_SENT,
    STATUS_ACTIVE,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

/// Lifecycle status of an assignment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Prospect,
    PendingContract,
    ContractSent,
    Active,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_PROSPECT => Ok(Self::Prospect),
            STATUS_PENDING_CONTRACT => Ok(Self::PendingContract),
            STATUS_CONTRACT_SENT => Ok(Self::ContractSent),
            STATUS_ACTIVE => Ok(Self::Active),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            _ => Err(format!(
                "Invalid assignment status '{s}'. Must be one of: {}",
                VALID_ASSIGNMENT_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prospect => STATUS_PROSPECT,
            Self::PendingContract => STATUS_PENDING_CONTRACT,
            Self::ContractSent => STATUS_CONTRACT_SENT,
            Self::Active => STATUS_ACTIVE,
            Self::Completed => STATUS_COMPLETED,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Whether an assignment in this status holds the space for its dates.
    ///
    /// Prospects, completed and cancelled assignments never block a space.
    pub fn is_occupying(&self) -> bool {
        matches!(
            self,
            Self::Active | Self::PendingContract | Self::ContractSent
        )
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The subset of an assignment row needed for window computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    pub assignment_id: DbId,
    pub person_id: DbId,
    pub status: AssignmentStatus,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub desired_departure_date: Option<Date>,
    /// Only a listed desired departure overrides `end_date`.
    pub desired_departure_listed: bool,
}

/// A space as seen by hierarchy propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceNode {
    pub id: DbId,
    pub parent_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Derived availability of one space on a given day.
///
/// `available_from == None` while `is_available == false` means the space is
/// occupied with no known end. `available_until == None` means open ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityWindow {
    pub space_id: DbId,
    pub is_available: bool,
    pub current_assignment_id: Option<DbId>,
    pub current_person_id: Option<DbId>,
    pub available_from: Option<Date>,
    pub next_assignment_id: Option<DbId>,
    pub next_person_id: Option<DbId>,
    pub available_until: Option<Date>,
    /// Set when the space is unavailable only because a parent or child is occupied.
    pub blocked_by_space_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Single-space derivation
// ---------------------------------------------------------------------------

/// The date an assignment actually ends.
///
/// A listed desired departure overrides the contractual `end_date`.
pub fn effective_end_date(occupancy: &Occupancy) -> Option<Date> {
    match occupancy.desired_departure_date {
        Some(date) if occupancy.desired_departure_listed => Some(date),
        _ => occupancy.end_date,
    }
}

/// Whether `occupancy` is an active assignment whose dates include `today`.
pub fn covers(occupancy: &Occupancy, today: Date) -> bool {
    occupancy.status == AssignmentStatus::Active
        && occupancy.start_date <= today
        && effective_end_date(occupancy).map_or(true, |end| end >= today)
}

/// Compute the availability window of one space from its own assignments.
///
/// `occupancies` may arrive in any order; they are considered by start date.
/// When several active assignments cover `today`, the one that stays longest
/// is current (earliest start on ties), so `available_from` is the day the
/// last of them leaves.
pub fn compute_window(space_id: DbId, today: Date, occupancies: &[Occupancy]) -> AvailabilityWindow {
    let mut sorted: Vec<&Occupancy> = occupancies.iter().collect();
    sorted.sort_by_key(|o| (o.start_date, o.assignment_id));

    let current = sorted
        .iter()
        .copied()
        .filter(|o| covers(o, today))
        .min_by_key(|o| {
            let end = effective_end_date(o).unwrap_or(Date::MAX);
            (Reverse(end), o.start_date, o.assignment_id)
        });

    let available_from = match current {
        Some(o) => effective_end_date(o),
        None => Some(today),
    };

    // An indefinitely occupied space has no next occupant to report.
    let next = available_from.and_then(|from| {
        sorted.iter().copied().find(|o| {
            o.status.is_occupying()
                && Some(o.assignment_id) != current.map(|c| c.assignment_id)
                && o.start_date >= from
        })
    });

    AvailabilityWindow {
        space_id,
        is_available: current.is_none(),
        current_assignment_id: current.map(|o| o.assignment_id),
        current_person_id: current.map(|o| o.person_id),
        available_from,
        next_assignment_id: next.map(|o| o.assignment_id),
        next_person_id: next.map(|o| o.person_id),
        available_until: next.map(|o| o.start_date),
        blocked_by_space_id: None,
    }
}

// ---------------------------------------------------------------------------
// Hierarchy propagation
// ---------------------------------------------------------------------------

/// The later of two "free from" dates, where `None` means never.
fn later_from(a: Option<Date>, b: Option<Date>) -> Option<Date> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    }
}

/// The earlier of two "free until" dates, where `None` means open ended.
fn earlier_until(a: Option<Date>, b: Option<Date>) -> Option<Date> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(d), None) | (None, Some(d)) => Some(d),
        (None, None) => None,
    }
}

/// Fold an occupied relative's window into `target`.
fn absorb(target: &mut AvailabilityWindow, relative: &AvailabilityWindow) {
    if target.is_available {
        target.blocked_by_space_id = Some(relative.space_id);
    }
    target.is_available = false;
    target.available_from = later_from(target.available_from, relative.available_from);
    target.available_until = earlier_until(target.available_until, relative.available_until);
}

/// Propagate unavailability between parents and their direct children.
///
/// Pass one blocks children of occupied parents; pass two blocks parents of
/// occupied children. Both passes read the windows as computed from each
/// space's own assignments, so the result does not depend on input order.
/// Windows for spaces missing from `own` are left out of the result.
pub fn propagate_hierarchy(
    spaces: &[SpaceNode],
    own: &[AvailabilityWindow],
) -> Vec<AvailabilityWindow> {
    let own_by_id: HashMap<DbId, &AvailabilityWindow> =
        own.iter().map(|w| (w.space_id, w)).collect();
    let mut result: HashMap<DbId, AvailabilityWindow> =
        own.iter().map(|w| (w.space_id, w.clone())).collect();

    // Pass 1: parent -> child.
    for space in spaces {
        let Some(parent_id) = space.parent_id else {
            continue;
        };
        let Some(parent) = own_by_id.get(&parent_id) else {
            continue;
        };
        if parent.is_available {
            continue;
        }
        if let Some(child) = result.get_mut(&space.id) {
            absorb(child, parent);
        }
    }

    // Pass 2: child -> parent.
    for space in spaces {
        let Some(parent_id) = space.parent_id else {
            continue;
        };
        let Some(child) = own_by_id.get(&space.id) else {
            continue;
        };
        if child.is_available {
            continue;
        }
        if let Some(parent) = result.get_mut(&parent_id) {
            absorb(parent, child);
        }
    }

    spaces
        .iter()
        .filter_map(|s| result.remove(&s.id))
        .collect()
}

/// Compute propagated windows for every space.
///
/// `occupancies` pairs a space id with an assignment covering it; an
/// assignment linked to several spaces appears once per space.
pub fn compute_all_windows(
    today: Date,
    spaces: &[SpaceNode],
    occupancies: &[(DbId, Occupancy)],
) -> Vec<AvailabilityWindow> {
    let mut by_space: HashMap<DbId, Vec<Occupancy>> = HashMap::new();
    for (space_id, occupancy) in occupancies {
        by_space
            .entry(*space_id)
            .or_default()
            .push(occupancy.clone());
    }

    let own: Vec<AvailabilityWindow> = spaces
        .iter()
        .map(|s| {
            let list = by_space.get(&s.id).map(Vec::as_slice).unwrap_or(&[]);
            compute_window(s.id, today, list)
        })
        .collect();

    propagate_hierarchy(spaces, &own)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

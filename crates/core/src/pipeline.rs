//! Rental-application pipeline stages and status state machines.
//!
//! The pipeline stage is never stored; it is recomputed from the
//! application, agreement and deposit status columns on every read.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Application status
// ---------------------------------------------------------------------------

pub const APP_INQUIRY: &str = "inquiry";
pub const APP_SUBMITTED: &str = "submitted";
pub const APP_UNDER_REVIEW: &str = "under_review";
pub const APP_WAITLISTED: &str = "waitlisted";
pub const APP_APPROVED: &str = "approved";
pub const APP_DENIED: &str = "denied";
pub const APP_WITHDRAWN: &str = "withdrawn";
pub const APP_CONVERTED: &str = "converted";

pub const VALID_APPLICATION_STATUSES: &[&str] = &[
    APP_INQUIRY,
    APP_SUBMITTED,
    APP_UNDER_REVIEW,
    APP_WAITLISTED,
    APP_APPROVED,
    APP_DENIED,
    APP_WITHDRAWN,
    APP_CONVERTED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Inquiry,
    Submitted,
    UnderReview,
    Waitlisted,
    Approved,
    Denied,
    Withdrawn,
    Converted,
}

impl ApplicationStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            APP_INQUIRY => Ok(Self::Inquiry),
            APP_SUBMITTED => Ok(Self::Submitted),
            APP_UNDER_REVIEW => Ok(Self::UnderReview),
            APP_WAITLISTED => Ok(Self::Waitlisted),
            APP_APPROVED => Ok(Self::Approved),
            APP_DENIED => Ok(Self::Denied),
            APP_WITHDRAWN => Ok(Self::Withdrawn),
            APP_CONVERTED => Ok(Self::Converted),
            _ => Err(CoreError::Validation(format!(
                "Invalid application status '{s}'. Must be one of: {}",
                VALID_APPLICATION_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inquiry => APP_INQUIRY,
            Self::Submitted => APP_SUBMITTED,
            Self::UnderReview => APP_UNDER_REVIEW,
            Self::Waitlisted => APP_WAITLISTED,
            Self::Approved => APP_APPROVED,
            Self::Denied => APP_DENIED,
            Self::Withdrawn => APP_WITHDRAWN,
            Self::Converted => APP_CONVERTED,
        }
    }

    /// Statuses reachable from `self`. Terminal statuses return an empty slice.
    pub fn valid_transitions(&self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Inquiry => &[Submitted, Denied, Withdrawn],
            Submitted => &[UnderReview, Approved, Denied, Withdrawn, Waitlisted],
            UnderReview => &[Approved, Denied, Withdrawn, Waitlisted],
            Waitlisted => &[UnderReview, Approved, Denied, Withdrawn],
            Approved => &[Converted, Denied, Withdrawn],
            Denied | Withdrawn | Converted => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Agreement status
// ---------------------------------------------------------------------------

pub const AGREEMENT_NONE: &str = "none";
pub const AGREEMENT_PENDING: &str = "pending";
pub const AGREEMENT_GENERATED: &str = "generated";
pub const AGREEMENT_SENT: &str = "sent";
pub const AGREEMENT_SIGNED: &str = "signed";

pub const VALID_AGREEMENT_STATUSES: &[&str] = &[
    AGREEMENT_NONE,
    AGREEMENT_PENDING,
    AGREEMENT_GENERATED,
    AGREEMENT_SENT,
    AGREEMENT_SIGNED,
];

/// Lease agreement progress, strictly ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    None,
    Pending,
    Generated,
    Sent,
    Signed,
}

impl AgreementStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            AGREEMENT_NONE => Ok(Self::None),
            AGREEMENT_PENDING => Ok(Self::Pending),
            AGREEMENT_GENERATED => Ok(Self::Generated),
            AGREEMENT_SENT => Ok(Self::Sent),
            AGREEMENT_SIGNED => Ok(Self::Signed),
            _ => Err(CoreError::Validation(format!(
                "Invalid agreement status '{s}'. Must be one of: {}",
                VALID_AGREEMENT_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => AGREEMENT_NONE,
            Self::Pending => AGREEMENT_PENDING,
            Self::Generated => AGREEMENT_GENERATED,
            Self::Sent => AGREEMENT_SENT,
            Self::Signed => AGREEMENT_SIGNED,
        }
    }

    /// Agreements only move forward; a regenerated document may be resent.
    pub fn can_transition(&self, to: AgreementStatus) -> bool {
        use AgreementStatus::*;
        matches!(
            (self, to),
            (None, Pending)
                | (None, Generated)
                | (Pending, Generated)
                | (Generated, Sent)
                | (Sent, Generated)
                | (Sent, Signed)
        )
    }
}

// ---------------------------------------------------------------------------
// Deposit status
// ---------------------------------------------------------------------------

pub const DEPOSIT_NONE: &str = "none";
pub const DEPOSIT_PENDING: &str = "pending";
pub const DEPOSIT_PARTIAL: &str = "partial";
pub const DEPOSIT_RECEIVED: &str = "received";
pub const DEPOSIT_CONFIRMED: &str = "confirmed";

pub const VALID_DEPOSIT_STATUSES: &[&str] = &[
    DEPOSIT_NONE,
    DEPOSIT_PENDING,
    DEPOSIT_PARTIAL,
    DEPOSIT_RECEIVED,
    DEPOSIT_CONFIRMED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    None,
    Pending,
    Partial,
    Received,
    Confirmed,
}

impl DepositStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            DEPOSIT_NONE => Ok(Self::None),
            DEPOSIT_PENDING => Ok(Self::Pending),
            DEPOSIT_PARTIAL => Ok(Self::Partial),
            DEPOSIT_RECEIVED => Ok(Self::Received),
            DEPOSIT_CONFIRMED => Ok(Self::Confirmed),
            _ => Err(CoreError::Validation(format!(
                "Invalid deposit status '{s}'. Must be one of: {}",
                VALID_DEPOSIT_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => DEPOSIT_NONE,
            Self::Pending => DEPOSIT_PENDING,
            Self::Partial => DEPOSIT_PARTIAL,
            Self::Received => DEPOSIT_RECEIVED,
            Self::Confirmed => DEPOSIT_CONFIRMED,
        }
    }

    pub fn is_received(&self) -> bool {
        matches!(self, Self::Received | Self::Confirmed)
    }
}

// ---------------------------------------------------------------------------
// Pipeline stage
// ---------------------------------------------------------------------------

/// Where an application sits in the leasing pipeline, in progress order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    CommunityFit,
    Applications,
    Approved,
    Contract,
    Deposit,
    Ready,
}

impl PipelineStage {
    /// Every stage in pipeline order.
    pub const ALL: [PipelineStage; 6] = [
        Self::CommunityFit,
        Self::Applications,
        Self::Approved,
        Self::Contract,
        Self::Deposit,
        Self::Ready,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommunityFit => "community_fit",
            Self::Applications => "applications",
            Self::Approved => "approved",
            Self::Contract => "contract",
            Self::Deposit => "deposit",
            Self::Ready => "ready",
        }
    }

    /// Human-readable column header.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CommunityFit => "Community Fit",
            Self::Applications => "Applications",
            Self::Approved => "Approved",
            Self::Contract => "Contract",
            Self::Deposit => "Deposit",
            Self::Ready => "Ready to Move In",
        }
    }
}

/// Derive the pipeline stage of an application.
///
/// Returns `None` for archived applications (denied, withdrawn, converted).
pub fn derive_stage(
    application: ApplicationStatus,
    agreement: AgreementStatus,
    deposit: DepositStatus,
) -> Option<PipelineStage> {
    match application {
        ApplicationStatus::Inquiry => Some(PipelineStage::CommunityFit),
        ApplicationStatus::Submitted
        | ApplicationStatus::UnderReview
        | ApplicationStatus::Waitlisted => Some(PipelineStage::Applications),
        ApplicationStatus::Approved => Some(match agreement {
            AgreementStatus::None | AgreementStatus::Pending => PipelineStage::Approved,
            AgreementStatus::Generated | AgreementStatus::Sent => PipelineStage::Contract,
            AgreementStatus::Signed if deposit.is_received() => PipelineStage::Ready,
            AgreementStatus::Signed => PipelineStage::Deposit,
        }),
        ApplicationStatus::Denied | ApplicationStatus::Withdrawn | ApplicationStatus::Converted => {
            None
        }
    }
}

/// String-column convenience wrapper around [`derive_stage`].
pub fn derive_stage_from_columns(
    application: &str,
    agreement: &str,
    deposit: &str,
) -> Result<Option<PipelineStage>, CoreError> {
    Ok(derive_stage(
        ApplicationStatus::from_str_value(application)?,
        AgreementStatus::from_str_value(agreement)?,
        DepositStatus::from_str_value(deposit)?,
    ))
}

// ---------------------------------------------------------------------------
// Transition validation
// ---------------------------------------------------------------------------

/// Validate an application status transition.
pub fn validate_application_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<(), CoreError> {
    if from.valid_transitions().contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid application transition: {} -> {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Validate an agreement status transition.
pub fn validate_agreement_transition(
    from: AgreementStatus,
    to: AgreementStatus,
) -> Result<(), CoreError> {
    if from.can_transition(to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid agreement transition: {} -> {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// An application may only become an assignment once it reaches `Ready`.
pub fn validate_conversion(stage: Option<PipelineStage>) -> Result<(), CoreError> {
    match stage {
        Some(PipelineStage::Ready) => Ok(()),
        Some(other) => Err(CoreError::Conflict(format!(
            "Application is in stage '{}'; only 'ready' applications can be converted",
            other.as_str()
        ))),
        None => Err(CoreError::Conflict(
            "Archived applications cannot be converted".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Count of applications per stage, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: PipelineStage,
    pub label: &'static str,
    pub count: usize,
}

/// Tally stages, skipping archived applications. Every stage is present.
pub fn summarize_stages<I>(stages: I) -> Vec<StageCount>
where
    I: IntoIterator<Item = Option<PipelineStage>>,
{
    let mut counts = [0usize; PipelineStage::ALL.len()];
    for stage in stages.into_iter().flatten() {
        counts[stage as usize] += 1;
    }
    PipelineStage::ALL
        .iter()
        .zip(counts)
        .map(|(stage, count)| StageCount {
            stage: *stage,
            label: stage.label(),
            count,
        })
        .collect()
}

//! Pure domain logic for the Hearth rental-operations backend.
//!
//! No database or HTTP dependencies live here; callers load rows and pass
//! plain values in.

pub mod availability;
pub mod cameras;
pub mod deposit;
pub mod error;
pub mod feature_requests;
pub mod fees;
pub mod media;
pub mod messaging;
pub mod pagination;
pub mod pipeline;
pub mod roles;
pub mod spaces;
pub mod tasks;
pub mod types;

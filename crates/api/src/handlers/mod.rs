//! Request handlers, one submodule per resource.
//!
//! Handlers authenticate through extractors, delegate persistence to the
//! repositories in `hearth_db` and derived values to `hearth_core`, and map
//! errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod applications;
pub mod assignments;
pub mod auth;
pub mod cameras;
pub mod feature_requests;
pub mod fees;
pub mod media;
pub mod people;
pub mod sms;
pub mod spaces;
pub mod tasks;

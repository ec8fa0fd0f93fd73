//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod assignment;
pub mod fee;
pub mod feature_request;
pub mod media;
pub mod person;
pub mod rental_application;
pub mod session;
pub mod sms_message;
pub mod space;
pub mod task;
pub mod user;

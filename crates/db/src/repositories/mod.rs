//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod assignment_repo;
pub mod fee_code_repo;
pub mod feature_request_repo;
pub mod media_repo;
pub mod payment_method_repo;
pub mod person_repo;
pub mod rental_application_repo;
pub mod session_repo;
pub mod sms_message_repo;
pub mod space_repo;
pub mod task_repo;
pub mod user_repo;

pub use assignment_repo::AssignmentRepo;
pub use fee_code_repo::FeeCodeRepo;
pub use feature_request_repo::FeatureRequestRepo;
pub use media_repo::MediaRepo;
pub use payment_method_repo::PaymentMethodRepo;
pub use person_repo::PersonRepo;
pub use rental_application_repo::RentalApplicationRepo;
pub use session_repo::SessionRepo;
pub use sms_message_repo::SmsMessageRepo;
pub use space_repo::SpaceRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;

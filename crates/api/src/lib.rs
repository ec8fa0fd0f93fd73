//! Hearth API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! external service clients) so integration tests and the binary
//! entrypoint can both access them.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod sms_gateway;
pub mod state;
pub mod storage;

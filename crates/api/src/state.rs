use std::sync::Arc;

use crate::config::ServerConfig;
use crate::sms_gateway::SmsGateway;
use crate::storage::MediaStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: hearth_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Object storage for uploaded media.
    pub media_store: Arc<dyn MediaStore>,
    /// Outbound SMS/WhatsApp sender.
    pub sms_gateway: Arc<dyn SmsGateway>,
}

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use hearth_api::auth::jwt::JwtConfig;
use hearth_api::auth::password::hash_password;
use hearth_api::config::{ServerConfig, SmsConfig, StorageConfig};
use hearth_api::router::build_app_router;
use hearth_api::sms_gateway::{OutboundSms, SendReceipt, SmsError, SmsGateway};
use hearth_api::state::AppState;
use hearth_api::storage::LocalStore;
use hearth_db::models::user::CreateUser;
use hearth_db::repositories::UserRepo;

/// Messages sent to this number are rejected by [`RecordingGateway`].
pub const FAILING_NUMBER: &str = "+15125550000";

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults and a private upload directory.
pub fn test_config() -> ServerConfig {
    let local_dir: PathBuf =
        std::env::temp_dir().join(format!("hearth-test-{}", uuid::Uuid::new_v4()));
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        storage: StorageConfig {
            supabase_url: None,
            service_role_key: None,
            bucket: "housephotos".to_string(),
            local_dir: local_dir.to_string_lossy().into_owned(),
        },
        sms: SmsConfig {
            endpoint_url: None,
            api_key: None,
            from_number: "+15555550100".to_string(),
        },
        bootstrap_admin: None,
    }
}

/// SMS gateway that records every message and fails for [`FAILING_NUMBER`].
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<OutboundSms>>,
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send(&self, message: &OutboundSms) -> Result<SendReceipt, SmsError> {
        if message.to == FAILING_NUMBER {
            return Err(SmsError::HttpStatus {
                status: 400,
                body: "unreachable handset".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(SendReceipt {
            provider_message_id: Some(format!("SM{}", sent.len())),
        })
    }

    fn from_number(&self) -> &str {
        "+15555550100"
    }
}

/// Build the full application router with the production middleware stack,
/// local file storage and a recording SMS gateway.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_gateway(pool, Arc::new(RecordingGateway::default()))
}

pub fn build_test_app_with_gateway(pool: PgPool, gateway: Arc<RecordingGateway>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        media_store: Arc::new(LocalStore::new(&config.storage.local_dir)),
        sms_gateway: gateway,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert a user directly with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> hearth_db::models::user::User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

/// Create a user with the given role and return an access token for it.
pub async fn token_for(pool: &PgPool, username: &str, role: &str) -> String {
    create_user(pool, username, role).await;
    let app = build_test_app(pool.clone());
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

pub async fn staff_token(pool: &PgPool) -> String {
    token_for(pool, "staffer", "staff").await
}

pub async fn admin_token(pool: &PgPool) -> String {
    token_for(pool, "root", "admin").await
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// POST and return the created resource's `data` payload, asserting 201.
pub async fn create(app: Router, uri: &str, body: serde_json::Value, token: &str) -> serde_json::Value {
    let response = post_json_auth(app, uri, body, token).await;
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, axum::http::StatusCode::CREATED, "POST {uri} failed: {json}");
    json["data"].clone()
}

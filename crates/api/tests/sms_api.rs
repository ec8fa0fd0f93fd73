//! HTTP-level tests for outbound messaging.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, create, get_auth, post_json_auth, RecordingGateway, FAILING_NUMBER};
use serde_json::json;
use sqlx::PgPool;

async fn create_person(pool: &PgPool, token: &str, phone: Option<&str>) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = json!({ "first_name": "Lin", "phone": phone });
    create(app, "/api/v1/people", body, token).await["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_to_person_records_message(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let person_id = create_person(&pool, &token, Some("512-555-0142")).await;
    let gateway = Arc::new(RecordingGateway::default());

    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());
    let body = json!({ "person_id": person_id, "body": "Your room is ready" });
    let response = post_json_auth(app, "/api/v1/sms/send", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let message = &json["data"];
    assert_eq!(message["to_number"], "+15125550142");
    assert_eq!(message["from_number"], "+15555550100");
    assert_eq!(message["channel"], "sms");
    assert_eq!(message["direction"], "outbound");
    assert_eq!(message["delivery_status"], "sent");
    assert_eq!(message["provider_message_id"], "SM1");
    assert_eq!(message["segments"], 1);

    let sent = gateway.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, "Your room is ready");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_to_known_number_links_person(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let person_id = create_person(&pool, &token, Some("512-555-0142")).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "to": "(512) 555-0142", "body": "Rent reminder" });
    let response = post_json_auth(app, "/api/v1/sms/send", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["person_id"], person_id);

    // A number shared by two people stays unattributed.
    create_person(&pool, &token, Some("512-555-0142")).await;
    let app = common::build_test_app(pool);
    let body = json!({ "to": "+15125550142", "body": "Rent reminder" });
    let response = post_json_auth(app, "/api/v1/sms/send", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_json(response).await["data"]["person_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_requires_recipient(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/sms/send", json!({ "body": "hello" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_rejects_unknown_channel_and_bad_number(pool: PgPool) {
    let token = common::staff_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "to": "5125550142", "channel": "email", "body": "hello" });
    let response = post_json_auth(app, "/api/v1/sms/send", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let body = json!({ "to": "555-0142", "body": "hello" });
    let response = post_json_auth(app, "/api/v1/sms/send", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_gateway_failure_is_recorded(pool: PgPool) {
    let token = common::staff_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "to": FAILING_NUMBER, "channel": "whatsapp", "body": "hello" });
    let response = post_json_auth(app, "/api/v1/sms/send", body, &token).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/sms/messages", &token).await;
    let json = body_json(response).await;
    let messages = json["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["delivery_status"], "failed");
    assert_eq!(messages[0]["channel"], "whatsapp");
    assert!(messages[0]["error_message"]
        .as_str()
        .unwrap()
        .contains("unreachable handset"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_send_reports_counts(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let with_phone = create_person(&pool, &token, Some("(512) 555-0101")).await;
    let without_phone = create_person(&pool, &token, None).await;
    let gateway = Arc::new(RecordingGateway::default());

    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());
    let body = json!({
        "person_ids": [with_phone, without_phone],
        "recipients": ["512-555-0102", FAILING_NUMBER, "not a number"],
        "body": "House meeting Sunday at 6",
    });
    let response = post_json_auth(app, "/api/v1/sms/bulk", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["sent"], 2);
    assert_eq!(json["data"]["failed"], 3);
    assert_eq!(gateway.sent.lock().unwrap().len(), 2);

    // Every attempted send is logged, including the gateway failure.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/sms/messages", &token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/sms/messages?person_id={with_phone}");
    let response = get_auth(app, &uri, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["to_number"], "+15125550101");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_send_rejects_empty_recipients(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "body": "hello" });
    let response = post_json_auth(app, "/api/v1/sms/bulk", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

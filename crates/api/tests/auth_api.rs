//! HTTP-level tests for login, token refresh, logout and admin user management.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, delete_auth, get_auth, post_json, post_json_auth, put_json_auth,
    TEST_PASSWORD,
};
use sqlx::PgPool;
use hearth_db::repositories::UserRepo;

async fn login(pool: &PgPool, username: &str, password: &str) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "username": username, "password": password });
    post_json(app, "/api/v1/auth/login", body).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = create_user(&pool, "maria", "staff").await;

    let response = login(&pool, "maria", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "staff");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    create_user(&pool, "maria", "staff").await;
    let response = login(&pool, "maria", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_nonexistent_user(pool: PgPool) {
    let response = login(&pool, "ghost", "whatever").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_inactive_user(pool: PgPool) {
    let user = create_user(&pool, "maria", "staff").await;
    UserRepo::deactivate(&pool, user.id).await.unwrap();

    let response = login(&pool, "maria", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_locks_after_repeated_failures(pool: PgPool) {
    create_user(&pool, "maria", "staff").await;
    for _ in 0..5 {
        let response = login(&pool, "maria", "not-the-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = login(&pool, "maria", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_returns_current_user(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["username"], "staffer");
    assert!(json.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    create_user(&pool, "maria", "staff").await;
    let json = body_json(login(&pool, "maria", TEST_PASSWORD).await).await;
    let refresh_token = json["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"], json["refresh_token"]);

    // The new pair works: the access token authenticates and the refresh
    // token rotates again.
    let app = common::build_test_app(pool.clone());
    let access = rotated["access_token"].as_str().unwrap();
    assert_eq!(get_auth(app, "/api/v1/auth/me", access).await.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let again = serde_json::json!({ "refresh_token": rotated["refresh_token"] });
    assert_eq!(post_json(app, "/api/v1/auth/refresh", again).await.status(), StatusCode::OK);

    // The old refresh token was replaced by the rotation.
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_ends_only_the_current_session(pool: PgPool) {
    create_user(&pool, "maria", "staff").await;
    let laptop = body_json(login(&pool, "maria", TEST_PASSWORD).await).await;
    let phone = body_json(login(&pool, "maria", TEST_PASSWORD).await).await;
    let access = laptop["access_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/auth/logout", serde_json::json!({}), access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The signed-out access token stops working before it expires.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/auth/me", access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": laptop["refresh_token"] });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let other = phone["access_token"].as_str().unwrap();
    assert_eq!(get_auth(app, "/api/v1/auth/me", other).await.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivation_rejects_outstanding_tokens(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    let user = create_user(&pool, "maria", "staff").await;
    let json = body_json(login(&pool, "maria", TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/admin/users/{}", user.id), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/spaces", access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": json["refresh_token"] });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promotion_applies_to_existing_token(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    let staff = common::staff_token(&pool).await;
    let staffer = UserRepo::find_by_username(&pool, "staffer").await.unwrap().unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "role": "admin" });
    let uri = format!("/api/v1/admin/users/{}", staffer.id);
    assert_eq!(put_json_auth(app, &uri, body, &admin).await.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &staff).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_staff_cannot_manage_users(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_and_deactivates_user(pool: PgPool) {
    let token = common::admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "newhire",
        "email": "newhire@example.com",
        "password": "a-long-enough-password",
        "role": "staff",
    });
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["role"], "staff");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/admin/users/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(!user.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_rejects_weak_password(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "newhire",
        "email": "newhire@example.com",
        "password": "short",
        "role": "staff",
    });
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_cannot_demote_self(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let admin = UserRepo::find_by_username(&pool, "root").await.unwrap().unwrap();
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "role": "staff" });
    let response =
        put_json_auth(app, &format!("/api/v1/admin/users/{}", admin.id), body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

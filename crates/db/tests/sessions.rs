use chrono::{Duration, Utc};
use sqlx::PgPool;
use hearth_db::models::session::{NewStaffSession, REVOKED_DEACTIVATED, REVOKED_LOGOUT};
use hearth_db::models::user::CreateUser;
use hearth_db::repositories::{SessionRepo, UserRepo};

async fn user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$placeholder".to_string(),
            role: "staff".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_session(user_id: i64, hash: &str) -> NewStaffSession {
    NewStaffSession {
        user_id,
        refresh_token_hash: hash.to_string(),
        user_agent: Some("test".to_string()),
        expires_at: Utc::now() + Duration::days(7),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rotation_keeps_session_id(pool: PgPool) {
    let user_id = user(&pool, "maria").await;
    let session = SessionRepo::open(&pool, &new_session(user_id, "hash-a")).await.unwrap();

    let later = Utc::now() + Duration::days(14);
    let rotated = SessionRepo::rotate(&pool, "hash-a", "hash-b", later)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rotated.id, session.id);
    assert_eq!(rotated.refresh_token_hash, "hash-b");
    assert!(rotated.last_refreshed_at.is_some());

    // The replaced hash no longer rotates.
    let replay = SessionRepo::rotate(&pool, "hash-a", "hash-c", later).await.unwrap();
    assert!(replay.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_principal_requires_live_session_and_active_user(pool: PgPool) {
    let user_id = user(&pool, "maria").await;
    let first = SessionRepo::open(&pool, &new_session(user_id, "hash-a")).await.unwrap();
    let second = SessionRepo::open(&pool, &new_session(user_id, "hash-b")).await.unwrap();

    let principal = SessionRepo::principal(&pool, first.id).await.unwrap().unwrap();
    assert_eq!(principal.user_id, user_id);
    assert_eq!(principal.username, "maria");
    assert_eq!(principal.role, "staff");

    assert!(SessionRepo::revoke(&pool, first.id, REVOKED_LOGOUT).await.unwrap());
    assert!(!SessionRepo::revoke(&pool, first.id, REVOKED_LOGOUT).await.unwrap());
    assert!(SessionRepo::principal(&pool, first.id).await.unwrap().is_none());
    assert!(SessionRepo::principal(&pool, second.id).await.unwrap().is_some());

    UserRepo::deactivate(&pool, user_id).await.unwrap();
    assert!(SessionRepo::principal(&pool, second.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_all_records_reason(pool: PgPool) {
    let user_id = user(&pool, "maria").await;
    let other = user(&pool, "sam").await;
    SessionRepo::open(&pool, &new_session(user_id, "hash-a")).await.unwrap();
    SessionRepo::open(&pool, &new_session(user_id, "hash-b")).await.unwrap();
    let kept = SessionRepo::open(&pool, &new_session(other, "hash-c")).await.unwrap();

    let revoked = SessionRepo::revoke_all_for_user(&pool, user_id, REVOKED_DEACTIVATED)
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    let reasons: Vec<(Option<String>,)> =
        sqlx::query_as("SELECT revoked_reason FROM staff_sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert!(reasons.iter().all(|(r,)| r.as_deref() == Some(REVOKED_DEACTIVATED)));
    assert!(SessionRepo::principal(&pool, kept.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_revocation_reason_rejected(pool: PgPool) {
    let user_id = user(&pool, "maria").await;
    let session = SessionRepo::open(&pool, &new_session(user_id, "hash-a")).await.unwrap();

    let result = SessionRepo::revoke(&pool, session.id, "bored").await;
    assert!(matches!(result, Err(sqlx::Error::Database(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_purge_removes_only_long_ended_sessions(pool: PgPool) {
    let user_id = user(&pool, "maria").await;
    let live = SessionRepo::open(&pool, &new_session(user_id, "hash-live")).await.unwrap();

    let mut expired = new_session(user_id, "hash-expired");
    expired.expires_at = Utc::now() - Duration::days(60);
    SessionRepo::open(&pool, &expired).await.unwrap();

    let recent = SessionRepo::open(&pool, &new_session(user_id, "hash-recent")).await.unwrap();
    SessionRepo::revoke(&pool, recent.id, REVOKED_LOGOUT).await.unwrap();

    let purged = SessionRepo::purge_ended_before(&pool, Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(purged, 1);

    let remaining: Vec<(i64,)> = sqlx::query_as("SELECT id FROM staff_sessions ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, vec![(live.id,), (recent.id,)]);
}

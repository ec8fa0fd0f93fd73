//! Integration tests for media links, tasks, messages, fees and feature requests.

use sqlx::PgPool;
use hearth_db::models::fee::{CreateFeeCode, CreatePaymentMethod};
use hearth_db::models::feature_request::CreateFeatureRequest;
use hearth_db::models::media::CreateMedia;
use hearth_db::models::sms_message::CreateSmsMessage;
use hearth_db::models::space::CreateSpace;
use hearth_db::models::task::{CreateTask, TaskFilter};
use hearth_db::repositories::{
    FeatureRequestRepo, FeeCodeRepo, MediaRepo, PaymentMethodRepo, SmsMessageRepo, SpaceRepo,
    TaskRepo,
};

fn new_media(path: &str) -> CreateMedia {
    CreateMedia {
        storage_path: path.to_string(),
        public_url: format!("https://cdn.example.com/{path}"),
        content_type: "image/jpeg".into(),
        file_size_bytes: Some(1024),
        caption: None,
        category: None,
        tags: vec!["kitchen".into()],
        uploaded_by: None,
    }
}

async fn new_space(pool: &PgPool, name: &str) -> i64 {
    SpaceRepo::create(
        pool,
        &CreateSpace {
            parent_id: None,
            name: name.into(),
            space_type: None,
            description: None,
            location: None,
            capacity: None,
            monthly_rate_cents: None,
            weekly_rate_cents: None,
            nightly_rate_cents: None,
            is_listed: None,
            airbnb_ical_url: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_media_links_append_in_order(pool: PgPool) {
    let space_id = new_space(&pool, "Studio").await;
    let first = MediaRepo::create(&pool, &new_media("spaces/1.jpg")).await.unwrap();
    let second = MediaRepo::create(&pool, &new_media("spaces/2.jpg")).await.unwrap();

    assert!(MediaRepo::link_space(&pool, first.id, space_id).await.unwrap());
    assert!(MediaRepo::link_space(&pool, second.id, space_id).await.unwrap());
    assert!(!MediaRepo::link_space(&pool, first.id, space_id).await.unwrap());

    let listed = MediaRepo::list_for_space(&pool, space_id).await.unwrap();
    let orders: Vec<_> = listed.iter().map(|m| (m.media.id, m.display_order)).collect();
    assert_eq!(orders, vec![(first.id, 0), (second.id, 1)]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_linked_is_all_or_nothing(pool: PgPool) {
    let space_id = new_space(&pool, "Studio").await;
    let existing = MediaRepo::create(&pool, &new_media("spaces/0.jpg")).await.unwrap();
    MediaRepo::link_space(&pool, existing.id, space_id).await.unwrap();

    let linked = MediaRepo::create_linked(&pool, &new_media("spaces/1.jpg"), Some(space_id))
        .await
        .unwrap();
    assert_eq!(
        MediaRepo::linked_ids(&pool, space_id).await.unwrap(),
        vec![existing.id, linked.id]
    );

    // A missing space fails the link, and the media row rolls back with it.
    let err = MediaRepo::create_linked(&pool, &new_media("spaces/2.jpg"), Some(999_999)).await;
    assert!(err.is_err());
    let all = MediaRepo::list(&pool, None, None, 50, 0).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|m| m.storage_path != "spaces/2.jpg"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_media_reorder(pool: PgPool) {
    let space_id = new_space(&pool, "Studio").await;
    let a = MediaRepo::create(&pool, &new_media("spaces/a.jpg")).await.unwrap();
    let b = MediaRepo::create(&pool, &new_media("spaces/b.jpg")).await.unwrap();
    let c = MediaRepo::create(&pool, &new_media("spaces/c.jpg")).await.unwrap();
    for m in [&a, &b, &c] {
        MediaRepo::link_space(&pool, m.id, space_id).await.unwrap();
    }

    assert!(MediaRepo::reorder(&pool, space_id, &[c.id, a.id, b.id])
        .await
        .unwrap());
    assert_eq!(
        MediaRepo::linked_ids(&pool, space_id).await.unwrap(),
        vec![c.id, a.id, b.id]
    );

    // Partial lists are rejected without touching the stored order.
    assert!(!MediaRepo::reorder(&pool, space_id, &[b.id, a.id])
        .await
        .unwrap());
    assert_eq!(
        MediaRepo::linked_ids(&pool, space_id).await.unwrap(),
        vec![c.id, a.id, b.id]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_media_tag_filter_and_delete(pool: PgPool) {
    let media = MediaRepo::create(&pool, &new_media("spaces/k.jpg")).await.unwrap();
    assert_eq!(
        MediaRepo::list(&pool, None, Some("kitchen"), 50, 0).await.unwrap().len(),
        1
    );
    assert!(MediaRepo::list(&pool, None, Some("garden"), 50, 0)
        .await
        .unwrap()
        .is_empty());

    let deleted = MediaRepo::delete(&pool, media.id).await.unwrap().unwrap();
    assert_eq!(deleted.storage_path, "spaces/k.jpg");
    assert!(MediaRepo::delete(&pool, media.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_done_stamps_completed_at(pool: PgPool) {
    let task = TaskRepo::create(
        &pool,
        &CreateTask {
            title: "Fix sink".into(),
            description: None,
            priority: None,
            space_id: None,
            assignee_user_id: None,
            due_date: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(task.status, "open");
    assert_eq!(task.priority, 3);

    let done = TaskRepo::transition_status(&pool, task.id, "open", "done")
        .await
        .unwrap()
        .unwrap();
    assert!(done.completed_at.is_some());

    let reopened = TaskRepo::transition_status(&pool, task.id, "done", "open")
        .await
        .unwrap()
        .unwrap();
    assert!(reopened.completed_at.is_none());

    let filter = TaskFilter {
        status: Some("open".into()),
        ..Default::default()
    };
    assert_eq!(TaskRepo::list(&pool, &filter, 50, 0).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sms_log_newest_first(pool: PgPool) {
    for body in ["first", "second"] {
        SmsMessageRepo::create(
            &pool,
            &CreateSmsMessage {
                person_id: None,
                channel: "sms".into(),
                direction: "outbound".into(),
                from_number: "+15125550100".into(),
                to_number: "+15125550199".into(),
                body: body.into(),
                delivery_status: "sent".into(),
                provider_message_id: None,
                error_message: None,
                sent_by: None,
            },
        )
        .await
        .unwrap();
    }
    let log = SmsMessageRepo::list(&pool, None, 50, 0).await.unwrap();
    assert_eq!(log[0].body, "second");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_payment_method_references_fee_code(pool: PgPool) {
    let code = FeeCodeRepo::create(
        &pool,
        &CreateFeeCode {
            code: "CARD_FEE".into(),
            label: "Card processing".into(),
            default_amount_cents: None,
        },
    )
    .await
    .unwrap();

    let method = PaymentMethodRepo::create(
        &pool,
        &CreatePaymentMethod {
            name: "Card".into(),
            method_type: "card".into(),
            account_handle: None,
            instructions: None,
            fee_percent_bps: Some(300),
            fee_flat_cents: Some(30),
            fee_code_id: Some(code.id),
            sort_order: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(method.fee_code_id, Some(code.id));

    assert!(FeeCodeRepo::delete(&pool, code.id).await.unwrap());
    let detached = PaymentMethodRepo::find_by_id(&pool, method.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detached.fee_code_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feature_request_retry_clears_error(pool: PgPool) {
    let fr = FeatureRequestRepo::create(
        &pool,
        &CreateFeatureRequest {
            title: "Dark mode".into(),
            description: None,
            requested_by: None,
        },
    )
    .await
    .unwrap();

    let processing = FeatureRequestRepo::transition(&pool, fr.id, "pending", "processing", None)
        .await
        .unwrap()
        .unwrap();
    assert!(processing.started_at.is_some());

    let failed =
        FeatureRequestRepo::transition(&pool, fr.id, "processing", "failed", Some("build broke"))
            .await
            .unwrap()
            .unwrap();
    assert_eq!(failed.error_message.as_deref(), Some("build broke"));

    let retried = FeatureRequestRepo::transition(&pool, fr.id, "failed", "pending", None)
        .await
        .unwrap()
        .unwrap();
    assert!(retried.error_message.is_none());
    assert!(retried.started_at.is_none());
}

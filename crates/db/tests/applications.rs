//! Integration tests for rental applications.
//!
//! - Compare-and-set status/agreement transitions
//! - Payment recording detects concurrent updates
//! - Conversion creates the assignment and archives the application atomically

use chrono::NaiveDate;
use sqlx::PgPool;
use hearth_core::pipeline::PipelineStage;
use hearth_db::models::person::CreatePerson;
use hearth_db::models::rental_application::CreateRentalApplication;
use hearth_db::models::space::CreateSpace;
use hearth_db::repositories::rental_application_repo::ConversionPlan;
use hearth_db::repositories::{PersonRepo, RentalApplicationRepo, SpaceRepo};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

async fn seed(pool: &PgPool) -> (i64, i64) {
    let person = PersonRepo::create(
        pool,
        &CreatePerson {
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
            email: Some("ada@example.com".into()),
            phone: None,
            person_type: Some("applicant".into()),
            notes: None,
        },
    )
    .await
    .unwrap();
    let space = SpaceRepo::create(
        pool,
        &CreateSpace {
            parent_id: None,
            name: "Blue Room".into(),
            space_type: None,
            description: None,
            location: None,
            capacity: None,
            monthly_rate_cents: Some(90_000),
            weekly_rate_cents: None,
            nightly_rate_cents: None,
            is_listed: None,
            airbnb_ical_url: None,
        },
    )
    .await
    .unwrap();
    (person.id, space.id)
}

fn new_application(person_id: i64, space_id: i64) -> CreateRentalApplication {
    CreateRentalApplication {
        person_id,
        desired_space_id: Some(space_id),
        application_status: None,
        desired_move_in: Some(d(2026, 11, 15)),
        desired_move_out: None,
        rate_cents: Some(90_000),
        rate_term: None,
        security_deposit_cents: None,
        notes: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_defaults_and_stage(pool: PgPool) {
    let (person_id, space_id) = seed(&pool).await;
    let app = RentalApplicationRepo::create(&pool, &new_application(person_id, space_id))
        .await
        .unwrap();

    assert_eq!(app.application_status, "submitted");
    assert_eq!(app.agreement_status, "none");
    assert_eq!(app.deposit_status, "none");
    assert_eq!(app.deposit_paid_cents, 0);
    assert_eq!(app.stage().unwrap(), Some(PipelineStage::Applications));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_is_compare_and_set(pool: PgPool) {
    let (person_id, space_id) = seed(&pool).await;
    let app = RentalApplicationRepo::create(&pool, &new_application(person_id, space_id))
        .await
        .unwrap();

    let approved = RentalApplicationRepo::transition_status(&pool, app.id, "submitted", "approved")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.stage().unwrap(), Some(PipelineStage::Approved));

    // Stale `from` no longer matches.
    let stale = RentalApplicationRepo::transition_status(&pool, app.id, "submitted", "denied")
        .await
        .unwrap();
    assert!(stale.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_payment_detects_race(pool: PgPool) {
    let (person_id, space_id) = seed(&pool).await;
    let app = RentalApplicationRepo::create(&pool, &new_application(person_id, space_id))
        .await
        .unwrap();

    let paid = RentalApplicationRepo::record_payment(&pool, app.id, 0, 50_000, "partial")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.deposit_paid_cents, 50_000);
    assert_eq!(paid.deposit_status, "partial");

    let stale = RentalApplicationRepo::record_payment(&pool, app.id, 0, 10_000, "partial")
        .await
        .unwrap();
    assert!(stale.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_convert_ready_application(pool: PgPool) {
    let (person_id, space_id) = seed(&pool).await;
    let app = RentalApplicationRepo::create(&pool, &new_application(person_id, space_id))
        .await
        .unwrap();

    let plan = ConversionPlan {
        assignment_status: "contract_sent".into(),
        start_date: d(2026, 11, 15),
        end_date: None,
        rate_cents: Some(90_000),
    };

    // Not ready yet.
    assert!(RentalApplicationRepo::convert(&pool, app.id, &plan)
        .await
        .unwrap()
        .is_none());

    RentalApplicationRepo::transition_status(&pool, app.id, "submitted", "approved")
        .await
        .unwrap()
        .unwrap();
    for (from, to) in [("none", "pending"), ("pending", "generated"), ("generated", "sent"), ("sent", "signed")] {
        RentalApplicationRepo::transition_agreement(&pool, app.id, from, to)
            .await
            .unwrap()
            .unwrap();
    }
    let ready = RentalApplicationRepo::record_payment(&pool, app.id, 0, 180_000, "received")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ready.stage().unwrap(), Some(PipelineStage::Ready));

    let (converted, assignment) = RentalApplicationRepo::convert(&pool, app.id, &plan)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(converted.application_status, "converted");
    assert_eq!(converted.assignment_id, Some(assignment.id));
    assert_eq!(converted.stage().unwrap(), None);
    assert_eq!(assignment.person_id, person_id);
    assert_eq!(assignment.status, "contract_sent");
    assert_eq!(assignment.rate_cents, Some(90_000));
    assert_eq!(assignment.space_ids, vec![space_id]);

    // A second conversion finds nothing ready.
    assert!(RentalApplicationRepo::convert(&pool, app.id, &plan)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_open_excludes_archived(pool: PgPool) {
    let (person_id, space_id) = seed(&pool).await;
    let keep = RentalApplicationRepo::create(&pool, &new_application(person_id, space_id))
        .await
        .unwrap();
    let drop = RentalApplicationRepo::create(&pool, &new_application(person_id, space_id))
        .await
        .unwrap();
    RentalApplicationRepo::transition_status(&pool, drop.id, "submitted", "withdrawn")
        .await
        .unwrap()
        .unwrap();

    let open = RentalApplicationRepo::list_open(&pool).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, keep.id);
}

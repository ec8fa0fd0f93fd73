//! Integration tests for spaces, people and assignments.
//!
//! - Assignment create writes its space links in the same transaction
//! - Relinking replaces the full set
//! - Occupancy rows feed straight into the availability computation
//! - Unique and check constraints surface as database errors

use chrono::NaiveDate;
use sqlx::PgPool;
use hearth_core::availability::{compute_all_windows, SpaceNode};
use hearth_db::models::assignment::{CreateAssignment, UpdateAssignment};
use hearth_db::models::person::CreatePerson;
use hearth_db::models::space::{CreateSpace, UpdateSpace};
use hearth_db::repositories::{AssignmentRepo, PersonRepo, SpaceRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn new_space(name: &str, parent_id: Option<i64>) -> CreateSpace {
    CreateSpace {
        parent_id,
        name: name.to_string(),
        space_type: None,
        description: None,
        location: None,
        capacity: None,
        monthly_rate_cents: Some(120_000),
        weekly_rate_cents: None,
        nightly_rate_cents: None,
        is_listed: None,
        airbnb_ical_url: None,
    }
}

fn new_person(first: &str) -> CreatePerson {
    CreatePerson {
        first_name: first.to_string(),
        last_name: None,
        email: None,
        phone: None,
        person_type: None,
        notes: None,
    }
}

fn new_assignment(
    person_id: i64,
    status: &str,
    start: NaiveDate,
    end: Option<NaiveDate>,
    space_ids: Vec<i64>,
) -> CreateAssignment {
    CreateAssignment {
        person_id,
        status: Some(status.to_string()),
        start_date: start,
        end_date: end,
        desired_departure_date: None,
        desired_departure_listed: None,
        rate_cents: None,
        rate_term: None,
        notes: None,
        space_ids,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_space_defaults_and_update(pool: PgPool) {
    let space = SpaceRepo::create(&pool, &new_space("Garden Room", None))
        .await
        .unwrap();
    assert_eq!(space.space_type, "room");
    assert!(space.is_listed);
    assert!(!space.is_archived);

    let update = UpdateSpace {
        parent_id: None,
        name: None,
        space_type: None,
        description: Some("South facing".into()),
        location: None,
        capacity: None,
        monthly_rate_cents: None,
        weekly_rate_cents: None,
        nightly_rate_cents: None,
        is_listed: None,
        is_archived: Some(true),
        airbnb_ical_url: None,
    };
    let updated = SpaceRepo::update(&pool, space.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("South facing"));
    assert_eq!(updated.monthly_rate_cents, Some(120_000));

    assert!(SpaceRepo::list(&pool, false).await.unwrap().is_empty());
    assert_eq!(SpaceRepo::list(&pool, true).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_space_name_violates_unique(pool: PgPool) {
    SpaceRepo::create(&pool, &new_space("Loft", None)).await.unwrap();
    let err = SpaceRepo::create(&pool, &new_space("Loft", None))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_spaces_name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_parent_map(pool: PgPool) {
    let house = SpaceRepo::create(&pool, &new_space("House", None)).await.unwrap();
    let room = SpaceRepo::create(&pool, &new_space("Room 1", Some(house.id)))
        .await
        .unwrap();

    let parents = SpaceRepo::parent_map(&pool).await.unwrap();
    assert_eq!(parents.get(&house.id), Some(&None));
    assert_eq!(parents.get(&room.id), Some(&Some(house.id)));

    assert!(SpaceRepo::clear_parent(&pool, room.id).await.unwrap());
    assert!(!SpaceRepo::clear_parent(&pool, room.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assignment_created_with_spaces(pool: PgPool) {
    let a = SpaceRepo::create(&pool, &new_space("A", None)).await.unwrap();
    let b = SpaceRepo::create(&pool, &new_space("B", None)).await.unwrap();
    let person = PersonRepo::create(&pool, &new_person("Ada")).await.unwrap();

    let assignment = AssignmentRepo::create(
        &pool,
        &new_assignment(person.id, "active", d(2026, 1, 1), None, vec![b.id, a.id]),
    )
    .await
    .unwrap();

    assert_eq!(assignment.space_ids, vec![a.id, b.id]);
    assert_eq!(assignment.rate_term, "monthly");

    let filtered = AssignmentRepo::list(&pool, None, None, Some(b.id), 50, 0)
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assignment_with_missing_space_rolls_back(pool: PgPool) {
    let person = PersonRepo::create(&pool, &new_person("Ada")).await.unwrap();

    let result = AssignmentRepo::create(
        &pool,
        &new_assignment(person.id, "active", d(2026, 1, 1), None, vec![999_999]),
    )
    .await;
    assert!(result.is_err());

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM assignments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0, "failed link must not leave an orphan assignment");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_spaces_replaces_links(pool: PgPool) {
    let a = SpaceRepo::create(&pool, &new_space("A", None)).await.unwrap();
    let b = SpaceRepo::create(&pool, &new_space("B", None)).await.unwrap();
    let person = PersonRepo::create(&pool, &new_person("Ada")).await.unwrap();
    let assignment = AssignmentRepo::create(
        &pool,
        &new_assignment(person.id, "active", d(2026, 1, 1), None, vec![a.id]),
    )
    .await
    .unwrap();

    let relinked = AssignmentRepo::set_spaces(&pool, assignment.id, &[b.id])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(relinked.space_ids, vec![b.id]);

    assert!(AssignmentRepo::set_spaces(&pool, 999_999, &[a.id])
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_assignment_keeps_spaces(pool: PgPool) {
    let a = SpaceRepo::create(&pool, &new_space("A", None)).await.unwrap();
    let person = PersonRepo::create(&pool, &new_person("Ada")).await.unwrap();
    let assignment = AssignmentRepo::create(
        &pool,
        &new_assignment(person.id, "prospect", d(2026, 1, 1), None, vec![a.id]),
    )
    .await
    .unwrap();

    let update = UpdateAssignment {
        status: Some("active".into()),
        start_date: None,
        end_date: Some(d(2026, 6, 30)),
        desired_departure_date: None,
        desired_departure_listed: None,
        rate_cents: None,
        rate_term: None,
        notes: None,
    };
    let updated = AssignmentRepo::update(&pool, assignment.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "active");
    assert_eq!(updated.end_date, Some(d(2026, 6, 30)));
    assert_eq!(updated.space_ids, vec![a.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_before_start_violates_check(pool: PgPool) {
    let person = PersonRepo::create(&pool, &new_person("Ada")).await.unwrap();
    let err = AssignmentRepo::create(
        &pool,
        &new_assignment(person.id, "active", d(2026, 6, 1), Some(d(2026, 5, 1)), vec![]),
    )
    .await
    .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23514"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_occupancies_drive_availability(pool: PgPool) {
    let house = SpaceRepo::create(&pool, &new_space("House", None)).await.unwrap();
    let room = SpaceRepo::create(&pool, &new_space("Room", Some(house.id)))
        .await
        .unwrap();
    let shed = SpaceRepo::create(&pool, &new_space("Shed", None)).await.unwrap();
    let ada = PersonRepo::create(&pool, &new_person("Ada")).await.unwrap();
    let bo = PersonRepo::create(&pool, &new_person("Bo")).await.unwrap();

    AssignmentRepo::create(
        &pool,
        &new_assignment(ada.id, "active", d(2026, 1, 1), Some(d(2026, 11, 30)), vec![room.id]),
    )
    .await
    .unwrap();
    AssignmentRepo::create(
        &pool,
        &new_assignment(bo.id, "prospect", d(2026, 1, 1), None, vec![shed.id]),
    )
    .await
    .unwrap();

    let rows = AssignmentRepo::list_occupancies(&pool).await.unwrap();
    assert_eq!(rows.len(), 1, "prospects are not loaded");

    let occupancies: Vec<_> = rows
        .into_iter()
        .map(|r| r.into_occupancy().unwrap())
        .collect();
    let spaces: Vec<SpaceNode> = SpaceRepo::list(&pool, true)
        .await
        .unwrap()
        .iter()
        .map(|s| s.node())
        .collect();

    let windows = compute_all_windows(d(2026, 10, 17), &spaces, &occupancies);
    let by_id = |id: i64| windows.iter().find(|w| w.space_id == id).unwrap();

    assert!(!by_id(room.id).is_available);
    assert_eq!(by_id(room.id).available_from, Some(d(2026, 11, 30)));
    assert!(!by_id(house.id).is_available);
    assert_eq!(by_id(house.id).blocked_by_space_id, Some(room.id));
    assert!(by_id(shed.id).is_available);
}

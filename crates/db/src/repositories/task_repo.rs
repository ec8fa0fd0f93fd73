//! Repository for the `tasks` table.

use sqlx::PgPool;
use hearth_core::types::DbId;

use crate::models::task::{CreateTask, Task, TaskFilter, UpdateTask};

const COLUMNS: &str = "id, title, description, status, priority, space_id, assignee_user_id, \
                        due_date, completed_at, created_at, updated_at";

pub struct TaskRepo;

impl TaskRepo {
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, priority, space_id, assignee_user_id, due_date)
             VALUES ($1, $2, COALESCE($3, 3), $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority)
            .bind(input.space_id)
            .bind(input.assignee_user_id)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks by urgency: priority, then due date (undated last).
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR space_id = $2)
               AND ($3::BIGINT IS NULL OR assignee_user_id = $3)
             ORDER BY priority, due_date NULLS LAST, id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&filter.status)
            .bind(filter.space_id)
            .bind(filter.assignee_user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                space_id = COALESCE($5, space_id),
                assignee_user_id = COALESCE($6, assignee_user_id),
                due_date = COALESCE($7, due_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority)
            .bind(input.space_id)
            .bind(input.assignee_user_id)
            .bind(input.due_date)
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-set the status. `completed_at` is stamped on `done` and
    /// cleared on any other status.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                status = $3,
                completed_at = CASE WHEN $3 = 'done' THEN NOW() ELSE NULL END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

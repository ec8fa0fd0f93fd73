//! Handlers for the `/tasks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use hearth_core::error::CoreError;
use hearth_core::tasks::{is_overdue, validate_priority, validate_status, validate_transition};
use hearth_core::types::DbId;
use hearth_db::models::task::{CreateTask, Task, TaskFilter, UpdateTask};
use hearth_db::repositories::{SpaceRepo, TaskRepo, UserRepo};
use hearth_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

/// A task with its overdue flag computed for today.
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub overdue: bool,
}

impl TaskView {
    fn new(task: Task) -> Self {
        let today = Utc::now().date_naive();
        let overdue = is_overdue(&task.status, task.due_date, today);
        Self { task, overdue }
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusRequest {
    pub status: String,
}

/// GET /api/v1/tasks
pub async fn list_tasks(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<TaskView>>>> {
    if let Some(status) = &filter.status {
        validate_status(status)?;
    }
    let (limit, offset) = page.resolve();
    let tasks = TaskRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse {
        data: tasks.into_iter().map(TaskView::new).collect(),
    }))
}

/// POST /api/v1/tasks
pub async fn create_task(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<Created<TaskView>> {
    validate_title(&input.title)?;
    if let Some(priority) = input.priority {
        validate_priority(priority)?;
    }
    check_references(&state.pool, input.space_id, input.assignee_user_id).await?;

    let task = TaskRepo::create(&state.pool, &input).await?;
    tracing::info!(task_id = task.id, user_id = user.user_id, "Task created");
    Ok(Created::at("tasks", task.id, TaskView::new(task)))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskView>>> {
    let task = find_task(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: TaskView::new(task),
    }))
}

/// PUT /api/v1/tasks/{id}
///
/// Status is not editable here; use `POST /tasks/{id}/status`.
pub async fn update_task(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<DataResponse<TaskView>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(priority) = input.priority {
        validate_priority(priority)?;
    }
    check_references(&state.pool, input.space_id, input.assignee_user_id).await?;

    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    Ok(Json(DataResponse {
        data: TaskView::new(task),
    }))
}

/// POST /api/v1/tasks/{id}/status
pub async fn transition_task(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TaskStatusRequest>,
) -> AppResult<Json<DataResponse<TaskView>>> {
    let task = find_task(&state.pool, id).await?;
    validate_transition(&task.status, &input.status)?;

    let updated = TaskRepo::transition_status(&state.pool, id, &task.status, &input.status)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(format!("Task {id} was modified concurrently; reload and retry"))
        })?;

    tracing::info!(
        task_id = id,
        from = %task.status,
        to = %updated.status,
        user_id = user.user_id,
        "Task status changed",
    );
    Ok(Json(DataResponse {
        data: TaskView::new(updated),
    }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TaskRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Task", id).into())
    }
}

async fn find_task(pool: &DbPool, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id).into())
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Task title must not be empty".into()).into());
    }
    Ok(())
}

async fn check_references(
    pool: &DbPool,
    space_id: Option<DbId>,
    assignee_user_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(space_id) = space_id {
        SpaceRepo::find_by_id(pool, space_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Space", space_id))?;
    }
    if let Some(user_id) = assignee_user_id {
        UserRepo::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;
    }
    Ok(())
}

//! REST routes
//!
//! Request bodies are read as raw bytes and decoded here so that malformed
//! JSON or unexpected fields come back as `400` with the usual error body.

use crate::error::ApiError;
use crate::state::AppState;
use crate::ws;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use taskboard_kanban::task::{
    AddTask, DeleteTask, ListTasks, MoveTask, ReorderColumn, UpdateTask,
};
use taskboard_kanban::user::{GetUser, RegisterUser};
use taskboard_kanban::{BoardError, ColumnId, TaskId, Uid};

/// Text served at `/`
pub const BANNER: &str = "taskboard is up and running";

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .route("/ws", get(ws::upgrade))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/reorder", put(reorder_column))
        .route("/tasks/reorder/:id", put(move_task))
        .route(
            "/tasks/:id",
            get(list_owner_tasks).put(update_task).delete(delete_task),
        )
        .route("/users", post(register_user))
        .route("/users/:uid", get(get_user))
        .with_state(state)
}

async fn banner() -> &'static str {
    BANNER
}

/// Health check handler for the /health endpoint.
async fn health_check() -> &'static str {
    "OK"
}

// =============================================================================
// Request shapes
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct TaskQuery {
    uid: Option<Uid>,
    status: Option<ColumnId>,
}

#[derive(Debug, Deserialize)]
struct CreateTaskBody {
    uid: Option<Uid>,
    title: Option<String>,
    description: Option<String>,
    status: Option<ColumnId>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateTaskBody {
    uid: Option<Uid>,
    title: Option<String>,
    description: Option<String>,
    status: Option<ColumnId>,
    rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MoveTaskBody {
    uid: Option<Uid>,
    status: Option<ColumnId>,
    order: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ReorderColumnBody {
    uid: Option<Uid>,
    status: Option<ColumnId>,
    order: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct DeleteTaskBody {
    uid: Option<Uid>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegisterUserBody {
    uid: Option<Uid>,
    name: Option<String>,
    email: Option<String>,
}

/// Decode a JSON body; an empty body reads as `{}`
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_str("{}")?);
    }
    Ok(serde_json::from_slice(body)?)
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, BoardError> {
    value.ok_or_else(|| BoardError::missing_field(field))
}

// =============================================================================
// Task handlers
// =============================================================================

/// GET /tasks?uid=
async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut command = ListTasks::new(required(query.uid, "uid")?);
    command.status = query.status;
    Ok(Json(state.run(&command).await?))
}

/// GET /tasks/:uid
async fn list_owner_tasks(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut command = ListTasks::new(uid);
    command.status = query.status;
    Ok(Json(state.run(&command).await?))
}

/// POST /tasks
async fn create_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body: CreateTaskBody = parse_body(&body)?;
    let mut command = AddTask::new(required(body.uid, "uid")?, required(body.title, "title")?);
    command.description = body.description;
    command.status = body.status;

    let task = state.run(&command).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /tasks/:id
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = TaskId::parse(&id)?;
    let body: UpdateTaskBody = parse_body(&body)?;
    let mut command = UpdateTask::new(id, required(body.uid, "uid")?);
    command.title = body.title;
    command.description = body.description;
    command.status = body.status;
    command.rank = body.rank;
    Ok(Json(state.run(&command).await?))
}

/// PUT /tasks/reorder/:id
async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = TaskId::parse(&id)?;
    let body: MoveTaskBody = parse_body(&body)?;
    let command = MoveTask::new(
        id,
        required(body.uid, "uid")?,
        required(body.status, "status")?,
        required(body.order, "order")?,
    );
    Ok(Json(state.run(&command).await?))
}

/// PUT /tasks/reorder
async fn reorder_column(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body: ReorderColumnBody = parse_body(&body)?;
    let order = required(body.order, "order")?
        .iter()
        .map(|id| TaskId::parse(id))
        .collect::<Result<Vec<_>, _>>()?;
    let command = ReorderColumn::new(
        required(body.uid, "uid")?,
        required(body.status, "status")?,
        order,
    );
    Ok(Json(state.run(&command).await?))
}

/// DELETE /tasks/:id with `uid` in the body or the query string
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TaskQuery>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = TaskId::parse(&id)?;
    let body: DeleteTaskBody = parse_body(&body)?;
    let uid = required(body.uid.or(query.uid), "uid")?;
    Ok(Json(state.run(&DeleteTask::new(id, uid)).await?))
}

// =============================================================================
// User handlers
// =============================================================================

/// POST /users
async fn register_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body: RegisterUserBody = parse_body(&body)?;
    let mut command = RegisterUser::new(required(body.uid, "uid")?);
    command.name = body.name;
    command.email = body.email;
    Ok(Json(state.run(&command).await?))
}

/// GET /users/:uid
async fn get_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.run(&GetUser::new(uid)).await?))
}

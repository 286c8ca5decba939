use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use shared::{
    CreateTaskRequest, ErrorKind, FieldError, Task, TaskCreate, TaskUpdate, UpdateTaskRequest,
    ValidationError,
};

use crate::db::Database;
use crate::error::ApiError;

pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Task Management API is running".to_string(),
    })
}

/// `?offset=&limit=` on the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl ListParams {
    /// `None` for the limit means every task after `offset`.
    fn bounds(&self) -> Result<(u32, Option<u32>), ValidationError> {
        let offset = u32::try_from(self.offset.unwrap_or(0)).map_err(|_| {
            ValidationError::single(FieldError::new(
                ["query", "offset"],
                "Input should be greater than or equal to 0",
                ErrorKind::GreaterThanEqual,
            ))
        })?;
        let Some(limit) = self.limit else {
            return Ok((offset, None));
        };

        if limit < 1 {
            return Err(ValidationError::single(FieldError::new(
                ["query", "limit"],
                "Input should be greater than or equal to 1",
                ErrorKind::GreaterThanEqual,
            )));
        }
        if limit > MAX_LIMIT {
            return Err(ValidationError::single(FieldError::new(
                ["query", "limit"],
                format!("Input should be less than or equal to {MAX_LIMIT}"),
                ErrorKind::LessThanEqual,
            )));
        }
        // 1..=MAX_LIMIT always fits.
        Ok((offset, Some(limit as u32)))
    }
}

pub async fn create_task(
    State(db): State<Database>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(payload) = payload?;
    let input = TaskCreate::try_from(payload)?;

    let task = db.run(move |session| session.insert(input)).await?;
    tracing::info!(id = task.id, "created task");

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(
    State(db): State<Database>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let Query(params) = params?;
    let (offset, limit) = params.bounds()?;

    let tasks = db
        .run(move |session| match (offset, limit) {
            (0, None) => session.list_all(),
            _ => session.list(offset, limit),
        })
        .await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Task>, ApiError> {
    let Path(id) = id?;

    let task = db
        .run(move |session| session.get_by_id(id)?.ok_or(ApiError::NotFound(id)))
        .await?;
    Ok(Json(task))
}

/// Partial update: fields missing from the body keep their stored value.
/// Routed for both PUT and PATCH.
pub async fn update_task(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let changes = TaskUpdate::try_from(payload)?;

    let task = db
        .run(move |session| session.update(id, changes)?.ok_or(ApiError::NotFound(id)))
        .await?;
    tracing::info!(id, "updated task");

    Ok(Json(task))
}

pub async fn delete_task(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;

    db.run(move |session| {
        if session.delete(id)? {
            Ok(())
        } else {
            Err(ApiError::NotFound(id))
        }
    })
    .await?;
    tracing::info!(id, "deleted task");

    Ok(StatusCode::NO_CONTENT)
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use super::AppState;
use super::extract::{ValidJson, parse_id};
use crate::error::AppError;
use crate::models::{CurrentUser, NewProject, Project, ProjectPatch, ProjectQuery, StatusChange};

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(project): ValidJson<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = state.projects.create(user.id, project).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    let client_id = match query.client_id.as_deref().filter(|raw| !raw.is_empty()) {
        None => None,
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(client_id) => Some(client_id),
            // no project can reference a client id that is not a UUID
            Err(_) => return Ok(Json(Vec::new())),
        },
    };

    Ok(Json(state.projects.list(user.id, client_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    let project_id = parse_id(&id, "Project")?;
    Ok(Json(state.projects.get(user.id, project_id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Result<ValidJson<ProjectPatch>, AppError>,
) -> Result<Json<Project>, AppError> {
    let project_id = parse_id(&id, "Project")?;
    let ValidJson(patch) = body?;
    Ok(Json(state.projects.update(user.id, project_id, patch).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Result<ValidJson<StatusChange>, AppError>,
) -> Result<Json<Project>, AppError> {
    let project_id = parse_id(&id, "Project")?;
    let ValidJson(change) = body?;
    let status = change.parse()?;
    Ok(Json(state.projects.update_status(user.id, project_id, status).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let project_id = parse_id(&id, "Project")?;
    state.projects.delete(user.id, project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

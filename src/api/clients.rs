use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::extract::{ValidJson, parse_id};
use crate::error::AppError;
use crate::models::{Client, ClientPatch, ClientQuery, CurrentUser, NewClient};

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(client): ValidJson<NewClient>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let client = state.clients.create(user.id, client).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ClientQuery>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = state.clients.list(user.id, query.search.as_deref()).await?;
    Ok(Json(clients))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Client>, AppError> {
    let client_id = parse_id(&id, "Client")?;
    Ok(Json(state.clients.get(user.id, client_id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Result<ValidJson<ClientPatch>, AppError>,
) -> Result<Json<Client>, AppError> {
    let client_id = parse_id(&id, "Client")?;
    let ValidJson(patch) = body?;
    Ok(Json(state.clients.update(user.id, client_id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let client_id = parse_id(&id, "Client")?;
    state.clients.delete(user.id, client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

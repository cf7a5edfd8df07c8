//! Registry endpoints. Each registry gets the same five routes, typed by
//! its [`Entity`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use domain::catalog::Entity;
use ulid::Ulid;

use crate::{errors::ApiError, session::CurrentSession, AppState};

pub fn routes<T: Entity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/:id", get(fetch::<T>).put(update::<T>).delete(remove::<T>))
}

async fn create<T: Entity>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(input): Json<T::Input>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_medical()?;
    let entity: T = state
        .catalog
        .register(Ulid::new().to_string(), input, Utc::now())
        .await?;
    tracing::info!("Registered {} {}", T::KIND, entity.id());

    Ok((StatusCode::CREATED, Json(entity)))
}

async fn list<T: Entity>(
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.list::<T>().await?))
}

async fn fetch<T: Entity>(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.require::<T>(&id).await?))
}

async fn update<T: Entity>(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(input): Json<T::Input>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_medical()?;
    let entity: T = state.catalog.revise(&id, input).await?;

    Ok(Json(entity))
}

async fn remove<T: Entity>(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    session.require_medical()?;
    state.catalog.remove::<T>(&id).await?;
    tracing::info!("Removed {} {}", T::KIND, id);

    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::note_dto::{CreateNotePayload, NoteListQuery, UpdateNotePayload},
    error::Result,
    middleware::auth::Actor,
    AppState,
};

// Notes are employer-side annotations; candidates never see them here.

#[axum::debug_handler]
pub async fn create_note(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(application_id): Path<i64>,
    Json(payload): Json<CreateNotePayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let note = state
        .note_service
        .create(application_id, actor.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[axum::debug_handler]
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(application_id): Path<i64>,
    Query(query): Query<NoteListQuery>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let notes = state
        .note_service
        .list_for_application(application_id, query.into())
        .await?;
    Ok(Json(notes))
}

#[axum::debug_handler]
pub async fn get_note(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    Ok(Json(state.note_service.get(id).await?))
}

#[axum::debug_handler]
pub async fn update_note(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateNotePayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    Ok(Json(state.note_service.update(id, payload).await?))
}

#[axum::debug_handler]
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    state.note_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn pin_note(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    Ok(Json(state.note_service.pin(id).await?))
}

#[axum::debug_handler]
pub async fn unpin_note(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    Ok(Json(state.note_service.unpin(id).await?))
}

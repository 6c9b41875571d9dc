use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::document_dto::AttachDocumentPayload, error::Result, middleware::auth::Actor, AppState,
};

#[axum::debug_handler]
pub async fn attach_document(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(application_id): Path<i64>,
    Json(payload): Json<AttachDocumentPayload>,
) -> Result<impl IntoResponse> {
    let app = state.transition_service.get(application_id).await?;
    actor.require_view(&app)?;
    let document = state
        .document_service
        .attach(application_id, actor.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[axum::debug_handler]
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(application_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let app = state.transition_service.get(application_id).await?;
    actor.require_view(&app)?;
    let documents = state
        .document_service
        .list_for_application(application_id)
        .await?;
    Ok(Json(documents))
}

#[axum::debug_handler]
pub async fn verify_document(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let document = state.document_service.verify(id, actor.id).await?;
    Ok(Json(document))
}

#[axum::debug_handler]
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    state.document_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

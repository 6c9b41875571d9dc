use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListQuery, BookmarkPayload, BulkDeletePayload, BulkDeleteResponse,
        BulkRejectPayload, BulkStatusPayload, CompleteStagePayload, SubmitApplicationPayload,
        TransitionPayload, WithdrawPayload,
    },
    error::Result,
    middleware::auth::Actor,
    AppState,
};

#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<SubmitApplicationPayload>,
) -> Result<impl IntoResponse> {
    let submitted = state.transition_service.submit(actor.id, payload).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let (mut filter, sort, page) = query.into_parts();
    if !actor.is_staff() {
        filter.user_id = Some(actor.id);
    }
    let page = state.transition_service.list(&filter, sort, page).await?;
    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let app = state.transition_service.get(id).await?;
    actor.require_view(&app)?;
    Ok(Json(app))
}

#[axum::debug_handler]
pub async fn transition_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<TransitionPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    payload.validate()?;
    let outcome = state
        .transition_service
        .transition(id, payload.status, Some(actor.id), payload.notes)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn withdraw_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<WithdrawPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .transition_service
        .withdraw(id, actor.id, payload.reason)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn mark_viewed(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let app = state.transition_service.mark_viewed(id).await?;
    Ok(Json(app))
}

#[axum::debug_handler]
pub async fn set_bookmark(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<BookmarkPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let app = state
        .transition_service
        .set_bookmark(id, payload.bookmarked)
        .await?;
    Ok(Json(app))
}

#[axum::debug_handler]
pub async fn stage_history(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let app = state.transition_service.get(id).await?;
    actor.require_view(&app)?;
    let stages = state.stage_service.stage_history(id).await?;
    Ok(Json(stages))
}

#[axum::debug_handler]
pub async fn current_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let app = state.transition_service.get(id).await?;
    actor.require_view(&app)?;
    let stage = state.stage_service.current_stage(id).await?;
    Ok(Json(stage))
}

#[axum::debug_handler]
pub async fn get_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(stage_id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let stage = state.stage_service.get(stage_id).await?;
    Ok(Json(stage))
}

#[axum::debug_handler]
pub async fn complete_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(stage_id): Path<i64>,
    Json(payload): Json<CompleteStagePayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    payload.validate()?;
    let stage = state
        .stage_service
        .complete_stage(stage_id, payload.notes)
        .await?;
    Ok(Json(stage))
}

#[axum::debug_handler]
pub async fn delete_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(stage_id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_admin()?;
    state.stage_service.delete_stage(stage_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn bulk_update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<BulkStatusPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    payload.validate()?;
    let outcome = state
        .transition_service
        .bulk_update_status(&payload.application_ids, payload.status, Some(actor.id), payload.notes)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn bulk_move_to_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<BulkStatusPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    payload.validate()?;
    let outcome = state
        .transition_service
        .bulk_move_to_stage(&payload.application_ids, payload.status, Some(actor.id), payload.notes)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn bulk_reject(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<BulkRejectPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    payload.validate()?;
    let outcome = state
        .transition_service
        .bulk_reject(&payload.application_ids, Some(actor.id), payload.reason)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<BulkDeletePayload>,
) -> Result<impl IntoResponse> {
    actor.require_admin()?;
    payload.validate()?;
    let deleted = state
        .transition_service
        .bulk_delete(&payload.application_ids)
        .await?;
    Ok(Json(BulkDeleteResponse {
        requested: payload.application_ids.len(),
        deleted,
    }))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::interview_dto::{
        CancelInterviewPayload, CompleteInterviewPayload, InterviewResponse,
        RescheduleInterviewPayload, ScheduleInterviewPayload, UpcomingInterviewsQuery,
        UpdateInterviewPayload,
    },
    error::Result,
    middleware::auth::Actor,
    AppState,
};

#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(application_id): Path<i64>,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let interview = state
        .interview_service
        .schedule(application_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(InterviewResponse::from(interview))))
}

#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(application_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let app = state.transition_service.get(application_id).await?;
    actor.require_view(&app)?;
    let interviews = state
        .interview_service
        .list_for_application(application_id)
        .await?;
    Ok(Json(
        interviews
            .into_iter()
            .map(InterviewResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[axum::debug_handler]
pub async fn upcoming_interviews(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<UpcomingInterviewsQuery>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let interviews = state.interview_service.upcoming(query.from, query.to).await?;
    Ok(Json(
        interviews
            .into_iter()
            .map(InterviewResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let interview = state.interview_service.get(id).await?;
    let app = state.transition_service.get(interview.application_id).await?;
    actor.require_view(&app)?;
    Ok(Json(InterviewResponse::from(interview)))
}

#[axum::debug_handler]
pub async fn update_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateInterviewPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let interview = state.interview_service.update_details(id, payload).await?;
    Ok(Json(InterviewResponse::from(interview)))
}

#[axum::debug_handler]
pub async fn reschedule_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<RescheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let interview = state.interview_service.reschedule(id, payload).await?;
    Ok(Json(InterviewResponse::from(interview)))
}

#[axum::debug_handler]
pub async fn complete_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<CompleteInterviewPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let interview = state.interview_service.complete(id, payload).await?;
    Ok(Json(InterviewResponse::from(interview)))
}

#[axum::debug_handler]
pub async fn cancel_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<CancelInterviewPayload>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    payload.validate()?;
    let interview = state.interview_service.cancel(id, payload.reason).await?;
    Ok(Json(InterviewResponse::from(interview)))
}

#[axum::debug_handler]
pub async fn mark_no_show(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let interview = state.interview_service.mark_no_show(id).await?;
    Ok(Json(InterviewResponse::from(interview)))
}

#[axum::debug_handler]
pub async fn delete_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    actor.require_admin()?;
    state.interview_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

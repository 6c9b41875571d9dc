use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    database::store::AnalyticsScope,
    dto::analytics_dto::{ScopeQuery, TopApplicantsQuery, TrendQuery},
    error::Result,
    middleware::auth::Actor,
    AppState,
};

#[axum::debug_handler]
pub async fn conversion_funnel(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let funnel = state
        .analytics_service
        .conversion_funnel(query.into())
        .await?;
    Ok(Json(funnel))
}

#[axum::debug_handler]
pub async fn stage_time_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let stats = state.analytics_service.stage_time_stats(query.into()).await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn application_trend(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<TrendQuery>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let scope = AnalyticsScope {
        company_id: query.company_id,
        job_id: query.job_id,
    };
    let trend = state
        .analytics_service
        .application_trend(scope, query.from, query.to)
        .await?;
    Ok(Json(trend))
}

#[axum::debug_handler]
pub async fn source_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    Ok(Json(state.analytics_service.source_stats(query.into()).await?))
}

#[axum::debug_handler]
pub async fn status_distribution(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    Ok(Json(
        state
            .analytics_service
            .status_distribution(query.into())
            .await?,
    ))
}

#[axum::debug_handler]
pub async fn top_applicants(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(job_id): Path<i64>,
    Query(query): Query<TopApplicantsQuery>,
) -> Result<impl IntoResponse> {
    actor.require_staff()?;
    let ranked = state
        .analytics_service
        .top_applicants(job_id, query.limit)
        .await?;
    Ok(Json(ranked))
}

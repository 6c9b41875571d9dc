pub mod analytics_routes;
pub mod application_routes;
pub mod document_routes;
pub mod health;
pub mod interview_routes;
pub mod note_routes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{middleware::auth::require_auth, middleware::cors::api_cors, AppState};

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let applications = Router::new()
        .route(
            "/api/applications",
            get(application_routes::list_applications).post(application_routes::submit_application),
        )
        .route("/api/applications/:id", get(application_routes::get_application))
        .route(
            "/api/applications/:id/status",
            post(application_routes::transition_application),
        )
        .route(
            "/api/applications/:id/withdraw",
            post(application_routes::withdraw_application),
        )
        .route(
            "/api/applications/:id/viewed",
            post(application_routes::mark_viewed),
        )
        .route(
            "/api/applications/:id/bookmark",
            put(application_routes::set_bookmark),
        )
        .route(
            "/api/applications/:id/stages",
            get(application_routes::stage_history),
        )
        .route(
            "/api/applications/:id/stages/current",
            get(application_routes::current_stage),
        )
        .route(
            "/api/stages/:id",
            get(application_routes::get_stage).delete(application_routes::delete_stage),
        )
        .route(
            "/api/stages/:id/complete",
            post(application_routes::complete_stage),
        )
        .route("/api/bulk/status", post(application_routes::bulk_update_status))
        .route("/api/bulk/stage", post(application_routes::bulk_move_to_stage))
        .route("/api/bulk/reject", post(application_routes::bulk_reject))
        .route("/api/bulk/delete", post(application_routes::bulk_delete));

    let interviews = Router::new()
        .route(
            "/api/applications/:id/interviews",
            get(interview_routes::list_interviews).post(interview_routes::schedule_interview),
        )
        .route("/api/interviews", get(interview_routes::upcoming_interviews))
        .route(
            "/api/interviews/:id",
            get(interview_routes::get_interview)
                .patch(interview_routes::update_interview)
                .delete(interview_routes::delete_interview),
        )
        .route(
            "/api/interviews/:id/reschedule",
            post(interview_routes::reschedule_interview),
        )
        .route(
            "/api/interviews/:id/complete",
            post(interview_routes::complete_interview),
        )
        .route(
            "/api/interviews/:id/cancel",
            post(interview_routes::cancel_interview),
        )
        .route(
            "/api/interviews/:id/no-show",
            post(interview_routes::mark_no_show),
        );

    let notes = Router::new()
        .route(
            "/api/applications/:id/notes",
            get(note_routes::list_notes).post(note_routes::create_note),
        )
        .route(
            "/api/notes/:id",
            get(note_routes::get_note)
                .patch(note_routes::update_note)
                .delete(note_routes::delete_note),
        )
        .route(
            "/api/notes/:id/pin",
            post(note_routes::pin_note).delete(note_routes::unpin_note),
        );

    let documents = Router::new()
        .route(
            "/api/applications/:id/documents",
            get(document_routes::list_documents).post(document_routes::attach_document),
        )
        .route(
            "/api/documents/:id",
            axum::routing::delete(document_routes::delete_document),
        )
        .route(
            "/api/documents/:id/verify",
            post(document_routes::verify_document),
        );

    let analytics = Router::new()
        .route("/api/analytics/funnel", get(analytics_routes::conversion_funnel))
        .route("/api/analytics/stage-times", get(analytics_routes::stage_time_stats))
        .route("/api/analytics/trend", get(analytics_routes::application_trend))
        .route("/api/analytics/sources", get(analytics_routes::source_stats))
        .route(
            "/api/analytics/status-distribution",
            get(analytics_routes::status_distribution),
        )
        .route(
            "/api/analytics/jobs/:id/top-applicants",
            get(analytics_routes::top_applicants),
        );

    let protected = applications
        .merge(interviews)
        .merge(notes)
        .merge(documents)
        .merge(analytics)
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health))
        .merge(protected)
        .with_state(state)
        .layer(api_cors())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

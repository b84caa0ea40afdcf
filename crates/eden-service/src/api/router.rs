//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Collaborations and voting
        .route(
            "/collaborations",
            get(handlers::list_collaborations).post(handlers::create_collaboration),
        )
        .route("/collaborations/:id", get(handlers::get_collaboration))
        .route(
            "/collaborations/:id/participants/:curator_id",
            post(handlers::set_participant),
        )
        .route(
            "/collaborations/:id/vote",
            get(handlers::vote_status).post(handlers::submit_vote),
        )
        // Collections
        .route(
            "/collections",
            get(handlers::list_collections).post(handlers::create_collection),
        )
        .route("/collections/:id", get(handlers::get_collection))
        .route(
            "/collections/:id/works",
            get(handlers::list_collection_works)
                .post(handlers::add_collection_work)
                .delete(handlers::remove_collection_work),
        )
        // Agent works
        .route(
            "/agents/:agent_id/works",
            get(handlers::list_works).post(handlers::create_work),
        )
        .route("/agents/:agent_id/works/:work_id", get(handlers::get_work))
        // Curation sessions
        .route(
            "/curation/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route("/curation/sessions/:id", get(handlers::get_session))
        .route(
            "/curation/sessions/:id/decisions",
            post(handlers::classify_work),
        )
        .route(
            "/curation/sessions/:id/complete",
            post(handlers::complete_session),
        );

    let router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}

mod dashboard;
mod journals;
mod reviews;
mod submissions;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/dashboard/recent", get(dashboard::recent_submissions))
        .route("/api/dashboard/top-journals", get(dashboard::top_journals))
        .route(
            "/api/journals",
            get(journals::list_journals).post(journals::create_journal),
        )
        .route("/api/journals/search", get(journals::search_journals))
        .route(
            "/api/journals/:id",
            get(journals::get_journal)
                .put(journals::update_journal)
                .delete(journals::delete_journal),
        )
        .route("/api/journals/:id/stats", get(journals::journal_stats))
        .route(
            "/api/journals/:id/submissions",
            get(journals::journal_submissions),
        )
        .route(
            "/api/submissions",
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .route(
            "/api/submissions/:id",
            get(submissions::get_submission)
                .put(submissions::update_submission)
                .delete(submissions::delete_submission),
        )
        .route("/api/submissions/:id/status", post(submissions::change_status))
        .route("/api/submissions/:id/history", get(submissions::history))
        .route(
            "/api/submissions/:id/suggestions",
            get(submissions::suggestions),
        )
        .route(
            "/api/submissions/:id/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route("/api/reviews", get(reviews::list_all_reviews))
        .route(
            "/api/reviews/:id",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route("/api/reviews/:id/assess", post(reviews::assess_review))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

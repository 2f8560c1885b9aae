use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::agents::{parse_assessment, ClaudeAgent};
use crate::db::{NewReview, Review, ReviewPatch};
use crate::error::{Error, Result};
use crate::state::AppState;
use crate::store::{ReviewStore, SubmissionStore};
use crate::validation;

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<Uuid>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(state.store.list_reviews(submission_id).await?))
}

pub async fn list_all_reviews(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Review>>> {
    Ok(Json(state.store.list_all_reviews().await?))
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<Uuid>,
    Json(input): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    validation::review(&input)?;
    if state.store.get_submission(submission_id).await?.is_none() {
        return Err(Error::not_found("submission", submission_id));
    }
    let review = state.store.create_review(submission_id, &input).await?;
    tracing::info!(
        submission_id = %submission_id,
        review_id = %review.id,
        "Review recorded with {} reviewers",
        review.reviewer_count
    );
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>> {
    state
        .store
        .get_review(id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("review", id))
}

pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ReviewPatch>,
) -> Result<Json<Review>> {
    let current = state
        .store
        .get_review(id)
        .await?
        .ok_or_else(|| Error::not_found("review", id))?;

    let input = current.patched(&patch);
    validation::review(&input)?;

    let review = state
        .store
        .update_review(id, &input)
        .await?
        .ok_or_else(|| Error::not_found("review", id))?;
    tracing::info!(review_id = %id, "Review updated");
    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.store.delete_review(id).await? {
        return Err(Error::not_found("review", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Scores how well the author's responses address the reviewers' requests
/// and stores the result on the review.
pub async fn assess_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>> {
    let api_key = state.config.claude_api_key.clone().ok_or_else(|| {
        Error::InvalidInput("revision assessment is disabled: CLAUDE_API_KEY is not set".into())
    })?;

    let review = state
        .store
        .get_review(id)
        .await?
        .ok_or_else(|| Error::not_found("review", id))?;

    let mut agent = ClaudeAgent::new(api_key)?;
    let text = agent.assess_revision(&review.exchanges()).await?;
    let assessment = parse_assessment(&text);

    tracing::info!(
        review_id = %id,
        model = agent.current_model(),
        score = ?assessment.score,
        "Revision assessed"
    );

    state
        .store
        .record_assessment(id, assessment.score, &assessment.suggestion)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("review", id))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    AlternativeJournal, Author, Journal, NewAlternative, NewAuthor, NewSubmission, Review,
    StatusHistoryEntry, Submission, SubmissionFilter, SubmissionPatch, SubmissionStatus,
};
use crate::error::{Error, Result};
use crate::lifecycle;
use crate::recommend::{self, Suggestion};
use crate::state::AppState;
use crate::store::{JournalStore, ReviewStore, StatsInvalidator, SubmissionStore};
use crate::validation;

#[derive(Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    submission: Submission,
    journal: Option<Journal>,
    authors: Vec<Author>,
    alternatives: Vec<AlternativeJournal>,
    reviews: Vec<Review>,
    history: Vec<StatusHistoryEntry>,
}

#[derive(Deserialize)]
pub struct UpdateSubmission {
    #[serde(flatten)]
    patch: SubmissionPatch,
    status: Option<SubmissionStatus>,
    note: Option<String>,
    authors: Option<Vec<NewAuthor>>,
    alternatives: Option<Vec<NewAlternative>>,
}

#[derive(Deserialize)]
pub struct StatusChange {
    status: SubmissionStatus,
    note: Option<String>,
}

async fn require_submission(state: &AppState, id: Uuid) -> Result<Submission> {
    state
        .store
        .get_submission(id)
        .await?
        .ok_or_else(|| Error::not_found("submission", id))
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SubmissionFilter>,
) -> Result<Json<Vec<Submission>>> {
    Ok(Json(state.store.list_submissions(&filter).await?))
}

pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewSubmission>,
) -> Result<(StatusCode, Json<Submission>)> {
    validation::submission(&input)?;
    if state.store.get_journal(input.journal_id).await?.is_none() {
        return Err(Error::not_found("journal", input.journal_id));
    }
    if let Some(original) = input.original_submission_id {
        require_submission(&state, original).await?;
    }

    let submission = lifecycle::create(state.store.as_ref(), state.stats.as_ref(), &input).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionDetail>> {
    let submission = require_submission(&state, id).await?;
    let store = state.store.as_ref();

    let journal = store.get_journal(submission.journal_id).await?;
    let authors = store.list_authors(id).await?;
    let alternatives = store.list_alternatives(id).await?;
    let reviews = store.list_reviews(id).await?;
    let history = store.list_history(id).await?;

    Ok(Json(SubmissionDetail {
        submission,
        journal,
        authors,
        alternatives,
        reviews,
        history,
    }))
}

pub async fn update_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateSubmission>,
) -> Result<Json<Submission>> {
    require_submission(&state, id).await?;
    let store = state.store.as_ref();

    validation::submission_patch(&update.patch)?;
    if let Some(authors) = &update.authors {
        validation::authors(authors)?;
    }
    if let Some(alternatives) = &update.alternatives {
        validation::alternatives(alternatives)?;
    }
    if let Some(journal_id) = update.patch.journal_id {
        if store.get_journal(journal_id).await?.is_none() {
            return Err(Error::not_found("journal", journal_id));
        }
    }

    if !update.patch.is_empty() {
        store.update_submission(id, &update.patch).await?;
        if update.patch.journal_id.is_some() {
            state.stats.invalidate_aggregate_stats();
        }
    }

    if let Some(authors) = &update.authors {
        store.replace_authors(id, authors).await?;
    }

    if let Some(alternatives) = &update.alternatives {
        store.replace_alternatives(id, alternatives).await?;
    }

    if let Some(status) = update.status {
        lifecycle::transition(store, state.stats.as_ref(), id, status, update.note).await?;
    }

    Ok(Json(require_submission(&state, id).await?))
}

pub async fn delete_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.store.delete_submission(id).await? {
        return Err(Error::not_found("submission", id));
    }
    state.stats.invalidate_aggregate_stats();
    tracing::info!(submission_id = %id, "Submission deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> Result<Json<StatusHistoryEntry>> {
    let entry = lifecycle::transition(
        state.store.as_ref(),
        state.stats.as_ref(),
        id,
        change.status,
        change.note,
    )
    .await?;
    Ok(Json(entry))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StatusHistoryEntry>>> {
    require_submission(&state, id).await?;
    Ok(Json(state.store.list_history(id).await?))
}

pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Json<Vec<Suggestion>> {
    Json(recommend::suggest(state.store.as_ref(), id).await)
}

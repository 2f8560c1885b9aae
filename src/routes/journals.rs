use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Journal, JournalInput, JournalPatch, StatusCounts, Submission, SubmissionFilter};
use crate::error::{Error, Result};
use crate::state::AppState;
use crate::store::{JournalStore, SubmissionStore};
use crate::validation;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub async fn list_journals(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Journal>>> {
    Ok(Json(state.store.list_journals().await?))
}

pub async fn search_journals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Journal>>> {
    let q = query.q.trim();
    let journals = if q.is_empty() {
        state.store.list_journals().await?
    } else {
        state.store.search_journals(q).await?
    };
    Ok(Json(journals))
}

pub async fn create_journal(
    State(state): State<Arc<AppState>>,
    Json(input): Json<JournalInput>,
) -> Result<(StatusCode, Json<Journal>)> {
    validation::journal(&input)?;
    let journal = state.store.create_journal(&input).await?;
    tracing::info!(journal_id = %journal.id, "Journal created: {}", journal.name);
    Ok((StatusCode::CREATED, Json(journal)))
}

pub async fn get_journal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Journal>> {
    state
        .store
        .get_journal(id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("journal", id))
}

pub async fn update_journal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<JournalPatch>,
) -> Result<Json<Journal>> {
    validation::journal_patch(&patch)?;
    state
        .store
        .update_journal(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("journal", id))
}

pub async fn delete_journal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.store.delete_journal(id).await? {
        return Err(Error::not_found("journal", id));
    }
    tracing::info!(journal_id = %id, "Journal deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn journal_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusCounts>> {
    if state.store.get_journal(id).await?.is_none() {
        return Err(Error::not_found("journal", id));
    }
    let store = state.store.clone();
    let counts = state
        .stats
        .get_or_load(Some(id), || async move { store.status_counts(Some(id)).await })
        .await?;
    Ok(Json(counts))
}

pub async fn journal_submissions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Submission>>> {
    let filter = SubmissionFilter {
        journal_id: Some(id),
        ..SubmissionFilter::default()
    };
    Ok(Json(state.store.list_submissions(&filter).await?))
}

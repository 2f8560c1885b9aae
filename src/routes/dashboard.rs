use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{JournalUsage, StatusCounts, Submission, SubmissionFilter};
use crate::error::Result;
use crate::state::AppState;
use crate::store::{JournalStore, SubmissionStore};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Deserialize)]
pub struct LimitQuery {
    limit: Option<i64>,
}

impl LimitQuery {
    fn value(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatusCounts>> {
    let store = state.store.clone();
    let counts = state
        .stats
        .get_or_load(None, || async move { store.status_counts(None).await })
        .await?;
    Ok(Json(counts))
}

pub async fn recent_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Submission>>> {
    let filter = SubmissionFilter {
        limit: Some(query.value()),
        ..SubmissionFilter::default()
    };
    Ok(Json(state.store.list_submissions(&filter).await?))
}

pub async fn top_journals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<JournalUsage>>> {
    Ok(Json(state.store.most_used_journals(query.value()).await?))
}

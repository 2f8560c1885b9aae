//! Submission status lifecycle.
//!
//! Every status change, creation included, goes through here so that the
//! submission row and its append-only history never disagree. The transition
//! graph is open: any status may follow any other.

use uuid::Uuid;

use crate::db::{NewSubmission, StatusHistoryEntry, Submission, SubmissionStatus};
use crate::error::{Error, Result};
use crate::store::{StatsInvalidator, SubmissionStore};

pub const CREATION_NOTE: &str = "Submission created";

pub fn default_note(status: SubmissionStatus) -> String {
    format!("Status changed to {}", status)
}

/// Persists a new submission and records its entry into `EM_AVALIACAO`.
pub async fn create<S>(
    store: &S,
    stats: &dyn StatsInvalidator,
    input: &NewSubmission,
) -> Result<Submission>
where
    S: SubmissionStore + ?Sized,
{
    let submission = store.create_submission(input, CREATION_NOTE).await?;
    stats.invalidate_aggregate_stats();

    tracing::info!(
        submission_id = %submission.id,
        journal_id = %submission.journal_id,
        "Submission created"
    );
    Ok(submission)
}

/// Moves a submission to `status` and appends the matching history entry.
pub async fn transition<S>(
    store: &S,
    stats: &dyn StatsInvalidator,
    submission_id: Uuid,
    status: SubmissionStatus,
    note: Option<String>,
) -> Result<StatusHistoryEntry>
where
    S: SubmissionStore + ?Sized,
{
    let current = store
        .get_submission(submission_id)
        .await?
        .ok_or_else(|| Error::not_found("submission", submission_id))?;

    let note = note.unwrap_or_else(|| default_note(status));

    store.set_submission_status(submission_id, status).await?;
    let entry = store.append_history(submission_id, status, &note).await?;
    stats.invalidate_aggregate_stats();

    tracing::info!(
        submission_id = %submission_id,
        from = %current.status,
        to = %status,
        "Submission status changed"
    );
    Ok(entry)
}

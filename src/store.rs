//! Data-access ports consumed by the lifecycle manager, the recommendation
//! scorer and the HTTP layer.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::{
    AlternativeJournal, Author, Journal, JournalInput, JournalPatch, JournalUsage,
    NewAlternative, NewAuthor, NewReview, NewSubmission, Review, StatusCounts,
    StatusHistoryEntry, Submission, SubmissionFilter, SubmissionPatch, SubmissionStatus,
};
use crate::error::Result;

#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn get_journal(&self, id: Uuid) -> Result<Option<Journal>>;

    /// Full catalog ordered by name.
    async fn list_journals(&self) -> Result<Vec<Journal>>;

    /// Substring match on name, ISSN or area.
    async fn search_journals(&self, query: &str) -> Result<Vec<Journal>>;

    async fn create_journal(&self, input: &JournalInput) -> Result<Journal>;

    /// Returns `None` when the journal does not exist.
    async fn update_journal(&self, id: Uuid, patch: &JournalPatch) -> Result<Option<Journal>>;

    async fn delete_journal(&self, id: Uuid) -> Result<bool>;

    /// Journals ordered by how many submissions target them.
    async fn most_used_journals(&self, limit: i64) -> Result<Vec<JournalUsage>>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>>;

    /// Newest submissions first.
    async fn list_submissions(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>>;

    /// Inserts the submission row in `EM_AVALIACAO` together with its
    /// authors, alternatives and the initial history entry carrying `note`.
    /// Either all of it is written or none of it.
    async fn create_submission(&self, input: &NewSubmission, note: &str) -> Result<Submission>;

    async fn update_submission(
        &self,
        id: Uuid,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>>;

    async fn delete_submission(&self, id: Uuid) -> Result<bool>;

    async fn set_submission_status(&self, id: Uuid, status: SubmissionStatus) -> Result<()>;

    async fn append_history(
        &self,
        submission_id: Uuid,
        status: SubmissionStatus,
        note: &str,
    ) -> Result<StatusHistoryEntry>;

    /// Newest entry first.
    async fn list_history(&self, submission_id: Uuid) -> Result<Vec<StatusHistoryEntry>>;

    async fn list_authors(&self, submission_id: Uuid) -> Result<Vec<Author>>;

    async fn replace_authors(&self, submission_id: Uuid, authors: &[NewAuthor]) -> Result<()>;

    /// Ordered by priority.
    async fn list_alternatives(&self, submission_id: Uuid) -> Result<Vec<AlternativeJournal>>;

    async fn replace_alternatives(
        &self,
        submission_id: Uuid,
        alternatives: &[NewAlternative],
    ) -> Result<()>;

    /// Counts across all submissions, or those of one journal.
    async fn status_counts(&self, journal_id: Option<Uuid>) -> Result<StatusCounts>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Most recently received first.
    async fn list_reviews(&self, submission_id: Uuid) -> Result<Vec<Review>>;

    /// Every review across all submissions, most recently received first.
    async fn list_all_reviews(&self) -> Result<Vec<Review>>;

    async fn get_review(&self, id: Uuid) -> Result<Option<Review>>;

    async fn create_review(&self, submission_id: Uuid, input: &NewReview) -> Result<Review>;

    /// Overwrites the editable fields. Any stored assessment is kept.
    async fn update_review(&self, id: Uuid, input: &NewReview) -> Result<Option<Review>>;

    async fn record_assessment(
        &self,
        id: Uuid,
        score: Option<i32>,
        suggestion: &str,
    ) -> Result<Option<Review>>;

    async fn delete_review(&self, id: Uuid) -> Result<bool>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store: JournalStore + SubmissionStore + ReviewStore {}

impl<T: JournalStore + SubmissionStore + ReviewStore> Store for T {}

/// Drops cached aggregates derived from submission status counts.
pub trait StatsInvalidator: Send + Sync {
    fn invalidate_aggregate_stats(&self);
}

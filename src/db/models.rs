use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed set of submission states. The Portuguese codes are the wire and
/// storage representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_status")]
pub enum SubmissionStatus {
    #[serde(rename = "EM_AVALIACAO")]
    #[sqlx(rename = "EM_AVALIACAO")]
    UnderReview,
    #[serde(rename = "APROVADO")]
    #[sqlx(rename = "APROVADO")]
    Approved,
    #[serde(rename = "REJEITADO")]
    #[sqlx(rename = "REJEITADO")]
    Rejected,
    #[serde(rename = "REVISAO_SOLICITADA")]
    #[sqlx(rename = "REVISAO_SOLICITADA")]
    RevisionRequested,
    #[serde(rename = "SUBMETIDO_NOVAMENTE")]
    #[sqlx(rename = "SUBMETIDO_NOVAMENTE")]
    Resubmitted,
}

impl SubmissionStatus {
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionStatus::UnderReview => "EM_AVALIACAO",
            SubmissionStatus::Approved => "APROVADO",
            SubmissionStatus::Rejected => "REJEITADO",
            SubmissionStatus::RevisionRequested => "REVISAO_SOLICITADA",
            SubmissionStatus::Resubmitted => "SUBMETIDO_NOVAMENTE",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Journal {
    pub id: Uuid,
    pub name: String,
    pub issn: Option<String>,
    pub area: Option<String>,
    pub qualis: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub abdc: Option<String>,
    pub abs: Option<String>,
    pub sjr_quartile: Option<String>,
    pub sjr_score: Option<String>,
    pub jcr_quartile: Option<String>,
    pub jcr_impact_factor: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalInput {
    pub name: String,
    pub issn: Option<String>,
    pub area: Option<String>,
    pub qualis: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub abdc: Option<String>,
    pub abs: Option<String>,
    pub sjr_quartile: Option<String>,
    pub sjr_score: Option<String>,
    pub jcr_quartile: Option<String>,
    pub jcr_impact_factor: Option<String>,
}

/// Partial journal update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalPatch {
    pub name: Option<String>,
    pub issn: Option<String>,
    pub area: Option<String>,
    pub qualis: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub abdc: Option<String>,
    pub abs: Option<String>,
    pub sjr_quartile: Option<String>,
    pub sjr_score: Option<String>,
    pub jcr_quartile: Option<String>,
    pub jcr_impact_factor: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Comma-separated keyword list as typed by the author
    pub keywords: String,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub journal_id: Uuid,
    pub secondary_journal_id: Option<Uuid>,
    pub original_submission_id: Option<Uuid>,
    pub action_plan: Option<String>,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubmission {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
    pub journal_id: Uuid,
    #[serde(default)]
    pub secondary_journal_id: Option<Uuid>,
    #[serde(default)]
    pub original_submission_id: Option<Uuid>,
    #[serde(default)]
    pub action_plan: Option<String>,
    pub creator_id: String,
    #[serde(default)]
    pub authors: Vec<NewAuthor>,
    #[serde(default)]
    pub alternatives: Vec<NewAlternative>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionPatch {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords: Option<String>,
    pub action_plan: Option<String>,
    pub journal_id: Option<Uuid>,
    pub secondary_journal_id: Option<Uuid>,
}

impl SubmissionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.abstract_text.is_none()
            && self.keywords.is_none()
            && self.action_plan.is_none()
            && self.journal_id.is_none()
            && self.secondary_journal_id.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub journal_id: Option<Uuid>,
    pub creator_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub submission_id: Uuid,
    pub status: SubmissionStatus,
    pub changed_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub institution: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AlternativeJournal {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub journal_name: String,
    pub journal_issn: Option<String>,
    pub journal_area: Option<String>,
    pub priority: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAlternative {
    pub journal_name: String,
    #[serde(default)]
    pub journal_issn: Option<String>,
    #[serde(default)]
    pub journal_area: Option<String>,
    pub priority: i32,
    #[serde(default)]
    pub reason: Option<String>,
}

pub const MAX_REVIEWERS: usize = 4;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub reviewer_count: i32,
    pub request_1: Option<String>,
    pub response_1: Option<String>,
    pub request_2: Option<String>,
    pub response_2: Option<String>,
    pub request_3: Option<String>,
    pub response_3: Option<String>,
    pub request_4: Option<String>,
    pub response_4: Option<String>,
    pub comments: Option<String>,
    pub reviewer_id: Option<String>,
    pub score: Option<i32>,
    pub suggestion: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One reviewer's request and the author's answer to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewerExchange {
    pub request: Option<String>,
    pub response: Option<String>,
}

impl ReviewerExchange {
    pub fn is_blank(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |t| t.trim().is_empty());
        blank(&self.request) && blank(&self.response)
    }
}

impl Review {
    /// Exchanges for the reviewers that were actually counted on this review.
    pub fn exchanges(&self) -> Vec<ReviewerExchange> {
        let pairs = [
            (&self.request_1, &self.response_1),
            (&self.request_2, &self.response_2),
            (&self.request_3, &self.response_3),
            (&self.request_4, &self.response_4),
        ];
        let count = self.reviewer_count.clamp(0, MAX_REVIEWERS as i32) as usize;
        pairs
            .into_iter()
            .take(count)
            .map(|(request, response)| ReviewerExchange {
                request: request.clone(),
                response: response.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub received_at: DateTime<Utc>,
    pub reviewer_count: i32,
    #[serde(default)]
    pub exchanges: Vec<ReviewerExchange>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub reviewer_id: Option<String>,
}

impl NewReview {
    pub fn exchange(&self, index: usize) -> ReviewerExchange {
        self.exchanges.get(index).cloned().unwrap_or_default()
    }
}

/// Partial review update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
    pub received_at: Option<DateTime<Utc>>,
    pub reviewer_count: Option<i32>,
    pub exchanges: Option<Vec<ReviewerExchange>>,
    pub comments: Option<String>,
}

impl Review {
    /// The full editable state of this review with `patch` applied. Stored
    /// exchanges past the resulting reviewer count are dropped.
    pub fn patched(&self, patch: &ReviewPatch) -> NewReview {
        let reviewer_count = patch.reviewer_count.unwrap_or(self.reviewer_count);
        let exchanges = match &patch.exchanges {
            Some(exchanges) => exchanges.clone(),
            None => Review {
                reviewer_count,
                ..self.clone()
            }
            .exchanges(),
        };
        NewReview {
            received_at: patch.received_at.unwrap_or(self.received_at),
            reviewer_count,
            exchanges,
            comments: patch.comments.clone().or_else(|| self.comments.clone()),
            reviewer_id: self.reviewer_id.clone(),
        }
    }
}

/// Submission counts per status, as shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: i64,
    pub under_review: i64,
    pub approved: i64,
    pub rejected: i64,
    pub revision_requested: i64,
    pub resubmitted: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: SubmissionStatus, count: i64) {
        self.total += count;
        match status {
            SubmissionStatus::UnderReview => self.under_review += count,
            SubmissionStatus::Approved => self.approved += count,
            SubmissionStatus::Rejected => self.rejected += count,
            SubmissionStatus::RevisionRequested => self.revision_requested += count,
            SubmissionStatus::Resubmitted => self.resubmitted += count,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JournalUsage {
    #[sqlx(flatten)]
    pub journal: Journal,
    pub total_submissions: i64,
}

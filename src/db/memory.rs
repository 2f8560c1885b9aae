//! In-memory store for unit and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::error::Result;
use crate::store::{JournalStore, ReviewStore, SubmissionStore};

#[derive(Default)]
struct Tables {
    journals: Vec<Journal>,
    submissions: Vec<Submission>,
    history: Vec<StatusHistoryEntry>,
    authors: Vec<Author>,
    alternatives: Vec<AlternativeJournal>,
    reviews: Vec<Review>,
    next_history_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a journal with only the scoring-relevant fields set.
    pub fn seed_journal(
        &self,
        name: &str,
        area: Option<&str>,
        qualis: Option<&str>,
        description: Option<&str>,
    ) -> Journal {
        let now = Utc::now();
        let journal = Journal {
            id: Uuid::new_v4(),
            name: name.to_string(),
            issn: None,
            area: area.map(str::to_string),
            qualis: qualis.map(str::to_string),
            description: description.map(str::to_string),
            publisher: None,
            abdc: None,
            abs: None,
            sjr_quartile: None,
            sjr_score: None,
            jcr_quartile: None,
            jcr_impact_factor: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().journals.push(journal.clone());
        journal
    }

    pub fn history_len(&self) -> usize {
        self.tables.lock().unwrap().history.len()
    }
}

fn contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .map_or(false, |h| h.to_lowercase().contains(needle))
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn get_journal(&self, id: Uuid) -> Result<Option<Journal>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.journals.iter().find(|j| j.id == id).cloned())
    }

    async fn list_journals(&self) -> Result<Vec<Journal>> {
        let mut journals = self.tables.lock().unwrap().journals.clone();
        journals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(journals)
    }

    async fn search_journals(&self, query: &str) -> Result<Vec<Journal>> {
        let needle = query.to_lowercase();
        let mut journals: Vec<Journal> = self
            .tables
            .lock()
            .unwrap()
            .journals
            .iter()
            .filter(|j| {
                j.name.to_lowercase().contains(&needle)
                    || contains_ci(&j.issn, &needle)
                    || contains_ci(&j.area, &needle)
            })
            .cloned()
            .collect();
        journals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(journals)
    }

    async fn create_journal(&self, input: &JournalInput) -> Result<Journal> {
        let now = Utc::now();
        let journal = Journal {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            issn: input.issn.clone(),
            area: input.area.clone(),
            qualis: input.qualis.clone(),
            description: input.description.clone(),
            publisher: input.publisher.clone(),
            abdc: input.abdc.clone(),
            abs: input.abs.clone(),
            sjr_quartile: input.sjr_quartile.clone(),
            sjr_score: input.sjr_score.clone(),
            jcr_quartile: input.jcr_quartile.clone(),
            jcr_impact_factor: input.jcr_impact_factor.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().journals.push(journal.clone());
        Ok(journal)
    }

    async fn update_journal(&self, id: Uuid, patch: &JournalPatch) -> Result<Option<Journal>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(journal) = tables.journals.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            journal.name = name.clone();
        }
        let fields = [
            (&mut journal.issn, &patch.issn),
            (&mut journal.area, &patch.area),
            (&mut journal.qualis, &patch.qualis),
            (&mut journal.description, &patch.description),
            (&mut journal.publisher, &patch.publisher),
            (&mut journal.abdc, &patch.abdc),
            (&mut journal.abs, &patch.abs),
            (&mut journal.sjr_quartile, &patch.sjr_quartile),
            (&mut journal.sjr_score, &patch.sjr_score),
            (&mut journal.jcr_quartile, &patch.jcr_quartile),
            (&mut journal.jcr_impact_factor, &patch.jcr_impact_factor),
        ];
        for (field, value) in fields {
            if value.is_some() {
                *field = value.clone();
            }
        }
        journal.updated_at = Utc::now();
        Ok(Some(journal.clone()))
    }

    async fn delete_journal(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.journals.len();
        tables.journals.retain(|j| j.id != id);
        Ok(tables.journals.len() != before)
    }

    async fn most_used_journals(&self, limit: i64) -> Result<Vec<JournalUsage>> {
        let tables = self.tables.lock().unwrap();
        let mut usage: Vec<JournalUsage> = tables
            .journals
            .iter()
            .map(|journal| JournalUsage {
                journal: journal.clone(),
                total_submissions: tables
                    .submissions
                    .iter()
                    .filter(|s| s.journal_id == journal.id)
                    .count() as i64,
            })
            .collect();
        usage.sort_by(|a, b| {
            b.total_submissions
                .cmp(&a.total_submissions)
                .then_with(|| a.journal.name.cmp(&b.journal.name))
        });
        usage.truncate(limit.max(0) as usize);
        Ok(usage)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_submissions(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>> {
        let tables = self.tables.lock().unwrap();
        let mut submissions: Vec<Submission> = tables
            .submissions
            .iter()
            .filter(|s| filter.status.map_or(true, |status| s.status == status))
            .filter(|s| filter.journal_id.map_or(true, |id| s.journal_id == id))
            .filter(|s| {
                filter
                    .creator_id
                    .as_deref()
                    .map_or(true, |creator| s.creator_id == creator)
            })
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        if let Some(limit) = filter.limit {
            submissions.truncate(limit.max(0) as usize);
        }
        Ok(submissions)
    }

    async fn create_submission(&self, input: &NewSubmission, note: &str) -> Result<Submission> {
        let now = Utc::now();
        let submission = Submission {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            abstract_text: input.abstract_text.clone(),
            keywords: input.keywords.clone(),
            status: SubmissionStatus::UnderReview,
            submitted_at: now,
            journal_id: input.journal_id,
            secondary_journal_id: input.secondary_journal_id,
            original_submission_id: input.original_submission_id,
            action_plan: input.action_plan.clone(),
            creator_id: input.creator_id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().submissions.push(submission.clone());
        self.replace_authors(submission.id, &input.authors).await?;
        self.replace_alternatives(submission.id, &input.alternatives)
            .await?;
        self.append_history(submission.id, SubmissionStatus::UnderReview, note)
            .await?;
        Ok(submission)
    }

    async fn update_submission(
        &self,
        id: Uuid,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(submission) = tables.submissions.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            submission.title = title.clone();
        }
        if let Some(abstract_text) = &patch.abstract_text {
            submission.abstract_text = abstract_text.clone();
        }
        if let Some(keywords) = &patch.keywords {
            submission.keywords = keywords.clone();
        }
        if patch.action_plan.is_some() {
            submission.action_plan = patch.action_plan.clone();
        }
        if let Some(journal_id) = patch.journal_id {
            submission.journal_id = journal_id;
        }
        if patch.secondary_journal_id.is_some() {
            submission.secondary_journal_id = patch.secondary_journal_id;
        }
        submission.updated_at = Utc::now();
        Ok(Some(submission.clone()))
    }

    async fn delete_submission(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.submissions.len();
        tables.submissions.retain(|s| s.id != id);
        let removed = tables.submissions.len() != before;
        if removed {
            tables.history.retain(|h| h.submission_id != id);
            tables.authors.retain(|a| a.submission_id != id);
            tables.alternatives.retain(|a| a.submission_id != id);
            tables.reviews.retain(|r| r.submission_id != id);
        }
        Ok(removed)
    }

    async fn set_submission_status(&self, id: Uuid, status: SubmissionStatus) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(submission) = tables.submissions.iter_mut().find(|s| s.id == id) {
            submission.status = status;
            submission.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn append_history(
        &self,
        submission_id: Uuid,
        status: SubmissionStatus,
        note: &str,
    ) -> Result<StatusHistoryEntry> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_history_id += 1;
        let entry = StatusHistoryEntry {
            id: tables.next_history_id,
            submission_id,
            status,
            changed_at: Utc::now(),
            note: Some(note.to_string()),
        };
        tables.history.push(entry.clone());
        Ok(entry)
    }

    async fn list_history(&self, submission_id: Uuid) -> Result<Vec<StatusHistoryEntry>> {
        let tables = self.tables.lock().unwrap();
        let mut entries: Vec<StatusHistoryEntry> = tables
            .history
            .iter()
            .filter(|h| h.submission_id == submission_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.changed_at.cmp(&a.changed_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn list_authors(&self, submission_id: Uuid) -> Result<Vec<Author>> {
        let tables = self.tables.lock().unwrap();
        let mut authors: Vec<Author> = tables
            .authors
            .iter()
            .filter(|a| a.submission_id == submission_id)
            .cloned()
            .collect();
        authors.sort_by_key(|a| a.position);
        Ok(authors)
    }

    async fn replace_authors(&self, submission_id: Uuid, authors: &[NewAuthor]) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.authors.retain(|a| a.submission_id != submission_id);
        tables.authors.extend(authors.iter().map(|a| Author {
            id: Uuid::new_v4(),
            submission_id,
            name: a.name.clone(),
            email: a.email.clone(),
            institution: a.institution.clone(),
            position: a.position,
        }));
        Ok(())
    }

    async fn list_alternatives(&self, submission_id: Uuid) -> Result<Vec<AlternativeJournal>> {
        let tables = self.tables.lock().unwrap();
        let mut alternatives: Vec<AlternativeJournal> = tables
            .alternatives
            .iter()
            .filter(|a| a.submission_id == submission_id)
            .cloned()
            .collect();
        alternatives.sort_by_key(|a| a.priority);
        Ok(alternatives)
    }

    async fn replace_alternatives(
        &self,
        submission_id: Uuid,
        alternatives: &[NewAlternative],
    ) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.alternatives.retain(|a| a.submission_id != submission_id);
        tables
            .alternatives
            .extend(alternatives.iter().map(|a| AlternativeJournal {
                id: Uuid::new_v4(),
                submission_id,
                journal_name: a.journal_name.clone(),
                journal_issn: a.journal_issn.clone(),
                journal_area: a.journal_area.clone(),
                priority: a.priority,
                reason: a.reason.clone(),
            }));
        Ok(())
    }

    async fn status_counts(&self, journal_id: Option<Uuid>) -> Result<StatusCounts> {
        let tables = self.tables.lock().unwrap();
        let mut counts = StatusCounts::default();
        for submission in tables
            .submissions
            .iter()
            .filter(|s| journal_id.map_or(true, |id| s.journal_id == id))
        {
            counts.add(submission.status, 1);
        }
        Ok(counts)
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn list_reviews(&self, submission_id: Uuid) -> Result<Vec<Review>> {
        let tables = self.tables.lock().unwrap();
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| r.submission_id == submission_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        Ok(reviews)
    }

    async fn list_all_reviews(&self) -> Result<Vec<Review>> {
        let tables = self.tables.lock().unwrap();
        let mut reviews = tables.reviews.clone();
        reviews.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        Ok(reviews)
    }

    async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn create_review(&self, submission_id: Uuid, input: &NewReview) -> Result<Review> {
        let review = Review {
            id: Uuid::new_v4(),
            submission_id,
            received_at: input.received_at,
            reviewer_count: input.reviewer_count,
            request_1: input.exchange(0).request,
            response_1: input.exchange(0).response,
            request_2: input.exchange(1).request,
            response_2: input.exchange(1).response,
            request_3: input.exchange(2).request,
            response_3: input.exchange(2).response,
            request_4: input.exchange(3).request,
            response_4: input.exchange(3).response,
            comments: input.comments.clone(),
            reviewer_id: input.reviewer_id.clone(),
            score: None,
            suggestion: None,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().reviews.push(review.clone());
        Ok(review)
    }

    async fn update_review(&self, id: Uuid, input: &NewReview) -> Result<Option<Review>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(review) = tables.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        review.received_at = input.received_at;
        review.reviewer_count = input.reviewer_count;
        review.request_1 = input.exchange(0).request;
        review.response_1 = input.exchange(0).response;
        review.request_2 = input.exchange(1).request;
        review.response_2 = input.exchange(1).response;
        review.request_3 = input.exchange(2).request;
        review.response_3 = input.exchange(2).response;
        review.request_4 = input.exchange(3).request;
        review.response_4 = input.exchange(3).response;
        review.comments = input.comments.clone();
        Ok(Some(review.clone()))
    }

    async fn record_assessment(
        &self,
        id: Uuid,
        score: Option<i32>,
        suggestion: &str,
    ) -> Result<Option<Review>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(review) = tables.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        review.score = score;
        review.suggestion = Some(suggestion.to_string());
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.reviews.len();
        tables.reviews.retain(|r| r.id != id);
        Ok(tables.reviews.len() != before)
    }
}

#[cfg(test)]
pub mod memory;
mod models;

pub use models::*;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::store::{JournalStore, ReviewStore, SubmissionStore};

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres-backed implementation of the store ports.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JournalStore for PgStore {
    async fn get_journal(&self, id: Uuid) -> Result<Option<Journal>> {
        let journal = sqlx::query_as::<_, Journal>("SELECT * FROM journals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(journal)
    }

    async fn list_journals(&self) -> Result<Vec<Journal>> {
        let journals = sqlx::query_as::<_, Journal>("SELECT * FROM journals ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(journals)
    }

    async fn search_journals(&self, query: &str) -> Result<Vec<Journal>> {
        let journals = sqlx::query_as::<_, Journal>(
            r#"
            SELECT * FROM journals
            WHERE name ILIKE '%' || $1 || '%'
               OR issn ILIKE '%' || $1 || '%'
               OR area ILIKE '%' || $1 || '%'
            ORDER BY name ASC
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await?;
        Ok(journals)
    }

    async fn create_journal(&self, input: &JournalInput) -> Result<Journal> {
        let journal = sqlx::query_as::<_, Journal>(
            r#"
            INSERT INTO journals (id, name, issn, area, qualis, description, publisher,
                                  abdc, abs, sjr_quartile, sjr_score, jcr_quartile, jcr_impact_factor)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.issn)
        .bind(&input.area)
        .bind(&input.qualis)
        .bind(&input.description)
        .bind(&input.publisher)
        .bind(&input.abdc)
        .bind(&input.abs)
        .bind(&input.sjr_quartile)
        .bind(&input.sjr_score)
        .bind(&input.jcr_quartile)
        .bind(&input.jcr_impact_factor)
        .fetch_one(&self.pool)
        .await?;
        Ok(journal)
    }

    async fn update_journal(&self, id: Uuid, patch: &JournalPatch) -> Result<Option<Journal>> {
        let journal = sqlx::query_as::<_, Journal>(
            r#"
            UPDATE journals SET
                name = COALESCE($2, name),
                issn = COALESCE($3, issn),
                area = COALESCE($4, area),
                qualis = COALESCE($5, qualis),
                description = COALESCE($6, description),
                publisher = COALESCE($7, publisher),
                abdc = COALESCE($8, abdc),
                abs = COALESCE($9, abs),
                sjr_quartile = COALESCE($10, sjr_quartile),
                sjr_score = COALESCE($11, sjr_score),
                jcr_quartile = COALESCE($12, jcr_quartile),
                jcr_impact_factor = COALESCE($13, jcr_impact_factor),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.issn)
        .bind(&patch.area)
        .bind(&patch.qualis)
        .bind(&patch.description)
        .bind(&patch.publisher)
        .bind(&patch.abdc)
        .bind(&patch.abs)
        .bind(&patch.sjr_quartile)
        .bind(&patch.sjr_score)
        .bind(&patch.jcr_quartile)
        .bind(&patch.jcr_impact_factor)
        .fetch_optional(&self.pool)
        .await?;
        Ok(journal)
    }

    async fn delete_journal(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM journals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn most_used_journals(&self, limit: i64) -> Result<Vec<JournalUsage>> {
        let usage = sqlx::query_as::<_, JournalUsage>(
            r#"
            SELECT j.*, COUNT(s.id) AS total_submissions
            FROM journals j
            LEFT JOIN submissions s ON s.journal_id = j.id
            GROUP BY j.id
            ORDER BY total_submissions DESC, j.name ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(usage)
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>> {
        let submission =
            sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(submission)
    }

    async fn list_submissions(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"
            SELECT * FROM submissions
            WHERE ($1::submission_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR journal_id = $2)
              AND ($3::text IS NULL OR creator_id = $3)
            ORDER BY submitted_at DESC
            LIMIT $4
            "#,
        )
        .bind(filter.status)
        .bind(filter.journal_id)
        .bind(&filter.creator_id)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    async fn create_submission(&self, input: &NewSubmission, note: &str) -> Result<Submission> {
        let mut tx = self.pool.begin().await?;

        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (id, title, abstract_text, keywords, status, journal_id,
                                     secondary_journal_id, original_submission_id, action_plan, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.abstract_text)
        .bind(&input.keywords)
        .bind(SubmissionStatus::UnderReview)
        .bind(input.journal_id)
        .bind(input.secondary_journal_id)
        .bind(input.original_submission_id)
        .bind(&input.action_plan)
        .bind(&input.creator_id)
        .fetch_one(&mut *tx)
        .await?;

        for author in &input.authors {
            insert_author(&mut tx, submission.id, author).await?;
        }
        for alternative in &input.alternatives {
            insert_alternative(&mut tx, submission.id, alternative).await?;
        }

        sqlx::query("INSERT INTO status_history (submission_id, status, note) VALUES ($1, $2, $3)")
            .bind(submission.id)
            .bind(SubmissionStatus::UnderReview)
            .bind(note)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(submission)
    }

    async fn update_submission(
        &self,
        id: Uuid,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions SET
                title = COALESCE($2, title),
                abstract_text = COALESCE($3, abstract_text),
                keywords = COALESCE($4, keywords),
                action_plan = COALESCE($5, action_plan),
                journal_id = COALESCE($6, journal_id),
                secondary_journal_id = COALESCE($7, secondary_journal_id),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.abstract_text)
        .bind(&patch.keywords)
        .bind(&patch.action_plan)
        .bind(patch.journal_id)
        .bind(patch.secondary_journal_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(submission)
    }

    async fn delete_submission(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_submission_status(&self, id: Uuid, status: SubmissionStatus) -> Result<()> {
        sqlx::query("UPDATE submissions SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn append_history(
        &self,
        submission_id: Uuid,
        status: SubmissionStatus,
        note: &str,
    ) -> Result<StatusHistoryEntry> {
        let entry = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            INSERT INTO status_history (submission_id, status, note)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(submission_id)
        .bind(status)
        .bind(note)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn list_history(&self, submission_id: Uuid) -> Result<Vec<StatusHistoryEntry>> {
        let entries = sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT * FROM status_history WHERE submission_id = $1 ORDER BY changed_at DESC, id DESC",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn list_authors(&self, submission_id: Uuid) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT * FROM authors WHERE submission_id = $1 ORDER BY position ASC",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn replace_authors(&self, submission_id: Uuid, authors: &[NewAuthor]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM authors WHERE submission_id = $1")
            .bind(submission_id)
            .execute(&mut *tx)
            .await?;
        for author in authors {
            insert_author(&mut tx, submission_id, author).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_alternatives(&self, submission_id: Uuid) -> Result<Vec<AlternativeJournal>> {
        let alternatives = sqlx::query_as::<_, AlternativeJournal>(
            "SELECT * FROM alternative_journals WHERE submission_id = $1 ORDER BY priority ASC",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(alternatives)
    }

    async fn replace_alternatives(
        &self,
        submission_id: Uuid,
        alternatives: &[NewAlternative],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM alternative_journals WHERE submission_id = $1")
            .bind(submission_id)
            .execute(&mut *tx)
            .await?;
        for alternative in alternatives {
            insert_alternative(&mut tx, submission_id, alternative).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn status_counts(&self, journal_id: Option<Uuid>) -> Result<StatusCounts> {
        let rows = sqlx::query_as::<_, (SubmissionStatus, i64)>(
            r#"
            SELECT status, COUNT(*) FROM submissions
            WHERE ($1::uuid IS NULL OR journal_id = $1)
            GROUP BY status
            "#,
        )
        .bind(journal_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.add(status, count);
        }
        Ok(counts)
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn list_reviews(&self, submission_id: Uuid) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE submission_id = $1 ORDER BY received_at DESC",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn list_all_reviews(&self) -> Result<Vec<Review>> {
        let reviews =
            sqlx::query_as::<_, Review>("SELECT * FROM reviews ORDER BY received_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(reviews)
    }

    async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn create_review(&self, submission_id: Uuid, input: &NewReview) -> Result<Review> {
        let mut query = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, submission_id, received_at, reviewer_count,
                                 request_1, response_1, request_2, response_2,
                                 request_3, response_3, request_4, response_4,
                                 comments, reviewer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(submission_id)
        .bind(input.received_at)
        .bind(input.reviewer_count);

        for index in 0..MAX_REVIEWERS {
            let exchange = input.exchange(index);
            query = query.bind(exchange.request).bind(exchange.response);
        }

        let review = query
            .bind(&input.comments)
            .bind(&input.reviewer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(review)
    }

    async fn update_review(&self, id: Uuid, input: &NewReview) -> Result<Option<Review>> {
        let mut query = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews SET
                received_at = $2,
                reviewer_count = $3,
                request_1 = $4, response_1 = $5,
                request_2 = $6, response_2 = $7,
                request_3 = $8, response_3 = $9,
                request_4 = $10, response_4 = $11,
                comments = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.received_at)
        .bind(input.reviewer_count);

        for index in 0..MAX_REVIEWERS {
            let exchange = input.exchange(index);
            query = query.bind(exchange.request).bind(exchange.response);
        }

        let review = query
            .bind(&input.comments)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn record_assessment(
        &self,
        id: Uuid,
        score: Option<i32>,
        suggestion: &str,
    ) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            "UPDATE reviews SET score = $2, suggestion = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(score)
        .bind(suggestion)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_author(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    submission_id: Uuid,
    author: &NewAuthor,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO authors (id, submission_id, name, email, institution, position)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(submission_id)
    .bind(&author.name)
    .bind(&author.email)
    .bind(&author.institution)
    .bind(author.position)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_alternative(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    submission_id: Uuid,
    alternative: &NewAlternative,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO alternative_journals (id, submission_id, journal_name, journal_issn,
                                          journal_area, priority, reason)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(submission_id)
    .bind(&alternative.journal_name)
    .bind(&alternative.journal_issn)
    .bind(&alternative.journal_area)
    .bind(alternative.priority)
    .bind(&alternative.reason)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

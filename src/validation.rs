use std::sync::OnceLock;

use regex::Regex;

use crate::db::{
    JournalInput, JournalPatch, NewAlternative, NewAuthor, NewReview, NewSubmission,
    SubmissionPatch, MAX_REVIEWERS,
};
use crate::error::{Error, Result};

const MAX_TITLE: usize = 1000;
const MAX_LONG_TEXT: usize = 5000;
const MAX_KEYWORDS: usize = 500;
const MAX_PERSON_NAME: usize = 300;
const MAX_EMAIL: usize = 320;
const MAX_JOURNAL_NAME: usize = 500;
const MAX_INSTITUTION: usize = 500;
const MAX_AREA: usize = 200;
const MAX_PUBLISHER: usize = 300;
const MAX_RANKING_LABEL: usize = 10;
const MAX_RANKING_SCORE: usize = 20;
const MAX_ISSN: usize = 20;
const MAX_USER_ID: usize = 64;

static ISSN: OnceLock<Regex> = OnceLock::new();
static EMAIL: OnceLock<Regex> = OnceLock::new();

fn issn_regex() -> &'static Regex {
    ISSN.get_or_init(|| Regex::new(r"^\d{4}-\d{3}[\dX]$").expect("static ISSN pattern"))
}

fn email_regex() -> &'static Regex {
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static e-mail pattern"))
}

pub fn is_valid_issn(issn: &str) -> bool {
    issn_regex().is_match(issn.trim())
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

/// Limits count characters, matching `VARCHAR(n)` semantics.
fn max_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::InvalidInput(format!(
            "{} must be at most {} characters, got {}",
            field, max, len
        )));
    }
    Ok(())
}

fn optional_max_len(field: &str, value: &Option<String>, max: usize) -> Result<()> {
    match value.as_deref() {
        Some(value) => max_len(field, value, max),
        None => Ok(()),
    }
}

fn optional_issn(issn: &Option<String>) -> Result<()> {
    match issn.as_deref() {
        Some(issn) if !issn.trim().is_empty() && !is_valid_issn(issn) => Err(Error::InvalidInput(
            format!("ISSN must look like 0000-000X, got {:?}", issn),
        )),
        _ => Ok(()),
    }
}

fn journal_fields(
    issn: &Option<String>,
    area: &Option<String>,
    description: &Option<String>,
    publisher: &Option<String>,
    labels: [(&str, &Option<String>); 5],
    scores: [(&str, &Option<String>); 2],
) -> Result<()> {
    optional_issn(issn)?;
    optional_max_len("issn", issn, MAX_ISSN)?;
    optional_max_len("area", area, MAX_AREA)?;
    optional_max_len("description", description, MAX_LONG_TEXT)?;
    optional_max_len("publisher", publisher, MAX_PUBLISHER)?;
    for (field, value) in labels {
        optional_max_len(field, value, MAX_RANKING_LABEL)?;
    }
    for (field, value) in scores {
        optional_max_len(field, value, MAX_RANKING_SCORE)?;
    }
    Ok(())
}

pub fn journal(input: &JournalInput) -> Result<()> {
    required("name", &input.name)?;
    max_len("name", &input.name, MAX_JOURNAL_NAME)?;
    journal_fields(
        &input.issn,
        &input.area,
        &input.description,
        &input.publisher,
        [
            ("qualis", &input.qualis),
            ("abdc", &input.abdc),
            ("abs", &input.abs),
            ("sjr_quartile", &input.sjr_quartile),
            ("jcr_quartile", &input.jcr_quartile),
        ],
        [
            ("sjr_score", &input.sjr_score),
            ("jcr_impact_factor", &input.jcr_impact_factor),
        ],
    )
}

pub fn journal_patch(patch: &JournalPatch) -> Result<()> {
    if let Some(name) = &patch.name {
        required("name", name)?;
        max_len("name", name, MAX_JOURNAL_NAME)?;
    }
    journal_fields(
        &patch.issn,
        &patch.area,
        &patch.description,
        &patch.publisher,
        [
            ("qualis", &patch.qualis),
            ("abdc", &patch.abdc),
            ("abs", &patch.abs),
            ("sjr_quartile", &patch.sjr_quartile),
            ("jcr_quartile", &patch.jcr_quartile),
        ],
        [
            ("sjr_score", &patch.sjr_score),
            ("jcr_impact_factor", &patch.jcr_impact_factor),
        ],
    )
}

pub fn authors(authors: &[NewAuthor]) -> Result<()> {
    for author in authors {
        required("author name", &author.name)?;
        max_len("author name", &author.name, MAX_PERSON_NAME)?;
        optional_max_len("author institution", &author.institution, MAX_INSTITUTION)?;
        if let Some(email) = author.email.as_deref().filter(|e| !e.trim().is_empty()) {
            max_len("author email", email, MAX_EMAIL)?;
            if !is_valid_email(email) {
                return Err(Error::InvalidInput(format!(
                    "author email is not a valid address: {:?}",
                    email
                )));
            }
        }
        if author.position < 0 {
            return Err(Error::InvalidInput("author position must not be negative".into()));
        }
    }
    Ok(())
}

pub fn alternatives(alternatives: &[NewAlternative]) -> Result<()> {
    for alternative in alternatives {
        required("alternative journal name", &alternative.journal_name)?;
        max_len(
            "alternative journal name",
            &alternative.journal_name,
            MAX_JOURNAL_NAME,
        )?;
        optional_max_len("alternative journal issn", &alternative.journal_issn, MAX_ISSN)?;
        optional_max_len("alternative journal area", &alternative.journal_area, MAX_AREA)?;
        optional_max_len("alternative reason", &alternative.reason, MAX_LONG_TEXT)?;
    }
    Ok(())
}

pub fn submission(input: &NewSubmission) -> Result<()> {
    required("title", &input.title)?;
    max_len("title", &input.title, MAX_TITLE)?;
    required("abstract", &input.abstract_text)?;
    max_len("abstract", &input.abstract_text, MAX_LONG_TEXT)?;
    required("keywords", &input.keywords)?;
    max_len("keywords", &input.keywords, MAX_KEYWORDS)?;
    optional_max_len("action_plan", &input.action_plan, MAX_LONG_TEXT)?;
    required("creator_id", &input.creator_id)?;
    max_len("creator_id", &input.creator_id, MAX_USER_ID)?;
    authors(&input.authors)?;
    alternatives(&input.alternatives)
}

/// Same bounds as [`submission`] for the fields present in the patch.
pub fn submission_patch(patch: &SubmissionPatch) -> Result<()> {
    for (field, value, max) in [
        ("title", &patch.title, MAX_TITLE),
        ("abstract", &patch.abstract_text, MAX_LONG_TEXT),
        ("keywords", &patch.keywords, MAX_KEYWORDS),
    ] {
        if let Some(value) = value {
            required(field, value)?;
            max_len(field, value, max)?;
        }
    }
    optional_max_len("action_plan", &patch.action_plan, MAX_LONG_TEXT)
}

pub fn review(input: &NewReview) -> Result<()> {
    let count = input.reviewer_count;
    if !(1..=MAX_REVIEWERS as i32).contains(&count) {
        return Err(Error::InvalidInput(format!(
            "reviewer_count must be between 1 and {}, got {}",
            MAX_REVIEWERS, count
        )));
    }
    if input.exchanges.len() > MAX_REVIEWERS {
        return Err(Error::InvalidInput(format!(
            "at most {} reviewer exchanges are allowed",
            MAX_REVIEWERS
        )));
    }
    let extra = input
        .exchanges
        .iter()
        .skip(count as usize)
        .any(|exchange| !exchange.is_blank());
    if extra {
        return Err(Error::InvalidInput(format!(
            "only {} reviewer exchanges may be filled in",
            count
        )));
    }
    for (i, exchange) in input.exchanges.iter().enumerate() {
        let n = i + 1;
        optional_max_len(&format!("reviewer {} request", n), &exchange.request, MAX_LONG_TEXT)?;
        optional_max_len(&format!("reviewer {} response", n), &exchange.response, MAX_LONG_TEXT)?;
    }
    optional_max_len("comments", &input.comments, MAX_LONG_TEXT)?;
    optional_max_len("reviewer_id", &input.reviewer_id, MAX_USER_ID)
}

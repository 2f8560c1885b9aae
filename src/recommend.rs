//! Resubmission suggestions: ranks catalog journals by estimated fit for a
//! submission that is leaving its current journal.

use serde::Serialize;
use uuid::Uuid;

use crate::db::{Journal, Submission};
use crate::error::Result;
use crate::store::{JournalStore, SubmissionStore};

pub const MAX_SUGGESTIONS: usize = 10;

const AREA_WEIGHT: f64 = 40.0;
const KEYWORD_WEIGHT: f64 = 10.0;
/// Stand-in for a submission-count signal worth up to 20 points.
const POPULARITY_PLACEHOLDER: f64 = 10.0;
/// Score for journals without a recognised qualis tier.
const UNRANKED_QUALIS_POINTS: f64 = 9.0;
/// Tiers named in the reasons text.
const TOP_TIERS: [QualisTier; 3] = [QualisTier::A1, QualisTier::A2, QualisTier::B1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualisTier {
    A1,
    A2,
    B1,
    B2,
    B3,
    B4,
    B5,
}

impl QualisTier {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "A1" => Some(QualisTier::A1),
            "A2" => Some(QualisTier::A2),
            "B1" => Some(QualisTier::B1),
            "B2" => Some(QualisTier::B2),
            "B3" => Some(QualisTier::B3),
            "B4" => Some(QualisTier::B4),
            "B5" => Some(QualisTier::B5),
            _ => None,
        }
    }

    pub fn points(&self) -> f64 {
        match self {
            QualisTier::A1 => 30.0,
            QualisTier::A2 => 27.0,
            QualisTier::B1 => 22.5,
            QualisTier::B2 => 18.0,
            QualisTier::B3 => 13.5,
            QualisTier::B4 => 9.0,
            QualisTier::B5 => 6.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualisTier::A1 => "A1",
            QualisTier::A2 => "A2",
            QualisTier::B1 => "B1",
            QualisTier::B2 => "B2",
            QualisTier::B3 => "B3",
            QualisTier::B4 => "B4",
            QualisTier::B5 => "B5",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    High,
    Medium,
    Low,
}

impl Alignment {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            Alignment::High
        } else if score >= 60 {
            Alignment::Medium
        } else {
            Alignment::Low
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub journal: Journal,
    pub score: u32,
    pub alignment: Alignment,
    pub reasons: String,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// Full points for the same area, 60% when one contains the other, 20%
/// otherwise. Nothing when either side has no area.
fn area_points(current_area: Option<&str>, candidate: &Journal) -> f64 {
    let (Some(current), Some(candidate)) = (current_area, non_blank(&candidate.area)) else {
        return 0.0;
    };
    if candidate == current {
        AREA_WEIGHT
    } else if candidate.contains(current) || current.contains(candidate.as_str()) {
        AREA_WEIGHT * 0.6
    } else {
        AREA_WEIGHT * 0.2
    }
}

fn qualis_points(candidate: &Journal) -> f64 {
    candidate
        .qualis
        .as_deref()
        .and_then(QualisTier::parse)
        .map_or(UNRANKED_QUALIS_POINTS, |tier| tier.points())
}

pub fn keyword_terms(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

fn keyword_points(terms: &[String], candidate: &Journal) -> f64 {
    let Some(description) = non_blank(&candidate.description) else {
        return 0.0;
    };
    if terms.is_empty() {
        return 0.0;
    }
    let matches = terms
        .iter()
        .filter(|term| description.contains(term.as_str()))
        .count();
    matches as f64 / terms.len() as f64 * KEYWORD_WEIGHT
}

fn reasons(current_area: Option<&str>, candidate: &Journal) -> String {
    let mut reasons = Vec::new();
    if current_area.is_some() && non_blank(&candidate.area).as_deref() == current_area {
        reasons.push("Same subject area".to_string());
    }
    if let Some(tier) = candidate.qualis.as_deref().and_then(QualisTier::parse) {
        if TOP_TIERS.contains(&tier) {
            reasons.push(format!("Qualis {} rating", tier.label()));
        }
    }
    if reasons.is_empty() {
        "Relevant journal in the field".to_string()
    } else {
        reasons.join(", ")
    }
}

/// Scores every catalog journal except the submission's own and keeps the
/// best ten. Ties keep catalog order.
pub fn rank(submission: &Submission, current: Option<&Journal>, catalog: &[Journal]) -> Vec<Suggestion> {
    let current_area = current.and_then(|j| non_blank(&j.area));
    let current_area = current_area.as_deref();
    let terms = keyword_terms(&submission.keywords);

    let mut suggestions: Vec<Suggestion> = catalog
        .iter()
        .filter(|journal| journal.id != submission.journal_id)
        .map(|journal| {
            let total = area_points(current_area, journal)
                + qualis_points(journal)
                + keyword_points(&terms, journal)
                + POPULARITY_PLACEHOLDER;
            let score = total.round() as u32;
            Suggestion {
                journal: journal.clone(),
                score,
                alignment: Alignment::from_score(score),
                reasons: reasons(current_area, journal),
            }
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.cmp(&a.score));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

async fn load_and_rank<S>(store: &S, submission_id: Uuid) -> Result<Vec<Suggestion>>
where
    S: SubmissionStore + JournalStore + ?Sized,
{
    let Some(submission) = store.get_submission(submission_id).await? else {
        tracing::debug!(%submission_id, "No suggestions for unknown submission");
        return Ok(Vec::new());
    };
    let current = store.get_journal(submission.journal_id).await?;
    let catalog = store.list_journals().await?;
    Ok(rank(&submission, current.as_ref(), &catalog))
}

/// Advisory read: any failure yields an empty list.
pub async fn suggest<S>(store: &S, submission_id: Uuid) -> Vec<Suggestion>
where
    S: SubmissionStore + JournalStore + ?Sized,
{
    match load_and_rank(store, submission_id).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            tracing::warn!(%submission_id, "Journal suggestions unavailable: {}", e);
            Vec::new()
        }
    }
}

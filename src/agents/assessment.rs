use regex::Regex;
use std::sync::OnceLock;

static SCORE: OnceLock<Regex> = OnceLock::new();
static SUGGESTION: OnceLock<Regex> = OnceLock::new();

fn score_regex() -> &'static Regex {
    SCORE.get_or_init(|| {
        Regex::new(r"(?i)FINAL SCORE:\s*\**\s*(\d{1,3})").expect("static score pattern")
    })
}

fn suggestion_regex() -> &'static Regex {
    SUGGESTION.get_or_init(|| {
        Regex::new(r"(?is)SUGGESTION:\s*(.+?)\s*(?:FINAL SCORE:|\z)")
            .expect("static suggestion pattern")
    })
}

#[derive(Debug, PartialEq)]
pub struct Assessment {
    /// 0..=100; `None` when the model did not state a score
    pub score: Option<i32>,
    pub suggestion: String,
}

pub fn parse_assessment(text: &str) -> Assessment {
    let score = score_regex()
        .captures_iter(text)
        .last()
        .and_then(|c| c[1].parse::<i32>().ok())
        .map(|s| s.clamp(0, 100));

    let suggestion = suggestion_regex()
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            // Without a SUGGESTION section keep the opening paragraph.
            let first = text.split("\n\n").next().unwrap_or(text).trim();
            truncate(first, 1000)
        });

    Assessment { score, suggestion }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

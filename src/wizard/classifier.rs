//! Local keyword classifier used by the mock analysis step
//!
//! Assigns a coarse domain, a complexity estimate, a core-issue excerpt and
//! constraint sentences from nothing but the problem text.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::models::{ComplexityEstimate, StructuredData};

pub const DEFAULT_DOMAIN: &str = "general";

const CORE_ISSUE_MAX_CHARS: usize = 160;

/// Domain keyword table; earlier rows win ties
const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "business",
        &[
            "revenue", "market", "customer", "customers", "sales", "profit", "startup",
            "company", "competitor", "competitors", "pricing", "growth", "hiring", "investor",
        ],
    ),
    (
        "technology",
        &[
            "software", "code", "platform", "data", "ai", "cloud", "security", "infrastructure",
            "app", "technical", "migration", "outage", "api",
        ],
    ),
    (
        "geopolitics",
        &[
            "country", "countries", "government", "election", "sanction", "sanctions",
            "trade war", "diplomacy", "diplomatic", "military", "treaty", "border", "nation",
            "nations", "geopolitical", "alliance",
        ],
    ),
    (
        "personal",
        &[
            "career", "relationship", "family", "habit", "habits", "personal", "life", "friend",
            "friends", "job offer", "motivation",
        ],
    ),
    (
        "health",
        &[
            "health", "medical", "doctor", "treatment", "diagnosis", "symptom", "symptoms",
            "fitness", "diet", "patient", "patients", "hospital",
        ],
    ),
];

fn sentence_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?\n]+").expect("valid sentence regex"))
}

fn constraint_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(must|cannot|can't|budget|deadline|limited|only)\b")
            .expect("valid constraint regex")
    })
}

/// Normalize a user- or service-supplied domain label
pub fn normalize_domain(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    match lower.as_str() {
        "" => DEFAULT_DOMAIN.to_string(),
        "geopolitical" | "politics" | "international" => "geopolitics".to_string(),
        "tech" | "engineering" => "technology".to_string(),
        "medical" | "healthcare" => "health".to_string(),
        _ => lower,
    }
}

/// Classification output for a problem text
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub domain: String,
    pub structured: StructuredData,
    /// Keywords that drove the domain choice
    pub key_factors: Vec<String>,
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Pick the domain with the most keyword hits, `general` when nothing matches
pub fn classify_domain(text: &str) -> (String, Vec<String>) {
    let lower = text.to_lowercase();
    let word_set = words(&lower);

    let mut best: Option<(&str, Vec<String>)> = None;

    for (domain, keywords) in DOMAIN_KEYWORDS {
        let hits: Vec<String> = keywords
            .iter()
            .filter(|k| {
                if k.contains(' ') {
                    lower.contains(*k)
                } else {
                    word_set.contains(**k)
                }
            })
            .map(|k| k.to_string())
            .collect();

        if hits.is_empty() {
            continue;
        }

        let better = match &best {
            None => true,
            Some((_, current)) => hits.len() > current.len(),
        };
        if better {
            best = Some((domain, hits));
        }
    }

    match best {
        Some((domain, hits)) => (domain.to_string(), hits),
        None => (DEFAULT_DOMAIN.to_string(), Vec::new()),
    }
}

fn sentences(text: &str) -> Vec<String> {
    sentence_splitter()
        .split(text)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// First sentence, capped at 160 characters
pub fn core_issue(text: &str) -> String {
    let first = sentences(text)
        .into_iter()
        .next()
        .unwrap_or_else(|| text.trim().to_string());

    if first.chars().count() <= CORE_ISSUE_MAX_CHARS {
        first
    } else {
        let truncated: String = first.chars().take(CORE_ISSUE_MAX_CHARS).collect();
        format!("{}...", truncated.trim_end())
    }
}

/// Sentences that state a limit on the solution space
pub fn constraints(text: &str) -> Vec<String> {
    sentences(text)
        .into_iter()
        .filter(|s| constraint_marker().is_match(s))
        .collect()
}

pub fn estimate_complexity(text: &str, constraint_count: usize) -> ComplexityEstimate {
    let word_count = text.split_whitespace().count();
    if word_count > 120 || constraint_count >= 3 {
        ComplexityEstimate::High
    } else if word_count > 40 || constraint_count >= 1 {
        ComplexityEstimate::Medium
    } else {
        ComplexityEstimate::Low
    }
}

/// Classify a problem. An explicit domain overrides keyword classification.
pub fn classify(text: &str, explicit_domain: Option<&str>) -> Classification {
    let (classified, key_factors) = classify_domain(text);
    let domain = match explicit_domain {
        Some(d) if !d.trim().is_empty() => normalize_domain(d),
        _ => classified,
    };

    let constraints = constraints(text);
    let complexity = estimate_complexity(text, constraints.len());

    Classification {
        domain,
        structured: StructuredData {
            core_issue: core_issue(text),
            complexity,
            constraints,
        },
        key_factors,
    }
}

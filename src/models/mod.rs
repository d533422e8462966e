// Data models matching the frontend TypeScript types

pub mod state_machine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::export::ExportFormat;

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ModelCategory {
    DecisionMaking,
    ProblemSolving,
    Systems,
    Strategy,
    Psychology,
    Economics,
}

impl ModelCategory {
    /// Returns all categories in display order
    pub fn all() -> &'static [ModelCategory] {
        &[
            ModelCategory::DecisionMaking,
            ModelCategory::ProblemSolving,
            ModelCategory::Systems,
            ModelCategory::Strategy,
            ModelCategory::Psychology,
            ModelCategory::Economics,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelCategory::DecisionMaking => "decision_making",
            ModelCategory::ProblemSolving => "problem_solving",
            ModelCategory::Systems => "systems",
            ModelCategory::Strategy => "strategy",
            ModelCategory::Psychology => "psychology",
            ModelCategory::Economics => "economics",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelCategory::DecisionMaking => "Decision Making",
            ModelCategory::ProblemSolving => "Problem Solving",
            ModelCategory::Systems => "Systems",
            ModelCategory::Strategy => "Strategy",
            ModelCategory::Psychology => "Psychology",
            ModelCategory::Economics => "Economics",
        }
    }
}

impl std::fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        ModelCategory::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown category: '{}'. Expected one of: decision_making, problem_solving, systems, strategy, psychology, economics",
                    s
                )
            })
    }
}

/// Usage and quality figures attached to a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Percentage 0-100
    pub accuracy: u8,
    pub usage_count: u32,
    /// Percentage 0-100
    pub success_rate: u8,
    /// Percentage 0-100
    pub relevance: u8,
}

/// A named reasoning framework. Never mutated after the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalModel {
    pub id: String,
    pub name: String,
    pub category: ModelCategory,
    /// 1-10
    pub complexity: u8,
    #[serde(default)]
    pub scenarios: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub limitations: Vec<String>,
    #[serde(default)]
    pub case_study: Option<String>,
    #[serde(default)]
    pub metrics: Option<PerformanceMetrics>,
}

// =============================================================================
// Problem submission
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }

    /// High and critical urgency favour simpler models
    pub fn favors_simplicity(&self) -> bool {
        matches!(self, Urgency::High | Urgency::Critical)
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Medium
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityEstimate {
    Low,
    Medium,
    High,
}

/// Fields derived from the raw problem text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredData {
    pub core_issue: String,
    pub complexity: ComplexityEstimate,
    pub constraints: Vec<String>,
}

/// What the user typed into the first wizard step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemInput {
    pub text: String,
    /// Explicit domain; classified from the text when absent
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub context: Option<String>,
}

/// One problem per wizard run, read-only once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSubmission {
    pub id: String,
    pub text: String,
    pub domain: String,
    pub urgency: Urgency,
    pub stakeholders: Vec<String>,
    pub context: Option<String>,
    pub structured: StructuredData,
    pub submitted_at: DateTime<Utc>,
}

// =============================================================================
// Analysis and recommendations
// =============================================================================

/// Canonical model-selection record shown in the recommendations step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecommendation {
    pub model_id: String,
    pub model_name: String,
    /// 0-100, non-increasing by list position
    pub relevance: u8,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemAnalysis {
    pub domain: String,
    pub complexity: ComplexityEstimate,
    pub core_issue: String,
    pub constraints: Vec<String>,
    pub key_factors: Vec<String>,
}

/// Payload of a successful analysis step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub analysis: ProblemAnalysis,
    pub recommendations: Vec<ModelRecommendation>,
}

/// Outcome of the analysis step, tagged so callers handle both arms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisResult {
    Success { data: AnalysisData },
    Failure { error: String },
}

impl AnalysisResult {
    pub fn failure(error: impl Into<String>) -> Self {
        AnalysisResult::Failure {
            error: error.into(),
        }
    }
}

// =============================================================================
// Solutions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionVariant {
    pub title: String,
    pub description: String,
    /// 0-100
    pub feasibility: u8,
    /// 0-100
    pub innovation: u8,
    pub steps: Vec<String>,
    pub risks: Vec<String>,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Weight used when folding severities into a 0-100 risk score
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Low => 25,
            Severity::Medium => 55,
            Severity::High => 85,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=59 => ConfidenceLevel::Low,
            60..=79 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasRisk {
    pub bias_type: String,
    pub severity: Severity,
    pub evidence: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasAnalysis {
    /// 0-100
    pub risk_score: u8,
    pub biases: Vec<BiasRisk>,
    pub confidence: ConfidenceLevel,
}

/// Generated answer for one selected model; discarded on wizard reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub id: String,
    pub submission_id: String,
    pub model_id: String,
    pub model_name: String,
    pub variants: Vec<SolutionVariant>,
    pub bias_analysis: BiasAnalysis,
    pub stakeholder_views: BTreeMap<String, String>,
    pub export_formats: Vec<ExportFormat>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of generating a single solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SolutionResult {
    Success { data: Solution },
    Failure { error: String },
}

impl SolutionResult {
    pub fn failure(error: impl Into<String>) -> Self {
        SolutionResult::Failure {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str_accepts_display_forms() {
        assert_eq!(
            "decision-making".parse::<ModelCategory>().unwrap(),
            ModelCategory::DecisionMaking
        );
        assert_eq!(
            "Problem Solving".parse::<ModelCategory>().unwrap(),
            ModelCategory::ProblemSolving
        );
        assert!("astrology".parse::<ModelCategory>().is_err());
    }

    #[test]
    fn test_urgency_favors_simplicity() {
        assert!(!Urgency::Low.favors_simplicity());
        assert!(!Urgency::Medium.favors_simplicity());
        assert!(Urgency::High.favors_simplicity());
        assert!(Urgency::Critical.favors_simplicity());
    }

    #[test]
    fn test_confidence_from_score() {
        assert_eq!(ConfidenceLevel::from_score(40), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(60), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(95), ConfidenceLevel::High);
    }

    #[test]
    fn test_analysis_result_is_tagged() {
        let failure = AnalysisResult::failure("service unavailable");
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["outcome"], "failure");
        assert_eq!(value["error"], "service unavailable");
    }

    #[test]
    fn test_problem_input_defaults() {
        let input: ProblemInput = serde_json::from_str(r#"{"text": "Hello"}"#).unwrap();
        assert_eq!(input.urgency, Urgency::Medium);
        assert!(input.domain.is_none());
        assert!(input.stakeholders.is_empty());
    }
}

//! Wizard session state
//!
//! An explicit session object holding everything one wizard run produces.
//! All transitions are synchronous methods; the async analyzer calls happen
//! between a `begin_*` and the matching `complete_*`, identified by a
//! revision token so stale completions (after a reset) are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::classifier::classify;
use crate::export::ExportError;
use crate::models::state_machine::{transition_step, StepTransitionError, WizardStep};
use crate::models::{
    AnalysisResult, ModelRecommendation, ProblemAnalysis, ProblemInput, ProblemSubmission,
    Solution, SolutionResult,
};

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Please describe your problem before continuing")]
    EmptyProblem,

    #[error("Select at least one mental model to generate solutions")]
    NoModelsSelected,

    #[error("A request is already in progress for this session")]
    RequestInFlight,

    #[error("Action requires the {expected} step but the wizard is at {actual}")]
    InvalidStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("Model {0} is not among the recommendations")]
    UnknownModel(String),

    #[error("Completion no longer matches the session (it was reset or restarted)")]
    StaleCompletion,

    #[error("Wizard session not found: {0}")]
    SessionNotFound(String),

    #[error("Nothing to export yet: submit a problem first")]
    NothingToExport,

    #[error("No problem has been submitted in this session")]
    MissingSubmission,

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Transition(#[from] StepTransitionError),
}

impl WizardError {
    /// Inline validation errors, as opposed to flow errors
    pub fn is_validation(&self) -> bool {
        matches!(self, WizardError::EmptyProblem | WizardError::NoModelsSelected)
    }
}

/// Token for an outstanding analysis request
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    pub revision: u64,
    pub submission: ProblemSubmission,
}

/// Token for an outstanding generation request
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub revision: u64,
    pub submission: ProblemSubmission,
    pub model_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession {
    pub id: String,
    pub step: WizardStep,
    pub submission: Option<ProblemSubmission>,
    pub analysis: Option<ProblemAnalysis>,
    pub recommendations: Vec<ModelRecommendation>,
    pub selected_models: Vec<String>,
    pub solutions: Vec<Solution>,
    /// Last user-visible error from a failed request
    pub error: Option<String>,
    /// An analysis or generation request is outstanding
    pub pending: bool,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            step: WizardStep::Input,
            submission: None,
            analysis: None,
            recommendations: Vec::new(),
            selected_models: Vec::new(),
            solutions: Vec::new(),
            error: None,
            pending: false,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn require_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::InvalidStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn require_idle(&self) -> Result<(), WizardError> {
        if self.pending {
            return Err(WizardError::RequestInFlight);
        }
        Ok(())
    }

    fn move_to(&mut self, target: WizardStep) -> Result<(), WizardError> {
        self.step = transition_step(self.step, target)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn clear_derived(&mut self) {
        self.submission = None;
        self.analysis = None;
        self.recommendations.clear();
        self.selected_models.clear();
        self.solutions.clear();
    }

    /// `input → analysis`. Blank text is rejected without touching the session.
    pub fn begin_submission(&mut self, input: ProblemInput) -> Result<PendingAnalysis, WizardError> {
        self.require_idle()?;
        self.require_step(WizardStep::Input)?;

        let text = input.text.trim();
        if text.is_empty() {
            return Err(WizardError::EmptyProblem);
        }

        let classification = classify(text, input.domain.as_deref());
        let stakeholders: Vec<String> = input
            .stakeholders
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let submission = ProblemSubmission {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            domain: classification.domain,
            urgency: input.urgency,
            stakeholders,
            context: input.context.filter(|c| !c.trim().is_empty()),
            structured: classification.structured,
            submitted_at: Utc::now(),
        };

        self.move_to(WizardStep::Analysis)?;
        self.submission = Some(submission.clone());
        self.error = None;
        self.pending = true;
        self.revision += 1;

        Ok(PendingAnalysis {
            revision: self.revision,
            submission,
        })
    }

    fn require_pending(&self, expected: WizardStep, revision: u64) -> Result<(), WizardError> {
        if !self.pending || self.revision != revision || self.step != expected {
            return Err(WizardError::StaleCompletion);
        }
        Ok(())
    }

    /// `analysis → recommendations` on success, back to `input` on failure.
    /// An error leaves the session untouched.
    pub fn complete_analysis(
        &mut self,
        revision: u64,
        result: AnalysisResult,
    ) -> Result<WizardStep, WizardError> {
        self.require_pending(WizardStep::Analysis, revision)?;

        let outcome = match result {
            AnalysisResult::Success { data } if !data.recommendations.is_empty() => Ok(data),
            AnalysisResult::Success { .. } => {
                Err("Analysis returned no recommendations".to_string())
            }
            AnalysisResult::Failure { error } => Err(error),
        };

        let target = if outcome.is_ok() {
            WizardStep::Recommendations
        } else {
            WizardStep::Input
        };
        transition_step(self.step, target)?;

        self.pending = false;
        match outcome {
            Ok(data) => {
                self.move_to(target)?;
                self.analysis = Some(data.analysis);
                self.recommendations = data.recommendations;
                self.selected_models.clear();
            }
            Err(error) => self.fail_to(target, &error)?,
        }

        Ok(self.step)
    }

    fn fail_to(&mut self, target: WizardStep, error: &str) -> Result<(), WizardError> {
        self.move_to(target)?;
        if target == WizardStep::Input {
            self.clear_derived();
        } else {
            self.solutions.clear();
        }
        self.error = Some(error.to_string());
        Ok(())
    }

    /// Toggle one recommended model in or out of the selection
    pub fn toggle_selection(&mut self, model_id: &str) -> Result<&[String], WizardError> {
        self.require_idle()?;
        self.require_step(WizardStep::Recommendations)?;

        if !self.recommendations.iter().any(|r| r.model_id == model_id) {
            return Err(WizardError::UnknownModel(model_id.to_string()));
        }

        if let Some(pos) = self.selected_models.iter().position(|id| id == model_id) {
            self.selected_models.remove(pos);
        } else {
            self.selected_models.push(model_id.to_string());
        }
        self.updated_at = Utc::now();

        Ok(&self.selected_models)
    }

    /// `recommendations → results`. Zero selections are rejected without a state change.
    pub fn begin_generation(&mut self) -> Result<PendingGeneration, WizardError> {
        self.require_idle()?;
        self.require_step(WizardStep::Recommendations)?;

        if self.selected_models.is_empty() {
            return Err(WizardError::NoModelsSelected);
        }

        let submission = self.submission.clone().ok_or(WizardError::MissingSubmission)?;

        self.move_to(WizardStep::Results)?;
        self.error = None;
        self.pending = true;
        self.revision += 1;

        Ok(PendingGeneration {
            revision: self.revision,
            submission,
            model_ids: self.selected_models.clone(),
        })
    }

    /// Apply generation results. Any failure discards every solution and
    /// returns to `recommendations`.
    pub fn complete_generation(
        &mut self,
        revision: u64,
        results: Vec<SolutionResult>,
    ) -> Result<WizardStep, WizardError> {
        self.require_pending(WizardStep::Results, revision)?;

        let submission_id = self
            .submission
            .as_ref()
            .map(|s| s.id.clone())
            .unwrap_or_default();

        let mut solutions = Vec::with_capacity(results.len());
        let mut errors = Vec::new();

        for result in results {
            match result {
                SolutionResult::Success { data: mut solution } => {
                    if !self.selected_models.contains(&solution.model_id) {
                        errors.push(format!(
                            "Solution returned for unselected model {}",
                            solution.model_id
                        ));
                        continue;
                    }
                    solution.submission_id = submission_id.clone();
                    solutions.push(solution);
                }
                SolutionResult::Failure { error } => errors.push(error),
            }
        }

        if solutions.is_empty() && errors.is_empty() {
            errors.push("No solutions were generated".to_string());
        }

        if errors.is_empty() {
            self.pending = false;
            self.solutions = solutions;
            self.updated_at = Utc::now();
        } else {
            transition_step(self.step, WizardStep::Recommendations)?;
            self.pending = false;
            self.fail_to(WizardStep::Recommendations, &errors.join("; "))?;
        }

        Ok(self.step)
    }

    /// Any step → `input`, clearing all derived data
    pub fn reset(&mut self) {
        self.step = WizardStep::Input;
        self.clear_derived();
        self.error = None;
        self.pending = false;
        self.revision += 1;
        self.updated_at = Utc::now();
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

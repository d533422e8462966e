// Wizard step state machine with validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Steps of the problem wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Problem text entry
    Input,
    /// Classification / external analysis in flight
    Analysis,
    /// Model selection
    Recommendations,
    /// Solution display
    Results,
}

impl WizardStep {
    /// Get all steps in order
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::Input,
            WizardStep::Analysis,
            WizardStep::Recommendations,
            WizardStep::Results,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Input => "input",
            WizardStep::Analysis => "analysis",
            WizardStep::Recommendations => "recommendations",
            WizardStep::Results => "results",
        }
    }

    /// Get the step index (0-based)
    pub fn index(&self) -> usize {
        match self {
            WizardStep::Input => 0,
            WizardStep::Analysis => 1,
            WizardStep::Recommendations => 2,
            WizardStep::Results => 3,
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::Input
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StepTransitionError {
    #[error("Invalid wizard transition from {from} to {to}")]
    InvalidTransition { from: WizardStep, to: WizardStep },
}

/// Validates if the wizard can move from one step to another
pub fn can_transition(from: WizardStep, to: WizardStep) -> bool {
    match (from, to) {
        (WizardStep::Input, WizardStep::Analysis) => true,

        // Analysis resolves forward on success, back to input on failure
        (WizardStep::Analysis, WizardStep::Recommendations) => true,
        (WizardStep::Analysis, WizardStep::Input) => true,

        // Generation resolves in place on success, back to selection on failure
        (WizardStep::Recommendations, WizardStep::Results) => true,
        (WizardStep::Results, WizardStep::Recommendations) => true,

        // Reset is always allowed
        (_, WizardStep::Input) => true,

        _ => false,
    }
}

/// Validates and performs a step transition
pub fn transition_step(
    current: WizardStep,
    target: WizardStep,
) -> Result<WizardStep, StepTransitionError> {
    if !can_transition(current, target) {
        return Err(StepTransitionError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    Ok(target)
}

/// Steps where the user can act (as opposed to waiting on a request)
pub fn is_interactive_step(step: WizardStep) -> bool {
    !matches!(step, WizardStep::Analysis)
}

/// Get all valid next steps from the current step
pub fn valid_next_steps(current: WizardStep) -> Vec<WizardStep> {
    WizardStep::all()
        .iter()
        .copied()
        .filter(|&step| step != current && can_transition(current, step))
        .collect()
}

//! Problem wizard
//!
//! Drives the `input → analysis → recommendations → results` flow:
//!
//! - `state`: the session object and its synchronous transitions
//! - `manager`: session registry, analyzer calls, persistence and events
//! - `analyzer`: mock / remote / fallback analysis collaborators
//! - `classifier`, `recommend`, `solution`: the local mock generators
//! - `scores`: seedable randomness shared by the mock generators

pub mod analyzer;
pub mod classifier;
pub mod manager;
pub mod recommend;
pub mod scores;
pub mod solution;
pub mod state;


pub use analyzer::{
    AnalysisRequest, FallbackAnalyzer, MockAnalyzer, ProblemAnalyzer, RemoteAnalyzer,
    SolutionRequest,
};
pub use manager::WizardManager;
pub use scores::ScoreSource;
pub use state::{PendingAnalysis, PendingGeneration, WizardError, WizardSession};

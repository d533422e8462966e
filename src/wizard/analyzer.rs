//! Analysis / solution-generation collaborators
//!
//! `MockAnalyzer` runs the local classifier and mock generators,
//! `RemoteAnalyzer` calls an external analysis function over HTTP, and
//! `FallbackAnalyzer` retries the analysis step locally when the remote
//! service fails. Solution generation has no fallback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::classifier::classify;
use super::recommend::recommend_models;
use super::scores::ScoreSource;
use super::solution::generate_solution;
use crate::models::{
    AnalysisData, AnalysisResult, MentalModel, ProblemAnalysis, ProblemSubmission, SolutionResult,
    Urgency,
};

/// Input to the analysis step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub submission_id: String,
    pub problem_text: String,
    pub domain: String,
    pub urgency: Urgency,
    pub stakeholders: Vec<String>,
    pub context: Option<String>,
}

impl AnalysisRequest {
    pub fn from_submission(submission: &ProblemSubmission) -> Self {
        Self {
            submission_id: submission.id.clone(),
            problem_text: submission.text.clone(),
            domain: submission.domain.clone(),
            urgency: submission.urgency,
            stakeholders: submission.stakeholders.clone(),
            context: submission.context.clone(),
        }
    }
}

/// Input to solution generation for one model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionRequest {
    pub submission: ProblemSubmission,
    pub model_id: String,
}

#[async_trait]
pub trait ProblemAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, request: &AnalysisRequest, catalog: &[MentalModel]) -> AnalysisResult;

    async fn generate_solution(
        &self,
        request: &SolutionRequest,
        catalog: &[MentalModel],
    ) -> SolutionResult;
}

// =============================================================================
// Mock
// =============================================================================

/// Local classifier + mock generators with a seedable score source
pub struct MockAnalyzer {
    scores: Mutex<ScoreSource>,
    delay: Duration,
}

impl MockAnalyzer {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            scores: Mutex::new(ScoreSource::from_optional_seed(seed)),
            delay: Duration::ZERO,
        }
    }

    /// Simulated latency before each response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl ProblemAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, request: &AnalysisRequest, catalog: &[MentalModel]) -> AnalysisResult {
        self.simulate_latency().await;

        let classification = classify(&request.problem_text, Some(&request.domain));

        let recommendations = {
            let mut scores = match self.scores.lock() {
                Ok(guard) => guard,
                Err(e) => return AnalysisResult::failure(format!("Failed to acquire lock: {}", e)),
            };
            recommend_models(
                catalog,
                &classification.domain,
                request.urgency,
                &mut scores,
            )
        };

        if recommendations.is_empty() {
            return AnalysisResult::failure("No mental models available for recommendation");
        }

        AnalysisResult::Success {
            data: AnalysisData {
                analysis: ProblemAnalysis {
                    domain: classification.domain,
                    complexity: classification.structured.complexity,
                    core_issue: classification.structured.core_issue,
                    constraints: classification.structured.constraints,
                    key_factors: classification.key_factors,
                },
                recommendations,
            },
        }
    }

    async fn generate_solution(
        &self,
        request: &SolutionRequest,
        catalog: &[MentalModel],
    ) -> SolutionResult {
        self.simulate_latency().await;

        let mut scores = match self.scores.lock() {
            Ok(guard) => guard,
            Err(e) => return SolutionResult::failure(format!("Failed to acquire lock: {}", e)),
        };

        SolutionResult::Success {
            data: generate_solution(catalog, &request.submission, &request.model_id, &mut scores),
        }
    }
}

// =============================================================================
// Remote
// =============================================================================

/// `{success, data|error}` envelope returned by the analysis function
#[derive(Debug, Deserialize)]
struct RemoteEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
struct RemotePayload<'a> {
    step: &'a str,
    problem_text: &'a str,
    domain: &'a str,
    urgency: Urgency,
    stakeholders: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submission_id: Option<&'a str>,
}

/// Calls an external analysis function over HTTP
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteAnalyzer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    async fn call(&self, payload: &RemotePayload<'_>) -> Result<Value, String> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("Analysis service request failed: {}", e))?;

        let status = response.status();
        let envelope: RemoteEnvelope = response
            .json()
            .await
            .map_err(|e| format!("Analysis service returned invalid JSON ({}): {}", status, e))?;

        if !envelope.success {
            return Err(envelope
                .error
                .unwrap_or_else(|| format!("Analysis service failed with status {}", status)));
        }

        envelope
            .data
            .ok_or_else(|| "Analysis service returned no data".to_string())
    }
}

#[async_trait]
impl ProblemAnalyzer for RemoteAnalyzer {
    fn name(&self) -> &str {
        "remote"
    }

    async fn analyze(&self, request: &AnalysisRequest, _catalog: &[MentalModel]) -> AnalysisResult {
        let payload = RemotePayload {
            step: "analyze",
            problem_text: &request.problem_text,
            domain: &request.domain,
            urgency: request.urgency,
            stakeholders: &request.stakeholders,
            context: request.context.as_deref(),
            model_id: None,
            submission_id: Some(&request.submission_id),
        };

        match self.call(&payload).await {
            Ok(data) => match serde_json::from_value::<AnalysisData>(data) {
                Ok(data) => AnalysisResult::Success { data },
                Err(e) => AnalysisResult::failure(format!("Invalid analysis payload: {}", e)),
            },
            Err(e) => AnalysisResult::failure(e),
        }
    }

    async fn generate_solution(
        &self,
        request: &SolutionRequest,
        _catalog: &[MentalModel],
    ) -> SolutionResult {
        let submission = &request.submission;
        let payload = RemotePayload {
            step: "solution",
            problem_text: &submission.text,
            domain: &submission.domain,
            urgency: submission.urgency,
            stakeholders: &submission.stakeholders,
            context: submission.context.as_deref(),
            model_id: Some(&request.model_id),
            submission_id: Some(&submission.id),
        };

        match self.call(&payload).await {
            Ok(data) => match serde_json::from_value(data) {
                Ok(solution) => SolutionResult::Success { data: solution },
                Err(e) => SolutionResult::failure(format!("Invalid solution payload: {}", e)),
            },
            Err(e) => SolutionResult::failure(e),
        }
    }
}

// =============================================================================
// Fallback composition
// =============================================================================

/// Uses `fallback` for the analysis step when `primary` fails
pub struct FallbackAnalyzer {
    primary: Arc<dyn ProblemAnalyzer>,
    fallback: Arc<dyn ProblemAnalyzer>,
}

impl FallbackAnalyzer {
    pub fn new(primary: Arc<dyn ProblemAnalyzer>, fallback: Arc<dyn ProblemAnalyzer>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl ProblemAnalyzer for FallbackAnalyzer {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn analyze(&self, request: &AnalysisRequest, catalog: &[MentalModel]) -> AnalysisResult {
        match self.primary.analyze(request, catalog).await {
            AnalysisResult::Failure { error } => {
                log::warn!(
                    "{} analysis failed, using {} recommendations: {}",
                    self.primary.name(),
                    self.fallback.name(),
                    error
                );
                self.fallback.analyze(request, catalog).await
            }
            success => success,
        }
    }

    async fn generate_solution(
        &self,
        request: &SolutionRequest,
        catalog: &[MentalModel],
    ) -> SolutionResult {
        self.primary.generate_solution(request, catalog).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::builtin_catalog;

    struct AlwaysFails;

    #[async_trait]
    impl ProblemAnalyzer for AlwaysFails {
        fn name(&self) -> &str {
            "always-fails"
        }

        async fn analyze(&self, _: &AnalysisRequest, _: &[MentalModel]) -> AnalysisResult {
            AnalysisResult::failure("upstream down")
        }

        async fn generate_solution(&self, _: &SolutionRequest, _: &[MentalModel]) -> SolutionResult {
            SolutionResult::failure("upstream down")
        }
    }

    fn request(text: &str, domain: &str, urgency: Urgency) -> AnalysisRequest {
        AnalysisRequest {
            submission_id: "sub-1".to_string(),
            problem_text: text.to_string(),
            domain: domain.to_string(),
            urgency,
            stakeholders: vec![],
            context: None,
        }
    }

    #[tokio::test]
    async fn test_mock_analyze_returns_recommendations() {
        let analyzer = MockAnalyzer::new(Some(4));
        let result = analyzer
            .analyze(
                &request("Should we enter a new market?", "business", Urgency::Medium),
                &builtin_catalog(),
            )
            .await;

        match result {
            AnalysisResult::Success { data } => {
                assert_eq!(data.analysis.domain, "business");
                assert!(!data.recommendations.is_empty());
            }
            AnalysisResult::Failure { error } => panic!("unexpected failure: {}", error),
        }
    }

    #[tokio::test]
    async fn test_mock_analyze_fails_on_empty_catalog() {
        let analyzer = MockAnalyzer::new(Some(4));
        let result = analyzer
            .analyze(&request("Anything", "business", Urgency::Low), &[])
            .await;
        assert!(matches!(result, AnalysisResult::Failure { .. }));
    }

    #[tokio::test]
    async fn test_fallback_used_for_analysis_only() {
        let analyzer = FallbackAnalyzer::new(Arc::new(AlwaysFails), Arc::new(MockAnalyzer::new(None)));
        let catalog = builtin_catalog();

        let analysis = analyzer
            .analyze(&request("Border dispute", "geopolitics", Urgency::Critical), &catalog)
            .await;
        match analysis {
            AnalysisResult::Success { data } => {
                assert_eq!(data.recommendations[0].model_id, "occams-razor")
            }
            AnalysisResult::Failure { error } => panic!("fallback should succeed: {}", error),
        }

        let submission = ProblemSubmission {
            id: "sub-1".to_string(),
            text: "Border dispute".to_string(),
            domain: "geopolitics".to_string(),
            urgency: Urgency::Critical,
            stakeholders: vec![],
            context: None,
            structured: crate::models::StructuredData {
                core_issue: "Border dispute".to_string(),
                complexity: crate::models::ComplexityEstimate::Low,
                constraints: vec![],
            },
            submitted_at: chrono::Utc::now(),
        };
        let solution = analyzer
            .generate_solution(
                &SolutionRequest {
                    submission,
                    model_id: "occams-razor".to_string(),
                },
                &catalog,
            )
            .await;
        assert!(matches!(solution, SolutionResult::Failure { .. }));
    }
}

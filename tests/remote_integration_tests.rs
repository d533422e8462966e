// Integration tests for the HTTP collaborators against a mock server:
// remote catalog table, remote analysis function and the tutorial proxy

#[cfg(test)]
mod remote_integration_tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use mindframe_lib::catalog::{
        load_catalog, BuiltinCatalogSource, CatalogOrigin, CatalogState, RemoteCatalogSource,
    };
    use mindframe_lib::events::EventBroadcaster;
    use mindframe_lib::models::{AnalysisResult, ProblemInput, Urgency};
    use mindframe_lib::models::state_machine::WizardStep;
    use mindframe_lib::server::{build_router, ServerAppState, TUTORIAL_PATH};
    use mindframe_lib::shutdown::ShutdownState;
    use mindframe_lib::storage::InMemoryStorage;
    use mindframe_lib::tutorial::{
        GeminiClient, PostgrestProgressStore, SupabaseAuth, TutorService,
    };
    use mindframe_lib::wizard::{
        AnalysisRequest, FallbackAnalyzer, MockAnalyzer, ProblemAnalyzer, RemoteAnalyzer,
        WizardManager,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, header as header_is, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_row(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "category": "strategy",
            "complexity": 4,
            "description": format!("{} description", name),
        })
    }

    #[tokio::test]
    async fn test_remote_catalog_is_loaded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/mental_models"))
            .and(query_param("order", "name.asc"))
            .and(header_is("apikey", "anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                model_row("moat", "Economic Moat"),
                model_row("red-team", "Red Teaming"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let source = RemoteCatalogSource::new(server.uri(), Some("anon".to_string())).unwrap();
        let loaded = load_catalog(&source).await;

        assert_eq!(loaded.origin, CatalogOrigin::Source);
        assert!(loaded.warning.is_none());
        let ids: Vec<&str> = loaded.models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["moat", "red-team"]);
    }

    #[tokio::test]
    async fn test_remote_catalog_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/mental_models"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let source = RemoteCatalogSource::new(server.uri(), None).unwrap();
        let loaded = load_catalog(&source).await;

        assert_eq!(loaded.origin, CatalogOrigin::Fallback);
        assert_eq!(loaded.models.len(), 5);
        assert!(loaded.warning.unwrap().contains("503"));
    }

    fn analysis_request() -> AnalysisRequest {
        AnalysisRequest {
            submission_id: "sub-1".to_string(),
            problem_text: "Should we expand into a second market this year?".to_string(),
            domain: "business".to_string(),
            urgency: Urgency::Medium,
            stakeholders: vec!["Board".to_string()],
            context: None,
        }
    }

    #[tokio::test]
    async fn test_remote_analyzer_parses_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(header_is("authorization", "Bearer secret"))
            .and(body_partial_json(json!({"step": "analyze", "domain": "business"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "analysis": {
                        "domain": "business",
                        "complexity": "medium",
                        "coreIssue": "Market expansion timing",
                        "constraints": [],
                        "keyFactors": ["capital"]
                    },
                    "recommendations": [{
                        "modelId": "second-order-thinking",
                        "modelName": "Second-Order Thinking",
                        "relevance": 88,
                        "rationale": "Expansion has knock-on effects"
                    }]
                }
            })))
            .mount(&server)
            .await;

        let analyzer = RemoteAnalyzer::new(
            format!("{}/analyze", server.uri()),
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        match analyzer.analyze(&analysis_request(), &[]).await {
            AnalysisResult::Success { data } => {
                assert_eq!(data.analysis.core_issue, "Market expansion timing");
                assert_eq!(data.recommendations[0].relevance, 88);
            }
            AnalysisResult::Failure { error } => panic!("unexpected failure: {}", error),
        }
    }

    #[tokio::test]
    async fn test_remote_analyzer_failure_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": false,
                "error": "quota exceeded"
            })))
            .mount(&server)
            .await;

        let analyzer = RemoteAnalyzer::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        let result = analyzer.analyze(&analysis_request(), &[]).await;
        assert_eq!(result, AnalysisResult::failure("quota exceeded"));
    }

    #[tokio::test]
    async fn test_wizard_falls_back_to_local_analysis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let remote = RemoteAnalyzer::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        let analyzer = FallbackAnalyzer::new(Arc::new(remote), Arc::new(MockAnalyzer::new(Some(3))));
        let catalog = Arc::new(CatalogState::new(load_catalog(&BuiltinCatalogSource).await));
        let manager = WizardManager::new(
            Arc::new(analyzer),
            catalog,
            Arc::new(InMemoryStorage::new()),
            Arc::new(EventBroadcaster::new()),
        );

        let session = manager.create_session();
        let input = ProblemInput {
            text: "Our team keeps missing deadlines on the platform migration".to_string(),
            ..Default::default()
        };
        let session = manager.submit_problem(&session.id, input).await.unwrap();

        assert_eq!(session.step, WizardStep::Recommendations);
        assert!(session.error.is_none());
        assert!(!session.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_remote_recommendations_are_ordered_by_relevance() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "analysis": {
                        "domain": "business",
                        "complexity": "medium",
                        "coreIssue": "Launch sequencing",
                        "constraints": [],
                        "keyFactors": []
                    },
                    "recommendations": [
                        {
                            "modelId": "inversion",
                            "modelName": "Inversion",
                            "relevance": 50,
                            "rationale": "List the ways the launch fails"
                        },
                        {
                            "modelId": "not-in-catalog",
                            "modelName": "Unknown",
                            "relevance": 99,
                            "rationale": "Dropped"
                        },
                        {
                            "modelId": "second-order-thinking",
                            "modelName": "Second-Order Thinking",
                            "relevance": 90,
                            "rationale": "Follow the knock-on effects"
                        },
                        {
                            "modelId": "first-principles",
                            "modelName": "First Principles",
                            "relevance": 70,
                            "rationale": "Rebuild the plan from scratch"
                        }
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let remote = RemoteAnalyzer::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        let catalog = Arc::new(CatalogState::new(load_catalog(&BuiltinCatalogSource).await));
        let manager = WizardManager::new(
            Arc::new(remote),
            catalog,
            Arc::new(InMemoryStorage::new()),
            Arc::new(EventBroadcaster::new()),
        );

        let session = manager.create_session();
        let input = ProblemInput {
            text: "Which product line should we launch first next quarter?".to_string(),
            ..Default::default()
        };
        let session = manager.submit_problem(&session.id, input).await.unwrap();

        assert_eq!(session.step, WizardStep::Recommendations);
        let ranked: Vec<(&str, u8)> = session
            .recommendations
            .iter()
            .map(|r| (r.model_id.as_str(), r.relevance))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("second-order-thinking", 90),
                ("first-principles", 70),
                ("inversion", 50),
            ]
        );
    }

    const TUTORIAL_JSON: &str = r#"{
        "title": "Inversion for Beginners",
        "introduction": "Think backwards to avoid failure.",
        "sections": [{"heading": "The idea", "content": "Ask what would guarantee failure."}],
        "exercises": [{"question": "Invert your next project plan."}],
        "keyTakeaways": ["Avoiding stupidity beats seeking brilliance"]
    }"#;

    async fn tutorial_router(server: &MockServer) -> axum::Router {
        let llm = GeminiClient::new(server.uri(), "gemini-pro", "llm-key").unwrap();
        let auth = SupabaseAuth::new(server.uri(), "anon").unwrap();
        let progress = PostgrestProgressStore::new(server.uri(), "anon").unwrap();
        let tutor = TutorService::new(Arc::new(auth), Arc::new(llm), Arc::new(progress));

        let broadcaster = Arc::new(EventBroadcaster::new());
        let catalog = Arc::new(CatalogState::new(load_catalog(&BuiltinCatalogSource).await));
        let wizard = Arc::new(WizardManager::new(
            Arc::new(MockAnalyzer::new(Some(1))),
            catalog.clone(),
            Arc::new(InMemoryStorage::new()),
            broadcaster.clone(),
        ));

        build_router(
            ServerAppState {
                auth_token: "api-token".to_string(),
                catalog,
                catalog_source: Arc::new(BuiltinCatalogSource),
                wizard,
                tutor: Some(Arc::new(tutor)),
                broadcaster,
                shutdown_state: ShutdownState::new(),
            },
            &[],
        )
    }

    async fn post_tutorial(app: axum::Router, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::post(TUTORIAL_PATH).header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let request = request
            .body(Body::from(
                json!({"level": "beginner", "topic": "Inversion", "userProgress": {"completed": 2}})
                    .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_tutorial_generation_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header_is("authorization", "Bearer user-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "user-1", "email": "learner@example.com"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .and(query_param("key", "llm-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": format!("```json\n{}\n```", TUTORIAL_JSON)}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/user_progress"))
            .and(query_param("on_conflict", "user_id,module_id"))
            .and(header_is("prefer", "resolution=merge-duplicates"))
            .and(body_partial_json(json!([{
                "user_id": "user-1",
                "module_id": "inversion-beginner",
                "status": "in_progress"
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let app = tutorial_router(&server).await;
        let (status, body) = post_tutorial(app, Some("Bearer user-token")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["title"], "Inversion for Beginners");
        assert_eq!(body["data"]["sections"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tutorial_without_bearer_fails_before_any_call() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = tutorial_router(&server).await;
        let (status, body) = post_tutorial(app, None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing authorization header");
    }

    #[tokio::test]
    async fn test_tutorial_progress_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-2"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": TUTORIAL_JSON}]}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/user_progress"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&server)
            .await;

        let app = tutorial_router(&server).await;
        let (status, body) = post_tutorial(app, Some("Bearer user-token")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Failed to save progress"));
    }

    #[tokio::test]
    async fn test_tutorial_rejected_token_stops_before_generation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid JWT"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/user_progress"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let app = tutorial_router(&server).await;
        let (status, body) = post_tutorial(app, Some("Bearer expired-token")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("Unauthorized"), "unexpected error: {}", error);
    }
}

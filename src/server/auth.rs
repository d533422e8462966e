//! Authentication middleware for the server
//!
//! Validates Bearer tokens on `/api/*` and `/ws/*`. Everything else (health,
//! version, the tutorial function which resolves its own bearer) is public.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::Layer;

/// Authentication layer that validates Bearer tokens
#[derive(Clone)]
pub struct AuthLayer {
    token: Arc<String>,
}

impl AuthLayer {
    pub fn new(token: String) -> Self {
        Self {
            token: Arc::new(token),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            token: self.token.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    token: Arc<String>,
}

fn query_token(query: Option<&str>) -> Option<&str> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
}

fn is_authorized(req: &Request, token: &str) -> bool {
    let path = req.uri().path();

    // Browsers can't set headers on WebSocket upgrades
    if path.starts_with("/ws/") && query_token(req.uri().query()) == Some(token) {
        return true;
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|provided| provided == token)
        .unwrap_or(false)
}

impl<S> tower::Service<Request> for AuthMiddleware<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let token = self.token.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if req.method() == Method::OPTIONS {
                return inner.call(req).await;
            }

            let path = req.uri().path().to_string();
            let requires_auth = path.starts_with("/api/") || path.starts_with("/ws/");

            if !requires_auth || is_authorized(&req, &token) {
                return inner.call(req).await;
            }

            log::debug!("Rejected unauthenticated request to {}", path);
            Ok((
                StatusCode::UNAUTHORIZED,
                "Unauthorized: Invalid or missing Bearer token",
            )
                .into_response())
        })
    }
}

/// Generate a secure random auth token
pub fn generate_auth_token() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::http::header::AUTHORIZATION;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use tracing::debug;

use super::AuthProvider;
use super::identity::OwnerIdentity;
use crate::error::ServerError;

/// Tower layer that adds authentication middleware.
#[derive(Clone)]
pub struct AuthLayer {
    provider: Option<Arc<AuthProvider>>,
}

impl AuthLayer {
    pub fn new(provider: Option<Arc<AuthProvider>>) -> Self {
        Self { provider }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            provider: self.provider.clone(),
        }
    }
}

/// Tower service that authenticates requests.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    provider: Option<Arc<AuthProvider>>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let provider = self.provider.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(provider) = provider else {
                req.extensions_mut().insert(OwnerIdentity::anonymous());
                return inner.call(req).await;
            };

            let Some(header) = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
            else {
                return Ok(unauthorized("missing authentication credentials"));
            };

            match provider.authenticate_header(header) {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                    inner.call(req).await
                }
                Err(reason) => {
                    debug!(reason, "rejected credentials");
                    Ok(unauthorized(reason))
                }
            }
        })
    }
}

fn unauthorized(message: &str) -> Response {
    ServerError::Unauthorized(message.to_owned()).into_response()
}

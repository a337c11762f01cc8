pub mod fragments;
pub mod health;
pub mod responses;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use fragments_service::FragmentService;

use crate::auth::AuthProvider;
use crate::auth::middleware::AuthLayer;
use crate::error::error_response;

/// Extra request body allowance on top of the fragment size ceiling.
///
/// Bodies between the two limits reach the service and are rejected there
/// with the JSON error envelope.
pub const BODY_LIMIT_HEADROOM: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: FragmentService,
    pub auth: Option<Arc<AuthProvider>>,
    /// Base URL used for `Location` headers; the `Host` header when unset.
    pub external_url: Option<String>,
}

impl AppState {
    pub fn new(service: FragmentService) -> Self {
        Self {
            service,
            auth: None,
            external_url: None,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Arc<AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state
        .service
        .max_fragment_size()
        .saturating_add(BODY_LIMIT_HEADROOM);

    let public = Router::new().route("/", get(health::health));

    let protected = Router::new()
        .route(
            "/v1/fragments",
            get(fragments::list_fragments).post(fragments::create_fragment),
        )
        .route(
            "/v1/fragments/{id}",
            get(fragments::get_fragment)
                .put(fragments::replace_fragment)
                .delete(fragments::delete_fragment),
        )
        .route("/v1/fragments/{id}/info", get(fragments::get_fragment_info))
        .layer(AuthLayer::new(state.auth.clone()));

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found")
}

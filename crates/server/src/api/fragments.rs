use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use super::responses::success;
use crate::auth::identity::OwnerIdentity;
use crate::error::ServerError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// `1` returns full records instead of ids.
    pub expand: Option<String>,
}

fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn fragment_url(state: &AppState, headers: &HeaderMap, id: &str) -> String {
    let base = match &state.external_url {
        Some(url) => url.trim_end_matches('/').to_owned(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}")
        }
    };
    format!("{base}/v1/fragments/{id}")
}

/// `POST /v1/fragments`
pub async fn create_fragment(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let record = state
        .service
        .create_fragment(&identity.owner_id, content_type(&headers), body)
        .await?;
    let location = fragment_url(&state, &headers, &record.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        success(json!({ "fragment": record })),
    )
        .into_response())
}

/// `GET /v1/fragments[?expand=1]`
pub async fn list_fragments(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    Query(params): Query<ListParams>,
) -> Result<Response, ServerError> {
    let expand = params.expand.as_deref() == Some("1");
    let fragments = state
        .service
        .list_fragments(&identity.owner_id, expand)
        .await?;
    Ok(success(json!({ "fragments": fragments })).into_response())
}

/// `GET /v1/fragments/{id}[.ext]`: raw bytes, converted when an extension is given.
pub async fn get_fragment(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    Path(raw_id): Path<String>,
) -> Result<Response, ServerError> {
    let converted = state
        .service
        .get_fragment_by_id(&identity.owner_id, &raw_id)
        .await?;
    Ok(([(CONTENT_TYPE, converted.content_type)], converted.data).into_response())
}

/// `GET /v1/fragments/{id}/info`
pub async fn get_fragment_info(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let record = state
        .service
        .get_fragment_info(&identity.owner_id, &id)
        .await?;
    Ok(success(json!({ "fragment": record })).into_response())
}

/// `PUT /v1/fragments/{id}`
pub async fn replace_fragment(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let record = state
        .service
        .replace_fragment_data(&identity.owner_id, &id, body, content_type(&headers))
        .await?;
    Ok(success(json!({ "fragment": record })).into_response())
}

/// `DELETE /v1/fragments/{id}`
pub async fn delete_fragment(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    state
        .service
        .delete_fragment(&identity.owner_id, &id)
        .await?;
    Ok(success(json!({ "message": "fragment deleted" })).into_response())
}

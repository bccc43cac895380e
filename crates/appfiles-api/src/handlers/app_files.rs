//! Application file route: serves `/apps/{slug}/{version}/{*file}`.

use crate::error::HttpAppError;
use crate::state::AppState;
use appfiles_storage::AssetCoordinate;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method},
    response::Response,
};
use std::sync::Arc;

/// Serve one file of an installed application, with conditional and range support.
#[tracing::instrument(
    skip(state, headers),
    fields(operation = "serve_app_file", slug = %coord.slug, version = %coord.version, file = %coord.file)
)]
pub async fn serve_app_file(
    State(state): State<Arc<AppState>>,
    Path(coord): Path<AssetCoordinate>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let response = state
        .file_server
        .serve_content(&method, &headers, &coord.slug, &coord.version, &coord.file)
        .await
        .map_err(|e| HttpAppError::from(e).with_details(!state.config.is_production()))?;

    tracing::debug!(status = response.status().as_u16(), "Application file served");
    Ok(response)
}

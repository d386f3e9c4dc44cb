//! Flyer submission, download and share.
//!
//! Submission validates and starts a render under the workspace lock,
//! releases it while the product image loads and the canvas is painted,
//! then re-acquires it to store the result. If another submission started
//! in the meantime, this result is stale and is dropped. The image wait is
//! bounded by the configured timeout.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ApiError, api_error, parse_workspace_id, workspace_not_found};
use crate::error::EncarteError;
use crate::export::{self, ExportFormat, SharePayload};
use crate::flyer::{FlyerForm, FlyerSpec};
use crate::render::{Completion, RenderTicket, RenderedFlyer, engine::load_product_image};
use crate::template::TemplateId;

use super::super::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub product_code: String,
    pub template: TemplateId,
    pub discount_percent: i64,
    pub width: u32,
    pub height: u32,
    pub image_loaded: bool,
    pub generation: u64,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    #[serde(flatten)]
    pub payload: SharePayload,
    /// Where to fetch the PNG.
    pub url: String,
}

/// POST /api/workspaces/:id/flyer - validate the form and render it.
///
/// The render runs in its own task, so a client that disconnects midway
/// still leaves the workspace with a finished or failed flyer.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<FlyerForm>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let id = parse_workspace_id(&id)?;

    let (ticket, spec) = {
        let mut workspaces = state.workspaces.write().await;
        let session = workspaces.get_mut(&id).ok_or_else(|| workspace_not_found(id))?;
        session.touch();
        session.workspace.submit(&form).map_err(api_error)?;
        session
            .workspace
            .begin_render()
            .ok_or_else(|| api_error(EncarteError::Render("no flyer submitted".to_string())))?
    };

    tokio::spawn(render_submission(state, id, ticket, spec))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?
}

async fn render_submission(
    state: Arc<AppState>,
    id: Uuid,
    ticket: RenderTicket,
    spec: FlyerSpec,
) -> Result<Json<SubmitResponse>, ApiError> {
    let timeout = state.config.render.image_timeout();
    let image = match tokio::time::timeout(timeout, load_product_image(&spec, state.loader.as_ref())).await {
        Ok(image) => image,
        Err(_) => {
            warn!(%id, url = %spec.product().image_url, "product image timed out, drawing placeholder");
            None
        }
    };

    let result = {
        let state = state.clone();
        let spec = spec.clone();
        tokio::task::spawn_blocking(move || state.renderer.paint(&spec, image.as_ref()))
            .await
            .unwrap_or_else(|e| Err(EncarteError::Render(format!("Task error: {}", e))))
    };

    let mut workspaces = state.workspaces.write().await;
    let session = workspaces.get_mut(&id).ok_or_else(|| workspace_not_found(id))?;
    match session.workspace.complete_render(ticket, result) {
        Completion::Stale => Err((
            StatusCode::CONFLICT,
            "Superseded by a newer submission".to_string(),
        )),
        Completion::Stored => {
            let flyer = current_flyer(&session.workspace)?;
            info!(%id, code = %flyer.product_code, generation = ticket.generation(), "flyer rendered");
            Ok(Json(SubmitResponse {
                product_code: flyer.product_code.clone(),
                template: spec.template(),
                discount_percent: spec.discount_percent(),
                width: flyer.width(),
                height: flyer.height(),
                image_loaded: flyer.image_loaded,
                generation: ticket.generation(),
            }))
        }
    }
}

/// GET /api/workspaces/:id/flyer?format=png|jpg - download the rendered flyer.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let flyer = rendered_flyer(&state, &id).await?;
    let quality = state.config.render.jpeg_quality;

    let file = tokio::task::spawn_blocking(move || export::export(&flyer, query.format, quality))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?
        .map_err(api_error)?;

    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    ))
}

/// GET /api/workspaces/:id/share - share text and a link to the PNG.
pub async fn share(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShareResponse>, ApiError> {
    let flyer = rendered_flyer(&state, &id).await?;
    let payload = SharePayload::describe(&flyer, state.renderer.branding());
    Ok(Json(ShareResponse {
        payload,
        url: format!("/api/workspaces/{}/flyer?format=png", id),
    }))
}

async fn rendered_flyer(state: &AppState, id: &str) -> Result<Arc<RenderedFlyer>, ApiError> {
    let id = parse_workspace_id(id)?;
    let mut workspaces = state.workspaces.write().await;
    let session = workspaces.get_mut(&id).ok_or_else(|| workspace_not_found(id))?;
    session.touch();
    current_flyer(&session.workspace)
}

fn current_flyer(workspace: &crate::workspace::Workspace) -> Result<Arc<RenderedFlyer>, ApiError> {
    let preview = workspace.preview();
    if let Some(flyer) = preview.flyer() {
        return Ok(flyer);
    }
    match preview.error() {
        Some(message) => Err((StatusCode::INTERNAL_SERVER_ERROR, message.to_string())),
        None if preview.is_generating() => Err((StatusCode::CONFLICT, "Gerando encarte...".to_string())),
        None => Err((StatusCode::NOT_FOUND, "No flyer rendered yet".to_string())),
    }
}

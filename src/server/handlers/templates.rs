//! Template listing and selection.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, api_error, parse_workspace_id, workspace_not_found};
use crate::catalog::sample::{TEMPLATE_CONTENT_TYPE, template_csv};
use crate::template::{self, Template, TemplateId};

use super::super::state::AppState;

/// GET /api/templates
pub async fn list() -> Json<&'static [Template]> {
    Json(template::all())
}

/// GET /api/csv-template - the spreadsheet layout users fill in.
pub async fn csv_template(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.config.branding.csv_template_filename
    );
    (
        [
            (header::CONTENT_TYPE, TEMPLATE_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        template_csv(),
    )
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub template: String,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub template: TemplateId,
}

/// PUT /api/workspaces/:id/template
pub async fn select(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SelectResponse>, ApiError> {
    let id = parse_workspace_id(&id)?;
    let template: TemplateId = req.template.parse().map_err(api_error)?;

    let mut workspaces = state.workspaces.write().await;
    let session = workspaces.get_mut(&id).ok_or_else(|| workspace_not_found(id))?;
    session.touch();
    session.workspace.select_template(template);

    Ok(Json(SelectResponse { template }))
}

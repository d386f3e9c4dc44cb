//! Spreadsheet upload and product listing.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{ApiError, api_error, parse_workspace_id, workspace_not_found};
use crate::catalog::{Product, upload};
use crate::workspace::Workspace;

use super::super::state::{AppState, WorkspaceSession};

/// Response from the upload endpoint.
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub id: Uuid,
    pub filename: String,
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// POST /api/workspaces - upload a spreadsheet (multipart field `file`).
pub async fn create(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("planilha.csv").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e)))?;
            file = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) = file.ok_or((StatusCode::BAD_REQUEST, "No file field found".to_string()))?;
    if !upload::is_accepted(&filename) {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported file type: {}", filename),
        ));
    }

    let mut workspace = Workspace::new();
    workspace.load_upload(&filename, &bytes).map_err(api_error)?;
    let products = workspace.products().to_vec();

    let id = Uuid::new_v4();
    state
        .workspaces
        .write()
        .await
        .insert(id, WorkspaceSession::new(workspace));
    info!(%id, filename = %filename, count = products.len(), "workspace created");

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            id,
            filename,
            products,
        }),
    ))
}

/// GET /api/workspaces/:id/products?q=
pub async fn products(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let id = parse_workspace_id(&id)?;
    let mut workspaces = state.workspaces.write().await;
    let session = workspaces.get_mut(&id).ok_or_else(|| workspace_not_found(id))?;
    session.touch();

    let found = session.workspace.search(&query.q).into_iter().cloned().collect();
    Ok(Json(found))
}

//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::document::{is_allowed_file, Document, DocumentSlot, SupportingDocuments};
use crate::analysis::pipeline::{run_analysis, AnalysisReport, AnalysisRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/analyses
///
/// Multipart form: `analysis_name` (text), `blueprint` (file, required) and
/// any of the optional supporting slots. Returns the structured SWOT report.
pub async fn handle_create_analysis(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut analysis_name = String::new();
    let mut blueprint: Option<Document> = None;
    let mut supporting = SupportingDocuments::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        if name == "analysis_name" {
            analysis_name = field.text().await?.trim().to_string();
            continue;
        }

        let Some(slot) = DocumentSlot::from_key(&name) else {
            warn!("Ignoring unknown multipart field: {}", name);
            continue;
        };

        let filename = field.file_name().unwrap_or("").to_string();
        let content = field.bytes().await?;

        // Browsers send an empty part for an unselected file input.
        if filename.is_empty() && content.is_empty() {
            continue;
        }
        if !is_allowed_file(&filename) {
            return Err(AppError::Validation(format!(
                "Invalid file type for {}: '{}'",
                slot.key(),
                filename
            )));
        }

        info!("Received {} upload: {} ({} bytes)", slot.key(), filename, content.len());
        let document = Document::new(slot, filename, content);
        match slot {
            DocumentSlot::Blueprint => blueprint = Some(document),
            _ => supporting.insert(document),
        }
    }

    if analysis_name.is_empty() {
        return Err(AppError::Validation("Analysis name is required".to_string()));
    }
    let blueprint = blueprint
        .filter(|doc| !doc.is_empty())
        .ok_or_else(|| AppError::Validation("Blueprint file is required".to_string()))?;

    let analysis_id = Uuid::new_v4();
    let store = if state.config.scope_uploads_per_request {
        state.store.scoped(analysis_id)
    } else {
        state.store.clone()
    };

    info!("Starting analysis {analysis_id}: {analysis_name}");
    let report = run_analysis(
        store,
        state.generator.as_ref(),
        AnalysisRequest {
            analysis_id,
            analysis_name,
            blueprint,
            supporting,
        },
    )
    .await?;

    Ok(Json(report))
}

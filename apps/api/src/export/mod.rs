//! Downloadable renditions of an analysis result.

pub mod csv;
pub mod report;

use axum::{
    response::{Html, Response},
    Json,
};
use serde::Deserialize;

use crate::models::analysis::PolicyAnalysisResult;
use crate::routes::attachment;

#[derive(Deserialize)]
pub struct ExportRequest {
    pub result: PolicyAnalysisResult,
}

/// POST /api/v1/export/csv
pub async fn handle_export_csv(Json(req): Json<ExportRequest>) -> Response {
    let body = csv::to_csv_download(&req.result);
    attachment("text/csv; charset=utf-8", csv::CSV_FILE_NAME, body.into_bytes())
}

/// POST /api/v1/export/report
pub async fn handle_export_report(Json(req): Json<ExportRequest>) -> Html<String> {
    Html(report::render_report(&req.result))
}

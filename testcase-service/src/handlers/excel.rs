use crate::dtos::ExcelProxyRequest;
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{Form, State},
    http::header,
    response::Response,
};
use service_core::error::AppError;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// `POST /generate-excel-proxy`
///
/// Forwards the form `content` to the Excel upstream and relays the returned
/// spreadsheet as an attachment.
pub async fn generate_excel_proxy(
    State(state): State<AppState>,
    Form(request): Form<ExcelProxyRequest>,
) -> Result<Response, AppError> {
    let bytes = state.excel.generate(&request.content).await?;

    tracing::info!(size = bytes.len(), "Relaying generated Excel file");

    Response::builder()
        .header(header::CONTENT_TYPE, XLSX_MIME)
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=test_cases.xlsx",
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))
}

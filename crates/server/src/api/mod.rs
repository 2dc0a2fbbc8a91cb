use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::Html,
    Json,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{AnalyzeRequest, AnalyzeResponse, DatasetOverview, ForecastParams, PlotDescriptor},
};
use studio_api::{analyze, forecast_defaults, inspect_dataset, plot_catalog};
use tracing::{error, info};

use crate::app_state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub(crate) type HttpError = (StatusCode, Json<ApiError>);

/// The parts of an upload form.
#[derive(Debug, Default)]
pub(crate) struct Upload {
    pub(crate) filename: String,
    pub(crate) bytes: Bytes,
    pub(crate) request: Option<String>,
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn reject(err: ApiError) -> HttpError {
    (status_for(err.code), Json(err))
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn http_plot_catalog() -> Json<Vec<PlotDescriptor>> {
    Json(plot_catalog())
}

pub(crate) async fn http_forecast_defaults() -> Json<ForecastParams> {
    Json(forecast_defaults())
}

pub(crate) async fn http_inspect(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<DatasetOverview>, HttpError> {
    let upload = read_upload(multipart).await?;
    let ctx = state.api.clone();
    let overview = run_blocking(move || inspect_dataset(&ctx, &upload.filename, &upload.bytes))
        .await
        .map_err(reject)?;
    info!(
        filename = %overview.filename,
        rows = overview.row_count,
        "dataset inspected"
    );
    Ok(Json(overview))
}

pub(crate) async fn http_analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, HttpError> {
    let upload = read_upload(multipart).await?;
    let raw = upload
        .request
        .as_deref()
        .ok_or_else(|| reject(ApiError::validation("missing 'request' part")))?;
    let request: AnalyzeRequest = serde_json::from_str(raw)
        .map_err(|e| reject(ApiError::validation(format!("invalid analysis request: {e}"))))?;
    let ctx = state.api.clone();
    let response = run_blocking(move || analyze(&ctx, &upload.filename, &upload.bytes, &request))
        .await
        .map_err(reject)?;
    Ok(Json(response))
}

/// Runs a pipeline call off the async workers.
async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(job).await.map_err(|e| {
        error!(error = %e, "analysis task failed");
        ApiError::new(ErrorCode::Internal, "analysis task failed")
    })?
}

/// Collects the `file` and `request` parts; other parts are ignored.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<Upload, HttpError> {
    let mut upload = Upload::default();
    let mut has_file = false;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                upload.filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| reject(ApiError::validation("file part has no file name")))?;
                upload.bytes = field.bytes().await.map_err(multipart_error)?;
                has_file = true;
            }
            Some("request") => {
                upload.request = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }
    if !has_file {
        return Err(reject(ApiError::validation("missing 'file' part")));
    }
    Ok(upload)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> HttpError {
    let status = err.status();
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorCode::PayloadTooLarge
    } else {
        ErrorCode::Validation
    };
    (status, Json(ApiError::new(code, err.body_text())))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;

//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::convert::excel_to_yaml;
use crate::error::BridgeError;
use crate::excel::read_headers;
use crate::merge::merge_group_address_names;
use crate::types::FieldMapping;

use super::server::AppState;

/// Response header carrying the number of updated group addresses
pub const UPDATED_COUNT_HEADER: &str = "x-updated-count";
/// Response header carrying the number of skipped group addresses
pub const SKIPPED_COUNT_HEADER: &str = "x-skipped-count";
/// Response header carrying the number of converted rows
pub const ROW_COUNT_HEADER: &str = "x-row-count";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error returned by handlers, rendered as a JSON `ApiResponse`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        let status = match &err {
            BridgeError::Validation(_) => StatusCode::BAD_REQUEST,
            e if e.is_parse_error() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), format!("Multipart error: {}", err.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, "request failed: {}", self.message);
        (self.status, Json(ApiResponse::<()>::err(self.message))).into_response()
    }
}

//==============================================================================
// Uploads
//==============================================================================

/// One uploaded file part
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Collected multipart form: file parts by field name, plus text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: HashMap<String, UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn collect(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match field.file_name().map(|s| s.to_string()) {
                Some(file_name) => {
                    let bytes = field.bytes().await?.to_vec();
                    form.files.insert(name, UploadedFile { file_name, bytes });
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    /// Required file part with the given extension, checked on the raw name
    pub fn take_file(&mut self, field: &str, extension: &str) -> Result<UploadedFile, ApiError> {
        let file = self
            .files
            .remove(field)
            .filter(|f| !f.file_name.is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("Missing '{}' file", field)))?;

        let ok = Path::new(&file.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !ok {
            return Err(ApiError::bad_request(format!(
                "'{}' must be a .{} file",
                field, extension
            )));
        }
        Ok(file)
    }
}

/// Strip directories and unsafe characters from an uploaded file name
pub fn secure_filename(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid filename pattern"));

    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned = unsafe_chars.replace_all(base.trim(), "_");
    cleaned.trim_start_matches('.').to_string()
}

/// Stem of the sanitized upload name, `output` when nothing survives
pub fn download_stem(file_name: &str) -> String {
    let safe = secure_filename(file_name);
    Path::new(&safe)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("output")
        .to_string()
}

fn attachment(
    content_type: &'static str,
    download_name: &str,
    counts: &[(&'static str, usize)],
    body: Vec<u8>,
) -> Response {
    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
    if let Ok(value) =
        format!("attachment; filename=\"{}\"", download_name).parse::<header::HeaderValue>()
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    for &(name, count) in counts {
        headers.insert(HeaderName::from_static(name), header::HeaderValue::from(count));
    }
    response
}

//==============================================================================
// Info endpoints
//==============================================================================

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Sheetbridge API Server".to_string(),
        version: state.version.clone(),
        description: "Merge spreadsheet names into KNX XML exports, convert spreadsheets to YAML"
            .to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/process-xml",
                "POST",
                "Multipart 'excel' + 'xml': merge names into GroupAddress elements",
            ),
            EndpointInfo::new(
                "/process-yaml",
                "POST",
                "Multipart 'excel' + optional 'field_mapping' JSON: convert to YAML",
            ),
            EndpointInfo::new(
                "/get-excel-headers",
                "POST",
                "Multipart 'excel': list header cells",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "process-xml".to_string(),
            "process-yaml".to_string(),
            "get-excel-headers".to_string(),
        ],
    }))
}

//==============================================================================
// Transformation endpoints
//==============================================================================

/// POST /process-xml - Merge names into a group-address export
pub async fn process_xml(multipart: Multipart) -> Result<Response, ApiError> {
    let mut form = UploadForm::collect(multipart).await?;
    let excel = form.take_file("excel", "xlsx")?;
    let xml = form.take_file("xml", "xml")?;

    let report = merge_group_address_names(&excel.bytes, &xml.bytes)?;
    info!(
        file = %xml.file_name,
        updated = report.updated,
        skipped = report.skipped,
        "processed XML upload"
    );

    let download_name = format!("{}_updated.xml", download_stem(&xml.file_name));
    Ok(attachment(
        "application/xml",
        &download_name,
        &[
            (UPDATED_COUNT_HEADER, report.updated),
            (SKIPPED_COUNT_HEADER, report.skipped),
        ],
        report.xml,
    ))
}

/// POST /process-yaml - Convert a spreadsheet to YAML
pub async fn process_yaml(multipart: Multipart) -> Result<Response, ApiError> {
    let mut form = UploadForm::collect(multipart).await?;
    let excel = form.take_file("excel", "xlsx")?;
    let mapping = form
        .fields
        .get("field_mapping")
        .map(|json| FieldMapping::from_json(json))
        .unwrap_or_default();

    let export = excel_to_yaml(&excel.bytes, &mapping)?;
    info!(file = %excel.file_name, rows = export.row_count, "processed YAML upload");

    let download_name = format!("{}.yaml", download_stem(&excel.file_name));
    Ok(attachment(
        "application/x-yaml",
        &download_name,
        &[(ROW_COUNT_HEADER, export.row_count)],
        export.content.into_bytes(),
    ))
}

/// Headers response
#[derive(Serialize, Default)]
pub struct HeadersResponse {
    pub headers: Vec<String>,
}

/// POST /get-excel-headers - List header cells
pub async fn get_excel_headers(multipart: Multipart) -> Result<Response, ApiError> {
    let mut form = UploadForm::collect(multipart).await?;
    let excel = form
        .files
        .remove("excel")
        .ok_or_else(|| ApiError::bad_request("Missing 'excel' file"))?;

    let headers = read_headers(&excel.bytes)?;
    Ok(Json(ApiResponse::ok(HeadersResponse { headers })).into_response())
}

//! celldiff HTTP service
//!
//! Accepts a workbook upload plus two cell references, runs the comparison
//! engine, and returns the highlighted report workbook as a download. Every
//! request is independent; the service holds no state between requests.

use std::io::Cursor;
use std::net::SocketAddr;

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use celldiff_core::{build_report, compare, CellRef, Splitter};
use celldiff_xlsx::{ReportWriter, XlsxReader};

const INDEX_HTML: &str = include_str!("../static/index.html");

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let config = Config::from_env()?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(index))
        .route("/get-sheets", post(get_sheets))
        .route("/compare", post(handle_comparison))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|err| AppError::Config(format!("Invalid bind addr: {err}")))?;
    info!("celldiff server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Http(format!("Bind error: {err}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|err| AppError::Http(format!("Server error: {err}")))?;

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

#[derive(Clone)]
struct Config {
    bind_addr: String,
    max_upload_bytes: usize,
}

impl Config {
    fn from_env() -> Result<Self, AppError> {
        let bind_addr =
            std::env::var("CELLDIFF_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9100".to_string());
        let max_upload_bytes = match std::env::var("CELLDIFF_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|err| AppError::Config(format!("Invalid max upload size: {err}")))?,
            Err(_) => 200 * 1024 * 1024,
        };
        Ok(Self {
            bind_addr,
            max_upload_bytes,
        })
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("upload error: {0}")]
    Upload(String),
    #[error("missing required parameter: {0}")]
    MissingParameter(String),
    #[error("unsupported file type: {0} (only .xlsx is accepted)")]
    UnsupportedFileType(String),
    #[error("{0}")]
    Engine(#[from] celldiff_core::Error),
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] celldiff_xlsx::XlsxError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Http(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Upload(_)
            | AppError::MissingParameter(_)
            | AppError::UnsupportedFileType(_)
            | AppError::Engine(_)
            | AppError::Workbook(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        };
        error!("request error: {}", message);
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Collected multipart form content
#[derive(Default)]
struct UploadForm {
    sheet_name: Option<String>,
    cell1: Option<String>,
    cell2: Option<String>,
    delimiters: Option<String>,
    file_name: Option<String>,
    file_bytes: Option<Vec<u8>>,
}

impl UploadForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| AppError::Upload(err.to_string()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "excel_file" => {
                    form.file_name = field.file_name().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| AppError::Upload(err.to_string()))?;
                    form.file_bytes = Some(bytes.to_vec());
                }
                "sheet_name" => form.sheet_name = Some(read_text(field).await?),
                "cell1" => form.cell1 = Some(read_text(field).await?),
                "cell2" => form.cell2 = Some(read_text(field).await?),
                "delimiters" => form.delimiters = Some(read_text(field).await?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Required text field; empty values count as missing
    fn require(&self, name: &str) -> Result<&str, AppError> {
        let value = match name {
            "sheet_name" => self.sheet_name.as_deref(),
            "cell1" => self.cell1.as_deref(),
            "cell2" => self.cell2.as_deref(),
            _ => None,
        };
        match value {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(AppError::MissingParameter(name.to_string())),
        }
    }

    /// Uploaded workbook bytes, with the extension checked first
    fn workbook(&self) -> Result<&[u8], AppError> {
        let bytes = self
            .file_bytes
            .as_deref()
            .ok_or_else(|| AppError::MissingParameter("excel_file".to_string()))?;

        let file_name = self.file_name.as_deref().unwrap_or("");
        if !has_xlsx_extension(file_name) {
            return Err(AppError::UnsupportedFileType(file_name.to_string()));
        }

        Ok(bytes)
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|err| AppError::Upload(err.to_string()))
}

fn has_xlsx_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false)
}

#[derive(serde::Serialize)]
struct SheetsResponse {
    sheets: Vec<String>,
}

/// List the sheet names of an uploaded workbook
async fn get_sheets(multipart: Multipart) -> Result<Json<SheetsResponse>, AppError> {
    let form = UploadForm::from_multipart(multipart).await?;
    let bytes = form.workbook()?;

    let sheets = XlsxReader::sheet_names(Cursor::new(bytes))?;
    Ok(Json(SheetsResponse { sheets }))
}

/// Compare two cells of an uploaded workbook and return the report workbook
async fn handle_comparison(multipart: Multipart) -> Result<Response, AppError> {
    let form = UploadForm::from_multipart(multipart).await?;

    // Required fields are validated before the file payload is examined
    let sheet_name = form.require("sheet_name")?.to_string();
    let cell_ref_1 = form.require("cell1")?.to_string();
    let cell_ref_2 = form.require("cell2")?.to_string();
    let delimiters = form.delimiters.clone().unwrap_or_default();

    let bytes = form.workbook()?;
    let grid = XlsxReader::read_sheet(Cursor::new(bytes), &sheet_name)?;

    let cell1 = CellRef::parse(&cell_ref_1)?;
    let cell2 = CellRef::parse(&cell_ref_2)?;

    let content1 = grid.text(cell1.row, cell1.col)?.to_string();
    let content2 = grid.text(cell2.row, cell2.col)?.to_string();

    let splitter = Splitter::new(&delimiters)?;
    let cmp = compare(splitter.split(&content1), splitter.split(&content2));
    let report = build_report(&cell_ref_1, &cell_ref_2, &cmp);

    let workbook = ReportWriter::write_bytes(&report)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_MIME));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"comparison_result.xlsx\""),
    );
    Ok((headers, workbook).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_xlsx_extension() {
        assert!(has_xlsx_extension("book.xlsx"));
        assert!(has_xlsx_extension("BOOK.XLSX"));
        assert!(!has_xlsx_extension("book.xls"));
        assert!(!has_xlsx_extension("book.csv"));
        assert!(!has_xlsx_extension("book"));
        assert!(!has_xlsx_extension(""));
    }

    #[test]
    fn test_require_rejects_missing_and_empty_fields() {
        let mut form = UploadForm::default();
        assert!(matches!(
            form.require("sheet_name"),
            Err(AppError::MissingParameter(name)) if name == "sheet_name"
        ));

        form.cell1 = Some(String::new());
        assert!(form.require("cell1").is_err());

        form.cell1 = Some("B2".to_string());
        assert_eq!(form.require("cell1").unwrap(), "B2");
    }

    #[test]
    fn test_workbook_requires_file_before_checking_extension() {
        let mut form = UploadForm::default();
        assert!(matches!(
            form.workbook(),
            Err(AppError::MissingParameter(name)) if name == "excel_file"
        ));

        form.file_bytes = Some(vec![1, 2, 3]);
        form.file_name = Some("legacy.xls".to_string());
        assert!(matches!(
            form.workbook(),
            Err(AppError::UnsupportedFileType(_))
        ));

        form.file_name = Some("modern.xlsx".to_string());
        assert!(form.workbook().is_ok());
    }
}

//! Upload server
//!
//! Serves the upload form and turns each uploaded export into the three
//! output files under the dated output folder.

use crate::adapters::storage::LocalStorage;
use crate::config::ShipmentConfig;
use crate::core::etl::EtlEngine;
use crate::core::pipeline::ShipmentPipeline;
use crate::utils::error::ShipmentError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Multipart field carrying the export file.
pub const UPLOAD_FIELD: &str = "uploadfile";

const INDEX_HTML: &str = r#"<html>
  <head>
    <title>SHIPMENT-TIMES</title>
  </head>
  <body>
    <div>
      <form enctype="multipart/form-data" action="/upload" method="post">
        <input type="file" name="uploadfile" />
        <input type="submit" value="upload" />
      </form>
    </div>
  </body>
</html>
"#;

#[derive(Clone)]
pub struct AppState {
    config: Arc<ShipmentConfig>,
    storage: LocalStorage,
}

impl AppState {
    pub fn new(config: ShipmentConfig) -> Self {
        let storage = LocalStorage::new(config.output_path.clone());
        Self {
            config: Arc::new(config),
            storage,
        }
    }
}

/// Upload failure, answered with the status code and its reason phrase.
#[derive(Debug)]
pub enum UploadError {
    BadRequest(String),
    Pipeline(ShipmentError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = match &self {
            UploadError::BadRequest(message) => {
                tracing::warn!("Rejected upload: {}", message);
                StatusCode::BAD_REQUEST
            }
            UploadError::Pipeline(e) => {
                tracing::error!(
                    category = ?e.category(),
                    severity = ?e.severity(),
                    "Upload processing failed: {}",
                    e
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}

impl From<ShipmentError> for UploadError {
    fn from(e: ShipmentError) -> Self {
        UploadError::Pipeline(e)
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, UploadError> {
    let mut data = None;
    let mut file_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::BadRequest(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            file_name = field.file_name().map(|s| s.to_string());
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::BadRequest(format!("Multipart error: {}", e)))?
                    .to_vec(),
            );
            break;
        }
    }

    let data = data.ok_or_else(|| {
        UploadError::BadRequest(format!("No '{}' field found", UPLOAD_FIELD))
    })?;

    tracing::info!(
        file_name = file_name.as_deref().unwrap_or("-"),
        size = data.len(),
        "Received order export"
    );

    let pipeline = ShipmentPipeline::new(state.storage.clone(), (*state.config).clone(), data);
    let report = EtlEngine::new(pipeline).run().await?;

    tracing::info!(
        directory = %report.directory,
        orders = report.order_count,
        "Upload processed"
    );

    Ok((StatusCode::FOUND, [(header::LOCATION, "/")]).into_response())
}

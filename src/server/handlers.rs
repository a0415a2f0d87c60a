use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{ConversionError, Doc2DeckError, ErrorKind};
use crate::job::{JobId, JobSnapshot, JobState};
use crate::options::OptionsForm;
use crate::orchestrator::Upload;
use crate::pipeline::build::MIME_PPTX;

// ── Response bodies ──────────────────────────────────────────────────────

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

/// Public view of a job.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub job_id: JobId,
    pub filename: String,
    pub state: JobState,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl From<JobSnapshot> for JobResponse {
    fn from(s: JobSnapshot) -> Self {
        let download_url = (s.state == JobState::Completed)
            .then(|| format!("/api/jobs/{}/download", s.id));
        Self {
            job_id: s.id,
            filename: s.filename,
            state: s.state,
            progress: s.progress,
            slide_count: s.slide_count,
            kind: s.error.as_ref().map(ConversionError::kind),
            error: s.error.map(|e| e.to_string()),
            download_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct AcceptedResponse {
    job_id: JobId,
    state: JobState,
    progress: u8,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    #[serde(default)]
    pub wait: bool,
}

// ── Error mapping ────────────────────────────────────────────────────────

pub(crate) struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, kind: &str, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                kind: kind.to_string(),
                error: error.into(),
                job_id: None,
            },
        }
    }

    fn conversion(e: &ConversionError) -> Self {
        let kind = e.kind();
        let status = StatusCode::from_u16(kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, kind.as_str(), e.to_string())
    }

    fn not_found(job_id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NotFound",
            format!("Job {job_id} not found or expired"),
        )
    }

    fn with_job(mut self, id: JobId) -> Self {
        self.body.job_id = Some(id);
        self
    }
}

impl From<Doc2DeckError> for ApiError {
    fn from(e: Doc2DeckError) -> Self {
        match &e {
            Doc2DeckError::Rejected(c) | Doc2DeckError::JobFailed(c) => Self::conversion(c),
            Doc2DeckError::JobNotFound(id) => Self::not_found(&id.to_string()),
            Doc2DeckError::NotReady { .. } => {
                Self::new(StatusCode::CONFLICT, "NotReady", e.to_string())
            }
            _ => {
                tracing::error!(error = %e, "Request failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::Build.as_str(),
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(raw))
}

// ── Handlers ─────────────────────────────────────────────────────────────

pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[tracing::instrument(skip(state, multipart))]
pub async fn convert_handler(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    tracing::debug!(
        filename = %upload.filename,
        content_type = ?upload.mime_type,
        bytes = upload.bytes.len(),
        "Conversion request received"
    );

    let orchestrator = &state.orchestrator;
    let id = orchestrator.submit(upload).await.map_err(|e| {
        tracing::warn!(error = %e, "Upload rejected");
        ApiError::from(e)
    })?;

    if !query.wait {
        let snapshot = orchestrator.status(id).await?;
        let body = AcceptedResponse {
            job_id: id,
            state: snapshot.state,
            progress: snapshot.progress,
        };
        return Ok((StatusCode::ACCEPTED, Json(body)).into_response());
    }

    let snapshot = orchestrator.wait(id).await?;
    match &snapshot.error {
        Some(error) => Err(ApiError::conversion(error).with_job(id)),
        None => Ok((StatusCode::OK, Json(JobResponse::from(snapshot))).into_response()),
    }
}

/// Collect the `document` file and option fields from the form.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut document: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut form = OptionsForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e.status(), e.body_text())),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let mime = field
                    .content_type()
                    .map(str::to_string)
                    .filter(|m| !m.is_empty());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e.status(), e.body_text()))?;
                document = Some((filename, mime, data.to_vec()));
            }
            "audience" | "length" | "summary" | "appendix" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e.status(), e.body_text()))?;
                let slot = match name.as_str() {
                    "audience" => &mut form.audience,
                    "length" => &mut form.length,
                    "summary" => &mut form.summary,
                    _ => &mut form.appendix,
                };
                *slot = Some(value);
            }
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    match document {
        Some((filename, mime, bytes)) if !filename.trim().is_empty() => {
            Ok(Upload::new(filename, mime, bytes).with_form(form))
        }
        _ => {
            tracing::warn!("Conversion request with no file");
            Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                ErrorKind::Validation.as_str(),
                "No file uploaded",
            ))
        }
    }
}

fn multipart_error(status: StatusCode, detail: String) -> ApiError {
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "File too large".to_string()
    } else {
        format!("Malformed upload: {detail}")
    };
    tracing::warn!(status = %status, "{}", message);
    ApiError::new(StatusCode::BAD_REQUEST, ErrorKind::Validation.as_str(), message)
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let id = parse_job_id(&job_id)?;
    let snapshot = state.orchestrator.status(id).await?;
    Ok(Json(snapshot.into()))
}

#[tracing::instrument(skip(state))]
pub async fn download_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_job_id(&job_id)?;
    let artifact = state.orchestrator.retrieve(id).await?;
    let bytes = tokio::fs::read(&artifact.path).await.map_err(|e| {
        tracing::error!(job_id = %id, error = %e, "Deck missing from storage");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Storage.as_str(),
            "Generated deck is no longer available",
        )
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe(&artifact.filename)
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, MIME_PPTX.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[tracing::instrument(skip(state))]
pub async fn delete_job_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_job_id(&job_id)?;
    state.orchestrator.abandon(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Printable ASCII without quotes or backslashes.
fn header_safe(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    if cleaned.trim().is_empty() {
        "presentation.pptx".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_safe_strips_quotes_and_unicode() {
        assert_eq!(header_safe("a\"b.pptx"), "a_b.pptx");
        assert_eq!(header_safe("résumé.pptx"), "r_sum_.pptx");
        assert_eq!(header_safe(""), "presentation.pptx");
    }

    #[test]
    fn job_response_links_download_only_when_completed() {
        let snap = JobSnapshot {
            id: JobId::new(),
            filename: "a.txt".into(),
            state: JobState::Failed,
            progress: 30,
            slide_count: None,
            output_filename: None,
            error: Some(ConversionError::extraction("PDF", "bad xref")),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let resp = JobResponse::from(snap);
        assert!(resp.download_url.is_none());
        assert_eq!(resp.kind, Some(ErrorKind::Extraction));

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["kind"], "ExtractionError");
        assert_eq!(json["state"], "failed");
    }

    #[test]
    fn not_ready_maps_to_conflict() {
        let err = ApiError::from(Doc2DeckError::NotReady {
            id: JobId::new(),
            state: JobState::Extracting,
        });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.body.kind, "NotReady");
    }

    #[test]
    fn internal_errors_hide_detail() {
        let err = ApiError::from(Doc2DeckError::Internal("/secret/path".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body.error.contains("/secret"));
    }
}

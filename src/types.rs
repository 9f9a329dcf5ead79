use serde::{Deserialize, Serialize};

/// Metadata record for an uploaded document. File bytes stay on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub original_filename: String,
    pub file_size: u64,
    pub mime_type: String,
    pub storage_key: Option<String>,
    pub uploaded_by: Option<String>,
    pub uploaded_at: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// A processing job as the server reports it. `status` moves through
/// queued, processing, completed, failed or cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub document_id: String,
    pub job_type: String,
    pub status: String,
    pub priority: Option<i64>,
    pub celery_task_id: Option<String>,
    pub created_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub retry_count: Option<i64>,
    pub max_retries: Option<i64>,
    pub error_message: Option<String>,
    pub options: Option<serde_json::Value>,
}

/// GET /api/jobs/{id} returns the job fields plus the owning document and
/// a result summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: Job,
    pub document: Option<Document>,
    pub result_count: Option<u64>,
    pub has_results: Option<bool>,
}

/// Response to POST /api/upload. `duplicate` is set when the server matched
/// the file's checksum to an existing document and returned that one instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub message: Option<String>,
    #[serde(default)]
    pub duplicate: bool,
    pub document: Document,
}

/// Response to POST /api/jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreated {
    pub message: Option<String>,
    pub job: Job,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMeta {
    pub id: String,
    pub result_type: String,
    pub has_data: bool,
    pub has_file: bool,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResultsPage {
    pub job_id: String,
    pub result_count: u64,
    pub results: Vec<ResultMeta>,
}

/// A single result fetched by type. Inline results carry `data`; file-backed
/// results carry a presigned `download_url` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResultPayload {
    pub result_type: String,
    pub data: Option<serde_json::Value>,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub download_url: Option<String>,
    pub expires_in_hours: Option<u64>,
}

/// GET /api/documents/{id}/download returns a time-limited presigned link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLink {
    pub document_id: String,
    pub filename: String,
    pub download_url: String,
    pub expires_in_hours: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub message: Option<String>,
    pub document_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentJobsPage {
    pub document_id: String,
    pub job_count: u64,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub message: Option<String>,
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryOutcome {
    pub message: Option<String>,
    pub original_job_id: String,
    pub new_job: Job,
}

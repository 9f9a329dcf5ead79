use std::error::Error;
use std::io;

pub const DEFAULT_SERVER_ADDR: &str = "http://localhost:5000";

/// The only job type the processing service currently executes.
pub const EXTRACT_DATA_JOB_TYPE: &str = "extract_data";

pub mod errors;
pub mod types;
mod reader_length;

pub use types::{
    CancelOutcome, DeleteOutcome, Document, DocumentJobsPage, DownloadLink, Job, JobCreated,
    JobDetails, JobResultPayload, JobResultsPage, ResultMeta, RetryOutcome, UploadOutcome,
};

/// The two calls the end-to-end check sequences. Implemented by
/// [`DocProcAPIClient`]; a fake implementation stands in for tests.
pub trait JobsAPI {
    fn create_extract_job(&self, document_id: &str) -> Result<Job, Box<dyn Error>>;
    fn get_job(&self, job_id: &str) -> Result<JobDetails, Box<dyn Error>>;
}

/// Queue an extract_data job for the document, then fetch its status a
/// single time. Status is not re-fetched however the job reports itself;
/// a fresh job will usually still be queued or processing.
pub fn create_extract_job_and_fetch_status<C: JobsAPI>(
    api: &C,
    document_id: &str,
) -> Result<(Job, JobDetails), Box<dyn Error>> {
    let job = api.create_extract_job(document_id)?;
    let details = api.get_job(&job.id)?;
    Ok((job, details))
}

#[derive(Debug)]
pub struct DocProcAPIClient {
    server_addr: url::Url,
    http_client: reqwest::blocking::Client,
}

impl DocProcAPIClient {
    pub fn new() -> Result<DocProcAPIClient, Box<dyn Error>> {
        DocProcAPIClient::new_for_server(DEFAULT_SERVER_ADDR)
    }

    pub fn new_for_server(server_addr: &str) -> Result<DocProcAPIClient, Box<dyn Error>> {
        let server_addr_parsed = url::Url::parse(server_addr)?;
        Ok(DocProcAPIClient {
            server_addr: server_addr_parsed,
            http_client: reqwest::blocking::Client::new(),
        })
    }

    /// Upload a document file. The reader's length is determined up front so
    /// the multipart part is sent with a known size.
    pub fn upload_document<T: io::Read + Send + 'static>(
        &self,
        file: T,
        filename: &str,
        uploaded_by: Option<&str>,
    ) -> Result<UploadOutcome, Box<dyn Error>> {
        let (file, file_length) = reader_length::determine_length(file)?;
        self.upload_document_sized(file, file_length, filename, uploaded_by)
    }

    pub fn upload_document_sized<T: io::Read + Send + 'static>(
        &self,
        file: T,
        file_size: u64,
        filename: &str,
        uploaded_by: Option<&str>,
    ) -> Result<UploadOutcome, Box<dyn Error>> {
        use reqwest::blocking::multipart::{Form, Part};

        let endpoint_url = self.server_addr.join("/api/upload")?;
        let file_part = Part::reader_with_length(file, file_size).file_name(filename.to_owned());
        let mut form = Form::new().part("file", file_part);
        if let Some(uploader) = uploaded_by {
            form = form.text("uploaded_by", uploader.to_owned());
        }
        let req = self.http_client.post(endpoint_url.clone()).multipart(form);
        self.execute(endpoint_url, req)
    }

    pub fn get_document(&self, document_id: &str) -> Result<Document, Box<dyn Error>> {
        let endpoint_url = self.document_url(document_id, "")?;
        let req = self.http_client.get(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    /// Ask the server for a presigned download URL for the stored file.
    pub fn download_document(&self, document_id: &str) -> Result<DownloadLink, Box<dyn Error>> {
        let endpoint_url = self.document_url(document_id, "/download")?;
        let req = self.http_client.get(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    pub fn delete_document(&self, document_id: &str) -> Result<DeleteOutcome, Box<dyn Error>> {
        let endpoint_url = self.document_url(document_id, "")?;
        let req = self.http_client.delete(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    /// Create a processing job for an already-uploaded document. The server
    /// queues it and reports its state through [`DocProcAPIClient::get_job`].
    pub fn create_job(
        &self,
        document_id: &str,
        job_type: &str,
        options: Option<serde_json::Value>,
    ) -> Result<Job, Box<dyn Error>> {
        use serde::Serialize;

        #[derive(Serialize)]
        struct CreateJobRequest<'a> {
            document_id: &'a str,
            job_type: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            options: Option<serde_json::Value>,
        }

        let endpoint_url = self.server_addr.join("/api/jobs")?;
        let req = self
            .http_client
            .post(endpoint_url.clone())
            .json(&CreateJobRequest {
                document_id,
                job_type,
                options,
            });
        let created: JobCreated = self.execute(endpoint_url, req)?;
        Ok(created.job)
    }

    pub fn create_extract_job(&self, document_id: &str) -> Result<Job, Box<dyn Error>> {
        self.create_job(document_id, EXTRACT_DATA_JOB_TYPE, None)
    }

    /// Fetch job status once. There is no waiting or polling in the client;
    /// callers decide if and when to ask again.
    pub fn get_job(&self, job_id: &str) -> Result<JobDetails, Box<dyn Error>> {
        let endpoint_url = self.job_url(job_id, "")?;
        let req = self.http_client.get(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    pub fn get_job_results(&self, job_id: &str) -> Result<JobResultsPage, Box<dyn Error>> {
        let endpoint_url = self.job_url(job_id, "/results")?;
        let req = self.http_client.get(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    pub fn get_job_result(
        &self,
        job_id: &str,
        result_type: &str,
    ) -> Result<JobResultPayload, Box<dyn Error>> {
        let endpoint_url = self.job_url(job_id, &("/results/".to_owned() + result_type))?;
        let req = self.http_client.get(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    pub fn get_document_jobs(&self, document_id: &str) -> Result<DocumentJobsPage, Box<dyn Error>> {
        let endpoint_url = self.document_url(document_id, "/jobs")?;
        let req = self.http_client.get(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    pub fn cancel_job(&self, job_id: &str) -> Result<CancelOutcome, Box<dyn Error>> {
        let endpoint_url = self.job_url(job_id, "")?;
        let req = self.http_client.delete(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    pub fn retry_job(&self, job_id: &str) -> Result<RetryOutcome, Box<dyn Error>> {
        let endpoint_url = self.job_url(job_id, "/retry")?;
        let req = self.http_client.post(endpoint_url.clone());
        self.execute(endpoint_url, req)
    }

    fn job_url(&self, job_id: &str, suffix: &str) -> Result<url::Url, Box<dyn Error>> {
        Ok(self
            .server_addr
            .join(&("/api/jobs/".to_owned() + job_id + suffix))?)
    }

    fn document_url(&self, document_id: &str, suffix: &str) -> Result<url::Url, Box<dyn Error>> {
        Ok(self
            .server_addr
            .join(&("/api/documents/".to_owned() + document_id + suffix))?)
    }

    fn execute<R: serde::de::DeserializeOwned>(
        &self,
        endpoint_url: url::Url,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<R, Box<dyn Error>> {
        let resp = req.send()?;
        let resp_status = resp.status().as_u16();
        let resp_body_bytes = resp.bytes()?;
        decode_api_response(endpoint_url, resp_status, &resp_body_bytes)
    }
}

impl JobsAPI for DocProcAPIClient {
    fn create_extract_job(&self, document_id: &str) -> Result<Job, Box<dyn Error>> {
        DocProcAPIClient::create_extract_job(self, document_id)
    }

    fn get_job(&self, job_id: &str) -> Result<JobDetails, Box<dyn Error>> {
        DocProcAPIClient::get_job(self, job_id)
    }
}

fn decode_api_response<R: serde::de::DeserializeOwned>(
    endpoint_url: url::Url,
    resp_status: u16,
    resp_body_bytes: &[u8],
) -> Result<R, Box<dyn Error>> {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct ServerErrorData {
        error: Option<String>,
        details: Option<String>,
        status: Option<String>,
    }

    if !(200..300).contains(&resp_status) {
        let error_data: serde_json::Result<ServerErrorData> =
            serde_json::from_slice(resp_body_bytes);
        let error_message = match error_data {
            Ok(data) => {
                let mut msg = data.error.unwrap_or_default();
                if let Some(details) = data.details {
                    msg = msg + ": " + &details;
                }
                if let Some(job_status) = data.status {
                    msg = msg + " (job status: " + &job_status + ")";
                }
                msg
            }
            Err(_) => String::from_utf8_lossy(resp_body_bytes).to_string(),
        };
        return Err(Box::new(errors::DocProcAPIError {
            endpoint_url: endpoint_url.into(),
            status: resp_status,
            error_message,
        }));
    }
    match serde_json::from_slice(resp_body_bytes) {
        Ok(data) => Ok(data),
        Err(decode_err) => Err(Box::new(errors::MalformedResponseError {
            endpoint_url: endpoint_url.into(),
            detail: decode_err.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DocProcAPIClient {
        DocProcAPIClient::new().unwrap()
    }

    #[test]
    fn default_server_addr_parses() {
        assert!(DocProcAPIClient::new().is_ok());
    }

    #[test]
    fn bad_server_addr_is_rejected() {
        assert!(DocProcAPIClient::new_for_server("not a url").is_err());
    }

    #[test]
    fn job_url_contains_the_job_id_verbatim() {
        let url = client().job_url("abc-123", "").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/jobs/abc-123");
    }

    #[test]
    fn job_url_with_suffix() {
        let url = client().job_url("abc-123", "/results/extracted_text").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/jobs/abc-123/results/extracted_text"
        );
    }

    #[test]
    fn empty_job_id_yields_bare_jobs_path() {
        let url = client().job_url("", "").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/jobs/");
    }

    #[test]
    fn document_url_contains_the_document_id() {
        let url = client()
            .document_url("067c7911-b2d7-48ff-b4c3-8b28d77a08b6", "/jobs")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/documents/067c7911-b2d7-48ff-b4c3-8b28d77a08b6/jobs"
        );
    }

    #[test]
    fn successful_creation_body_decodes_to_job() {
        let endpoint = url::Url::parse("http://localhost:5000/api/jobs").unwrap();
        let body = br#"{
            "message": "Job created and queued successfully",
            "job": {"id": "abc-123",
                    "document_id": "067c7911-b2d7-48ff-b4c3-8b28d77a08b6",
                    "job_type": "extract_data",
                    "status": "queued"}
        }"#;
        let created: JobCreated = decode_api_response(endpoint, 201, body).unwrap();
        assert_eq!(created.job.id, "abc-123");
    }

    #[test]
    fn error_body_becomes_api_error() {
        let endpoint = url::Url::parse("http://localhost:5000/api/jobs").unwrap();
        let body = br#"{"error": "not found"}"#;
        let result: Result<JobCreated, _> = decode_api_response(endpoint, 404, body);
        let err = result.unwrap_err();
        let api_err = err.downcast_ref::<errors::DocProcAPIError>().unwrap();
        assert_eq!(api_err.status, 404);
        assert_eq!(api_err.error_message, "not found");
    }

    #[test]
    fn error_body_with_details_and_status_is_folded_into_message() {
        let endpoint =
            url::Url::parse("http://localhost:5000/api/jobs/abc-123/results").unwrap();
        let body = br#"{"error": "Job not completed yet", "status": "processing"}"#;
        let result: Result<JobResultsPage, _> = decode_api_response(endpoint, 400, body);
        let err = result.unwrap_err();
        let api_err = err.downcast_ref::<errors::DocProcAPIError>().unwrap();
        assert_eq!(
            api_err.error_message,
            "Job not completed yet (job status: processing)"
        );
    }

    #[test]
    fn non_json_error_body_is_passed_through_raw() {
        let endpoint = url::Url::parse("http://localhost:5000/api/jobs").unwrap();
        let result: Result<JobCreated, _> =
            decode_api_response(endpoint, 502, b"Bad Gateway");
        let err = result.unwrap_err();
        let api_err = err.downcast_ref::<errors::DocProcAPIError>().unwrap();
        assert_eq!(api_err.error_message, "Bad Gateway");
    }

    struct RecordingJobsAPI {
        create_calls: std::cell::RefCell<Vec<String>>,
        status_calls: std::cell::RefCell<Vec<String>>,
    }

    impl RecordingJobsAPI {
        fn new() -> RecordingJobsAPI {
            RecordingJobsAPI {
                create_calls: std::cell::RefCell::new(Vec::new()),
                status_calls: std::cell::RefCell::new(Vec::new()),
            }
        }
    }

    impl JobsAPI for RecordingJobsAPI {
        fn create_extract_job(&self, document_id: &str) -> Result<Job, Box<dyn Error>> {
            self.create_calls.borrow_mut().push(document_id.to_owned());
            Ok(serde_json::from_value(serde_json::json!({
                "id": "abc-123",
                "document_id": document_id,
                "job_type": EXTRACT_DATA_JOB_TYPE,
                "status": "queued"
            }))?)
        }

        fn get_job(&self, job_id: &str) -> Result<JobDetails, Box<dyn Error>> {
            self.status_calls.borrow_mut().push(job_id.to_owned());
            // reports a job that has not finished yet
            Ok(serde_json::from_value(serde_json::json!({
                "id": job_id,
                "document_id": "067c7911-b2d7-48ff-b4c3-8b28d77a08b6",
                "job_type": EXTRACT_DATA_JOB_TYPE,
                "status": "processing",
                "result_count": 0,
                "has_results": false
            }))?)
        }
    }

    #[test]
    fn sequence_fetches_status_exactly_once() {
        let api = RecordingJobsAPI::new();
        let (job, details) =
            create_extract_job_and_fetch_status(&api, "067c7911-b2d7-48ff-b4c3-8b28d77a08b6")
                .unwrap();
        assert_eq!(job.id, "abc-123");
        // an unfinished status must not trigger a second fetch
        assert_eq!(details.job.status, "processing");
        assert_eq!(
            api.create_calls.borrow().as_slice(),
            ["067c7911-b2d7-48ff-b4c3-8b28d77a08b6"]
        );
        assert_eq!(api.status_calls.borrow().as_slice(), ["abc-123"]);
    }

    #[test]
    fn ok_status_with_undecodable_body_is_reported() {
        // A 200 whose body lacks the expected id field must surface as an
        // error, never as an empty identifier.
        let endpoint = url::Url::parse("http://localhost:5000/api/jobs").unwrap();
        let result: Result<JobCreated, _> =
            decode_api_response(endpoint, 200, br#"{"error": "not found"}"#);
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<errors::MalformedResponseError>().is_some());
    }
}

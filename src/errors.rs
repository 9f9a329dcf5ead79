use std::error::Error;

#[derive(Debug)]
pub struct DocProcAPIError {
    pub endpoint_url: String,
    pub status: u16,
    pub error_message: String,
}

impl Error for DocProcAPIError {}

impl std::fmt::Display for DocProcAPIError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Document API endpoint {} responded with status {}: {}",
            self.endpoint_url, self.status, self.error_message
        )
    }
}

#[derive(Debug)]
pub struct MalformedResponseError {
    pub endpoint_url: String,
    pub detail: String,
}

impl Error for MalformedResponseError {}

impl std::fmt::Display for MalformedResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Document API endpoint {} sent a response that could not be decoded: {}",
            self.endpoint_url, self.detail
        )
    }
}

pub type DfResult<T> = Result<T, DfError>;

#[derive(Debug, thiserror::Error)]
pub enum DfError {
    #[error("[HTTP Request Error] {0}")]
    HttpRequestError(#[from] ::reqwest::Error),

    #[error("[HTTP Status Error] [{request}] {status}")]
    HttpStatusError { status: String, request: String },

    #[error("[Invalid] {message}")]
    Invalid { code: &'static str, message: String },

    #[error("[Parse Config Error] {0}")]
    ParseConfigError(#[from] ::confy::ConfyError),

    #[error("[Parse Enum Error] {0}")]
    ParseEnumError(#[from] ::strum::ParseError),

    #[error("[Parse URL Error] {0}")]
    ParseUrlError(#[from] url::ParseError),

    #[error("[Serde JSON Error] {0}")]
    SerdeJsonError(#[from] ::serde_json::Error),
}

impl DfError {
    pub fn http_status(status: reqwest::StatusCode, request: &str) -> Self {
        Self::HttpStatusError {
            status: status.to_string(),
            request: request.to_string(),
        }
    }
}

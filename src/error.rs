use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    /// The service client could not be built (e.g. no catalog entry for the service)
    #[error("Client initialization failed: {0}")]
    ClientInit(String),

    /// The initial listing request failed
    #[error("Unable to get data: {0}")]
    Fetch(String),

    /// A page body could not be decoded into records
    #[error("Failed to decode page: {0}")]
    Decode(String),

    /// Pagination was aborted after the first page
    #[error("Page iteration aborted: {0}")]
    PageIteration(String),

    #[error("OpenStack API error: {0}")]
    OpenStackApi(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP server error: {0}")]
    Server(String),

    #[error("Metric sink closed: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("{source_name} request failed: {error}")]
    Http {
        source_name: &'static str,
        #[source]
        error: reqwest::Error,
    },

    #[error("{source_name} answered HTTP {status}")]
    Status { source_name: &'static str, status: u16 },

    #[error("{source_name} response could not be decoded: {reason}")]
    Decode { source_name: &'static str, reason: String },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP client could not be built: {0}")]
    Client(#[from] reqwest::Error),
}

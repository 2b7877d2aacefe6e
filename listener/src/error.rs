use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot connect to `{url}`: {reason}")]
    Connect { url: String, reason: String },

    #[error("Rate limited by RPC (429), will retry")]
    RateLimited,

    #[error("Max retries ({0}) exceeded")]
    MaxRetriesExceeded(u32),

    #[error("RPC error: {0}")]
    RpcError(String),
}

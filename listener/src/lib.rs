//! RPC side of the analytics pipeline
//!
//! [`client::ChainReader`] is the seam every on-chain read goes through;
//! [`service`] builds the tolerant, windowed scans on top of it.

pub mod client;
pub mod error;
pub mod service;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{ChainReader, NodeClient};
pub use error::AppError;
pub use service::{BlockWindow, FailedWindow, LogQuery, LogScan};

//! Decoding, classification and aggregation of nLP / Pendle activity
//!
//! [`service::AnalyticsService`] is the entry point: it pulls logs through a
//! [`listener::ChainReader`], decodes them with [`events`], folds them with
//! [`aggregate`] and caches the results.

pub mod aggregate;
pub mod all_time;
pub mod decoder;
pub mod error;
pub mod events;
pub mod outcome;
pub mod service;

pub use error::AppError;
pub use outcome::{FetchIssue, Fetched};
pub use service::AnalyticsService;

//! Explicit fetch outcomes
//!
//! Every fetch still yields usable data when a source misbehaves, but the
//! degradation travels alongside it as [`FetchIssue`]s instead of being
//! swallowed.

use std::fmt;

use listener::LogScan;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchIssue {
    /// The node head could not be read; no logs were requested
    HeadUnavailable { source: String },
    /// One `eth_getLogs` window failed and contributed nothing
    FailedWindow {
        source: String,
        from: u64,
        to: u64,
        reason: String,
    },
    /// A point-in-time chain read failed
    ChainRead { source: String, reason: String },
    /// A third-party API failed
    Adapter { source: String, reason: String },
    /// A paged listing stopped early
    Truncated { source: String, pages: u32 },
    /// A bounded scan stopped short of the chain head
    BehindHead {
        source: String,
        reached: Option<u64>,
        head: u64,
    },
    Snapshot { reason: String },
}

impl fmt::Display for FetchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchIssue::HeadUnavailable { source } => {
                write!(f, "{source}: block height unavailable, no data fetched")
            }
            FetchIssue::FailedWindow {
                source,
                from,
                to,
                reason,
            } => write!(f, "{source}: blocks {from}-{to} missing ({reason})"),
            FetchIssue::ChainRead { source, reason } => write!(f, "{source}: {reason}"),
            FetchIssue::Adapter { source, reason } => write!(f, "{source} unavailable: {reason}"),
            FetchIssue::Truncated { source, pages } => {
                write!(f, "{source}: listing truncated after {pages} pages")
            }
            FetchIssue::BehindHead {
                source,
                reached: Some(reached),
                head,
            } => write!(f, "{source}: scanned to block {reached} of {head}, totals incomplete"),
            FetchIssue::BehindHead {
                source,
                reached: None,
                head,
            } => write!(f, "{source}: not scanned yet (head {head}), totals incomplete"),
            FetchIssue::Snapshot { reason } => write!(f, "snapshot: {reason}"),
        }
    }
}

impl FetchIssue {
    /// Issues describing an incomplete log scan
    pub fn from_scan(source: &str, scan: &LogScan) -> Vec<Self> {
        if scan.head_unavailable {
            return vec![FetchIssue::HeadUnavailable {
                source: source.to_string(),
            }];
        }

        scan.failed_windows
            .iter()
            .map(|failed| FetchIssue::FailedWindow {
                source: source.to_string(),
                from: failed.window.from,
                to: failed.window.to,
                reason: failed.reason.clone(),
            })
            .collect()
    }
}

/// Data plus whatever went wrong while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub issues: Vec<FetchIssue>,
}

impl<T> Fetched<T> {
    pub fn complete(data: T) -> Self {
        Self {
            data,
            issues: Vec::new(),
        }
    }

    pub fn degraded(data: T, issues: Vec<FetchIssue>) -> Self {
        Self { data, issues }
    }

    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            issues: self.issues,
        }
    }

    /// Combine with another outcome, keeping both sets of issues
    pub fn zip<U>(self, other: Fetched<U>) -> Fetched<(T, U)> {
        let mut issues = self.issues;
        issues.extend(other.issues);

        Fetched {
            data: (self.data, other.data),
            issues,
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use listener::{BlockWindow, FailedWindow};

    use super::*;

    #[test]
    fn test_scan_issues() {
        let scan = LogScan {
            failed_windows: vec![FailedWindow {
                window: BlockWindow { from: 1000, to: 1900 },
                reason: "timeout".to_string(),
            }],
            ..Default::default()
        };

        let issues = FetchIssue::from_scan("wNLP transfers", &scan);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "wNLP transfers: blocks 1000-1900 missing (timeout)");
        assert!(FetchIssue::from_scan("x", &LogScan::default()).is_empty());
    }

    #[test]
    fn test_zip_keeps_all_issues() {
        let left = Fetched::degraded(1, vec![FetchIssue::Snapshot { reason: "a".into() }]);
        let right = Fetched::degraded("b", vec![FetchIssue::Snapshot { reason: "b".into() }]);

        let joined = left.zip(right).map(|(n, s)| format!("{n}{s}"));

        assert_eq!(joined.data, "1b");
        assert_eq!(joined.warnings(), vec!["snapshot: a", "snapshot: b"]);
        assert!(!joined.is_complete());
    }
}

//! Error classification and recovery hints.

use strum::{Display, EnumString};

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Authentication,
    Connectivity,
    Network,
    Timeout,
    RateLimit,
    Server,
    Http,
    Decoding,
    Encoding,
    Configuration,
    Storage,
    Request,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckConnection,
    SignInAgain,
    CheckConfiguration,
    ReportBug,
}

use crate::ScoutError;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Conditions evaluated against a received response.
#[derive(Debug, Clone)]
pub enum RequestRetryCondition {
    StatusCode(u16),
    StatusRange { from: u16, to: u16 },
}

/// Conditions evaluated against an error raised while fetching or reading a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorRetryCondition {
    Connection,   // transport failure, no status received
    StaleVersion, // board rejected our client build version
}

#[derive(Debug, Clone)]
pub enum RetryCondition {
    Request(RequestRetryCondition),
    Error(ErrorRetryCondition),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffPolicy {
    Constant,
    Linear,
    Exponential { factor: f32 },
}

/// Declaration order is evaluation order when conditions overlap.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum RetryCategory {
    RateLimit,    // 429
    ServerError,  // 408, 500-599
    Network,      // connection resets, timeouts
    StaleVersion, // 406 from the hh family
}

impl fmt::Display for RetryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryCategory::RateLimit => write!(f, "rate_limit"),
            RetryCategory::ServerError => write!(f, "server_error"),
            RetryCategory::Network => write!(f, "network"),
            RetryCategory::StaleVersion => write!(f, "stale_version"),
        }
    }
}

impl FromStr for RetryCategory {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rate_limit" => Ok(RetryCategory::RateLimit),
            "server_error" => Ok(RetryCategory::ServerError),
            "network" => Ok(RetryCategory::Network),
            "stale_version" => Ok(RetryCategory::StaleVersion),
            other => Err(ScoutError::InvalidSettings(format!(
                "unknown retry category '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryConfig {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_policy: BackoffPolicy,
    pub conditions: Vec<RetryCondition>,
}

#[derive(Debug, Clone)]
pub struct RetryState {
    pub counts: HashMap<RetryCategory, usize>,
    pub total_retries: usize,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub categories: BTreeMap<RetryCategory, CategoryConfig>,
}

use crate::ScoutError;

use super::types::*;
use std::time::Duration;

pub fn retry_request_condition_should_apply(
    condition: &RequestRetryCondition,
    status: u16,
) -> bool {
    match condition {
        RequestRetryCondition::StatusCode(code) => *code == status,
        RequestRetryCondition::StatusRange { from, to } => (*from..=*to).contains(&status),
    }
}

pub fn retry_error_condition_should_apply(
    condition: &ErrorRetryCondition,
    error: &ScoutError,
) -> bool {
    match condition {
        ErrorRetryCondition::Connection => matches!(
            error,
            ScoutError::HttpError(_) | ScoutError::ConnectionError(_)
        ),
        ErrorRetryCondition::StaleVersion => matches!(error, ScoutError::StaleVersion { .. }),
    }
}

/// Delay before retry number `attempt + 1`, never above `max_delay`. Runaway
/// growth and nonsensical factors saturate instead of overflowing `Duration`.
pub fn calculate_delay(config: &CategoryConfig, attempt: usize) -> Duration {
    if attempt == 0 {
        return config.initial_delay.min(config.max_delay);
    }

    let multiplier = match config.backoff_policy {
        BackoffPolicy::Constant => 1.0,
        BackoffPolicy::Linear => attempt as f64 + 1.0,
        BackoffPolicy::Exponential { factor } => {
            f64::from(factor).powi(i32::try_from(attempt).unwrap_or(i32::MAX))
        }
    };

    let secs = config.initial_delay.as_secs_f64() * multiplier;
    if !secs.is_finite() || secs >= config.max_delay.as_secs_f64() {
        return config.max_delay;
    }
    Duration::from_secs_f64(secs.max(0.0))
}

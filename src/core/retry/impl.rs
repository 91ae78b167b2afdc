use crate::{ScoutError, ScoutResult};

use super::types::*;
use super::utils::*;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_policy: BackoffPolicy::Exponential { factor: 2.0 },
            conditions: Vec::new(),
        }
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            total_retries: 0,
        }
    }

    pub fn attempts(&self, category: &RetryCategory) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }
}

impl RetryConfig {
    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: RetryCategory, config: CategoryConfig) -> Self {
        self.categories.insert(category, config);
        self
    }

    pub fn should_retry_request(
        &self,
        status: u16,
        state: &mut RetryState,
    ) -> Option<(RetryCategory, Duration)> {
        self.next_retry(state, |condition| match condition {
            RetryCondition::Request(req_condition) => {
                retry_request_condition_should_apply(req_condition, status)
            }
            RetryCondition::Error(_) => false,
        })
    }

    pub fn should_retry_error(
        &self,
        error: &ScoutError,
        state: &mut RetryState,
    ) -> Option<(RetryCategory, Duration)> {
        self.next_retry(state, |condition| match condition {
            RetryCondition::Error(err_condition) => {
                retry_error_condition_should_apply(err_condition, error)
            }
            RetryCondition::Request(_) => false,
        })
    }

    /// Keeps only transport-level retries. Used where a non-200 answer is itself meaningful,
    /// such as contact lookups and webhook deliveries.
    pub fn transport_only(&self) -> Self {
        let categories = self
            .categories
            .iter()
            .filter_map(|(category, config)| {
                let conditions: Vec<RetryCondition> = config
                    .conditions
                    .iter()
                    .filter(|c| {
                        matches!(c, RetryCondition::Error(ErrorRetryCondition::Connection))
                    })
                    .cloned()
                    .collect();
                if conditions.is_empty() {
                    None
                } else {
                    Some((
                        category.clone(),
                        CategoryConfig {
                            conditions,
                            ..config.clone()
                        },
                    ))
                }
            })
            .collect();
        Self { categories }
    }

    /// First category, in `RetryCategory` order, with budget left and a matching condition.
    fn next_retry<F>(&self, state: &mut RetryState, applies: F) -> Option<(RetryCategory, Duration)>
    where
        F: Fn(&RetryCondition) -> bool,
    {
        for (category, config) in &self.categories {
            let current_retries = state.attempts(category);
            if current_retries >= config.max_retries {
                continue;
            }

            if config.conditions.iter().any(&applies) {
                state.counts.insert(category.clone(), current_retries + 1);
                state.total_retries += 1;
                let delay = calculate_delay(config, current_retries);
                return Some((category.clone(), delay));
            }
        }
        None
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::empty()
            .with_category(
                RetryCategory::RateLimit,
                CategoryConfig {
                    max_retries: 5,
                    initial_delay: Duration::from_secs(10),
                    max_delay: Duration::from_secs(120),
                    backoff_policy: BackoffPolicy::Exponential { factor: 2.0 },
                    conditions: vec![RetryCondition::Request(RequestRetryCondition::StatusCode(
                        429,
                    ))],
                },
            )
            .with_category(
                RetryCategory::ServerError,
                CategoryConfig {
                    max_retries: 5,
                    initial_delay: Duration::from_secs(30),
                    max_delay: Duration::from_secs(30),
                    backoff_policy: BackoffPolicy::Constant,
                    conditions: vec![
                        RetryCondition::Request(RequestRetryCondition::StatusCode(408)),
                        RetryCondition::Request(RequestRetryCondition::StatusRange {
                            from: 500,
                            to: 599,
                        }),
                    ],
                },
            )
            .with_category(
                RetryCategory::Network,
                CategoryConfig {
                    max_retries: 5,
                    initial_delay: Duration::from_secs(30),
                    max_delay: Duration::from_secs(30),
                    backoff_policy: BackoffPolicy::Constant,
                    conditions: vec![RetryCondition::Error(ErrorRetryCondition::Connection)],
                },
            )
            .with_category(
                RetryCategory::StaleVersion,
                CategoryConfig {
                    max_retries: 3,
                    initial_delay: Duration::from_secs(2),
                    max_delay: Duration::from_secs(2),
                    backoff_policy: BackoffPolicy::Constant,
                    conditions: vec![RetryCondition::Error(ErrorRetryCondition::StaleVersion)],
                },
            )
    }
}

impl CategoryConfig {
    pub fn calculate_delay(&self, attempt: usize) -> Duration {
        calculate_delay(self, attempt)
    }

    /// Rejects backoff settings that can only produce nonsense delays.
    pub fn validate(&self, category: &RetryCategory) -> ScoutResult<()> {
        if let BackoffPolicy::Exponential { factor } = self.backoff_policy {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(ScoutError::InvalidSettings(format!(
                    "retry category '{}': exponential factor must be a positive number, got {}",
                    category, factor
                )));
            }
        }
        Ok(())
    }
}

use crate::core::retry::{BackoffPolicy, RetryCategory, RetryConfig};
use crate::{ScoutError, ScoutResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Pacing, persistence and retry knobs shared by every board runner.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub state_dir: PathBuf,
    pub page_cap: usize,
    pub page_delay_ms: u64,
    pub max_vacancy_delay_ms: u64,
    pub restart_delay_secs: u64,
    pub retry: BTreeMap<String, CategoryOverride>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryOverride {
    pub max_retries: Option<usize>,
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub backoff: Option<BackoffPolicy>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("."),
            page_cap: 20,
            page_delay_ms: 2_000,
            max_vacancy_delay_ms: 5_000,
            restart_delay_secs: 120,
            retry: BTreeMap::new(),
        }
    }
}

impl RunnerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn max_vacancy_delay(&self) -> Duration {
        Duration::from_millis(self.max_vacancy_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    /// Default retry policy with the settings-file overrides applied.
    pub fn retry_config(&self) -> ScoutResult<RetryConfig> {
        let mut config = RetryConfig::default();
        for (name, overrides) in &self.retry {
            let category: RetryCategory = name.parse()?;
            let category_config = config.categories.get_mut(&category).ok_or_else(|| {
                ScoutError::InvalidSettings(format!("retry category '{}' has no defaults", name))
            })?;

            if let Some(max_retries) = overrides.max_retries {
                category_config.max_retries = max_retries;
            }
            if let Some(ms) = overrides.initial_delay_ms {
                category_config.initial_delay = Duration::from_millis(ms);
            }
            if let Some(ms) = overrides.max_delay_ms {
                category_config.max_delay = Duration::from_millis(ms);
            }
            if let Some(backoff) = overrides.backoff {
                category_config.backoff_policy = backoff;
            }
            category_config.validate(&category)?;
        }
        Ok(config)
    }
}

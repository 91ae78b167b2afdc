use crate::core::retry::RetryCategory;
use crate::{ScoutError, ScoutResult};
use chrono::prelude::*;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: Url,
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub retry_count: usize,
    pub retry_history: HashMap<RetryCategory, usize>,
}

impl HttpResponse {
    /// Boards and webhooks only count an exact 200 as success.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> ScoutResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn ensure_ok(self) -> ScoutResult<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(ScoutError::UnexpectedStatus {
                url: self.url,
                status: self.status,
            })
        }
    }
}

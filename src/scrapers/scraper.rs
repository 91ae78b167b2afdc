use crate::core::retry::{RetryConfig, RetryState};
use crate::http::{HttpRequest, HttpResponse};
use crate::{ScoutResult, StatsTracker};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, trace, warn};
use std::sync::Arc;
use tokio::time::sleep;

#[async_trait]
pub trait Scraper: Send + Sync {
    async fn fetch_single(&self, request: HttpRequest) -> ScoutResult<HttpResponse>;
    fn stats(&self) -> &StatsTracker;
    fn set_stats(&mut self, stats: Arc<StatsTracker>);

    /// Fetches with retries. Transport errors are retried while a `Connection`
    /// category has budget; responses are retried on matching status.
    /// When the budget runs out the last response (or error) is returned as is.
    async fn fetch(&self, request: HttpRequest, retry: &RetryConfig) -> ScoutResult<HttpResponse> {
        let start_time = Utc::now();
        let mut state = RetryState::new();

        loop {
            debug!("Fetching URL: {} {}", request.method, request.url);
            let response = match self.fetch_single(request.clone()).await {
                Ok(response) => response,
                Err(error) => {
                    if let Some((category, delay)) = retry.should_retry_error(&error, &mut state) {
                        self.stats().record_retry(category.to_string());
                        warn!(
                            "Retry triggered for URL: {} (category={}, attempt={}, delay={:?}): {}",
                            request.url,
                            category,
                            state.attempts(&category),
                            delay,
                            error
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(error);
                }
            };
            trace!(
                "Received response: status={}, body_length={}",
                response.status,
                response.body.len()
            );

            if let Some((category, delay)) =
                retry.should_retry_request(response.status, &mut state)
            {
                self.stats().record_retry(category.to_string());
                warn!(
                    "Retry triggered for URL: {} (category={}, attempt={}/{}, delay={:?})",
                    request.url,
                    category,
                    state.attempts(&category),
                    retry
                        .categories
                        .get(&category)
                        .map(|c| c.max_retries)
                        .unwrap_or(0),
                    delay
                );

                sleep(delay).await;
                continue;
            }

            debug!(
                "Request completed for URL: {} (total_retries={}, status={})",
                request.url, state.total_retries, response.status
            );

            let duration = Utc::now().signed_duration_since(start_time);
            self.stats()
                .record_request(response.status, response.body.len(), duration);

            return Ok(HttpResponse {
                retry_count: state.total_retries,
                retry_history: state.counts,
                ..response
            });
        }
    }
}

use super::Delivery;
use crate::config::WebhookSettings;
use crate::core::retry::RetryConfig;
use crate::http::HttpRequest;
use crate::scrapers::Scraper;
use crate::ScoutResult;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub accepted: usize,
    pub rejected: usize,
}

/// Posts each delivery to every configured endpoint. Only HTTP 200 counts as accepted;
/// rejections are logged and reported, never retried.
pub struct WebhookSink {
    endpoints: Vec<WebhookSettings>,
    retry: RetryConfig,
}

impl WebhookSink {
    pub fn new(endpoints: Vec<WebhookSettings>, retry: &RetryConfig) -> Self {
        if endpoints.is_empty() {
            warn!("No webhooks configured, new vacancies will only be recorded locally");
        }
        Self {
            endpoints,
            retry: retry.transport_only(),
        }
    }

    pub async fn deliver(
        &self,
        scraper: &dyn Scraper,
        delivery: &Delivery<'_>,
    ) -> ScoutResult<DeliveryOutcome> {
        let mut outcome = DeliveryOutcome::default();

        for endpoint in &self.endpoints {
            let payload = delivery.payload(endpoint.format)?;
            let request = HttpRequest::new(endpoint.url.clone()).with_json(&payload)?;
            let response = scraper.fetch(request, &self.retry).await?;

            if response.is_ok() {
                debug!(
                    "Webhook {} accepted vacancy {}",
                    endpoint.url, delivery.vacancy.id
                );
                outcome.accepted += 1;
            } else {
                warn!(
                    "Webhook {} rejected vacancy {}: status {} {}",
                    endpoint.url, delivery.vacancy.id, response.status, response.body
                );
                outcome.rejected += 1;
            }
        }

        Ok(outcome)
    }
}

use chrono::{DateTime, Duration, Utc};
use log::info;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub retry_count: usize,
    pub bytes_downloaded: usize,
    pub status_codes: HashMap<u16, usize>,
    pub retry_reasons: HashMap<String, usize>,
    pub average_response_time: f64, // in milliseconds
    pub pages_fetched: usize,
    pub vacancies_seen: usize,
    pub vacancies_delivered: usize,
    pub webhooks_rejected: usize,
    pub contacts_missing: usize,
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScrapingStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScrapingStats {
                start_time: Utc::now(),
                end_time: None,
                total_requests: 0,
                successful_requests: 0,
                failed_requests: 0,
                retry_count: 0,
                bytes_downloaded: 0,
                status_codes: HashMap::new(),
                retry_reasons: HashMap::new(),
                average_response_time: 0.0,
                pages_fetched: 0,
                vacancies_seen: 0,
                vacancies_delivered: 0,
                webhooks_rejected: 0,
                contacts_missing: 0,
            })),
        }
    }

    pub fn record_request(&self, status: u16, size: usize, duration: Duration) {
        let mut stats = self.stats.write();
        stats.total_requests += 1;

        if status < 400 {
            stats.successful_requests += 1;
        } else {
            stats.failed_requests += 1;
        }

        *stats.status_codes.entry(status).or_insert(0) += 1;
        stats.bytes_downloaded += size;

        let current_total = stats.average_response_time * (stats.total_requests - 1) as f64;
        let new_duration = duration.num_milliseconds() as f64;
        stats.average_response_time = (current_total + new_duration) / stats.total_requests as f64;
    }

    pub fn record_retry(&self, category: String) {
        let mut stats = self.stats.write();
        stats.retry_count += 1;
        *stats.retry_reasons.entry(category).or_insert(0) += 1;
    }

    pub fn record_page(&self, vacancies: usize) {
        let mut stats = self.stats.write();
        stats.pages_fetched += 1;
        stats.vacancies_seen += vacancies;
    }

    pub fn record_delivery(&self, rejected_webhooks: usize) {
        let mut stats = self.stats.write();
        stats.vacancies_delivered += 1;
        stats.webhooks_rejected += rejected_webhooks;
    }

    pub fn record_missing_contacts(&self) {
        self.stats.write().contacts_missing += 1;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        info!("Scraping statistics:");
        info!("  Duration: {} seconds", duration.num_seconds());
        info!("  Total requests: {}", stats.total_requests);
        info!("  Successful requests: {}", stats.successful_requests);
        info!("  Failed requests: {}", stats.failed_requests);
        info!("  Retry count: {}", stats.retry_count);
        info!(
            "  Data downloaded: {:.2} MB",
            stats.bytes_downloaded as f64 / 1_000_000.0
        );
        info!(
            "  Average response time: {:.2}ms",
            stats.average_response_time
        );
        info!("  Pages fetched: {}", stats.pages_fetched);
        info!("  Vacancies seen: {}", stats.vacancies_seen);
        info!("  Vacancies delivered: {}", stats.vacancies_delivered);
        info!("  Webhooks rejected: {}", stats.webhooks_rejected);
        info!("  Missed contact lookups: {}", stats.contacts_missing);

        for (code, count) in &stats.status_codes {
            info!("  Status {}: {}", code, count);
        }

        for (reason, count) in &stats.retry_reasons {
            info!("  Retries ({}): {}", reason, count);
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

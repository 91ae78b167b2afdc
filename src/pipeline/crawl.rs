use super::{ContactEnricher, Deduplicator, PageCursor, PageFetcher, PageState};
use crate::catalog::QueryTarget;
use crate::config::{RunnerConfig, SortOrder};
use crate::core::retry::RetryConfig;
use crate::core::{BoardSession, JobBoard};
use crate::delivery::{Delivery, WebhookSink};
use crate::models::VacancyRecord;
use crate::scrapers::Scraper;
use crate::storage::VacancyStore;
use crate::ScoutResult;
use log::{debug, error, info};
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub pages: usize,
    pub delivered: usize,
}

/// Crawls one query target: page by page, deliver what is new, persist after
/// every page.
pub struct TargetCrawl<'a> {
    pub board: &'a dyn JobBoard,
    pub scraper: &'a dyn Scraper,
    pub store: &'a dyn VacancyStore,
    pub sink: &'a WebhookSink,
    pub retry: &'a RetryConfig,
    pub config: &'a RunnerConfig,
    pub order: &'a SortOrder,
}

fn vacancy_delay(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=max_ms))
}

impl TargetCrawl<'_> {
    pub async fn run(
        &self,
        target: &QueryTarget,
        session: &mut BoardSession,
    ) -> ScoutResult<CrawlReport> {
        let mut dedup = Deduplicator::new(self.store.load_seen().await?);
        info!(
            "{}: {} vacancies in storage",
            self.board.name(),
            dedup.persisted_count()
        );

        let cursor = PageCursor::new(self.config.page_cap);
        let fetcher = PageFetcher::new(self.board, self.scraper, self.retry);
        let mut report = CrawlReport::default();
        let mut state = cursor.start();

        while let PageState::Fetching(page) = state {
            info!("{}: {}, page {}", self.board.name(), target, page + 1);
            let result = fetcher
                .fetch(target, page, self.order, session)
                .await?;
            self.scraper.stats().record_page(result.vacancies.len());

            let mut log_rows = Vec::new();
            let delivered = self
                .deliver_page(&result.vacancies, &mut dedup, &mut log_rows)
                .await;

            // Whatever went out before a failure is recorded before the failure propagates.
            self.store.save_seen(&dedup.snapshot()).await?;
            self.store.append_log(&log_rows).await?;
            report.delivered += delivered?;
            report.pages += 1;

            state = cursor.advance(page, &result);
            sleep(self.config.page_delay()).await;
        }

        debug!(
            "{}: {} done after {} pages, {} delivered",
            self.board.name(),
            target,
            report.pages,
            report.delivered
        );
        Ok(report)
    }

    async fn deliver_page(
        &self,
        vacancies: &[VacancyRecord],
        dedup: &mut Deduplicator,
        log_rows: &mut Vec<String>,
    ) -> ScoutResult<usize> {
        let enricher = ContactEnricher::new(self.board, self.scraper, self.retry);
        let candidates = dedup.candidates(vacancies);
        let mut delivered = 0;

        for vacancy in candidates {
            let contact = enricher.enrich(vacancy).await?;
            if contact.is_empty() && !self.board.deliver_without_contacts() {
                debug!(
                    "{}: holding vacancy {} until its contacts are reachable",
                    self.board.name(),
                    vacancy.id
                );
                continue;
            }
            let delivery = Delivery::new(vacancy, &contact, self.board.name());
            let outcome = match self.sink.deliver(self.scraper, &delivery).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Delivering vacancy {} failed: {}", vacancy.id, e);
                    return Err(e);
                }
            };

            self.scraper.stats().record_delivery(outcome.rejected);
            log_rows.push(delivery.summary_line());
            dedup.mark_delivered(vacancy.id.clone());
            delivered += 1;

            sleep(vacancy_delay(self.config.max_vacancy_delay())).await;
        }

        Ok(delivered)
    }
}

use crate::catalog::QueryTarget;
use crate::config::SortOrder;
use crate::core::retry::{RetryCategory, RetryConfig, RetryState};
use crate::core::{BoardSession, JobBoard, PageQuery};
use crate::models::SearchPage;
use crate::scrapers::Scraper;
use crate::{ScoutError, ScoutResult};
use log::warn;
use tokio::time::sleep;

/// Fetches result pages, re-discovering the board session whenever the board
/// reports it stale. Transport and status retries happen inside the scraper.
pub struct PageFetcher<'a> {
    board: &'a dyn JobBoard,
    scraper: &'a dyn Scraper,
    retry: &'a RetryConfig,
}

impl<'a> PageFetcher<'a> {
    pub fn new(board: &'a dyn JobBoard, scraper: &'a dyn Scraper, retry: &'a RetryConfig) -> Self {
        Self {
            board,
            scraper,
            retry,
        }
    }

    pub async fn fetch(
        &self,
        target: &QueryTarget,
        page: usize,
        order: &SortOrder,
        session: &mut BoardSession,
    ) -> ScoutResult<SearchPage> {
        let mut state = RetryState::new();

        loop {
            let query = PageQuery {
                target,
                page,
                order,
                session: &*session,
            };
            let error = match self.board.fetch_page(self.scraper, query, self.retry).await {
                Err(error @ ScoutError::StaleVersion { .. }) => error,
                result => return result,
            };

            let Some((category, delay)) = self.retry.should_retry_error(&error, &mut state) else {
                return Err(ScoutError::MaxRetriesReached {
                    category: RetryCategory::StaleVersion,
                    board: self.board.name().to_string(),
                    attempts: state.attempts(&RetryCategory::StaleVersion),
                });
            };

            self.scraper.stats().record_retry(category.to_string());
            warn!(
                "{}: {}, refreshing session (attempt {}, delay {:?})",
                self.board.name(),
                error,
                state.attempts(&category),
                delay
            );
            sleep(delay).await;
            *session = self.board.refresh_session(self.scraper, self.retry).await?;
        }
    }
}

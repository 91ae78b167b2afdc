use crate::catalog::{QueryTarget, Taxonomy};
use crate::config::{ParserSettings, SortOrder};
use crate::core::retry::RetryConfig;
use crate::models::{ContactInfo, SearchPage, VacancyRecord};
use crate::scrapers::Scraper;
use crate::ScoutResult;
use async_trait::async_trait;

/// Per-crawl state a board needs on every search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSession {
    /// Frontend build the hh family insists on; `None` until first discovered.
    pub static_version: Option<String>,
}

/// One search request: which target, which page, in which order.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery<'a> {
    pub target: &'a QueryTarget,
    pub page: usize,
    pub order: &'a SortOrder,
    pub session: &'a BoardSession,
}

/// Site adapter. Builds the board's requests and maps its responses into the
/// shared model; pagination, dedup and delivery live in the pipeline.
#[async_trait]
pub trait JobBoard: Send + Sync {
    /// Site name as used in the settings file and payloads, e.g. `hh.ru`.
    fn name(&self) -> &str;

    /// File stem of the board's state files.
    fn state_stem(&self) -> &str;

    /// Applies the operator's per-board settings: host override and the headers
    /// sent on this board's requests only.
    fn with_parser(self, parser: &ParserSettings) -> Self
    where
        Self: Sized;

    /// Whether a candidate whose contact lookup came back empty is still
    /// delivered. When `false` it stays unseen and is retried next cycle.
    fn deliver_without_contacts(&self) -> bool {
        true
    }

    async fn load_taxonomy(
        &self,
        scraper: &dyn Scraper,
        retry: &RetryConfig,
    ) -> ScoutResult<Taxonomy>;

    /// Fails with `ScoutError::StaleVersion` when the board rejects the session.
    async fn fetch_page(
        &self,
        scraper: &dyn Scraper,
        query: PageQuery<'_>,
        retry: &RetryConfig,
    ) -> ScoutResult<SearchPage>;

    async fn refresh_session(
        &self,
        _scraper: &dyn Scraper,
        _retry: &RetryConfig,
    ) -> ScoutResult<BoardSession> {
        Ok(BoardSession::default())
    }

    /// Contact details for a candidate. Boards that list contacts inline return
    /// them without a request.
    async fn fetch_contacts(
        &self,
        _scraper: &dyn Scraper,
        vacancy: &VacancyRecord,
        _retry: &RetryConfig,
    ) -> ScoutResult<ContactInfo> {
        Ok(vacancy.inline_contact.clone().unwrap_or_default())
    }
}

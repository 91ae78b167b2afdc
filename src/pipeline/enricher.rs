use crate::core::retry::RetryConfig;
use crate::core::JobBoard;
use crate::models::{ContactInfo, VacancyRecord};
use crate::scrapers::Scraper;
use crate::ScoutResult;
use log::debug;

pub struct ContactEnricher<'a> {
    board: &'a dyn JobBoard,
    scraper: &'a dyn Scraper,
    retry: &'a RetryConfig,
}

impl<'a> ContactEnricher<'a> {
    pub fn new(board: &'a dyn JobBoard, scraper: &'a dyn Scraper, retry: &'a RetryConfig) -> Self {
        Self {
            board,
            scraper,
            retry,
        }
    }

    /// Missing contacts are an empty result, not an error.
    pub async fn enrich(&self, vacancy: &VacancyRecord) -> ScoutResult<ContactInfo> {
        let contact = self
            .board
            .fetch_contacts(self.scraper, vacancy, self.retry)
            .await?;
        if contact.is_empty() {
            debug!("Vacancy {} has no reachable contacts", vacancy.id);
            self.scraper.stats().record_missing_contacts();
        }
        Ok(contact)
    }
}

//! The polling loop shared by every board: fetch a page, keep what is new,
//! enrich it, deliver it, persist.

mod crawl;
mod cursor;
mod dedup;
mod enricher;
mod fetcher;

pub use crawl::{CrawlReport, TargetCrawl};
pub use cursor::{PageCursor, PageState};
pub use dedup::Deduplicator;
pub use enricher::ContactEnricher;
pub use fetcher::PageFetcher;

#[cfg(test)]
mod tests;

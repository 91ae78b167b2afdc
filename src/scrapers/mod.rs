pub mod http_scraper;
#[cfg(test)]
pub mod mock_scraper;

mod scraper;
pub use http_scraper::HttpScraper;
#[cfg(test)]
pub use mock_scraper::{MockResponse, MockScraper};
pub use scraper::Scraper;

use super::{BoardSession, JobBoard};
use crate::catalog::resolve_targets;
use crate::config::{ParserSettings, RunnerConfig, SearchSettings};
use crate::core::retry::RetryConfig;
use crate::delivery::WebhookSink;
use crate::pipeline::TargetCrawl;
use crate::scrapers::{HttpScraper, Scraper};
use crate::storage::{DiskStorage, VacancyStore};
use crate::{ScoutResult, StatsTracker};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::time::sleep;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub targets: usize,
    pub pages: usize,
    pub delivered: usize,
}

/// Drives one board forever: resolve the catalog, crawl every target, start over.
pub struct Runner {
    board: Box<dyn JobBoard>,
    scraper: Box<dyn Scraper>,
    store: Box<dyn VacancyStore>,
    sink: WebhookSink,
    parser: ParserSettings,
    config: RunnerConfig,
    retry: RetryConfig,
    stats: Arc<StatsTracker>,
}

impl Runner {
    pub fn new(
        board: Box<dyn JobBoard>,
        scraper: Box<dyn Scraper>,
        settings: &SearchSettings,
    ) -> ScoutResult<Self> {
        info!("Initializing {} runner", board.name());
        let parser = settings.parser(board.name())?.clone();
        let config = settings.runner.clone();
        let retry = config.retry_config()?;

        let stats = Arc::new(StatsTracker::new());
        let mut scraper = scraper;
        scraper.set_stats(Arc::clone(&stats));

        let store = Box::new(DiskStorage::new(&config.state_dir, board.state_stem()));
        let sink = WebhookSink::new(settings.webhooks.clone(), &retry);

        Ok(Self {
            board,
            scraper,
            store,
            sink,
            parser,
            config,
            retry,
            stats,
        })
    }

    pub fn with_store(mut self, store: Box<dyn VacancyStore>) -> Self {
        self.store = store;
        self
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    pub async fn run_cycle(&self) -> ScoutResult<CycleReport> {
        let cycle_id = Uuid::now_v7();
        info!("[{}] Starting {} cycle", cycle_id, self.board.name());

        let taxonomy = self
            .board
            .load_taxonomy(self.scraper.as_ref(), &self.retry)
            .await?;
        let targets = resolve_targets(&taxonomy, &self.parser.whitelist());
        if targets.is_empty() {
            warn!(
                "[{}] No whitelisted targets for {}, check structure.areas and structure.roles",
                cycle_id,
                self.board.name()
            );
        }

        let order = self.parser.sort_order();
        let crawl = TargetCrawl {
            board: self.board.as_ref(),
            scraper: self.scraper.as_ref(),
            store: self.store.as_ref(),
            sink: &self.sink,
            retry: &self.retry,
            config: &self.config,
            order: &order,
        };

        let mut session = BoardSession::default();
        let mut report = CycleReport::default();
        for target in &targets {
            let crawled = crawl.run(target, &mut session).await?;
            report.targets += 1;
            report.pages += crawled.pages;
            report.delivered += crawled.delivered;
        }

        info!(
            "[{}] {} cycle finished: {} targets, {} pages, {} delivered",
            cycle_id,
            self.board.name(),
            report.targets,
            report.pages,
            report.delivered
        );
        self.stats.finish();
        self.stats.print_summary();
        Ok(report)
    }

    /// Returns only on a configuration error; anything else restarts the cycle
    /// after `restart_delay`.
    pub async fn run_forever(&self) -> ScoutResult<()> {
        loop {
            match self.run_cycle().await {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(
                        "{} cycle failed: {}. Restarting in {:?}",
                        self.board.name(),
                        e,
                        self.config.restart_delay()
                    );
                    sleep(self.config.restart_delay()).await;
                }
            }
        }
    }
}

/// Builds the runner for `board` from the settings file and runs it. The
/// board's own headers ride on its requests only, never on webhook posts.
pub async fn run_board<B: JobBoard + 'static>(board: B, settings: SearchSettings) -> ScoutResult<()> {
    let parser = settings.parser(board.name())?;
    let board = board.with_parser(parser);
    Runner::new(Box::new(board), Box::new(HttpScraper::new()?), &settings)?
        .run_forever()
        .await
}

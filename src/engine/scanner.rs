//! Riven auction scan pipeline.
//!
//! Walks the whole riven catalog one weapon at a time, scores every
//! direct-buyout auction, and streams the ones that pass the filter to the
//! sink as soon as they arrive. Optionally re-emits the collected results
//! sorted by endo per platinum once every category has been scanned.
//!
//! Fetches are strictly serial: the marketplace request budget is the
//! bottleneck, so there is nothing to gain from fanning out.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::presenter::{self, Presenter};
use super::sink::Sink;
use crate::config::ScanConfig;
use crate::platforms::{AuctionFilters, MarketApi};
use crate::strategy::{FilterPolicy, ScoringEngine};
use crate::types::{
    FailurePolicy, ItemCategory, RawAuctionListing, ScanError, ScanSummary, ScoredListing,
    SortDirection,
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle of a single scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Init,
    FetchingCategories,
    /// Scanning the category at this index of the catalog.
    ScanningCategory(usize),
    Done,
    /// A fatal error ended the run.
    Aborted,
}

/// Counters accumulated while scanning.
#[derive(Debug, Default)]
struct Counters {
    categories_scanned: usize,
    categories_skipped: usize,
    examined: usize,
    excluded: usize,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// One scan run: catalog → auctions → score → filter → emit → sort.
pub struct ScanPipeline<M, S> {
    market: M,
    sink: S,
    presenter: Presenter,
    filter: FilterPolicy,
    auction_filters: AuctionFilters,
    silent: bool,
    sort: Option<SortDirection>,
    failure_policy: FailurePolicy,
    progress_every: usize,
    state: ScanState,
    results: Vec<ScoredListing>,
}

impl<M: MarketApi, S: Sink> ScanPipeline<M, S> {
    /// Build a pipeline from a validated config.
    pub fn new(market: M, sink: S, config: &ScanConfig) -> Self {
        Self {
            market,
            sink,
            presenter: Presenter::new(config.auction_link_base.clone()),
            filter: FilterPolicy::new(config.filter_params()),
            auction_filters: config.auction_filters(),
            silent: config.silent,
            sort: config.sort,
            failure_policy: config.failure_policy,
            progress_every: config.progress_every.max(1),
            state: ScanState::Init,
            results: Vec::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Listings that passed the filter, in emission order (or sorted order
    /// once a final sort has run).
    pub fn results(&self) -> &[ScoredListing] {
        &self.results
    }

    pub fn market(&self) -> &M {
        &self.market
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the pipeline, returning the sink and the collected results.
    pub fn into_parts(self) -> (S, Vec<ScoredListing>) {
        (self.sink, self.results)
    }

    /// Execute the scan. Any fatal error moves the pipeline to `Aborted`.
    ///
    /// A pipeline runs once; calling `run` again fails with
    /// [`ScanError::AlreadyRun`] and leaves state and results untouched.
    pub async fn run(&mut self) -> Result<ScanSummary, ScanError> {
        if self.state != ScanState::Init {
            return Err(ScanError::AlreadyRun);
        }

        match self.run_inner().await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.state = ScanState::Aborted;
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<ScanSummary, ScanError> {
        let started_at = Utc::now();
        let clock = Instant::now();

        info!(
            platform = self.market.name(),
            min_rerolls = ?self.auction_filters.min_rerolls,
            sort = ?self.sort,
            policy = ?self.failure_policy,
            "Starting riven scan"
        );

        // 1. Catalog
        self.state = ScanState::FetchingCategories;
        let categories = self.market.list_categories().await?;

        if !self.silent {
            self.sink.emit(&presenter::catalog_line(categories.len()));
        }

        // 2. Auctions, one category at a time
        let mut counters = Counters::default();

        for (index, category) in categories.iter().enumerate() {
            self.state = ScanState::ScanningCategory(index);

            let auctions = match self
                .market
                .list_auctions(category, self.auction_filters)
                .await
            {
                Ok(auctions) => auctions,
                Err(e) if self.should_skip(&e) => {
                    warn!(category = %category.slug, error = %e, "Skipping category after failed fetch");
                    counters.categories_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if !self.silent && index != 0 && index % self.progress_every == 0 {
                self.sink.emit(&presenter::progress_line(counters.excluded));
            }

            self.process_batch(category, auctions, &mut counters);
            counters.categories_scanned += 1;
        }

        self.state = ScanState::Done;

        // 3. Optional ranked view
        if let Some(direction) = self.sort {
            self.sort_results(direction);
            self.sink.clear();
            let blocks: Vec<String> =
                self.results.iter().map(|r| self.presenter.render(r)).collect();
            for block in &blocks {
                self.emit_block(block);
            }
        }

        // 4. Timing
        let elapsed = clock.elapsed();
        self.sink.emit(&presenter::finished_line(elapsed));

        let summary = ScanSummary {
            started_at,
            elapsed,
            categories_scanned: counters.categories_scanned,
            categories_skipped: counters.categories_skipped,
            listings_examined: counters.examined,
            listings_excluded: counters.excluded,
            listings_included: self.results.len(),
        };

        info!(
            categories = summary.categories_scanned,
            skipped = summary.categories_skipped,
            examined = summary.listings_examined,
            included = summary.listings_included,
            elapsed_secs = summary.elapsed.as_secs(),
            "Riven scan complete"
        );

        Ok(summary)
    }

    /// Score, filter and stream one category's auctions.
    fn process_batch(
        &mut self,
        category: &ItemCategory,
        auctions: Vec<RawAuctionListing>,
        counters: &mut Counters,
    ) {
        let fetched = auctions.len();
        let mut kept = 0usize;

        for raw in auctions {
            counters.examined += 1;
            let scored = ScoringEngine::enrich(raw, category);

            if !self.filter.included(&scored) {
                counters.excluded += 1;
                continue;
            }

            let block = self.presenter.render(&scored);
            self.emit_block(&block);
            self.results.push(scored);
            kept += 1;
        }

        debug!(
            category = %category.slug,
            fetched,
            kept,
            "Category scanned"
        );
    }

    /// Lenient mode skips transport/decode failures; cancellation is
    /// always fatal.
    fn should_skip(&self, err: &ScanError) -> bool {
        self.failure_policy == FailurePolicy::Lenient && !err.is_cancellation()
    }

    /// Stable sort by endo per platinum. Ties keep catalog-then-arrival order.
    fn sort_results(&mut self, direction: SortDirection) {
        match direction {
            SortDirection::Ascending => self
                .results
                .sort_by(|a, b| a.efficiency_per_cost().total_cmp(&b.efficiency_per_cost())),
            SortDirection::Descending => self
                .results
                .sort_by(|a, b| b.efficiency_per_cost().total_cmp(&a.efficiency_per_cost())),
        }
    }

    fn emit_block(&mut self, block: &str) {
        if !self.silent {
            self.sink.emit("");
        }
        self.sink.emit(block);
        self.sink.emit("");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Scan configuration.
//!
//! Options come from three layers, later ones winning: built-in defaults,
//! an optional TOML file (`[scan]` table), and command-line overrides.
//! The merged `ScanConfig` is validated once at startup and passed down.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::engine::presenter::DEFAULT_AUCTION_LINK_BASE;
use crate::platforms::warframe_market::{DEFAULT_BASE_URL, DEFAULT_GAME_PLATFORM};
use crate::platforms::AuctionFilters;
use crate::strategy::FilterParams;
use crate::types::{FailurePolicy, ScanError, SortDirection};

/// Default config file looked up when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "rivenscan.toml";

/// Fully resolved options for one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub min_price: i64,
    pub max_price: i64,
    pub min_efficiency_per_cost: f64,
    pub min_rerolls: Option<u32>,
    /// Suppress header, progress and separator lines.
    pub silent: bool,
    /// Re-emit all results sorted by endo per platinum once the scan ends.
    pub sort: Option<SortDirection>,
    pub failure_policy: FailurePolicy,
    /// Report the skipped count every this many categories.
    pub progress_every: usize,
    pub api_base_url: String,
    pub auction_link_base: String,
    pub game_platform: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_price: 10,
            max_price: 100,
            min_efficiency_per_cost: 300.0,
            min_rerolls: None,
            silent: false,
            sort: None,
            failure_policy: FailurePolicy::Strict,
            progress_every: 50,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            auction_link_base: DEFAULT_AUCTION_LINK_BASE.to_string(),
            game_platform: DEFAULT_GAME_PLATFORM.to_string(),
        }
    }
}

impl ScanConfig {
    /// Check that the options describe a scan that can match anything.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.min_price < 0 {
            return Err(ScanError::Config(format!(
                "min_price must not be negative (got {})",
                self.min_price
            )));
        }
        if self.min_price > self.max_price {
            return Err(ScanError::Config(format!(
                "min_price ({}) is greater than max_price ({})",
                self.min_price, self.max_price
            )));
        }
        if !self.min_efficiency_per_cost.is_finite() {
            return Err(ScanError::Config(
                "min_efficiency_per_cost must be a finite number".to_string(),
            ));
        }
        if self.progress_every == 0 {
            return Err(ScanError::Config(
                "progress_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Overlay every option that is set in `overrides`.
    pub fn apply(&mut self, overrides: ScanOverrides) {
        if let Some(v) = overrides.min_price {
            self.min_price = v;
        }
        if let Some(v) = overrides.max_price {
            self.max_price = v;
        }
        if let Some(v) = overrides.min_efficiency_per_cost {
            self.min_efficiency_per_cost = v;
        }
        if let Some(v) = overrides.min_rerolls {
            self.min_rerolls = Some(v);
        }
        if let Some(v) = overrides.silent {
            self.silent = v;
        }
        if let Some(v) = overrides.sort {
            self.sort = Some(v);
        }
        if let Some(v) = overrides.failure_policy {
            self.failure_policy = v;
        }
        if let Some(v) = overrides.progress_every {
            self.progress_every = v;
        }
        if let Some(v) = overrides.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = overrides.auction_link_base {
            self.auction_link_base = v;
        }
        if let Some(v) = overrides.game_platform {
            self.game_platform = v;
        }
    }

    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            min_price: self.min_price,
            max_price: self.max_price,
            min_efficiency_per_cost: self.min_efficiency_per_cost,
        }
    }

    pub fn auction_filters(&self) -> AuctionFilters {
        AuctionFilters {
            min_rerolls: self.min_rerolls,
        }
    }
}

/// A partial set of options, as found in the config file or on the CLI.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanOverrides {
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    #[serde(alias = "min_endo_per_plat")]
    pub min_efficiency_per_cost: Option<f64>,
    pub min_rerolls: Option<u32>,
    pub silent: Option<bool>,
    pub sort: Option<SortDirection>,
    pub failure_policy: Option<FailurePolicy>,
    pub progress_every: Option<usize>,
    pub api_base_url: Option<String>,
    pub auction_link_base: Option<String>,
    pub game_platform: Option<String>,
}

/// Top-level shape of the TOML config file.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub scan: ScanOverrides,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load `path` if it exists, otherwise return `None`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

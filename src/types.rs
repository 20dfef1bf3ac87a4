//! Shared types for the RIVENSCAN scanner.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that platform, strategy,
//! and engine modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One tradeable weapon that rivens can be listed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCategory {
    /// Human-readable weapon name, e.g. "Kuva Bramma".
    pub display_name: String,
    /// Stable external key used in auction queries, e.g. "kuva_bramma".
    pub slug: String,
}

impl ItemCategory {
    pub fn new(display_name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            slug: slug.into(),
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.slug)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Seller presence as reported by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerStatus {
    Online,
    Ingame,
    Offline,
}

impl OwnerStatus {
    /// Whether a trade request sent now could be answered.
    pub fn is_reachable(&self) -> bool {
        !matches!(self, OwnerStatus::Offline)
    }
}

impl fmt::Display for OwnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerStatus::Online => write!(f, "online"),
            OwnerStatus::Ingame => write!(f, "ingame"),
            OwnerStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Parse the marketplace's status string. Unknown values are treated as
/// offline so they are never considered actionable.
impl std::str::FromStr for OwnerStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "online" => OwnerStatus::Online,
            "ingame" => OwnerStatus::Ingame,
            _ => OwnerStatus::Offline,
        })
    }
}

/// Ordering applied by the final-sort pass, keyed on endo per platinum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ascending"),
            SortDirection::Descending => write!(f, "descending"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(ScanError::Config(format!("Unknown sort direction: {s}"))),
        }
    }
}

/// What the pipeline does when a single category's auction fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failed fetch.
    #[default]
    Strict,
    /// Log the failure, skip the category and keep scanning.
    Lenient,
}

// ---------------------------------------------------------------------------
// Auctions
// ---------------------------------------------------------------------------

/// A direct-buyout riven auction as returned by the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAuctionListing {
    pub id: String,
    /// Buyout price in platinum.
    pub buyout_price: i64,
    pub owner_name: String,
    pub owner_status: OwnerStatus,
    /// Riven name suffix, e.g. "Acri-visiata".
    pub item_display_name: String,
    pub reroll_count: i32,
    pub mod_rank: i32,
    pub mastery_level: i32,
}

/// A listing enriched with its category and endo figures.
///
/// Built once by [`crate::strategy::scoring::ScoringEngine`] and never
/// modified afterwards; fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    listing: RawAuctionListing,
    category: ItemCategory,
    efficiency_score: i64,
    efficiency_per_cost: f64,
}

impl ScoredListing {
    pub(crate) fn new(
        listing: RawAuctionListing,
        category: ItemCategory,
        efficiency_score: i64,
        efficiency_per_cost: f64,
    ) -> Self {
        Self {
            listing,
            category,
            efficiency_score,
            efficiency_per_cost,
        }
    }

    pub fn listing(&self) -> &RawAuctionListing {
        &self.listing
    }

    pub fn category(&self) -> &ItemCategory {
        &self.category
    }

    /// Endo yielded by dissolving the riven, net of the baseline cost.
    pub fn efficiency_score(&self) -> i64 {
        self.efficiency_score
    }

    /// Endo per platinum. Non-finite when the buyout price was not positive.
    pub fn efficiency_per_cost(&self) -> f64 {
        self.efficiency_per_cost
    }
}

impl fmt::Display for ScoredListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} for {}p (endo: {} | endo/p: {:.2} | {} {})",
            self.listing.id,
            self.category.display_name,
            self.listing.item_display_name,
            self.listing.buyout_price,
            self.efficiency_score,
            self.efficiency_per_cost,
            self.listing.owner_name,
            self.listing.owner_status,
        )
    }
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Counters describing one completed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub categories_scanned: usize,
    /// Categories dropped after a failed fetch (lenient policy only).
    pub categories_skipped: usize,
    pub listings_examined: usize,
    pub listings_excluded: usize,
    pub listings_included: usize,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan: categories={} skipped={} examined={} excluded={} included={} in {:.1}s",
            self.categories_scanned,
            self.categories_skipped,
            self.listings_examined,
            self.listings_excluded,
            self.listings_included,
            self.elapsed.as_secs_f64(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for RIVENSCAN.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Transport error ({url}): {message}")]
    Transport { url: String, message: String },

    #[error("Decode error ({url}): {message}")]
    Decode { url: String, message: String },

    #[error("Rate limiter wait cancelled")]
    Cancelled,

    #[error("Failed to fetch auctions for {category}: {cause}")]
    FetchFailed {
        category: String,
        cause: Box<ScanError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scan pipeline has already run")]
    AlreadyRun,
}

impl ScanError {
    /// Whether this error stops the run regardless of the failure policy.
    pub fn is_cancellation(&self) -> bool {
        match self {
            ScanError::Cancelled => true,
            ScanError::FetchFailed { cause, .. } => cause.is_cancellation(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

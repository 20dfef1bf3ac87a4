//! Marketplace integration.
//!
//! Defines the `MarketApi` trait the scan pipeline consumes and the
//! `JsonFetch` transport seam underneath it:
//! - `warframe_market`: the read-only warframe.market v1 client
//! - `rate_limiter`: the shared outbound request budget

pub mod rate_limiter;
pub mod warframe_market;

use async_trait::async_trait;

use crate::types::{ItemCategory, RawAuctionListing, ScanError};

/// Server-side restrictions applied to an auction search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuctionFilters {
    /// Only return rivens rerolled at least this many times.
    pub min_rerolls: Option<u32>,
}

/// Read operations the scan pipeline needs from the marketplace.
///
/// Implementations are expected to apply their own rate limiting; the
/// pipeline calls these strictly one at a time.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Fetch the full catalog of weapons rivens can be listed for.
    async fn list_categories(&self) -> Result<Vec<ItemCategory>, ScanError>;

    /// Fetch one page of direct-buyout auctions for `category`, cheapest
    /// first. Failures are reported as [`ScanError::FetchFailed`].
    async fn list_auctions(
        &self,
        category: &ItemCategory,
        filters: AuctionFilters,
    ) -> Result<Vec<RawAuctionListing>, ScanError>;

    /// Platform name for logging and identification.
    fn name(&self) -> &str;
}

/// Generic "GET a URL and hand back the JSON body" capability.
///
/// Transport failures map to [`ScanError::Transport`]; bodies that are not
/// JSON map to [`ScanError::Decode`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JsonFetch: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, ScanError>;
}

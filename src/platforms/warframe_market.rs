//! warframe.market read-only integration.
//!
//! Lists the riven weapon catalog and searches direct-buyout riven
//! auctions per weapon. No authentication and no write access.
//!
//! API: `https://api.warframe.market/v1`
//! Auth: Not required for reading.
//! Rate limit: ~3 requests/second per client.
//! Platform: selected with the `Platform` header (pc, xbox, ps4, switch).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::rate_limiter::RateLimiter;
use super::{AuctionFilters, JsonFetch, MarketApi};
use crate::types::{ItemCategory, OwnerStatus, RawAuctionListing, ScanError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.warframe.market/v1";
const PLATFORM_NAME: &str = "warframe.market";

const RIVEN_ITEMS_ROUTE: &str = "/riven/items";
const AUCTION_SEARCH_ROUTE: &str = "/auctions/search";

/// Gaming platform whose market is queried when none is configured.
pub const DEFAULT_GAME_PLATFORM: &str = "pc";

// ---------------------------------------------------------------------------
// API response types (warframe.market JSON → Rust)
// ---------------------------------------------------------------------------

/// Response from `/riven/items`.
#[derive(Debug, Deserialize)]
struct RivenItemsResponse {
    payload: RivenItemsPayload,
}

#[derive(Debug, Deserialize)]
struct RivenItemsPayload {
    items: Vec<RivenItem>,
}

#[derive(Debug, Deserialize)]
struct RivenItem {
    item_name: String,
    url_name: String,
}

/// Response from `/auctions/search`.
#[derive(Debug, Deserialize)]
struct AuctionSearchResponse {
    payload: AuctionSearchPayload,
}

#[derive(Debug, Deserialize)]
struct AuctionSearchPayload {
    auctions: Vec<Auction>,
}

#[derive(Debug, Deserialize)]
struct Auction {
    id: String,
    /// Null on auctions without a buyout; treated as a zero price.
    buyout_price: Option<i64>,
    owner: AuctionOwner,
    item: AuctionItem,
}

#[derive(Debug, Deserialize)]
struct AuctionOwner {
    ingame_name: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct AuctionItem {
    name: String,
    re_rolls: i32,
    mod_rank: i32,
    mastery_level: i32,
}

impl From<RivenItem> for ItemCategory {
    fn from(item: RivenItem) -> Self {
        ItemCategory::new(item.item_name, item.url_name)
    }
}

impl From<Auction> for RawAuctionListing {
    fn from(a: Auction) -> Self {
        // FromStr for OwnerStatus is infallible.
        let owner_status = a
            .owner
            .status
            .parse::<OwnerStatus>()
            .unwrap_or(OwnerStatus::Offline);

        RawAuctionListing {
            id: a.id,
            buyout_price: a.buyout_price.unwrap_or(0),
            owner_name: a.owner.ingame_name,
            owner_status,
            item_display_name: a.item.name,
            reroll_count: a.item.re_rolls,
            mod_rank: a.item.mod_rank,
            mastery_level: a.item.mastery_level,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// `JsonFetch` over reqwest.
pub struct HttpFetcher {
    http: Client,
    game_platform: String,
}

impl HttpFetcher {
    /// Create a fetcher that queries the given gaming platform's market.
    pub fn new(game_platform: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("RIVENSCAN/0.1.0 (riven-auction-scanner)")
            .build()
            .context("Failed to build HTTP client for warframe.market")?;

        Ok(Self {
            http,
            game_platform: game_platform.to_string(),
        })
    }
}

#[async_trait]
impl JsonFetch for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, ScanError> {
        let transport = |message: String| ScanError::Transport {
            url: url.to_string(),
            message,
        };

        let resp = self
            .http
            .get(url)
            .header("Platform", &self.game_platform)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(transport(format!("HTTP {status}: {body}")));
        }

        let body = resp.text().await.map_err(|e| transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| ScanError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// warframe.market client. Every request waits on the shared rate limiter.
pub struct WarframeMarketClient<F = HttpFetcher> {
    fetcher: F,
    limiter: RateLimiter,
    base_url: String,
}

impl<F: JsonFetch> WarframeMarketClient<F> {
    pub fn new(fetcher: F, limiter: RateLimiter) -> Self {
        Self {
            fetcher,
            limiter,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (mirror or test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    // -- Internal helpers ------------------------------------------------

    fn categories_url(&self) -> String {
        format!("{}{RIVEN_ITEMS_ROUTE}", self.base_url)
    }

    fn auctions_url(&self, slug: &str, filters: AuctionFilters) -> String {
        let mut url = format!(
            "{}{AUCTION_SEARCH_ROUTE}?type=riven&buyout_policy=direct&weapon_url_name={}&sort_by=price_asc",
            self.base_url,
            urlencoding::encode(slug),
        );
        if let Some(min) = filters.min_rerolls {
            url.push_str(&format!("&re_rolls_min={min}"));
        }
        url
    }

    /// Wait for a token, fetch `url` and decode the body into `T`.
    async fn fetch<T>(&self, url: &str) -> Result<T, ScanError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.limiter.acquire().await?;

        debug!(url = %url, "Fetching warframe.market");

        let value = self.fetcher.get_json(url).await?;

        serde_json::from_value(value).map_err(|e| ScanError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// MarketApi trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl<F: JsonFetch> MarketApi for WarframeMarketClient<F> {
    async fn list_categories(&self) -> Result<Vec<ItemCategory>, ScanError> {
        let url = self.categories_url();
        let resp: RivenItemsResponse = self.fetch(&url).await?;

        let categories: Vec<ItemCategory> =
            resp.payload.items.into_iter().map(ItemCategory::from).collect();

        info!(count = categories.len(), "Riven catalog fetched");
        Ok(categories)
    }

    async fn list_auctions(
        &self,
        category: &ItemCategory,
        filters: AuctionFilters,
    ) -> Result<Vec<RawAuctionListing>, ScanError> {
        let url = self.auctions_url(&category.slug, filters);

        let resp: AuctionSearchResponse =
            self.fetch(&url)
                .await
                .map_err(|e| ScanError::FetchFailed {
                    category: category.slug.clone(),
                    cause: Box::new(e),
                })?;

        let auctions: Vec<RawAuctionListing> = resp
            .payload
            .auctions
            .into_iter()
            .map(RawAuctionListing::from)
            .collect();

        debug!(
            category = %category.slug,
            count = auctions.len(),
            "Auctions fetched"
        );

        Ok(auctions)
    }

    fn name(&self) -> &str {
        PLATFORM_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

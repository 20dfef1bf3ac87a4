//! Mock marketplace for integration testing.
//!
//! Two deterministic doubles, both in-memory with no network access:
//! - `MockMarket` implements `MarketApi` directly, for pipeline tests.
//! - `FakeFetcher` implements `JsonFetch`, so the real
//!   `WarframeMarketClient` (URL building, decoding, rate limiting) can be
//!   driven end to end.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use rivenscan::platforms::{AuctionFilters, JsonFetch, MarketApi};
use rivenscan::types::*;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A riven auction with MR16, rank 8: 6553 endo plus 200 per reroll.
pub fn listing(id: &str, price: i64, rerolls: i32, status: OwnerStatus) -> RawAuctionListing {
    RawAuctionListing {
        id: id.to_string(),
        buyout_price: price,
        owner_name: format!("seller-{id}"),
        owner_status: status,
        item_display_name: "crita-visican".to_string(),
        reroll_count: rerolls,
        mod_rank: 8,
        mastery_level: 16,
    }
}

/// JSON body of `/riven/items` for the given slugs.
pub fn catalog_json(slugs: &[&str]) -> Value {
    let items: Vec<Value> = slugs
        .iter()
        .map(|s| json!({ "item_name": s.to_uppercase(), "url_name": s, "group": "primary" }))
        .collect();
    json!({ "payload": { "items": items } })
}

/// JSON body of `/auctions/search` with one auction per `(id, price, status)`.
pub fn auctions_json(auctions: &[(&str, i64, &str)]) -> Value {
    let auctions: Vec<Value> = auctions
        .iter()
        .map(|(id, price, status)| {
            json!({
                "id": id,
                "buyout_price": price,
                "owner": { "ingame_name": format!("seller-{id}"), "status": status },
                "item": { "name": "crita-visican", "re_rolls": 0, "mod_rank": 8, "mastery_level": 16 }
            })
        })
        .collect();
    json!({ "payload": { "auctions": auctions } })
}

// ---------------------------------------------------------------------------
// MockMarket
// ---------------------------------------------------------------------------

/// A mock marketplace with a fixed catalog and canned auctions per slug.
pub struct MockMarket {
    categories: Vec<ItemCategory>,
    auctions: Vec<(String, Vec<RawAuctionListing>)>,
    failing_slug: Arc<Mutex<Option<String>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockMarket {
    pub fn new(auctions: Vec<(&str, Vec<RawAuctionListing>)>) -> Self {
        Self {
            categories: auctions
                .iter()
                .map(|(slug, _)| ItemCategory::new(slug.to_uppercase(), *slug))
                .collect(),
            auctions: auctions
                .into_iter()
                .map(|(slug, a)| (slug.to_string(), a))
                .collect(),
            failing_slug: Arc::new(Mutex::new(None)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make auction fetches for `slug` fail with a transport error.
    pub fn fail_on(&self, slug: &str) {
        *self.failing_slug.lock().unwrap() = Some(slug.to_string());
    }

    /// Slugs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketApi for MockMarket {
    async fn list_categories(&self) -> Result<Vec<ItemCategory>, ScanError> {
        Ok(self.categories.clone())
    }

    async fn list_auctions(
        &self,
        category: &ItemCategory,
        _filters: AuctionFilters,
    ) -> Result<Vec<RawAuctionListing>, ScanError> {
        self.requested.lock().unwrap().push(category.slug.clone());

        if self.failing_slug.lock().unwrap().as_deref() == Some(category.slug.as_str()) {
            return Err(ScanError::FetchFailed {
                category: category.slug.clone(),
                cause: Box::new(ScanError::Transport {
                    url: format!("mock://{}", category.slug),
                    message: "connection reset by peer".to_string(),
                }),
            });
        }

        Ok(self
            .auctions
            .iter()
            .find(|(slug, _)| *slug == category.slug)
            .map(|(_, a)| a.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// FakeFetcher
// ---------------------------------------------------------------------------

/// Canned response for URLs containing a pattern.
enum Route {
    Json(Value),
    Fail(String),
}

/// A `JsonFetch` that answers from a route table and records every call.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    routes: Arc<Mutex<Vec<(String, Route)>>>,
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer URLs containing `pattern` with `body`.
    pub fn respond(&self, pattern: &str, body: Value) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .push((pattern.to_string(), Route::Json(body)));
        self
    }

    /// Fail URLs containing `pattern` with a transport error.
    pub fn fail(&self, pattern: &str, message: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .push((pattern.to_string(), Route::Fail(message.to_string())));
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl JsonFetch for FakeFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, ScanError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(pattern, _)| url.contains(pattern.as_str())) {
            Some((_, Route::Json(body))) => Ok(body.clone()),
            Some((_, Route::Fail(message))) => Err(ScanError::Transport {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Err(ScanError::Transport {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Self-tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mock_market_records_requests() {
    let market = MockMarket::new(vec![
        ("braton", vec![listing("a1", 20, 0, OwnerStatus::Online)]),
        ("lex", vec![]),
    ]);
    let cats = market.list_categories().await.unwrap();
    assert_eq!(cats.len(), 2);

    let auctions = market
        .list_auctions(&cats[0], AuctionFilters::default())
        .await
        .unwrap();
    assert_eq!(auctions.len(), 1);
    assert_eq!(market.requested(), ["braton"]);
}

#[tokio::test]
async fn test_mock_market_forced_error() {
    let market = MockMarket::new(vec![("braton", vec![])]);
    market.fail_on("braton");
    let cats = market.list_categories().await.unwrap();
    let err = market
        .list_auctions(&cats[0], AuctionFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::FetchFailed { .. }));
}

#[tokio::test]
async fn test_fake_fetcher_unrouted_url_fails() {
    let fetcher = FakeFetcher::new();
    fetcher.respond("/riven/items", catalog_json(&["braton"]));
    assert!(fetcher.get_json("http://x/riven/items").await.is_ok());
    assert!(fetcher.get_json("http://x/other").await.is_err());
    assert_eq!(fetcher.urls().len(), 2);
}

#[tokio::test]
async fn test_fake_fetcher_default_is_empty_and_clones_share_state() {
    let fetcher = FakeFetcher::default();
    assert!(fetcher.urls().is_empty());

    let clone = fetcher.clone();
    clone.respond("/riven/items", catalog_json(&[]));
    assert!(fetcher.get_json("http://x/riven/items").await.is_ok());
    assert_eq!(clone.urls(), ["http://x/riven/items"]);
}

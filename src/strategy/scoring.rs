//! Endo yield scoring.
//!
//! Dissolving a riven returns endo based on the weapon's mastery
//! requirement, the mod's rank and how often it has been rerolled:
//!
//! ```text
//! endo = floor(100 × (mastery - 8) + 22.5 × 2^rank + 200 × rerolls - 7)
//! ```
//!
//! Scores are not clamped. Low-mastery, unranked rivens come out negative,
//! which simply makes them poor value for the filter to drop.

use tracing::debug;

use crate::types::{ItemCategory, RawAuctionListing, ScoredListing};

// ---------------------------------------------------------------------------
// Formula constants
// ---------------------------------------------------------------------------

const MASTERY_BASELINE: f64 = 8.0;
const ENDO_PER_MASTERY: f64 = 100.0;
const RANK_BASE_ENDO: f64 = 22.5;
const ENDO_PER_REROLL: f64 = 200.0;
const BASELINE_COST: f64 = 7.0;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Endo figures computed for a single listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub efficiency_score: i64,
    /// `efficiency_score / buyout_price`; NaN when the price is not positive.
    pub efficiency_per_cost: f64,
}

/// Pure endo scoring. Stateless; all methods are associated functions.
pub struct ScoringEngine;

impl ScoringEngine {
    /// Endo yield for the given riven attributes.
    pub fn efficiency_score(mastery_level: i32, mod_rank: i32, reroll_count: i32) -> i64 {
        let raw = ENDO_PER_MASTERY * (f64::from(mastery_level) - MASTERY_BASELINE)
            + RANK_BASE_ENDO * 2f64.powi(mod_rank)
            + ENDO_PER_REROLL * f64::from(reroll_count)
            - BASELINE_COST;
        raw.floor() as i64
    }

    /// Endo per platinum. A zero or negative price yields NaN, which the
    /// filter always rejects.
    pub fn efficiency_per_cost(efficiency_score: i64, buyout_price: i64) -> f64 {
        if buyout_price <= 0 {
            return f64::NAN;
        }
        efficiency_score as f64 / buyout_price as f64
    }

    /// Score a raw listing.
    pub fn score(listing: &RawAuctionListing) -> Score {
        let efficiency_score = Self::efficiency_score(
            listing.mastery_level,
            listing.mod_rank,
            listing.reroll_count,
        );

        if listing.buyout_price <= 0 {
            debug!(
                auction_id = %listing.id,
                buyout_price = listing.buyout_price,
                "Non-positive buyout price, endo per platinum undefined"
            );
        }

        Score {
            efficiency_score,
            efficiency_per_cost: Self::efficiency_per_cost(efficiency_score, listing.buyout_price),
        }
    }

    /// Consume a raw listing and produce its immutable scored form.
    pub fn enrich(listing: RawAuctionListing, category: &ItemCategory) -> ScoredListing {
        let score = Self::score(&listing);
        ScoredListing::new(
            listing,
            category.clone(),
            score.efficiency_score,
            score.efficiency_per_cost,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Inclusion policy for scored listings.
//!
//! A listing is worth showing when its price falls inside the configured
//! band, its endo per platinum meets the threshold, and the seller is
//! around to answer a whisper.

use std::fmt;

use tracing::trace;

use crate::types::ScoredListing;

/// User-supplied thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Inclusive lower bound on buyout price.
    pub min_price: i64,
    /// Inclusive upper bound on buyout price.
    pub max_price: i64,
    pub min_efficiency_per_cost: f64,
}

/// Why a listing was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BelowMinPrice,
    AboveMaxPrice,
    /// Endo per platinum was NaN or infinite (bad price upstream).
    NonFiniteRatio,
    BelowMinEfficiency,
    SellerOffline,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::BelowMinPrice => write!(f, "below minimum price"),
            Rejection::AboveMaxPrice => write!(f, "above maximum price"),
            Rejection::NonFiniteRatio => write!(f, "endo per platinum undefined"),
            Rejection::BelowMinEfficiency => write!(f, "endo per platinum too low"),
            Rejection::SellerOffline => write!(f, "seller offline"),
        }
    }
}

/// Decides whether a scored listing is of interest.
#[derive(Debug, Clone, Copy)]
pub struct FilterPolicy {
    params: FilterParams,
}

impl FilterPolicy {
    pub fn new(params: FilterParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// The first rule the listing fails, or `None` if it passes all of them.
    pub fn rejection(&self, scored: &ScoredListing) -> Option<Rejection> {
        let price = scored.listing().buyout_price;
        let per_cost = scored.efficiency_per_cost();

        let reason = if price < self.params.min_price {
            Rejection::BelowMinPrice
        } else if price > self.params.max_price {
            Rejection::AboveMaxPrice
        } else if !per_cost.is_finite() {
            Rejection::NonFiniteRatio
        } else if per_cost < self.params.min_efficiency_per_cost {
            Rejection::BelowMinEfficiency
        } else if !scored.listing().owner_status.is_reachable() {
            Rejection::SellerOffline
        } else {
            return None;
        };

        trace!(auction_id = %scored.listing().id, reason = %reason, "Listing excluded");
        Some(reason)
    }

    /// Whether the listing passes every rule.
    pub fn included(&self, scored: &ScoredListing) -> bool {
        self.rejection(scored).is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

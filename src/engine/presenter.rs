//! Notification rendering.
//!
//! Turns a scored listing into the text block shown to the operator,
//! including a ready-to-paste whisper for sellers who are reachable.

use std::time::Duration;

use crate::types::ScoredListing;

/// Base of the human-followable auction permalink.
pub const DEFAULT_AUCTION_LINK_BASE: &str = "https://warframe.market/auction/";

/// Renders listings as notification blocks. Pure formatting.
#[derive(Debug, Clone)]
pub struct Presenter {
    auction_link_base: String,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(DEFAULT_AUCTION_LINK_BASE)
    }
}

impl Presenter {
    pub fn new(auction_link_base: impl Into<String>) -> Self {
        Self {
            auction_link_base: auction_link_base.into(),
        }
    }

    pub fn permalink(&self, scored: &ScoredListing) -> String {
        format!("{}{}", self.auction_link_base, scored.listing().id)
    }

    /// Whisper to paste into in-game chat. `None` when the seller is offline.
    pub fn trade_message(scored: &ScoredListing) -> Option<String> {
        let l = scored.listing();
        if !l.owner_status.is_reachable() {
            return None;
        }
        Some(format!(
            "/w {} Hi! Are you still selling the {} {} riven for {}:platinum:?",
            l.owner_name,
            scored.category().display_name,
            l.item_display_name,
            l.buyout_price,
        ))
    }

    /// Render the full notification block (no trailing newline).
    pub fn render(&self, scored: &ScoredListing) -> String {
        let l = scored.listing();
        let mut lines = vec![
            self.permalink(scored),
            format!("  -> Cost is {} platinum", l.buyout_price),
            format!("  -> Amount of re-rolls is {}", l.reroll_count),
            format!("  -> Mod rank is {}", l.mod_rank),
            format!("  -> Endo gains {}", scored.efficiency_score()),
            format!("  -> Endo per platinum {:.2}", scored.efficiency_per_cost()),
            format!("  -> {} is {}", l.owner_name, l.owner_status),
        ];

        if let Some(msg) = Self::trade_message(scored) {
            lines.push(format!("  -> {msg}"));
        }

        lines.join("\n")
    }
}

/// Progress line reporting how many listings have been filtered out so far.
pub fn progress_line(excluded: usize) -> String {
    format!("Skipped {excluded} auctions")
}

/// Header shown once the catalog is loaded.
pub fn catalog_line(categories: usize) -> String {
    format!("Found {categories} riven items. Looking for auctions...")
}

/// Closing line with the total wall-clock time.
pub fn finished_line(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("Finished after {} minutes and {} seconds", secs / 60, secs % 60)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Onboarding phase resolution.
//!
//! New deployments should not open on an empty "low stock" screen before
//! thresholds have been tuned, so the inventory overview moves through three
//! phases keyed on wall-clock time since first use:
//!
//! 1. `AllItems` (first week): the full inventory, newly-added items last.
//! 2. `LowStockSorted` (week two): low-stock items ranked by urgency ratio.
//! 3. `ServerRanked` (after two weeks): same view, asynchronously upgraded
//!    to the server-side ranking when the suggestion service responds.
//!
//! Phase resolution is a pure function of the elapsed time; the first-use
//! timestamp is written once and never updated.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::quantity;
use crate::storage::KeyValueStore;
use crate::suggestion::{RankedSuggestion, SuggestionService};
use crate::types::InventoryItem;

/// Storage key for the first-use timestamp (epoch milliseconds, decimal
/// string).
pub const FIRST_SEEN_KEY: &str = "restock.first_seen_at";

/// Days of the `AllItems` phase (inclusive upper bound).
const ALL_ITEMS_MAX_DAYS: f64 = 7.0;
/// Day threshold at which `ServerRanked` begins.
const SERVER_RANKED_MIN_DAYS: f64 = 14.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnboardingPhase {
    AllItems,
    LowStockSorted,
    ServerRanked,
}

impl OnboardingPhase {
    /// Pure phase function over elapsed days.
    pub fn for_elapsed_days(days: f64) -> Self {
        if days <= ALL_ITEMS_MAX_DAYS {
            OnboardingPhase::AllItems
        } else if days < SERVER_RANKED_MIN_DAYS {
            OnboardingPhase::LowStockSorted
        } else {
            OnboardingPhase::ServerRanked
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

pub struct OnboardingPhaseResolver {
    store: Arc<dyn KeyValueStore>,
    /// Explicit debug override: forces `AllItems` regardless of elapsed time.
    force_all_items: bool,
}

impl OnboardingPhaseResolver {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            force_all_items: false,
        }
    }

    /// Force the `AllItems` phase. This is an override path for debugging,
    /// not a policy change.
    pub fn force_all_items(mut self, force: bool) -> Self {
        self.force_all_items = force;
        self
    }

    /// The persisted first-use timestamp, initialized to `now_ms` on the
    /// first resolution and never updated thereafter. An unparseable stored
    /// value is treated as absent and rewritten.
    pub fn first_seen_at(&self, now_ms: i64) -> i64 {
        if let Some(raw) = self.store.get(FIRST_SEEN_KEY) {
            if let Ok(stored) = raw.trim().parse::<i64>() {
                return stored;
            }
            log::warn!("stored first-seen timestamp {:?} is unparseable, resetting", raw);
        }
        self.store.set(FIRST_SEEN_KEY, &now_ms.to_string());
        now_ms
    }

    /// Resolve the phase at the given instant.
    pub fn phase_at(&self, now_ms: i64) -> OnboardingPhase {
        if self.force_all_items {
            return OnboardingPhase::AllItems;
        }
        let first_ms = self.first_seen_at(now_ms);
        let days = (now_ms - first_ms) as f64 / MILLIS_PER_DAY;
        OnboardingPhase::for_elapsed_days(days)
    }

    /// Resolve the phase now.
    pub fn phase(&self) -> OnboardingPhase {
        self.phase_at(Utc::now().timestamp_millis())
    }
}

// ---------------------------------------------------------------------------
// View builders
// ---------------------------------------------------------------------------

/// Full inventory overview: newly-added items last, then alphabetical.
pub fn all_items_view(items: &[InventoryItem]) -> Vec<InventoryItem> {
    let mut view = items.to_vec();
    view.sort_by(|a, b| {
        a.is_newly_added
            .cmp(&b.is_newly_added)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    view
}

/// Low-stock items ranked by ascending urgency ratio; ties put newly-added
/// items after established ones, then sort by name.
pub fn low_stock_view(items: &[InventoryItem]) -> Vec<InventoryItem> {
    let mut view: Vec<InventoryItem> = items.iter().filter(|i| i.is_low_stock).cloned().collect();
    view.sort_by(|a, b| {
        let ra = quantity::urgency_ratio(a.current_stock, a.reorder_point, a.safety_stock);
        let rb = quantity::urgency_ratio(b.current_stock, b.reorder_point, b.safety_stock);
        ra.partial_cmp(&rb)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.is_newly_added.cmp(&b.is_newly_added))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    view
}

/// The view for a resolved phase, before any asynchronous refinement.
/// `ServerRanked` starts from the low-stock ordering and is upgraded via
/// [`server_ranked_view`].
pub fn view_for(phase: OnboardingPhase, items: &[InventoryItem]) -> Vec<InventoryItem> {
    match phase {
        OnboardingPhase::AllItems => all_items_view(items),
        OnboardingPhase::LowStockSorted | OnboardingPhase::ServerRanked => low_stock_view(items),
    }
}

/// Upgrade the low-stock view with the server-side ranking. Soft: a failed
/// call, an empty response, or a response naming no known items leaves the
/// locally computed view authoritative.
pub async fn server_ranked_view(
    items: &[InventoryItem],
    service: &dyn SuggestionService,
) -> Vec<InventoryItem> {
    let local = low_stock_view(items);
    let item_ids: Vec<String> = local.iter().map(|i| i.item_id.clone()).collect();

    let mut suggestions = match service.fetch_ranked(&item_ids).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            log::warn!("suggestion service {} unavailable, keeping local ranking: {}", service.name(), e);
            return local;
        }
    };
    if suggestions.is_empty() {
        log::debug!("suggestion service {} returned no ranking, keeping local ranking", service.name());
        return local;
    }

    // Highest urgency first; NaN scores sink to the end.
    suggestions.sort_by(|a, b| match (a.urgency_score.is_nan(), b.urgency_score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b
            .urgency_score
            .partial_cmp(&a.urgency_score)
            .unwrap_or(Ordering::Equal),
    });

    let by_id: HashMap<&str, &InventoryItem> =
        local.iter().map(|i| (i.item_id.as_str(), i)).collect();
    let ranked: Vec<InventoryItem> = suggestions
        .iter()
        .filter_map(|s: &RankedSuggestion| by_id.get(s.item_id.as_str()).map(|&i| i.clone()))
        .collect();

    if ranked.is_empty() {
        return local;
    }
    ranked
}

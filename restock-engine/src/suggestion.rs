use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::util;

/// One entry of a server-side reorder ranking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedSuggestion {
    pub item_id: String,
    /// Higher means more urgent.
    pub urgency_score: f64,
}

/// Deferred reorder-ranking service. A soft dependency: every failure mode
/// degrades to the locally computed low-stock ordering, so implementations
/// may be slow or flaky without affecting correctness.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// Fetch the server-side urgency ranking for the given items.
    async fn fetch_ranked(&self, item_ids: &[String]) -> Result<Vec<RankedSuggestion>, String>;

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

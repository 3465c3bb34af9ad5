//! Procurement reorder engine.
//!
//! Given live inventory levels, this crate canonicalizes free-form category
//! labels into a closed taxonomy, computes suggested reorder quantities,
//! maintains the deduplicated preferred-vendor-per-category list, resolves
//! the phased onboarding view, and distributes a multi-item order across
//! vendors (category routing first, broadcast fallback second), tolerating
//! partial per-vendor failures.
//!
//! External collaborators are ports:
//! - [`storage::KeyValueStore`]: the durable key-value contract
//! - [`submitter::OrderSubmitter`]: the order-submission endpoint
//! - [`suggestion::SuggestionService`]: the deferred reorder ranking
//!
//! Everything behind those ports is out of scope here, which is what keeps
//! the whole engine testable with in-memory fakes.

pub mod distribution;
pub mod error;
pub mod inventory_loader;
pub mod onboarding;
pub mod preferences;
pub mod quantity;
pub mod storage;
pub mod submitter;
pub mod suggestion;
pub mod taxonomy;
pub mod types;
pub mod util;

pub use distribution::{OrderDistributionEngine, OrderMeta};
pub use error::{DistributionError, DistributionResult};
pub use onboarding::{OnboardingPhase, OnboardingPhaseResolver};
pub use preferences::VendorPreferenceStore;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use submitter::{DryRunSubmitter, OrderSubmitter};
pub use suggestion::SuggestionService;
pub use taxonomy::CategoryTaxonomy;
pub use types::{
    AbcClass, BatchSummary, CanonicalCategory, InventoryItem, PreferredVendorEntry,
    SubmissionResult, Vendor,
};

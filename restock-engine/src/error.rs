//! Distribution error types.
//!
//! Every caller-visible failure mode has a named variant. No stringly-typed
//! errors. Per-vendor submission failures are NOT errors — they are recorded
//! in the result set; only the terminal outcomes below are raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistributionError {
    /// No preferred vendors are configured. Raised before any submission is
    /// attempted.
    #[error("No preferred vendors configured: assign a vendor to at least one category before ordering")]
    NoPreferredVendors,

    /// Both the category pass and the broadcast fallback produced zero
    /// successful submissions.
    #[error("All {attempted} vendor submissions failed; no purchase order was created")]
    AllSubmissionsFailed { attempted: usize },
}

/// Result type alias for distribution operations.
pub type DistributionResult<T> = Result<T, DistributionError>;

//! Order-submission port and wire types.
//!
//! The wire shapes mirror the upstream purchase-order endpoint contract,
//! which speaks camelCase JSON. The engine only depends on this contract;
//! transport, retries and authentication belong to the implementation.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::util;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One line of a purchase-order request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: String,
    pub order_quantity: f64,
    /// Free-form note shown to the vendor, e.g. the order unit.
    pub notes: String,
}

/// One purchase-order request, one per vendor per distribution attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderRequest {
    pub vendor_id: String,
    pub selected_items: Vec<OrderLine>,
    pub order_notes: String,
    /// ISO date string.
    pub requested_delivery_date: String,
}

/// Reference to a created purchase order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderRef {
    pub po_number: String,
}

/// Endpoint response. `success: false` and a transport error are treated
/// identically by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order: Option<PurchaseOrderRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Order-submission collaborator.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit one purchase-order request. Expected to resolve to either a
    /// response or an error, never to block indefinitely.
    async fn submit(&self, request: &PurchaseOrderRequest)
        -> Result<PurchaseOrderResponse, String>;

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Submitter that creates no real orders: every request succeeds with a
/// locally allocated sequential PO number. Used by the CLI for dry runs and
/// demos.
pub struct DryRunSubmitter {
    counter: AtomicU64,
}

impl Default for DryRunSubmitter {
    fn default() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }
}

impl DryRunSubmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderSubmitter for DryRunSubmitter {
    async fn submit(
        &self,
        request: &PurchaseOrderRequest,
    ) -> Result<PurchaseOrderResponse, String> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let po_number = format!("PO-DRY-{:04}", n);
        log::info!(
            "dry-run submit vendor_id={} items={} po={}",
            request.vendor_id,
            request.selected_items.len(),
            po_number
        );
        Ok(PurchaseOrderResponse {
            success: true,
            purchase_order: Some(PurchaseOrderRef { po_number }),
            error: None,
        })
    }
}

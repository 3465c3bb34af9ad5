//! Order distribution across preferred vendors.
//!
//! Two-pass strategy over one submission batch:
//!
//! 1. **Category pass**: items are grouped by canonical category and each
//!    group is submitted to the preferred vendor for that category.
//! 2. **Broadcast fallback**: only when the category pass produced zero
//!    successful submissions, the entire item set is offered to every
//!    preferred vendor individually.
//!
//! Submissions within a pass run strictly one at a time. Sequential ordering
//! keeps generated purchase-order numbers deterministic and auditable and
//! avoids hammering a rate-limited endpoint. A per-vendor failure is recorded
//! and the batch continues; only a batch with zero successes after both
//! passes is a terminal error. No cancellation mid-batch.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::error::{DistributionError, DistributionResult};
use crate::submitter::{OrderLine, OrderSubmitter, PurchaseOrderRequest};
use crate::types::{InventoryItem, OrderAssignment, PreferredVendorEntry, SubmissionResult};

/// Order-level metadata applied to every request in the batch.
#[derive(Clone, Debug, Default)]
pub struct OrderMeta {
    pub order_notes: String,
    /// ISO date string.
    pub requested_delivery_date: String,
}

pub struct OrderDistributionEngine {
    submitter: Arc<dyn OrderSubmitter>,
}

impl OrderDistributionEngine {
    pub fn new(submitter: Arc<dyn OrderSubmitter>) -> Self {
        Self { submitter }
    }

    /// Distribute `selected_items` across `preferred_vendors`.
    ///
    /// Returns every submission attempt from both passes, successes and
    /// failures mixed. Fails with [`DistributionError::NoPreferredVendors`]
    /// before any submission when the preferred list is empty, and with
    /// [`DistributionError::AllSubmissionsFailed`] when both passes yield
    /// zero successes.
    pub async fn distribute(
        &self,
        selected_items: &[InventoryItem],
        preferred_vendors: &[PreferredVendorEntry],
        meta: &OrderMeta,
    ) -> DistributionResult<Vec<SubmissionResult>> {
        if preferred_vendors.is_empty() {
            return Err(DistributionError::NoPreferredVendors);
        }

        // BTreeMap keeps the unmatched-category log output stable.
        let mut by_category: BTreeMap<&str, Vec<&InventoryItem>> = BTreeMap::new();
        for item in selected_items {
            by_category
                .entry(item.vendor_category_key.as_str())
                .or_default()
                .push(item);
        }

        // Pass 1: one request per preferred vendor holding that vendor's
        // category items. Vendors with no matching items are skipped.
        let mut results = Vec::new();
        for vendor in preferred_vendors {
            let Some(items) = by_category.get(vendor.normalized_category_key.as_str()) else {
                continue;
            };
            let assignment = OrderAssignment {
                vendor: vendor.vendor.clone(),
                category: vendor.normalized_category_key.clone(),
                items: items.iter().map(|&i| i.clone()).collect(),
            };
            results.push(self.submit_assignment(&assignment, meta).await);
        }

        let category_pass_succeeded = results.iter().any(|r| r.success);

        if category_pass_succeeded {
            // Items whose category no preferred vendor covers are dropped
            // from the batch. Kept observable in the logs.
            let covered: HashSet<&str> = preferred_vendors
                .iter()
                .map(|v| v.normalized_category_key.as_str())
                .collect();
            for (category, items) in &by_category {
                if !covered.contains(category) {
                    let ids: Vec<&str> = items.iter().map(|i| i.item_id.as_str()).collect();
                    log::warn!(
                        "no preferred vendor for category={}, dropping items [{}]",
                        category,
                        ids.join(", ")
                    );
                }
            }
        } else {
            // Pass 2: broadcast the entire order to every preferred vendor.
            log::warn!(
                "category pass produced no successful submissions, broadcasting {} items to {} vendors",
                selected_items.len(),
                preferred_vendors.len()
            );
            for vendor in preferred_vendors {
                let assignment = OrderAssignment {
                    vendor: vendor.vendor.clone(),
                    category: vendor.normalized_category_key.clone(),
                    items: selected_items.to_vec(),
                };
                results.push(self.submit_assignment(&assignment, meta).await);
            }
        }

        if !results.iter().any(|r| r.success) {
            return Err(DistributionError::AllSubmissionsFailed {
                attempted: results.len(),
            });
        }
        Ok(results)
    }

    /// Submit one assignment and record the outcome. Transport errors and
    /// `success: false` responses are both recorded as failed results; the
    /// distinction belongs to the transport layer.
    async fn submit_assignment(
        &self,
        assignment: &OrderAssignment,
        meta: &OrderMeta,
    ) -> SubmissionResult {
        let request = build_request(assignment, meta);
        let mut result = SubmissionResult {
            vendor_name: assignment.vendor.name.clone(),
            vendor_id: assignment.vendor.vendor_id.clone(),
            category: assignment.category.clone(),
            po_number: None,
            item_count: assignment.items.len(),
            success: false,
        };

        match self.submitter.submit(&request).await {
            Ok(response) if response.success => {
                result.success = true;
                result.po_number = response.purchase_order.map(|po| po.po_number);
                log::info!(
                    "submitted {} items to vendor_id={} category={} po={}",
                    result.item_count,
                    result.vendor_id,
                    result.category,
                    result.po_number.as_deref().unwrap_or("-")
                );
            }
            Ok(response) => {
                log::warn!(
                    "vendor_id={} rejected order: {}",
                    result.vendor_id,
                    response.error.as_deref().unwrap_or("no reason given")
                );
            }
            Err(e) => {
                log::warn!("submission to vendor_id={} failed: {}", result.vendor_id, e);
            }
        }
        result
    }
}

fn build_request(assignment: &OrderAssignment, meta: &OrderMeta) -> PurchaseOrderRequest {
    PurchaseOrderRequest {
        vendor_id: assignment.vendor.vendor_id.clone(),
        selected_items: assignment
            .items
            .iter()
            .map(|item| OrderLine {
                item_id: item.item_id.clone(),
                order_quantity: item.reorder_qty,
                notes: item.unit.clone(),
            })
            .collect(),
        order_notes: meta.order_notes.clone(),
        requested_delivery_date: meta.requested_delivery_date.clone(),
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quantity;
use crate::taxonomy::CategoryTaxonomy;

// ---------------------------------------------------------------------------
// Inventory types
// ---------------------------------------------------------------------------

/// ABC sales-importance classification.
///
/// `A` items drive most revenue, `C` items the least. Items with no
/// classification available default to `C`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    #[default]
    C,
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbcClass::A => write!(f, "A"),
            AbcClass::B => write!(f, "B"),
            AbcClass::C => write!(f, "C"),
        }
    }
}

/// A single stocked item with its reorder thresholds and derived fields.
///
/// `vendor_category_key`, `reorder_qty` and `is_low_stock` are derived from
/// the source fields via [`InventoryItem::refresh_derived`] and must be
/// recomputed whenever stock or threshold data changes. `reorder_qty` may be
/// edited locally before an order is submitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: String,
    pub name: String,
    /// Unit symbol, e.g. "kg" or "ltr".
    pub unit: String,
    /// Raw category label as supplied by the inventory source.
    pub category: String,
    pub current_stock: f64,
    /// Minimum desired stock level.
    pub reorder_point: f64,
    /// Buffer held above the reorder point.
    pub safety_stock: f64,
    pub abc_class: AbcClass,
    /// Canonical category key used for vendor routing (derived).
    pub vendor_category_key: String,
    /// Suggested order quantity (derived, locally editable).
    pub reorder_qty: f64,
    /// True when stock sits at or below a configured threshold (derived).
    pub is_low_stock: bool,
    /// Flag from the upstream inventory source for recently created items.
    pub is_newly_added: bool,
}

impl InventoryItem {
    /// Recompute the derived fields from the current source fields.
    pub fn refresh_derived(&mut self, taxonomy: &CategoryTaxonomy) {
        self.vendor_category_key =
            taxonomy.derive_category_from_item_name(&self.category, &self.name);
        self.reorder_qty =
            quantity::suggest(self.current_stock, self.reorder_point, self.safety_stock);
        self.is_low_stock =
            quantity::is_low_stock(self.current_stock, self.reorder_point, self.safety_stock);
    }
}

impl Default for InventoryItem {
    fn default() -> Self {
        Self {
            item_id: String::new(),
            name: String::new(),
            unit: String::new(),
            category: String::new(),
            current_stock: 0.0,
            reorder_point: 0.0,
            safety_stock: 0.0,
            abc_class: AbcClass::C,
            vendor_category_key: String::new(),
            reorder_qty: 0.0,
            is_low_stock: false,
            is_newly_added: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Vendor types
// ---------------------------------------------------------------------------

/// A supplier as provided by the vendor data source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Vendor {
    pub vendor_id: String,
    pub name: String,
    /// Raw category label, pre-canonicalization.
    pub vendor_category: String,
    pub average_rating: f64,
    pub total_purchase_orders: u32,
    pub contact_phone: String,
    pub contact_email: String,
}

/// The canonical `{key, label}` pair every raw category string resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCategory {
    /// Slug form, e.g. `dairy`.
    pub key: String,
    /// Display form, e.g. `Dairy`.
    pub label: String,
}

impl CanonicalCategory {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A vendor designated as the single preferred supplier for one canonical
/// category. The preferred list holds at most one entry per
/// `normalized_category_key`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreferredVendorEntry {
    pub vendor: Vendor,
    pub normalized_category_key: String,
    pub normalized_category_label: String,
}

// ---------------------------------------------------------------------------
// Distribution types
// ---------------------------------------------------------------------------

/// Items routed to one vendor for a single submission attempt. Transient:
/// built per attempt and discarded once the result is recorded.
#[derive(Clone, Debug)]
pub struct OrderAssignment {
    pub vendor: Vendor,
    pub category: String,
    pub items: Vec<InventoryItem>,
}

/// Outcome of one vendor submission attempt.
#[derive(Clone, Debug, Serialize)]
pub struct SubmissionResult {
    pub vendor_name: String,
    pub vendor_id: String,
    pub category: String,
    /// Purchase-order number returned by the endpoint, when the submission
    /// succeeded.
    pub po_number: Option<String>,
    pub item_count: usize,
    pub success: bool,
}

/// Aggregate view over a distribution batch, for caller-facing summaries.
#[derive(Clone, Debug, Serialize)]
pub struct BatchSummary {
    /// Items covered by successful submissions.
    pub total_items_ordered: usize,
    pub vendors_contacted: usize,
    pub successes: usize,
    pub failures: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[SubmissionResult]) -> Self {
        let successes = results.iter().filter(|r| r.success).count();
        Self {
            total_items_ordered: results
                .iter()
                .filter(|r| r.success)
                .map(|r| r.item_count)
                .sum(),
            vendors_contacted: results.len(),
            successes,
            failures: results.len() - successes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abc_class_defaults_to_c() {
        assert_eq!(AbcClass::default(), AbcClass::C);
    }

    #[test]
    fn refresh_derived_populates_all_fields() {
        let taxonomy = CategoryTaxonomy::new();
        let mut item = InventoryItem {
            item_id: "itm-1".into(),
            name: "Milk".into(),
            category: "Dairy Products".into(),
            current_stock: 5.0,
            reorder_point: 10.0,
            safety_stock: 2.0,
            ..InventoryItem::default()
        };
        item.refresh_derived(&taxonomy);
        assert_eq!(item.vendor_category_key, "dairy");
        assert!((item.reorder_qty - 7.0).abs() < f64::EPSILON);
        assert!(item.is_low_stock);
    }

    #[test]
    fn batch_summary_counts_only_successful_items() {
        let results = vec![
            SubmissionResult {
                vendor_name: "Fresh Farms".into(),
                vendor_id: "v-1".into(),
                category: "dairy".into(),
                po_number: Some("PO-0001".into()),
                item_count: 3,
                success: true,
            },
            SubmissionResult {
                vendor_name: "Meat House".into(),
                vendor_id: "v-2".into(),
                category: "meat".into(),
                po_number: None,
                item_count: 2,
                success: false,
            },
        ];
        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total_items_ordered, 3);
        assert_eq!(summary.vendors_contacted, 2);
        assert_eq!(summary.successes, 1);
        assert_eq!(summary.failures, 1);
    }
}

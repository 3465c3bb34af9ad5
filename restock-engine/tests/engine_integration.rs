use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use restock_engine::distribution::{OrderDistributionEngine, OrderMeta};
use restock_engine::error::DistributionError;
use restock_engine::onboarding::{self, OnboardingPhase, OnboardingPhaseResolver};
use restock_engine::preferences::VendorPreferenceStore;
use restock_engine::storage::{KeyValueStore, MemoryStore};
use restock_engine::submitter::{
    OrderSubmitter, PurchaseOrderRef, PurchaseOrderRequest, PurchaseOrderResponse,
};
use restock_engine::taxonomy::CategoryTaxonomy;
use restock_engine::types::{BatchSummary, InventoryItem, Vendor};

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

/// A small restaurant inventory across several categories.
fn sample_items() -> Vec<InventoryItem> {
    let taxonomy = CategoryTaxonomy::new();
    let mut items = vec![
        // Low on milk: deficit 5 + safety 1 = 6 suggested.
        raw_item("itm-1", "Milk", "ltr", "dairy", 5.0, 10.0, 1.0, false),
        // Low on chicken; category says wholesale but the name routes to meat.
        raw_item("itm-2", "Chicken", "kg", "wholesale", 2.0, 8.0, 0.0, false),
        // Processed good: stays with its raw category despite "chicken".
        raw_item("itm-3", "Chicken Masala Powder", "pkt", "spices", 1.0, 4.0, 0.0, true),
        // Fully stocked rice: not low stock.
        raw_item("itm-4", "Basmati Rice", "kg", "grains", 50.0, 10.0, 5.0, false),
    ];
    for item in &mut items {
        item.refresh_derived(&taxonomy);
    }
    items
}

#[allow(clippy::too_many_arguments)]
fn raw_item(
    id: &str,
    name: &str,
    unit: &str,
    category: &str,
    stock: f64,
    reorder: f64,
    safety: f64,
    newly_added: bool,
) -> InventoryItem {
    InventoryItem {
        item_id: id.into(),
        name: name.into(),
        unit: unit.into(),
        category: category.into(),
        current_stock: stock,
        reorder_point: reorder,
        safety_stock: safety,
        is_newly_added: newly_added,
        ..InventoryItem::default()
    }
}

fn vendor(id: &str, name: &str, category: &str) -> Vendor {
    Vendor {
        vendor_id: id.into(),
        name: name.into(),
        vendor_category: category.into(),
        average_rating: 4.0,
        total_purchase_orders: 25,
        contact_phone: "555-0100".into(),
        contact_email: "orders@example.com".into(),
    }
}

/// Submitter that succeeds with sequential PO numbers unless a vendor is
/// listed as failing, and records every request it sees.
#[derive(Default)]
struct RecordingSubmitter {
    failing_vendors: Vec<String>,
    requests: Mutex<Vec<PurchaseOrderRequest>>,
    counter: AtomicU64,
}

#[async_trait]
impl OrderSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        request: &PurchaseOrderRequest,
    ) -> Result<PurchaseOrderResponse, String> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing_vendors.contains(&request.vendor_id) {
            return Err("connection refused".into());
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PurchaseOrderResponse {
            success: true,
            purchase_order: Some(PurchaseOrderRef {
                po_number: format!("PO-{:04}", n),
            }),
            error: None,
        })
    }
}

// ---------------------------------------------------------------------------
// End-to-end reorder flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reorder_flow_end_to_end() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let preferences = VendorPreferenceStore::new(Arc::clone(&kv), CategoryTaxonomy::new());

    // Seed preferred vendors from the bulk vendor list.
    let preferred = preferences.seed_if_empty(&[
        vendor("v-10", "Fresh Farms", "Dairy Products"),
        vendor("v-20", "Meat House", "meat"),
        vendor("v-30", "Spice Bazaar", "Spices & Masala"),
    ]);
    assert_eq!(preferred.len(), 3);

    // Low-stock selection from the sample inventory.
    let items = sample_items();
    let selected: Vec<InventoryItem> = items.iter().filter(|i| i.is_low_stock).cloned().collect();
    assert_eq!(selected.len(), 3);

    let submitter = Arc::new(RecordingSubmitter::default());
    let engine = OrderDistributionEngine::new(Arc::clone(&submitter) as Arc<dyn OrderSubmitter>);
    let meta = OrderMeta {
        order_notes: "weekly restock".into(),
        requested_delivery_date: "2026-08-10".into(),
    };

    let results = engine.distribute(&selected, &preferred, &meta).await.unwrap();

    // One submission per matched category: dairy, meat, spices.
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));

    let dairy = results.iter().find(|r| r.category == "dairy").unwrap();
    assert_eq!(dairy.vendor_id, "v-10");
    assert_eq!(dairy.item_count, 1);
    assert!(dairy.po_number.is_some());

    let meat = results.iter().find(|r| r.category == "meat").unwrap();
    assert_eq!(meat.vendor_id, "v-20");

    // The milk request carries the suggested quantity (deficit 5 + safety 1).
    let requests = submitter.requests.lock().unwrap().clone();
    let to_dairy = requests.iter().find(|r| r.vendor_id == "v-10").unwrap();
    assert_eq!(to_dairy.selected_items.len(), 1);
    assert_eq!(to_dairy.selected_items[0].item_id, "itm-1");
    assert!((to_dairy.selected_items[0].order_quantity - 6.0).abs() < 0.01);

    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.total_items_ordered, 3);
    assert_eq!(summary.successes, 3);
    assert_eq!(summary.failures, 0);
}

#[tokio::test]
async fn two_vendor_scenario_routes_each_item_to_its_vendor() {
    let taxonomy = CategoryTaxonomy::new();
    let mut milk = raw_item("1", "Milk", "ltr", "dairy", 0.0, 5.0, 0.0, false);
    let mut chicken = raw_item("2", "Chicken", "kg", "meat", 0.0, 3.0, 0.0, false);
    milk.refresh_derived(&taxonomy);
    chicken.refresh_derived(&taxonomy);

    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let preferences = VendorPreferenceStore::new(Arc::clone(&kv), taxonomy);
    let preferred = preferences.seed_if_empty(&[
        vendor("10", "Fresh Farms", "dairy"),
        vendor("20", "Meat House", "meat"),
    ]);

    let submitter = Arc::new(RecordingSubmitter::default());
    let engine = OrderDistributionEngine::new(Arc::clone(&submitter) as Arc<dyn OrderSubmitter>);
    let results = engine
        .distribute(&[milk, chicken], &preferred, &OrderMeta::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(result.success);
        assert_eq!(result.item_count, 1);
    }
    let requests = submitter.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    let to_dairy = requests.iter().find(|r| r.vendor_id == "10").unwrap();
    assert_eq!(to_dairy.selected_items[0].item_id, "1");
    let to_meat = requests.iter().find(|r| r.vendor_id == "20").unwrap();
    assert_eq!(to_meat.selected_items[0].item_id, "2");
}

#[tokio::test]
async fn no_preferred_vendors_fails_before_any_submission() {
    let submitter = Arc::new(RecordingSubmitter::default());
    let engine = OrderDistributionEngine::new(Arc::clone(&submitter) as Arc<dyn OrderSubmitter>);
    let result = engine
        .distribute(&sample_items(), &[], &OrderMeta::default())
        .await;
    assert!(matches!(result, Err(DistributionError::NoPreferredVendors)));
    assert!(submitter.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn broadcast_fallback_covers_unmatched_categories() {
    // Preferred vendors cover none of the selected categories; the category
    // pass matches nothing, and the broadcast fallback reaches both vendors.
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let preferences = VendorPreferenceStore::new(Arc::clone(&kv), CategoryTaxonomy::new());
    let preferred = preferences.seed_if_empty(&[
        vendor("v-40", "Frozen Fancies", "frozen"),
        vendor("v-50", "Juice World", "beverages"),
    ]);

    let items = sample_items();
    let selected: Vec<InventoryItem> = items.iter().filter(|i| i.is_low_stock).cloned().collect();

    let submitter = Arc::new(RecordingSubmitter::default());
    let engine = OrderDistributionEngine::new(Arc::clone(&submitter) as Arc<dyn OrderSubmitter>);
    let results = engine
        .distribute(&selected, &preferred, &OrderMeta::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.success));
    assert!(results.iter().all(|r| r.item_count == selected.len()));
}

#[tokio::test]
async fn partial_vendor_failure_is_recorded_not_raised() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let preferences = VendorPreferenceStore::new(Arc::clone(&kv), CategoryTaxonomy::new());
    let preferred = preferences.seed_if_empty(&[
        vendor("v-10", "Fresh Farms", "dairy"),
        vendor("v-20", "Meat House", "meat"),
        vendor("v-30", "Spice Bazaar", "spices"),
    ]);

    let items = sample_items();
    let selected: Vec<InventoryItem> = items.iter().filter(|i| i.is_low_stock).cloned().collect();

    let submitter = Arc::new(RecordingSubmitter {
        failing_vendors: vec!["v-20".into()],
        ..RecordingSubmitter::default()
    });
    let engine = OrderDistributionEngine::new(Arc::clone(&submitter) as Arc<dyn OrderSubmitter>);
    let results = engine
        .distribute(&selected, &preferred, &OrderMeta::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.successes, 2);
    assert_eq!(summary.failures, 1);
    let failed = results.iter().find(|r| !r.success).unwrap();
    assert_eq!(failed.vendor_id, "v-20");
    assert!(failed.po_number.is_none());
}

// ---------------------------------------------------------------------------
// Onboarding view over the same fixtures
// ---------------------------------------------------------------------------

#[test]
fn onboarding_view_narrows_as_the_deployment_ages() {
    const DAY_MS: i64 = 86_400_000;
    let store = Arc::new(MemoryStore::new());
    store.set(onboarding::FIRST_SEEN_KEY, "0");
    let resolver = OnboardingPhaseResolver::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
    let items = sample_items();

    // First week: everything is visible, newly-added items last.
    let phase = resolver.phase_at(2 * DAY_MS);
    assert_eq!(phase, OnboardingPhase::AllItems);
    let view = onboarding::view_for(phase, &items);
    assert_eq!(view.len(), items.len());
    assert_eq!(view.last().unwrap().item_id, "itm-3");

    // Second week: only low-stock items, most urgent first.
    let phase = resolver.phase_at(10 * DAY_MS);
    assert_eq!(phase, OnboardingPhase::LowStockSorted);
    let view = onboarding::view_for(phase, &items);
    assert_eq!(view.len(), 3);
    // Chicken at 2/8 (0.25) outranks Milk at 5/10 (0.5).
    assert_eq!(view[0].name, "Chicken");

    // After two weeks the server ranking takes over when available.
    assert_eq!(resolver.phase_at(30 * DAY_MS), OnboardingPhase::ServerRanked);
}

use std::collections::HashMap;
use std::env;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};
use serde::Serialize;

use restock_engine::distribution::{OrderDistributionEngine, OrderMeta};
use restock_engine::inventory_loader::{
    load_abc_classes_file, load_items_file, load_vendors_file,
};
use restock_engine::onboarding::{self, OnboardingPhase, OnboardingPhaseResolver};
use restock_engine::preferences::VendorPreferenceStore;
use restock_engine::storage::{JsonFileStore, KeyValueStore};
use restock_engine::submitter::DryRunSubmitter;
use restock_engine::taxonomy::CategoryTaxonomy;
use restock_engine::types::{AbcClass, BatchSummary, InventoryItem, SubmissionResult};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DigestJson {
    generated_at: String,
    phase: String,
    items_total: usize,
    preferred_vendor_count: usize,
    view: Vec<ViewItemJson>,
    results: Vec<SubmissionResult>,
    summary: BatchSummary,
}

#[derive(Serialize)]
struct ViewItemJson {
    item_id: String,
    name: String,
    unit: String,
    category: String,
    abc_class: String,
    current_stock: f64,
    reorder_point: f64,
    safety_stock: f64,
    suggested_qty: f64,
    low_stock: bool,
}

fn view_item_json(item: &InventoryItem) -> ViewItemJson {
    ViewItemJson {
        item_id: item.item_id.clone(),
        name: item.name.clone(),
        unit: item.unit.clone(),
        category: item.vendor_category_key.clone(),
        abc_class: item.abc_class.to_string(),
        current_stock: item.current_stock,
        reorder_point: item.reorder_point,
        safety_stock: item.safety_stock,
        suggested_qty: item.reorder_qty,
        low_stock: item.is_low_stock,
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

fn phase_str(phase: OnboardingPhase) -> &'static str {
    match phase {
        OnboardingPhase::AllItems => "all items",
        OnboardingPhase::LowStockSorted => "low stock",
        OnboardingPhase::ServerRanked => "server ranked",
    }
}

fn print_human(
    phase: OnboardingPhase,
    view: &[InventoryItem],
    results: &[SubmissionResult],
    summary: &BatchSummary,
    load_ms: u128,
    distribute_ms: u128,
) {
    println!();
    println!("  \u{2554}{:\u{2550}<60}\u{2557}", "");
    println!("  \u{2551}{:^60}\u{2551}", "RESTOCK \u{2014} Reorder Digest");
    println!("  \u{255a}{:\u{2550}<60}\u{255d}", "");
    println!();
    println!(
        "  View: {} \u{00b7} {} items shown \u{00b7} {} vendors contacted",
        phase_str(phase),
        view.len(),
        summary.vendors_contacted
    );
    println!();

    println!("  Item                      | ABC | Stock    | Suggested");
    println!("  ------------------------- | --- | -------- | ---------");
    for item in view {
        println!(
            "  {:25} | {:^3} | {:>8} | {:>6} {}",
            item.name,
            item.abc_class,
            format!("{}/{}", item.current_stock, item.reorder_point),
            item.reorder_qty,
            item.unit
        );
    }
    println!();

    if results.is_empty() {
        println!("  Stock levels healthy. Nothing to reorder.");
    } else {
        println!("  Submissions");
        println!("  Vendor               | Category     | Items | PO");
        println!("  -------------------- | ------------ | ----- | ----------");
        for result in results {
            let status = if result.success {
                result.po_number.clone().unwrap_or_else(|| "ok".into())
            } else {
                "FAILED".into()
            };
            println!(
                "  {:20} | {:12} | {:>5} | {}",
                result.vendor_name, result.category, result.item_count, status
            );
        }
        println!();
        println!(
            "  {} of {} submissions succeeded \u{00b7} {} items ordered",
            summary.successes, summary.vendors_contacted, summary.total_items_ordered
        );
    }

    println!();
    println!(
        "  \u{23f1}  Data loaded in {}ms \u{00b7} Distribution ran in {}ms",
        load_ms, distribute_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn usage() -> ! {
    eprintln!("Usage: restock-server <items.csv> <vendors.csv> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --abc <file>      ABC classification CSV (item_id,abc_class)");
    eprintln!("  --state <file>    State file path (default: restock-state.json)");
    eprintln!("  --notes <text>    Order notes applied to every purchase order");
    eprintln!("  --deliver <date>  Requested delivery date (default: tomorrow)");
    eprintln!("  --all-items       Force the all-items view (debug override)");
    eprintln!("  --json            Output as JSON instead of formatted text");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  restock-server fixtures/items.csv fixtures/vendors.csv --json");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage();
    }
    let items_path = &args[1];
    let vendors_path = &args[2];

    let mut abc_path: Option<String> = None;
    let mut state_path = "restock-state.json".to_string();
    let mut order_notes = String::new();
    let mut delivery_date: Option<String> = None;
    let mut force_all_items = false;
    let mut json_output = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--abc" | "--state" | "--notes" | "--deliver" => {
                let flag = args[i].clone();
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires a value", flag);
                    process::exit(1);
                }
                let value = args[i + 1].clone();
                match flag.as_str() {
                    "--abc" => abc_path = Some(value),
                    "--state" => state_path = value,
                    "--notes" => order_notes = value,
                    _ => delivery_date = Some(value),
                }
                i += 2;
            }
            "--all-items" => {
                force_all_items = true;
                i += 1;
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
            }
        }
    }

    // Load source data.
    let load_start = Instant::now();
    let item_records = match load_items_file(items_path) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error loading items: {}", e);
            process::exit(1);
        }
    };
    let vendors = match load_vendors_file(vendors_path) {
        Ok(vendors) => vendors,
        Err(e) => {
            eprintln!("Error loading vendors: {}", e);
            process::exit(1);
        }
    };
    // The ABC source is optional and non-fatal: every failure degrades to
    // class C.
    let abc: HashMap<String, AbcClass> = match abc_path.as_deref().map(load_abc_classes_file) {
        Some(Ok(classes)) => classes,
        Some(Err(e)) => {
            log::warn!("ABC classification unavailable, defaulting to class C: {}", e);
            HashMap::new()
        }
        None => HashMap::new(),
    };

    let taxonomy = CategoryTaxonomy::new();
    let items: Vec<InventoryItem> = item_records
        .into_iter()
        .map(|r| r.into_inventory_item(&taxonomy, &abc))
        .collect();
    let load_ms = load_start.elapsed().as_millis();

    // Onboarding phase and view.
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(state_path.as_str()));
    let resolver =
        OnboardingPhaseResolver::new(Arc::clone(&store)).force_all_items(force_all_items);
    let phase = resolver.phase();
    let view = onboarding::view_for(phase, &items);

    // Preferred vendors, seeded from the bulk list on first run.
    let preferences = VendorPreferenceStore::new(Arc::clone(&store), taxonomy);
    let preferred = preferences.seed_if_empty(&vendors);

    // Reorder everything currently below its thresholds.
    let selected = onboarding::low_stock_view(&items);

    let mut results: Vec<SubmissionResult> = Vec::new();
    let distribute_start = Instant::now();
    if !selected.is_empty() {
        let engine = OrderDistributionEngine::new(Arc::new(DryRunSubmitter::new()));
        let meta = OrderMeta {
            order_notes,
            requested_delivery_date: delivery_date.unwrap_or_else(|| {
                (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string()
            }),
        };
        match engine.distribute(&selected, &preferred, &meta).await {
            Ok(batch) => results = batch,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
    let distribute_ms = distribute_start.elapsed().as_millis();

    let summary = BatchSummary::from_results(&results);

    if json_output {
        let digest = DigestJson {
            generated_at: Utc::now().to_rfc3339(),
            phase: format!("{:?}", phase),
            items_total: items.len(),
            preferred_vendor_count: preferred.len(),
            view: view.iter().map(view_item_json).collect(),
            results,
            summary,
        };
        match serde_json::to_string_pretty(&digest) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing digest: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_human(phase, &view, &results, &summary, load_ms, distribute_ms);
    }
}

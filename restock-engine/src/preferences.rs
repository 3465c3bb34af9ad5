//! Preferred-vendor store.
//!
//! Maintains the "one vendor per canonical category" list used for order
//! routing. This is the sole mutation path for the list; every mutation
//! dedupes on the normalized category key and persists the full list, so
//! the stored state can never hold two vendors for one category.

use std::collections::HashSet;
use std::sync::Arc;

use crate::storage::KeyValueStore;
use crate::taxonomy::CategoryTaxonomy;
use crate::types::{PreferredVendorEntry, Vendor};

/// Storage key for the serialized preferred-vendor list.
pub const PREFERRED_VENDORS_KEY: &str = "restock.preferred_vendors";

/// Keep only the first occurrence of each `normalized_category_key`,
/// preserving input order.
pub fn dedupe(entries: Vec<PreferredVendorEntry>) -> Vec<PreferredVendorEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.normalized_category_key.clone()))
        .collect()
}

pub struct VendorPreferenceStore {
    store: Arc<dyn KeyValueStore>,
    taxonomy: CategoryTaxonomy,
}

impl VendorPreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>, taxonomy: CategoryTaxonomy) -> Self {
        Self { store, taxonomy }
    }

    /// Reconstruct the preferred list from durable storage. Missing or
    /// malformed stored data degrades to an empty list.
    pub fn load(&self) -> Vec<PreferredVendorEntry> {
        let Some(raw) = self.store.get(PREFERRED_VENDORS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<PreferredVendorEntry>>(&raw) {
            // Dedupe on load as well: stored state written by older builds
            // may predate the one-entry-per-category rule.
            Ok(entries) => dedupe(entries),
            Err(e) => {
                log::warn!("stored preferred-vendor list is malformed, ignoring: {}", e);
                Vec::new()
            }
        }
    }

    /// Designate `vendor` as the preferred supplier for its category (or for
    /// `category_override` when supplied). Replaces any existing entry for
    /// that category, persists the resulting list, and returns it.
    /// Idempotent under repeated identical input.
    pub fn add(&self, vendor: &Vendor, category_override: Option<&str>) -> Vec<PreferredVendorEntry> {
        let entry = self.entry_for(vendor, category_override);
        let mut entries = self.load();
        entries.retain(|e| e.normalized_category_key != entry.normalized_category_key);
        log::info!(
            "preferred vendor for category={} set to vendor_id={}",
            entry.normalized_category_key,
            entry.vendor.vendor_id
        );
        entries.push(entry);
        self.persist(&entries);
        entries
    }

    /// Seed the store from a bulk vendor list when it is empty: first vendor
    /// encountered per distinct category wins, persisted immediately.
    /// Returns the effective list either way.
    pub fn seed_if_empty(&self, vendors: &[Vendor]) -> Vec<PreferredVendorEntry> {
        let existing = self.load();
        if !existing.is_empty() || vendors.is_empty() {
            return existing;
        }
        let seeded = dedupe(
            vendors
                .iter()
                .map(|v| self.entry_for(v, None))
                .collect(),
        );
        log::info!(
            "seeded preferred-vendor list with {} categories from {} vendors",
            seeded.len(),
            vendors.len()
        );
        self.persist(&seeded);
        seeded
    }

    fn entry_for(&self, vendor: &Vendor, category_override: Option<&str>) -> PreferredVendorEntry {
        let raw = category_override.unwrap_or(&vendor.vendor_category);
        let canonical = self.taxonomy.canonicalize(raw);
        PreferredVendorEntry {
            vendor: vendor.clone(),
            normalized_category_key: canonical.key,
            normalized_category_label: canonical.label,
        }
    }

    fn persist(&self, entries: &[PreferredVendorEntry]) {
        match serde_json::to_string(entries) {
            Ok(serialized) => self.store.set(PREFERRED_VENDORS_KEY, &serialized),
            Err(e) => log::warn!("failed to serialize preferred-vendor list: {}", e),
        }
    }
}

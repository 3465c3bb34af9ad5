//! Category canonicalization.
//!
//! Vendors and items arrive with free-form category labels ("Dairy Products",
//! "MILK & curd", "veg"). Routing needs a closed taxonomy, so every raw label
//! is resolved to one canonical `{key, label}` pair via an ordered list of
//! synonym groups matched by substring containment. The list order is the
//! tie-break: the first matching group wins, so resolution is deterministic.
//!
//! A second entry point derives a category from the item name itself
//! ("Chicken Breast" routes to the meat vendor even when its category says
//! "wholesale"), with a processed-food suppressor list so that a
//! "chicken masala powder" is not sent to the butcher.

use crate::types::CanonicalCategory;

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

/// Ordered synonym groups: (substring keys, canonical key, canonical label).
/// Order matters — groups are tested top to bottom and the first hit wins.
const SYNONYM_TABLE: &[(&[&str], &str, &str)] = &[
    (
        &["wholesale", "general", "grocery", "staples", "kirana"],
        "wholesale",
        "Wholesale",
    ),
    (
        &["dairy", "milk", "curd", "paneer", "cheese", "butter"],
        "dairy",
        "Dairy",
    ),
    (
        &["meat", "chicken", "mutton", "poultry", "butcher"],
        "meat",
        "Meat",
    ),
    (
        &["seafood", "fish", "prawn", "shrimp", "marine"],
        "seafood",
        "Seafood",
    ),
    (
        &["vegetable", "veggie", "produce", "greens"],
        "vegetables",
        "Vegetables",
    ),
    (&["fruit"], "fruits", "Fruits"),
    (&["spice", "masala", "herb"], "spices", "Spices"),
    (
        &["grain", "rice", "wheat", "flour", "atta", "pulse", "dal"],
        "grains",
        "Grains",
    ),
    (&["bakery", "bread", "bake"], "bakery", "Bakery"),
    (
        &["beverage", "drink", "juice", "tea", "coffee"],
        "beverages",
        "Beverages",
    ),
    (&["oil", "ghee"], "oils", "Oils"),
    (
        &["condiment", "sauce", "ketchup", "vinegar", "pickle"],
        "condiments",
        "Condiments",
    ),
    (&["snack", "namkeen", "chips"], "snacks", "Snacks"),
    (&["frozen", "ice cream"], "frozen", "Frozen"),
];

/// Name-override table: an item whose name contains one of these stems is
/// routed to the given canonical key regardless of its raw category.
/// Ordered, first match wins.
const NAME_OVERRIDES: &[(&[&str], &str)] = &[
    (&["chicken", "mutton", "lamb", "beef", "pork", "keema"], "meat"),
    (&["fish", "prawn", "shrimp", "crab", "squid"], "seafood"),
    (&["milk", "paneer", "cheese", "curd", "butter"], "dairy"),
];

/// Processed-food keyword stems. A hit on the item name suppresses the
/// name-override table: a "chicken masala powder" is a shelf good, not a
/// meat-vendor item. Empirically derived; kept configurable.
const PROCESSED_STEMS: &[&str] = &[
    "masala",
    "powder",
    "paste",
    "marinade",
    "gravy",
    "tikka",
    "sauce",
    "seasoning",
    "pickle",
    "premix",
];

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// One synonym group: any key contained in the input maps to the canonical
/// category.
#[derive(Clone, Debug)]
pub struct SynonymGroup {
    pub keys: Vec<String>,
    pub canonical: CanonicalCategory,
}

/// One name-override rule: any stem contained in the item name maps to the
/// canonical key.
#[derive(Clone, Debug)]
pub struct NameOverride {
    pub stems: Vec<String>,
    pub key: String,
}

/// The closed category taxonomy. The built-in tables are the default; custom
/// tables can be supplied where deployments need different synonym sets.
#[derive(Clone, Debug)]
pub struct CategoryTaxonomy {
    groups: Vec<SynonymGroup>,
    name_overrides: Vec<NameOverride>,
    processed_stems: Vec<String>,
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        let groups = SYNONYM_TABLE
            .iter()
            .map(|(keys, key, label)| SynonymGroup {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                canonical: CanonicalCategory::new(*key, *label),
            })
            .collect();
        let name_overrides = NAME_OVERRIDES
            .iter()
            .map(|(stems, key)| NameOverride {
                stems: stems.iter().map(|s| s.to_string()).collect(),
                key: key.to_string(),
            })
            .collect();
        let processed_stems = PROCESSED_STEMS.iter().map(|s| s.to_string()).collect();
        Self {
            groups,
            name_overrides,
            processed_stems,
        }
    }
}

impl CategoryTaxonomy {
    /// Taxonomy with the built-in tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Taxonomy with custom tables. Group order is preserved and remains the
    /// tie-break.
    pub fn with_tables(
        groups: Vec<SynonymGroup>,
        name_overrides: Vec<NameOverride>,
        processed_stems: Vec<String>,
    ) -> Self {
        Self {
            groups,
            name_overrides,
            processed_stems,
        }
    }

    /// Resolve a raw category label to its canonical `{key, label}` pair.
    ///
    /// Deterministic and total: the same input always yields the same output,
    /// unknown labels fall back to a slug/title-case derivation, and an empty
    /// input yields `{other, Other}`.
    pub fn canonicalize(&self, raw: &str) -> CanonicalCategory {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return CanonicalCategory::new("other", "Other");
        }
        for group in &self.groups {
            if group.keys.iter().any(|k| needle.contains(k.as_str())) {
                return group.canonical.clone();
            }
        }
        let key = slugify(&needle);
        if key.is_empty() {
            return CanonicalCategory::new("other", "Other");
        }
        CanonicalCategory {
            key,
            label: title_case(raw.trim()),
        }
    }

    /// Derive the vendor-routing key for an item from its raw category and
    /// its name.
    ///
    /// The name wins over the category for fresh goods (a "Chicken Breast"
    /// filed under "wholesale" still routes to the meat vendor) unless a
    /// processed-food stem appears in the name, in which case the raw
    /// category alone decides. With no category to fall back on, items
    /// route to the general `wholesale` vendor.
    pub fn derive_category_from_item_name(&self, raw_category: &str, item_name: &str) -> String {
        let name = item_name.trim().to_lowercase();
        if !name.is_empty() {
            let processed = self
                .processed_stems
                .iter()
                .any(|s| name.contains(s.as_str()));
            if !processed {
                for rule in &self.name_overrides {
                    if rule.stems.iter().any(|s| name.contains(s.as_str())) {
                        return rule.key.clone();
                    }
                }
            }
        }
        if raw_category.trim().is_empty() {
            return "wholesale".to_string();
        }
        self.canonicalize(raw_category).key
    }
}

// ---------------------------------------------------------------------------
// Fallback derivation helpers
// ---------------------------------------------------------------------------

/// Collapse runs of non-alphanumeric characters into single hyphens.
fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Upper-case the first letter of each whitespace-separated word.
fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

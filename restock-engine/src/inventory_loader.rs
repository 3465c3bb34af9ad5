//! CSV inventory and vendor data loaders.
//!
//! Parses the external data source's CSV exports into typed records.
//! Expected item columns:
//!   item_id, name, unit, category, current_stock, reorder_point,
//!   safety_stock, is_newly_added
//! Expected vendor columns:
//!   vendor_id, name, vendor_category, average_rating,
//!   total_purchase_orders, contact_phone, contact_email
//! Optional ABC classification columns: item_id, abc_class

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

use crate::taxonomy::CategoryTaxonomy;
use crate::types::{AbcClass, InventoryItem, Vendor};

/// A raw item row before derived fields are computed.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecord {
    pub item_id: String,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub current_stock: f64,
    pub reorder_point: f64,
    pub safety_stock: f64,
    #[serde(default, deserialize_with = "deserialize_bool")]
    pub is_newly_added: bool,
}

impl ItemRecord {
    /// Convert to an `InventoryItem` with derived fields populated.
    pub fn into_inventory_item(
        self,
        taxonomy: &CategoryTaxonomy,
        abc: &HashMap<String, AbcClass>,
    ) -> InventoryItem {
        let abc_class = abc.get(&self.item_id).copied().unwrap_or_default();
        let mut item = InventoryItem {
            item_id: self.item_id,
            name: self.name,
            unit: self.unit,
            category: self.category,
            current_stock: self.current_stock,
            reorder_point: self.reorder_point,
            safety_stock: self.safety_stock,
            abc_class,
            ..InventoryItem::default()
        };
        item.refresh_derived(taxonomy);
        item
    }
}

/// Load item records from a CSV reader.
pub fn load_items<R: Read>(reader: R) -> Result<Vec<ItemRecord>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: ItemRecord =
            result.map_err(|e| format!("CSV parse error at line {}: {}", line_num + 2, e))?;
        records.push(record);
    }
    Ok(records)
}

/// Load item records from a CSV file path.
pub fn load_items_file(path: &str) -> Result<Vec<ItemRecord>, String> {
    let file = std::fs::File::open(path).map_err(|e| format!("Failed to open '{}': {}", path, e))?;
    load_items(file)
}

/// Load vendors from a CSV reader.
pub fn load_vendors<R: Read>(reader: R) -> Result<Vec<Vendor>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut vendors = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let vendor: Vendor =
            result.map_err(|e| format!("CSV parse error at line {}: {}", line_num + 2, e))?;
        vendors.push(vendor);
    }
    Ok(vendors)
}

/// Load vendors from a CSV file path.
pub fn load_vendors_file(path: &str) -> Result<Vec<Vendor>, String> {
    let file = std::fs::File::open(path).map_err(|e| format!("Failed to open '{}': {}", path, e))?;
    load_vendors(file)
}

#[derive(Debug, Deserialize)]
struct AbcRecord {
    item_id: String,
    abc_class: String,
}

/// Load the optional ABC classification lookup. Unknown class letters
/// degrade to `C` rather than failing the load.
pub fn load_abc_classes<R: Read>(reader: R) -> Result<HashMap<String, AbcClass>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut classes = HashMap::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: AbcRecord =
            result.map_err(|e| format!("CSV parse error at line {}: {}", line_num + 2, e))?;
        let class = match record.abc_class.to_uppercase().as_str() {
            "A" => AbcClass::A,
            "B" => AbcClass::B,
            "C" => AbcClass::C,
            other => {
                log::warn!(
                    "unknown ABC class {:?} for item_id={}, defaulting to C",
                    other,
                    record.item_id
                );
                AbcClass::C
            }
        };
        classes.insert(record.item_id, class);
    }
    Ok(classes)
}

/// Load the ABC classification lookup from a CSV file path.
pub fn load_abc_classes_file(path: &str) -> Result<HashMap<String, AbcClass>, String> {
    let file = std::fs::File::open(path).map_err(|e| format!("Failed to open '{}': {}", path, e))?;
    load_abc_classes(file)
}

/// Flexible bool deserializer: handles "true"/"false", "1"/"0", "yes"/"no".
fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.to_lowercase().trim() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected bool value, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ITEMS: &str = "\
item_id,name,unit,category,current_stock,reorder_point,safety_stock,is_newly_added
itm-1,Milk,ltr,dairy,5,10,2,false
itm-2,Chicken Breast,kg,wholesale,2,8,1,false
itm-3,Chicken Masala Powder,pkt,spices,1,4,0,true
itm-4,Basmati Rice,kg,grains,40,10,5,0
";

    const SAMPLE_VENDORS: &str = "\
vendor_id,name,vendor_category,average_rating,total_purchase_orders,contact_phone,contact_email
v-10,Fresh Farms,Dairy Products,4.6,120,555-0100,orders@freshfarms.example
v-20,Meat House,meat,4.1,80,555-0101,sales@meathouse.example
";

    #[test]
    fn load_sample_items() {
        let records = load_items(SAMPLE_ITEMS.as_bytes()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].item_id, "itm-1");
        assert!((records[0].current_stock - 5.0).abs() < 0.01);
        assert!(!records[0].is_newly_added);
        assert!(records[2].is_newly_added);
    }

    #[test]
    fn into_inventory_item_computes_derived_fields() {
        let taxonomy = CategoryTaxonomy::new();
        let abc: HashMap<String, AbcClass> = [("itm-1".to_string(), AbcClass::A)].into();
        let records = load_items(SAMPLE_ITEMS.as_bytes()).unwrap();

        let milk = records[0].clone().into_inventory_item(&taxonomy, &abc);
        assert_eq!(milk.vendor_category_key, "dairy");
        assert_eq!(milk.abc_class, AbcClass::A);
        assert!((milk.reorder_qty - 7.0).abs() < 0.01);
        assert!(milk.is_low_stock);

        // Name override beats the raw category for fresh goods.
        let chicken = records[1].clone().into_inventory_item(&taxonomy, &abc);
        assert_eq!(chicken.vendor_category_key, "meat");
        assert_eq!(chicken.abc_class, AbcClass::C);

        // Processed stem keeps shelf goods out of the meat group.
        let powder = records[2].clone().into_inventory_item(&taxonomy, &abc);
        assert_eq!(powder.vendor_category_key, "spices");

        let rice = records[3].clone().into_inventory_item(&taxonomy, &abc);
        assert!(!rice.is_low_stock);
        assert!((rice.reorder_qty - 5.0).abs() < 0.01);
    }

    #[test]
    fn load_sample_vendors() {
        let vendors = load_vendors(SAMPLE_VENDORS.as_bytes()).unwrap();
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].vendor_id, "v-10");
        assert_eq!(vendors[0].vendor_category, "Dairy Products");
        assert!((vendors[0].average_rating - 4.6).abs() < 0.01);
        assert_eq!(vendors[1].total_purchase_orders, 80);
    }

    #[test]
    fn abc_classes_parse_and_degrade_to_c() {
        let csv_data = "\
item_id,abc_class
itm-1,A
itm-2,b
itm-3,X
";
        let classes = load_abc_classes(csv_data.as_bytes()).unwrap();
        assert_eq!(classes["itm-1"], AbcClass::A);
        assert_eq!(classes["itm-2"], AbcClass::B);
        assert_eq!(classes["itm-3"], AbcClass::C);
    }

    #[test]
    fn bool_parsing_handles_variants() {
        let csv_data = "\
item_id,name,unit,category,current_stock,reorder_point,safety_stock,is_newly_added
a,A,kg,dairy,1,2,0,1
b,B,kg,dairy,1,2,0,yes
c,C,kg,dairy,1,2,0,false
";
        let records = load_items(csv_data.as_bytes()).unwrap();
        assert!(records[0].is_newly_added);
        assert!(records[1].is_newly_added);
        assert!(!records[2].is_newly_added);
    }
}

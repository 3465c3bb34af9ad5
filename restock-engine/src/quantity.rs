//! Reorder quantity suggestion.
//!
//! Pure numeric functions over coerced inputs. The suggested quantity is the
//! deficit below the reorder point plus the safety-stock buffer — note that a
//! fully stocked item still suggests its safety stock. That matches the
//! observed ordering behavior in production and is preserved as-is.

/// Non-finite values (NaN, infinities) are treated as 0.
fn coerce(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round to 2 decimal places, half-up. The epsilon nudge keeps exact halves
/// from truncating under binary floating point (0.125 * 100 = 12.499...).
pub fn round2(value: f64) -> f64 {
    ((value + 1e-9) * 100.0).round() / 100.0
}

/// Suggested reorder quantity: `max(0, reorder_point - current_stock) +
/// safety_stock`, rounded to 2 decimals.
pub fn suggest(current_stock: f64, reorder_point: f64, safety_stock: f64) -> f64 {
    let current = coerce(current_stock);
    let reorder = coerce(reorder_point);
    let safety = coerce(safety_stock);
    let deficit = (reorder - current).max(0.0);
    round2(deficit + safety)
}

/// True when stock sits at or below either configured threshold. Thresholds
/// set to 0 are treated as unconfigured and never trigger.
pub fn is_low_stock(current_stock: f64, reorder_point: f64, safety_stock: f64) -> bool {
    let current = coerce(current_stock);
    let reorder = coerce(reorder_point);
    let safety = coerce(safety_stock);
    (reorder > 0.0 && current <= reorder) || (safety > 0.0 && current <= safety)
}

/// Urgency ratio for ranking low-stock items: `current_stock /
/// max(reorder_point, safety_stock, 1)`. Lower means more urgent.
pub fn urgency_ratio(current_stock: f64, reorder_point: f64, safety_stock: f64) -> f64 {
    let current = coerce(current_stock);
    let threshold = coerce(reorder_point).max(coerce(safety_stock)).max(1.0);
    current / threshold
}

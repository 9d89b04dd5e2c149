//! Sample bills built from the demo menu, used by the command line runner.

use chrono::{DateTime, FixedOffset};

use crate::model::{BillData, BillLineItem, Product};

/// Default tax rate applied at checkout.
pub const DEFAULT_TAX_RATE: f64 = 0.1;

const MENU: &[(&str, &str, f64, &str)] = &[
    ("1", "Masala Chai", 180.0, "BEV001"),
    ("2", "Herbal Tea", 150.0, "BEV002"),
    ("3", "Fresh Lime Juice", 120.0, "BEV003"),
    ("4", "Vegetable Samosa", 85.0, "SNK001"),
    ("5", "Chicken Roll", 220.0, "SNK002"),
    ("6", "Fish Cutlet", 95.0, "SNK003"),
    ("7", "Egg Roll", 180.0, "SNK004"),
    ("8", "Chicken Biryani", 650.0, "MAIN001"),
    ("9", "Mutton Curry", 850.0, "MAIN002"),
    ("10", "Fish Curry", 750.0, "MAIN003"),
    ("11", "Vegetable Curry", 450.0, "MAIN004"),
    ("12", "Coconut Rice", 280.0, "RICE001"),
    ("13", "Plain Rice", 180.0, "RICE002"),
    ("14", "Papadam", 35.0, "RICE003"),
];

/// Returns the demo menu as products.
pub fn menu() -> Vec<Product> {
    MENU.iter()
        .map(|&(id, name, price, sku)| Product::new(id, name, price, sku))
        .collect()
}

/// Builds a bill with `item_count` lines taken round-robin from the demo menu.
///
/// The bill number follows the checkout convention `SPOT-<unix millis>`.
pub fn sample_bill(item_count: usize, date: DateTime<FixedOffset>) -> BillData {
    let menu = menu();
    let items = (0..item_count)
        .map(|index| {
            let product = menu[index % menu.len()].clone();
            BillLineItem::new(product, (index % 3 + 1) as u32)
        })
        .collect();

    BillData::from_items(
        items,
        DEFAULT_TAX_RATE,
        "cash",
        format!("SPOT-{}", date.timestamp_millis()),
        date,
        "Admin User",
    )
}

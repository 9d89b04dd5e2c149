//! Data structures describing a checkout handed to the receipt renderer.
//!
//! The types in this module carry no rendering concerns.  They are built by
//! the billing screen from its cart, passed once into the renderer and then
//! discarded.  Every type is serde-friendly so bills can be exchanged as JSON.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::InvalidBillData;

/// Largest difference tolerated between a derived total and its recomputed value.
const TOTALS_TOLERANCE: f64 = 0.005;

/// The subset of a catalog product that appears on a receipt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: String,
    /// Display name, truncated by the layout when it is too long.
    pub name: String,
    /// Unit price in the local currency.
    pub price: f64,
    /// Stock keeping unit.
    pub sku: String,
}

impl Product {
    /// Creates a new product description.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        sku: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            sku: sku.into(),
        }
    }
}

/// A product together with the ordered quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BillLineItem {
    /// The ordered product.
    pub product: Product,
    /// Number of units, always greater than zero for a valid bill.
    pub quantity: u32,
}

impl BillLineItem {
    /// Creates a new line item.
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Returns `price * quantity`.
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Everything the renderer needs to lay out one receipt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillData {
    /// Ordered line items; may be empty.
    pub items: Vec<BillLineItem>,
    /// Sum of all line totals.
    pub subtotal: f64,
    /// `subtotal * tax_rate`.
    pub tax: f64,
    /// Tax rate as a fraction, e.g. `0.1` for ten percent.
    pub tax_rate: f64,
    /// `subtotal + tax`.
    pub total: f64,
    /// Payment method as chosen at checkout (`cash`, `card`, ...).
    pub payment_method: String,
    /// Caller supplied bill number, unique per document.
    pub bill_number: String,
    /// Moment of checkout.  Drives the printed date/time and the file name.
    pub date: DateTime<FixedOffset>,
    /// Name of the cashier who took the payment.
    pub cashier: String,
}

impl BillData {
    /// Builds a bill from cart items, deriving subtotal, tax and total.
    pub fn from_items(
        items: Vec<BillLineItem>,
        tax_rate: f64,
        payment_method: impl Into<String>,
        bill_number: impl Into<String>,
        date: DateTime<FixedOffset>,
        cashier: impl Into<String>,
    ) -> Self {
        let subtotal = items_subtotal(&items);
        let tax = subtotal * tax_rate;
        Self {
            items,
            subtotal,
            tax,
            tax_rate,
            total: subtotal + tax,
            payment_method: payment_method.into(),
            bill_number: bill_number.into(),
            date,
            cashier: cashier.into(),
        }
    }

    /// Checks the invariants the renderer relies on and reports the first violation.
    pub fn validate(&self) -> Result<(), InvalidBillData> {
        for (field, value) in [
            ("subtotal", self.subtotal),
            ("tax", self.tax),
            ("taxRate", self.tax_rate),
            ("total", self.total),
        ] {
            if !value.is_finite() {
                return Err(InvalidBillData::NonFinite { field, value });
            }
        }

        if self.tax_rate < 0.0 {
            return Err(InvalidBillData::NegativeTaxRate(self.tax_rate));
        }

        for (index, item) in self.items.iter().enumerate() {
            let price = item.product.price;
            if !price.is_finite() {
                return Err(InvalidBillData::NonFinite {
                    field: "price",
                    value: price,
                });
            }
            if price < 0.0 {
                return Err(InvalidBillData::NegativePrice {
                    index,
                    sku: item.product.sku.clone(),
                    price,
                });
            }
            if item.quantity == 0 {
                return Err(InvalidBillData::ZeroQuantity {
                    index,
                    sku: item.product.sku.clone(),
                });
            }
        }

        let expected_subtotal = items_subtotal(&self.items);
        check_consistent("subtotal", self.subtotal, expected_subtotal)?;
        check_consistent("tax", self.tax, self.subtotal * self.tax_rate)?;
        check_consistent("total", self.total, self.subtotal + self.tax)?;
        Ok(())
    }
}

fn items_subtotal(items: &[BillLineItem]) -> f64 {
    items.iter().map(BillLineItem::line_total).sum()
}

fn check_consistent(
    field: &'static str,
    actual: f64,
    expected: f64,
) -> Result<(), InvalidBillData> {
    if (actual - expected).abs() > TOTALS_TOLERANCE {
        Err(InvalidBillData::Inconsistent {
            field,
            actual,
            expected,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkout_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2023-11-14T22:13:20+05:30").expect("valid timestamp")
    }

    fn sample_bill(items: Vec<BillLineItem>, payment: &str, number: &str) -> BillData {
        BillData::from_items(items, 0.1, payment, number, checkout_time(), "Admin")
    }

    fn sample_items() -> Vec<BillLineItem> {
        vec![
            BillLineItem::new(Product::new("1", "Chicken Kottu", 450.0, "KOT-001"), 2),
            BillLineItem::new(Product::new("2", "Iced Coffee", 85.5, "BEV-004"), 1),
        ]
    }

    #[test]
    fn from_items_derives_totals() {
        let bill = sample_bill(sample_items(), "cash", "SPOT-1");
        assert_eq!(bill.subtotal, 985.5);
        assert!((bill.tax - 98.55).abs() < 1e-9);
        assert!((bill.total - 1084.05).abs() < 1e-9);
        assert!(bill.validate().is_ok());
    }

    #[test]
    fn empty_bill_is_valid() {
        let bill = sample_bill(Vec::new(), "card", "SPOT-2");
        assert_eq!(bill.total, 0.0);
        assert!(bill.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inconsistent_total() {
        let mut bill = sample_bill(sample_items(), "cash", "SPOT-3");
        bill.total += 1.0;
        let err = bill.validate().unwrap_err();
        assert!(matches!(err, InvalidBillData::Inconsistent { field: "total", .. }));
    }

    #[test]
    fn validate_rejects_zero_quantity_and_negative_price() {
        let mut items = sample_items();
        items[1].quantity = 0;
        let bill = BillData::from_items(items, 0.1, "cash", "SPOT-4", checkout_time(), "Admin");
        assert!(matches!(
            bill.validate(),
            Err(InvalidBillData::ZeroQuantity { index: 1, .. })
        ));

        let mut items = sample_items();
        items[0].product.price = -1.0;
        let bill = BillData::from_items(items, 0.1, "cash", "SPOT-5", checkout_time(), "Admin");
        assert!(matches!(
            bill.validate(),
            Err(InvalidBillData::NegativePrice { index: 0, .. })
        ));
    }

    #[test]
    fn validate_rejects_non_finite_amounts() {
        let mut bill = sample_bill(sample_items(), "cash", "SPOT-6");
        bill.total = f64::NAN;
        assert!(matches!(
            bill.validate(),
            Err(InvalidBillData::NonFinite { field: "total", .. })
        ));
    }

    #[test]
    fn deserializes_camel_case_json() {
        let json = r#"{
            "items": [{"product": {"id": "1", "name": "Tea", "price": 120.0, "sku": "BEV-001"}, "quantity": 3}],
            "subtotal": 360.0,
            "tax": 36.0,
            "taxRate": 0.1,
            "total": 396.0,
            "paymentMethod": "card",
            "billNumber": "SPOT-1700000000000",
            "date": "2023-11-14T22:13:20Z",
            "cashier": "Admin User"
        }"#;
        let bill: BillData = serde_json::from_str(json).expect("bill parses");
        assert_eq!(bill.items[0].quantity, 3);
        assert_eq!(bill.bill_number, "SPOT-1700000000000");
        assert!(bill.validate().is_ok());
    }
}

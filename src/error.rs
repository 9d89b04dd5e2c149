//! Error types surfaced by the receipt renderer, the print path and config loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A broken `BillData` invariant, reported before any drawing happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidBillData {
    /// A monetary field is NaN or infinite.
    #[error("{field} is not a finite number ({value})")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A line item carries a negative unit price.
    #[error("item {index} ({sku}) has a negative price {price}")]
    NegativePrice {
        /// Zero-based position of the item in the bill.
        index: usize,
        /// SKU of the product.
        sku: String,
        /// The rejected price.
        price: f64,
    },
    /// A line item has a zero quantity.
    #[error("item {index} ({sku}) has a zero quantity")]
    ZeroQuantity {
        /// Zero-based position of the item in the bill.
        index: usize,
        /// SKU of the product.
        sku: String,
    },
    /// The tax rate is negative.
    #[error("tax rate {0} is negative")]
    NegativeTaxRate(f64),
    /// A derived total does not match the value recomputed from the items.
    #[error("{field} is {actual:.2} but the items add up to {expected:.2}")]
    Inconsistent {
        /// Name of the derived field (`subtotal`, `tax` or `total`).
        field: &'static str,
        /// Value carried by the bill.
        actual: f64,
        /// Value recomputed from the line items.
        expected: f64,
    },
}

/// Errors raised while generating a bill document.
#[derive(Debug, Error)]
pub enum BillError {
    /// The bill failed validation.
    #[error("invalid bill data: {0}")]
    InvalidBillData(#[from] InvalidBillData),
    /// The configured logo could not be decoded.
    #[error("failed to load logo image")]
    Logo(#[source] image::ImageError),
    /// The PDF backend rejected a drawing or serialization call.
    #[error("failed to write PDF document: {0}")]
    Pdf(String),
    /// Saving the artifact failed.
    #[error("failed to write bill document to {path}")]
    Io {
        /// Target path of the failed write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Post-processing the outline failed.
    #[cfg(feature = "bookmarks")]
    #[error(transparent)]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),
}

/// Faults raised by an opened print surface.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The surface failed while receiving or printing the document.
    #[error("print surface failed")]
    Surface(#[from] io::Error),
}

/// Errors raised while loading a [`crate::config::ReceiptConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid JSON for the expected shape.
    #[error("failed to parse config file {path}")]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

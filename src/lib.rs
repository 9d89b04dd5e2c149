//! Core entry point for the bill_receipt crate.
//!
//! Turns a point-of-sale checkout ([`model::BillData`]) into a paginated PDF
//! receipt ([`generate_document`]) and wraps on-screen bill markup into a
//! print-ready page ([`print::print_fragment`]).

pub mod builder;
pub mod config;
pub mod demo;
pub mod error;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod model;
pub mod print;
pub mod render;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{generate_document, BillDocument, ReceiptBuilder};
pub use config::{BrandingConfig, PrintOptions, ReceiptConfig, RenderOptions};
pub use error::{BillError, ConfigError, InvalidBillData, PrintError};
pub use model::{BillData, BillLineItem, Product};
pub use print::{print_element, print_fragment, PrintOutcome};

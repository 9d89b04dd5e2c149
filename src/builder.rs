//! Receipt document construction for the bill_receipt crate.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::{BrandingConfig, RenderOptions};
use crate::error::BillError;
use crate::format;
use crate::layout::ReceiptLayout;
use crate::model::BillData;
use crate::render;

/// A rendered receipt ready to be downloaded or stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillDocument {
    /// Suggested download name, see [`format::bill_file_name`].
    pub file_name: String,
    /// Serialized PDF bytes.
    pub bytes: Vec<u8>,
    /// Number of pages in the document.
    pub page_count: usize,
}

impl BillDocument {
    /// Writes the document into `dir` under its file name and returns the full path.
    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, BillError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| BillError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes).map_err(|source| BillError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Builder for receipt documents pre-configured with the crate defaults.
#[derive(Clone, Debug, Default)]
pub struct ReceiptBuilder {
    branding: BrandingConfig,
    options: RenderOptions,
}

impl ReceiptBuilder {
    /// Creates a new builder with the default branding and options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the business identity printed on the receipt.
    pub fn with_branding(mut self, branding: BrandingConfig) -> Self {
        self.branding = branding;
        self
    }

    /// Sets the layout and formatting options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the configured branding.
    pub fn branding(&self) -> &BrandingConfig {
        &self.branding
    }

    /// Returns the configured options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Validates `bill` (when enabled) and computes its layout without rendering.
    pub fn layout(&self, bill: &BillData) -> Result<ReceiptLayout, BillError> {
        if self.options.validate {
            bill.validate()?;
        }
        Ok(ReceiptLayout::compute(bill, &self.branding, &self.options))
    }

    /// Renders `bill` into a PDF document.
    pub fn render(&self, bill: &BillData) -> Result<BillDocument, BillError> {
        let layout = self.layout(bill)?;
        let logo = self
            .branding
            .logo
            .as_ref()
            .map(render::decode_logo)
            .transpose()?;

        let title = format!("{} Bill {}", self.branding.shop_name, bill.bill_number);
        let bytes = render::render_pdf(&layout, &title, logo.as_ref())?;

        #[cfg(feature = "bookmarks")]
        let bytes = crate::bookmarks::apply_page_bookmarks(&bytes, &layout)?;

        let document = BillDocument {
            file_name: format::bill_file_name(
                &self.branding.shop_name,
                &bill.bill_number,
                &bill.date,
            ),
            bytes,
            page_count: layout.page_count(),
        };
        info!(
            "Generated {} with {} page(s)",
            document.file_name, document.page_count
        );
        Ok(document)
    }
}

/// Renders `bill` with `branding` and the default options.
pub fn generate_document(
    bill: &BillData,
    branding: &BrandingConfig,
) -> Result<BillDocument, BillError> {
    ReceiptBuilder::new()
        .with_branding(branding.clone())
        .render(bill)
}

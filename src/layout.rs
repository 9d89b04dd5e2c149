//! Deterministic receipt layout.
//!
//! [`ReceiptLayout::compute`] turns a [`BillData`] into positioned drawing
//! operations on A4 pages.  Coordinates are millimetres with the origin in the
//! top-left corner of the page and `y` growing downwards; text coordinates are
//! baselines.  The layout does not touch the PDF backend so every placement can
//! be inspected directly.

use log::debug;

use crate::config::{BrandingConfig, Overflow, RenderOptions};
use crate::fonts::{self, FontWeight};
use crate::format;
use crate::model::{BillData, BillLineItem};

/// Page width in millimetres (A4 portrait).
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// Page height in millimetres (A4 portrait).
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// Lowest `y` an item row may reach before the table continues on a new page.
pub const CONTENT_BOTTOM_MM: f64 = 287.0;
/// Vertical distance between two item rows.
pub const ROW_STEP_MM: f64 = 12.0;
/// Height of the totals and footer block measured from the cursor after the last row.
///
/// The block moves to a new page only when it would run past [`PAGE_HEIGHT_MM`].
pub const TOTALS_EXTENT_MM: f64 = 95.0;

const CENTER_X: f64 = PAGE_WIDTH_MM / 2.0;
const LEFT_X: f64 = 20.0;
const RIGHT_X: f64 = 190.0;
const TABLE_WIDTH: f64 = RIGHT_X - LEFT_X;
const FIRST_TABLE_TOP: f64 = 115.0;
const CONTINUATION_TABLE_TOP: f64 = 40.0;
const FIRST_ROW_OFFSET: f64 = 25.0;
const ROW_BOTTOM_PAD: f64 = 2.0;
const COLUMN_X: [f64; 5] = [25.0, 85.0, 115.0, 135.0, 165.0];
const QUANTITY_X: f64 = 118.0;
const COLUMN_LABELS: [&str; 5] = ["ITEM", "SKU", "QTY", "PRICE", "TOTAL"];
const DIVIDER_WIDTH_MM: f64 = 0.5;
const RULE_WIDTH_MM: f64 = 0.3;
const LOGO_BOX: (f64, f64, f64) = (LEFT_X, 13.0, 20.0);

/// An sRGB colour with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Plain black text.
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    /// Text on the highlighted total band.
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    /// Tagline text.
    pub const TAGLINE_GREY: Rgb = Rgb(80, 80, 80);
    /// Footer text.
    pub const FOOTER_GREY: Rgb = Rgb(100, 100, 100);
    /// Background of the table header band.
    pub const HEADER_BAND: Rgb = Rgb(240, 248, 244);
    /// Background of striped item rows.
    pub const ZEBRA: Rgb = Rgb(250, 252, 251);
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb(r, g, b)
    }
}

/// Horizontal anchoring of a text run relative to its `x` coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the horizontal center.
    Center,
    /// `x` is the right edge.
    Right,
}

/// A single line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Text to print.
    pub text: String,
    /// Anchor `x` interpreted according to `align`.
    pub x: f64,
    /// Baseline.
    pub y: f64,
    /// Size in points.
    pub font_size: u8,
    /// Helvetica face.
    pub weight: FontWeight,
    /// Fill colour of the glyphs.
    pub color: Rgb,
    /// Anchoring of `x`.
    pub align: TextAlign,
}

impl TextRun {
    /// Returns the `x` coordinate of the left edge of the run.
    pub fn left_x(&self) -> f64 {
        let width = fonts::text_width_mm(&self.text, self.weight, self.font_size);
        match self.align {
            TextAlign::Left => self.x,
            TextAlign::Center => self.x - width / 2.0,
            TextAlign::Right => self.x - width,
        }
    }
}

/// A positioned drawing primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// A line of text.
    Text(TextRun),
    /// A filled rectangle without outline.
    FillRect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Fill colour.
        color: Rgb,
    },
    /// An outlined, unfilled rectangle.
    StrokeRect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Outline colour.
        color: Rgb,
        /// Outline thickness in millimetres.
        line_width: f64,
    },
    /// A straight line.
    Line {
        /// Start point.
        from: (f64, f64),
        /// End point.
        to: (f64, f64),
        /// Stroke colour.
        color: Rgb,
        /// Stroke thickness in millimetres.
        line_width: f64,
    },
    /// Square box the configured logo is fitted into.
    Logo {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Edge length of the box.
        size: f64,
    },
}

impl DrawOp {
    fn bottom(&self) -> f64 {
        match self {
            DrawOp::Text(run) => run.y,
            DrawOp::FillRect { y, height, .. } | DrawOp::StrokeRect { y, height, .. } => y + height,
            DrawOp::Line { from, to, .. } => from.1.max(to.1),
            DrawOp::Logo { y, size, .. } => y + size,
        }
    }
}

/// Drawing operations of one page together with what the page holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// One-based page number.
    pub number: usize,
    /// Operations in painting order.
    pub ops: Vec<DrawOp>,
    /// Indices of the line items printed on this page.
    pub items: std::ops::Range<usize>,
    /// Whether the totals block is on this page.
    pub has_totals: bool,
}

impl Page {
    fn new(number: usize, first_item: usize) -> Self {
        Self {
            number,
            ops: Vec::new(),
            items: first_item..first_item,
            has_totals: false,
        }
    }

    /// Returns every text run on the page.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Returns the lowest `y` touched by any operation on the page.
    pub fn extent(&self) -> f64 {
        self.ops.iter().map(DrawOp::bottom).fold(0.0, f64::max)
    }

    fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    fn text(
        &mut self,
        text: impl Into<String>,
        (x, y): (f64, f64),
        font_size: u8,
        weight: FontWeight,
        color: Rgb,
        align: TextAlign,
    ) {
        self.push(DrawOp::Text(TextRun {
            text: text.into(),
            x,
            y,
            font_size,
            weight,
            color,
            align,
        }));
    }

    /// Regular 10 pt black text, left aligned.
    fn body_text(&mut self, text: impl Into<String>, at: (f64, f64)) {
        self.text(text, at, 10, FontWeight::Regular, Rgb::BLACK, TextAlign::Left);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb, line_width: f64) {
        self.push(DrawOp::Line {
            from,
            to,
            color,
            line_width,
        });
    }

    fn fill_rect(&mut self, (x, y): (f64, f64), width: f64, height: f64, color: Rgb) {
        self.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }
}

/// Where one line item ended up and what it shows.
#[derive(Clone, Debug, PartialEq)]
pub struct RowPlacement {
    /// Zero-based index of the item in the bill.
    pub index: usize,
    /// One-based page number.
    pub page: usize,
    /// Baseline of the row text.
    pub baseline: f64,
    /// Whether the row carries the zebra background.
    pub striped: bool,
    /// Possibly truncated product name.
    pub name: String,
    /// Product SKU.
    pub sku: String,
    /// Quantity as integer text.
    pub quantity: String,
    /// Formatted unit price.
    pub unit_price: String,
    /// Formatted `price * quantity`.
    pub line_total: String,
}

/// Placement and texts of the totals block.
#[derive(Clone, Debug, PartialEq)]
pub struct TotalsPlacement {
    /// One-based page number.
    pub page: usize,
    /// Baseline of the subtotal row.
    pub subtotal_y: f64,
    /// Formatted subtotal.
    pub subtotal: String,
    /// Tax row label including the rate.
    pub tax_label: String,
    /// Formatted tax.
    pub tax: String,
    /// Baseline of the highlighted total row.
    pub total_y: f64,
    /// Formatted grand total.
    pub total: String,
}

/// The complete, positioned receipt.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceiptLayout {
    /// Pages in order.
    pub pages: Vec<Page>,
    /// One placement per line item, in bill order.
    pub rows: Vec<RowPlacement>,
    /// The totals block.
    pub totals: TotalsPlacement,
}

impl ReceiptLayout {
    /// Lays out `bill` with the given branding and options.
    pub fn compute(bill: &BillData, branding: &BrandingConfig, options: &RenderOptions) -> Self {
        let mut composer = Composer::new(bill, branding, options);
        composer.first_page();
        for (index, item) in bill.items.iter().enumerate() {
            composer.item_row(index, item);
        }
        let totals = composer.totals_and_footer();

        let layout = ReceiptLayout {
            pages: composer.pages,
            rows: composer.rows,
            totals,
        };
        debug!(
            "Laid out bill {} with {} items on {} page(s)",
            bill.bill_number,
            bill.items.len(),
            layout.pages.len()
        );
        layout
    }

    /// Returns the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Indicates whether any page draws below the physical page bottom.
    pub fn overflows_page(&self) -> bool {
        self.pages.iter().any(|page| page.extent() > PAGE_HEIGHT_MM)
    }
}

struct Composer<'a> {
    bill: &'a BillData,
    branding: &'a BrandingConfig,
    options: &'a RenderOptions,
    accent: Rgb,
    pages: Vec<Page>,
    rows: Vec<RowPlacement>,
    cursor: f64,
}

impl<'a> Composer<'a> {
    fn new(bill: &'a BillData, branding: &'a BrandingConfig, options: &'a RenderOptions) -> Self {
        Self {
            bill,
            branding,
            options,
            accent: branding.accent_color.into(),
            pages: Vec::new(),
            rows: Vec::with_capacity(bill.items.len()),
            cursor: 0.0,
        }
    }

    fn page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::new(1, 0));
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn currency(&self, value: f64) -> String {
        format::format_currency(&self.options.currency_prefix, value)
    }

    fn paginate(&self) -> bool {
        self.options.overflow == Overflow::Paginate
    }

    fn first_page(&mut self) {
        self.header();
        self.metadata();
        self.table_header(FIRST_TABLE_TOP);
    }

    fn header(&mut self) {
        let accent = self.accent;
        let branding = self.branding;
        let page = self.page();
        if branding.logo.is_some() {
            let (x, y, size) = LOGO_BOX;
            page.push(DrawOp::Logo { x, y, size });
        }
        page.text(
            branding.shop_name.as_str(),
            (CENTER_X, 25.0),
            28,
            FontWeight::Regular,
            accent,
            TextAlign::Center,
        );
        page.text(
            branding.tagline.as_str(),
            (CENTER_X, 35.0),
            16,
            FontWeight::Regular,
            Rgb::TAGLINE_GREY,
            TextAlign::Center,
        );
        page.text(
            branding.address.as_str(),
            (CENTER_X, 45.0),
            10,
            FontWeight::Regular,
            Rgb::BLACK,
            TextAlign::Center,
        );
        page.text(
            branding.contact_line(),
            (CENTER_X, 52.0),
            10,
            FontWeight::Regular,
            Rgb::BLACK,
            TextAlign::Center,
        );
        page.line((LEFT_X, 60.0), (RIGHT_X, 60.0), accent, DIVIDER_WIDTH_MM);
    }

    fn metadata(&mut self) {
        let bill = self.bill;
        let page = self.page();
        page.text(
            "BILL RECEIPT",
            (LEFT_X, 75.0),
            14,
            FontWeight::Bold,
            Rgb::BLACK,
            TextAlign::Left,
        );

        let left = [
            format!("Bill Number: {}", bill.bill_number),
            format!("Date: {}", format::format_bill_date(&bill.date)),
            format!("Time: {}", format::format_bill_time(&bill.date)),
        ];
        for (line, y) in left.into_iter().zip([85.0, 92.0, 99.0]) {
            page.body_text(line, (LEFT_X, y));
        }

        let right = [
            format!("Cashier: {}", bill.cashier),
            format!("Payment: {}", bill.payment_method.to_uppercase()),
        ];
        for (line, y) in right.into_iter().zip([85.0, 92.0]) {
            page.body_text(line, (120.0, y));
        }
    }

    fn table_header(&mut self, top: f64) {
        let accent = self.accent;
        let page = self.page();
        page.line((LEFT_X, top), (RIGHT_X, top), accent, RULE_WIDTH_MM);
        page.fill_rect((LEFT_X, top + 2.0), TABLE_WIDTH, 12.0, Rgb::HEADER_BAND);
        for (label, x) in COLUMN_LABELS.iter().zip(COLUMN_X) {
            page.text(
                *label,
                (x, top + 10.0),
                10,
                FontWeight::Bold,
                accent,
                TextAlign::Left,
            );
        }
        page.line((LEFT_X, top + 14.0), (RIGHT_X, top + 14.0), accent, RULE_WIDTH_MM);
        self.cursor = top + FIRST_ROW_OFFSET;
    }

    fn continuation_page(&mut self) {
        let number = self.pages.len() + 1;
        let first_item = self.rows.len();
        self.pages.push(Page::new(number, first_item));

        let accent = self.accent;
        let title = format!("{} - BILL RECEIPT (continued)", self.branding.shop_name);
        let bill_number = format!("Bill Number: {}", self.bill.bill_number);
        let page = self.page();
        page.text(
            title,
            (LEFT_X, 20.0),
            12,
            FontWeight::Bold,
            accent,
            TextAlign::Left,
        );
        page.text(
            format!("Page {}", number),
            (RIGHT_X, 20.0),
            9,
            FontWeight::Regular,
            Rgb::FOOTER_GREY,
            TextAlign::Right,
        );
        page.body_text(bill_number, (LEFT_X, 27.0));
        page.line((LEFT_X, 32.0), (RIGHT_X, 32.0), accent, DIVIDER_WIDTH_MM);
        self.cursor = CONTINUATION_TABLE_TOP;
        debug!("Starting continuation page {} at item {}", number, first_item);
    }

    fn item_row(&mut self, index: usize, item: &BillLineItem) {
        if self.paginate() && self.cursor + ROW_BOTTOM_PAD > CONTENT_BOTTOM_MM {
            self.continuation_page();
            self.table_header(CONTINUATION_TABLE_TOP);
        }

        let y = self.cursor;
        let striped = index % 2 == 0;
        let row = RowPlacement {
            index,
            page: self.pages.len(),
            baseline: y,
            striped,
            name: format::truncate_name(&item.product.name, self.options.name_max_chars).to_owned(),
            sku: item.product.sku.clone(),
            quantity: item.quantity.to_string(),
            unit_price: self.currency(item.product.price),
            line_total: self.currency(item.line_total()),
        };

        let page = self.page();
        if striped {
            page.fill_rect((LEFT_X, y - 8.0), TABLE_WIDTH, 10.0, Rgb::ZEBRA);
        }
        let cells = [
            (row.name.as_str(), COLUMN_X[0]),
            (row.sku.as_str(), COLUMN_X[1]),
            (row.quantity.as_str(), QUANTITY_X),
            (row.unit_price.as_str(), COLUMN_X[3]),
            (row.line_total.as_str(), COLUMN_X[4]),
        ];
        for (text, x) in cells {
            page.body_text(text, (x, y));
        }
        page.items.end = index + 1;

        self.rows.push(row);
        self.cursor += ROW_STEP_MM;
    }

    fn totals_and_footer(&mut self) -> TotalsPlacement {
        if self.paginate() && self.cursor + TOTALS_EXTENT_MM > PAGE_HEIGHT_MM {
            self.continuation_page();
        }

        let accent = self.accent;
        let page_number = self.pages.len();
        let mut y = self.cursor + 8.0;
        let totals_top = y;
        let subtotal = self.currency(self.bill.subtotal);
        let tax_label = format::format_tax_label(self.bill.tax_rate);
        let tax = self.currency(self.bill.tax);
        let total = self.currency(self.bill.total);
        let thank_you = self.branding.thank_you_line();
        let social = self.branding.social_line();

        let page = self.page();
        page.has_totals = true;
        page.line((120.0, y - 5.0), (RIGHT_X, y - 5.0), accent, RULE_WIDTH_MM);
        page.body_text("Subtotal:", (135.0, y));
        page.body_text(subtotal.as_str(), (165.0, y));

        y += 12.0;
        page.body_text(tax_label.as_str(), (135.0, y));
        page.body_text(tax.as_str(), (165.0, y));

        y += 15.0;
        let total_y = y;
        page.fill_rect((120.0, y - 8.0), 70.0, 12.0, accent);
        page.text(
            "TOTAL:",
            (135.0, y),
            12,
            FontWeight::Bold,
            Rgb::WHITE,
            TextAlign::Left,
        );
        page.text(
            total.as_str(),
            (165.0, y),
            12,
            FontWeight::Bold,
            Rgb::WHITE,
            TextAlign::Left,
        );

        for (line, offset) in [
            (thank_you, 25.0),
            (social, 35.0),
            ("Please keep this receipt for your records".to_owned(), 45.0),
        ] {
            page.text(
                line,
                (CENTER_X, y + offset),
                9,
                FontWeight::Regular,
                Rgb::FOOTER_GREY,
                TextAlign::Center,
            );
        }

        page.text(
            "Scan QR for feedback:",
            (LEFT_X, y + 40.0),
            8,
            FontWeight::Regular,
            Rgb::FOOTER_GREY,
            TextAlign::Left,
        );
        page.push(DrawOp::StrokeRect {
            x: LEFT_X,
            y: y + 45.0,
            width: 15.0,
            height: 15.0,
            color: accent,
            line_width: RULE_WIDTH_MM,
        });
        page.text(
            "QR",
            (26.0, y + 54.0),
            8,
            FontWeight::Regular,
            Rgb::FOOTER_GREY,
            TextAlign::Left,
        );

        TotalsPlacement {
            page: page_number,
            subtotal_y: totals_top,
            subtotal,
            tax_label,
            tax,
            total_y,
            total,
        }
    }
}

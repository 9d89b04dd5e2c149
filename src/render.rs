//! PDF backend that paints a [`ReceiptLayout`] with `printpdf`.
//!
//! The layout works top-down in millimetres; PDF user space starts at the
//! bottom-left corner, so every `y` is flipped against the page height here.

use std::io::BufWriter;
use std::path::Path;

use image::{DynamicImage, GenericImageView};
use log::debug;
use printpdf::{
    Color, CustomPdfConformance, Image, IndirectFontRef, Line, Mm, PdfConformance, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};

use crate::config::LogoSource;
use crate::error::BillError;
use crate::fonts::{FontWeight, MM_PER_PT};
use crate::layout::{DrawOp, Page, ReceiptLayout, Rgb, TextRun, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

const LAYER_NAME: &str = "Receipt";
const LOGO_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// Loads a logo from in-memory bytes or a file with descriptive errors.
pub fn decode_logo(source: &LogoSource) -> Result<DynamicImage, BillError> {
    let image = match source {
        LogoSource::Bytes(bytes) => image::load_from_memory(bytes),
        LogoSource::Path(path) => open_logo(path),
    }
    .map_err(BillError::Logo)?;
    // Alpha channels are flattened; receipts are printed on white paper.
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

fn open_logo(path: &Path) -> image::ImageResult<DynamicImage> {
    debug!("Decoding logo from {}", path.display());
    image::open(path)
}

/// Paints `layout` into a new PDF document and returns the serialized bytes.
pub fn render_pdf(
    layout: &ReceiptLayout,
    title: &str,
    logo: Option<&DynamicImage>,
) -> Result<Vec<u8>, BillError> {
    // Receipts carry neither an ICC profile nor XMP metadata.
    let document = PdfDocument::empty(title).with_conformance(PdfConformance::Custom(
        CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..Default::default()
        },
    ));
    let fonts = Fonts::install(&document)?;

    for page in &layout.pages {
        let (page_index, layer_index) =
            document.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        let layer = document.get_page(page_index).get_layer(layer_index);
        paint_page(&layer, &fonts, page, logo);
    }

    let mut writer = BufWriter::new(Vec::new());
    document.save(&mut writer).map_err(pdf_error)?;
    writer.into_inner().map_err(pdf_error)
}

fn pdf_error(err: impl std::fmt::Display) -> BillError {
    BillError::Pdf(err.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn install(document: &PdfDocumentReference) -> Result<Self, BillError> {
        Ok(Self {
            regular: document
                .add_builtin_font(FontWeight::Regular.builtin())
                .map_err(pdf_error)?,
            bold: document
                .add_builtin_font(FontWeight::Bold.builtin())
                .map_err(pdf_error)?,
        })
    }

    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

fn pdf_color(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        None,
    ))
}

fn point(x: f64, y: f64) -> Point {
    Point::new(Mm(x), Mm(PAGE_HEIGHT_MM - y))
}

fn paint_page(layer: &PdfLayerReference, fonts: &Fonts, page: &Page, logo: Option<&DynamicImage>) {
    for op in &page.ops {
        match op {
            DrawOp::Text(run) => paint_text(layer, fonts, run),
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                layer.set_fill_color(pdf_color(*color));
                layer.add_shape(rectangle(*x, *y, *width, *height, true));
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
                color,
                line_width,
            } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(line_width / MM_PER_PT);
                layer.add_shape(rectangle(*x, *y, *width, *height, false));
            }
            DrawOp::Line {
                from,
                to,
                color,
                line_width,
            } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(line_width / MM_PER_PT);
                layer.add_shape(Line {
                    points: vec![(point(from.0, from.1), false), (point(to.0, to.1), false)],
                    is_closed: false,
                    has_fill: false,
                    has_stroke: true,
                    is_clipping_path: false,
                });
            }
            DrawOp::Logo { x, y, size } => {
                if let Some(image) = logo {
                    paint_logo(layer, image, *x, *y, *size);
                }
            }
        }
    }
}

fn paint_text(layer: &PdfLayerReference, fonts: &Fonts, run: &TextRun) {
    layer.set_fill_color(pdf_color(run.color));
    layer.use_text(
        run.text.clone(),
        run.font_size.into(),
        Mm(run.left_x()),
        Mm(PAGE_HEIGHT_MM - run.y),
        fonts.get(run.weight),
    );
}

fn rectangle(x: f64, y: f64, width: f64, height: f64, filled: bool) -> Line {
    Line {
        points: vec![
            (point(x, y), false),
            (point(x + width, y), false),
            (point(x + width, y + height), false),
            (point(x, y + height), false),
        ],
        is_closed: true,
        has_fill: filled,
        has_stroke: !filled,
        is_clipping_path: false,
    }
}

fn paint_logo(layer: &PdfLayerReference, image: &DynamicImage, x: f64, y: f64, size: f64) {
    let (px_width, px_height) = image.dimensions();
    let natural_width = MM_PER_INCH * f64::from(px_width) / LOGO_DPI;
    let natural_height = MM_PER_INCH * f64::from(px_height) / LOGO_DPI;
    let longest = natural_width.max(natural_height);
    if longest <= f64::EPSILON {
        return;
    }

    let scale = size / longest;
    let drawn_height = natural_height * scale;
    Image::from_dynamic_image(image).add_to_layer(
        layer.clone(),
        Some(Mm(x)),
        Some(Mm(PAGE_HEIGHT_MM - y - drawn_height)),
        None,
        Some(scale),
        Some(scale),
        Some(LOGO_DPI),
    );
}

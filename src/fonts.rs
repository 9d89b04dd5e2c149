//! Font utilities for the built-in PDF fonts used by receipts.
//!
//! Receipts are drawn with the standard Helvetica faces, which every PDF viewer
//! ships, so no font files have to be located or embedded.  The advance widths
//! below (in 1/1000 em, printable ASCII) are needed to center text.

use printpdf::BuiltinFont;

/// Millimetres per PDF point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

const FIRST_CHAR: u32 = 0x20;
const MISSING_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Weight of the Helvetica face used for a text run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    /// Helvetica.
    #[default]
    Regular,
    /// Helvetica-Bold.
    Bold,
}

impl FontWeight {
    /// Returns the matching built-in PDF font.
    pub fn builtin(self) -> BuiltinFont {
        match self {
            FontWeight::Regular => BuiltinFont::Helvetica,
            FontWeight::Bold => BuiltinFont::HelveticaBold,
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            FontWeight::Regular => &HELVETICA_WIDTHS,
            FontWeight::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    fn advance(self, ch: char) -> u16 {
        let index = (ch as u32).wrapping_sub(FIRST_CHAR) as usize;
        self.widths().get(index).copied().unwrap_or(MISSING_WIDTH)
    }
}

/// Width of `text` in millimetres when set in `weight` at `font_size` points.
pub fn text_width_mm(text: &str, weight: FontWeight, font_size: u8) -> f64 {
    let units: u32 = text.chars().map(|ch| u32::from(weight.advance(ch))).sum();
    f64::from(units) / 1000.0 * f64::from(font_size) * MM_PER_PT
}

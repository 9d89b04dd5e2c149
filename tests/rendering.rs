use bill_receipt::config::{BrandingConfig, LogoSource, Overflow, RenderOptions};
use bill_receipt::{demo, generate_document, BillData, BillError, ReceiptBuilder};
use chrono::DateTime;
use sha2::{Digest, Sha256};
use std::fs;

fn sample_bill(items: usize) -> BillData {
    let date = DateTime::parse_from_rfc3339("2023-11-15T03:43:20+05:30").expect("valid timestamp");
    demo::sample_bill(items, date)
}

fn render(bill: &BillData) -> Vec<u8> {
    generate_document(bill, &BrandingConfig::default())
        .expect("render sample bill")
        .bytes
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

fn pdf_page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("rendered bytes parse as PDF")
        .get_pages()
        .len()
}

#[test]
fn renders_pdf_header() {
    let bytes = render(&sample_bill(3));
    assert!(bytes.starts_with(b"%PDF-"), "output should be a PDF document");
}

#[test]
fn rendering_is_deterministic() {
    let bill = sample_bill(6);
    let bytes_a = render(&bill);
    let bytes_b = render(&bill);

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn file_name_follows_download_pattern() {
    let document = generate_document(&sample_bill(2), &BrandingConfig::default())
        .expect("render sample bill");
    assert_eq!(
        document.file_name,
        "SPOT-Bill-SPOT-1700000000000-2023-11-14T22-13-20.pdf"
    );
}

#[test]
fn page_count_matches_layout() {
    let short = generate_document(&sample_bill(3), &BrandingConfig::default()).expect("render");
    assert_eq!(short.page_count, 1);
    assert_eq!(pdf_page_count(&short.bytes), 1);

    let long = generate_document(&sample_bill(45), &BrandingConfig::default()).expect("render");
    assert!(long.page_count > 1);
    assert_eq!(pdf_page_count(&long.bytes), long.page_count);
}

#[test]
fn unbounded_overflow_renders_a_single_page() {
    let options = RenderOptions {
        overflow: Overflow::Unbounded,
        ..RenderOptions::default()
    };
    let document = ReceiptBuilder::new()
        .with_options(options)
        .render(&sample_bill(45))
        .expect("render");
    assert_eq!(document.page_count, 1);
    assert_eq!(pdf_page_count(&document.bytes), 1);
}

#[test]
fn empty_cart_still_renders() {
    let document = generate_document(&sample_bill(0), &BrandingConfig::default())
        .expect("empty bill renders");
    assert_eq!(document.page_count, 1);
    assert!(document.bytes.starts_with(b"%PDF-"));
}

#[test]
fn inconsistent_bill_is_rejected_unless_validation_is_off() {
    let mut bill = sample_bill(2);
    bill.total = f64::NAN;

    let err = generate_document(&bill, &BrandingConfig::default()).unwrap_err();
    assert!(matches!(err, BillError::InvalidBillData(_)));

    let options = RenderOptions {
        validate: false,
        ..RenderOptions::default()
    };
    let layout = ReceiptBuilder::new()
        .with_options(options.clone())
        .layout(&bill)
        .expect("layout without validation");
    assert_eq!(layout.totals.total, "Rs. NaN");
    ReceiptBuilder::new()
        .with_options(options)
        .render(&bill)
        .expect("malformed bill renders as-is");
}

#[test]
fn unreadable_logo_fails_generation() {
    let branding = BrandingConfig {
        logo: Some(LogoSource::Bytes(b"not an image".to_vec())),
        ..BrandingConfig::default()
    };
    let err = generate_document(&sample_bill(1), &branding).unwrap_err();
    assert!(matches!(err, BillError::Logo(_)));
}

#[test]
fn saves_into_directory_under_file_name() {
    let dir = std::env::temp_dir().join(format!("bill_receipt_save_{}", std::process::id()));
    let document = generate_document(&sample_bill(2), &BrandingConfig::default()).expect("render");
    let path = document.save_to_dir(&dir).expect("save");

    assert_eq!(path, dir.join(&document.file_name));
    assert_eq!(fs::read(&path).expect("read back"), document.bytes);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn rebranding_changes_file_prefix() {
    let branding = BrandingConfig {
        shop_name: "Lotus".to_owned(),
        ..BrandingConfig::default()
    };
    let document = generate_document(&sample_bill(1), &branding).expect("render");
    assert!(document.file_name.starts_with("Lotus-Bill-SPOT-"));
}

#[cfg(feature = "bookmarks")]
#[test]
fn outline_lists_every_page() {
    use bill_receipt::bookmarks::page_title;
    use lopdf::{Document, Object};

    let bill = sample_bill(45);
    let layout = ReceiptBuilder::new().layout(&bill).expect("layout");
    let rendered = generate_document(&bill, &BrandingConfig::default()).expect("render");
    assert_eq!(rendered.page_count, layout.page_count());

    let document = Document::load_mem(&rendered.bytes).expect("rendered bytes parse as PDF");
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .expect("catalog reference");
    let catalog = document.get_dictionary(catalog_id).expect("catalog");
    let outlines_id = catalog
        .get(b"Outlines")
        .and_then(Object::as_reference)
        .expect("outline root");
    let outlines = document.get_dictionary(outlines_id).expect("outline dictionary");
    let count = outlines
        .get(b"Count")
        .and_then(Object::as_i64)
        .expect("outline count");
    assert_eq!(count as usize, rendered.page_count);

    let mut titles = Vec::new();
    let mut next = outlines.get(b"First").and_then(Object::as_reference).ok();
    while let Some(entry_id) = next {
        let entry = document.get_dictionary(entry_id).expect("outline entry");
        let title = entry
            .get(b"Title")
            .and_then(Object::as_str)
            .expect("outline title");
        titles.push(String::from_utf8_lossy(title).into_owned());
        next = entry.get(b"Next").and_then(Object::as_reference).ok();
    }

    let expected: Vec<String> = layout.pages.iter().map(page_title).collect();
    assert_eq!(titles, expected);
    assert_eq!(titles.first().map(String::as_str), Some("Items 1-13"));
}

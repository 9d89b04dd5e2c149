//! Page outline support built on top of `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::layout::{Page, ReceiptLayout};

/// Errors that can occur while embedding bookmarks into a rendered receipt.
#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    #[error("failed to process PDF bytes: {0}")]
    Parse(#[from] lopdf::Error),
    /// A required catalog entry was missing from the document trailer.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object was not a dictionary, preventing outline injection.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A laid out page did not exist in the rendered document.
    #[error("receipt page {0} is missing from the rendered document")]
    MissingPage(usize),
}

/// Returns the outline title of a receipt page, e.g. `Items 14-32, Totals`.
pub fn page_title(page: &Page) -> String {
    let items = if page.items.is_empty() {
        None
    } else {
        Some(format!("Items {}-{}", page.items.start + 1, page.items.end))
    };

    match (items, page.has_totals) {
        (Some(items), true) => format!("{}, Totals", items),
        (Some(items), false) => items,
        (None, true) => "Totals".to_owned(),
        (None, false) => format!("Page {}", page.number),
    }
}

/// Adds a flat outline with one entry per receipt page.
pub fn apply_page_bookmarks(
    pdf_bytes: &[u8],
    layout: &ReceiptLayout,
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;

    let pages = document.get_pages();
    let mut outline_entries = collect_outline_entries(&mut document, layout, &pages)?;

    if outline_entries.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &mut outline_entries);

    insert_outlines_root(outlines_id, &mut document, &outline_entries)?;

    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .map_err(|err| BookmarkError::Parse(err.into()))?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    layout: &ReceiptLayout,
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    layout
        .pages
        .iter()
        .map(|page| {
            let page_ref = pages
                .get(&(page.number as u32))
                .copied()
                .ok_or(BookmarkError::MissingPage(page.number))?;
            Ok(OutlineEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: page_title(page),
            })
        })
        .collect()
}

fn link_outline_entries(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &mut [OutlineEntry],
) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        dictionary.set(
            "Title",
            Object::string_literal(entries[index].title.as_str()),
        );
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }

        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?
        .set("Outlines", Object::Reference(outlines_id));

    Ok(())
}

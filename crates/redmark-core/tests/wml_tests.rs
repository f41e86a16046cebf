//! End-to-end WordprocessingML comparison scenarios over in-memory
//! fixtures.

mod common;

use common::docx;
use pretty_assertions::assert_eq;
use redmark_core::wml::{
    accept_revisions, reject_revisions, revision_ids, WmlChangeType, WmlComparer,
    WmlComparerSettings, WmlDocument,
};

fn doc(bytes: &[u8]) -> WmlDocument {
    WmlDocument::from_bytes(bytes).expect("fixture should open")
}

fn settings() -> WmlComparerSettings {
    WmlComparerSettings::new()
        .with_author("tester")
        .with_date_time("2026-01-15T09:00:00Z".parse().unwrap())
}

/// Applies a transform to every document part of a marked output and
/// returns the resulting document.
fn transform_marked(bytes: &[u8], f: impl Fn(&mut redmark_core::xml::XmlTree)) -> WmlDocument {
    let mut marked = doc(bytes);
    let uri = marked.main_part_uri();
    let mut tree = marked.package().xml_part(&uri).unwrap();
    f(&mut tree);
    marked.package_mut().set_xml_part(&uri, &tree).unwrap();
    let bytes = marked.to_bytes().unwrap();
    doc(&bytes)
}

#[test]
fn identical_documents_yield_no_changes() {
    let a = docx::from_paragraphs(&["First paragraph", "Second paragraph"]);
    let result = WmlComparer::compare(&doc(&a), &doc(&a), Some(&settings())).unwrap();
    assert!(result.is_identical());
    assert_eq!(result.revision_count(), 0);
}

#[test]
fn single_word_edit_yields_one_insertion_and_one_deletion() {
    let a = docx::from_paragraphs(&["The quick brown fox"]);
    let b = docx::from_paragraphs(&["The slow brown fox"]);

    let result =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();

    assert_eq!(result.insertions, 1);
    assert_eq!(result.deletions, 1);
    assert_eq!(result.revision_count(), 2);
    assert_eq!(result.changes.len(), 1);
    assert_eq!(result.changes[0].change_type, WmlChangeType::ParagraphModified);

    // The markup carries one w:del around "quick" and one w:ins around
    // "slow" in the same paragraph.
    let output = doc(result.document.as_ref().unwrap());
    let tree = output
        .package()
        .xml_part(&output.main_part_uri())
        .unwrap();
    let root = tree.root().unwrap();
    let ns = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    let dels = tree.find_descendants(root, &redmark_core::xml::QName::new(ns, "del"));
    let inss = tree.find_descendants(root, &redmark_core::xml::QName::new(ns, "ins"));
    assert_eq!(dels.len(), 1);
    assert_eq!(inss.len(), 1);
    assert_eq!(tree.text_content(dels[0]).trim(), "quick");
    assert_eq!(tree.text_content(inss[0]).trim(), "slow");
}

#[test]
fn deleted_table_row_counts_one_revision() {
    let a = docx::build(&docx::table(&[
        &["r1c1", "r1c2"],
        &["r2c1", "r2c2"],
        &["r3c1", "r3c2"],
    ]));
    let b = docx::build(&docx::table(&[&["r1c1", "r1c2"], &["r3c1", "r3c2"]]));

    let result =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();

    assert_eq!(result.insertions, 0);
    assert_eq!(result.deletions, 1);
    let row_deletions: Vec<_> = result
        .changes
        .iter()
        .filter(|c| c.change_type == WmlChangeType::RowDeleted)
        .collect();
    assert_eq!(row_deletions.len(), 1);

    // The output row carries a row-level deletion marker.
    let output = doc(result.document.as_ref().unwrap());
    let tree = output
        .package()
        .xml_part(&output.main_part_uri())
        .unwrap();
    let root = tree.root().unwrap();
    let ns = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    let tr_prs = tree.find_descendants(root, &redmark_core::xml::QName::new(ns, "trPr"));
    let row_del = tr_prs.iter().any(|&tr_pr| {
        tree.find_child(tr_pr, &redmark_core::xml::QName::new(ns, "del"))
            .is_some()
    });
    assert!(row_del, "expected a trPr-level w:del marker");
}

#[test]
fn inserted_paragraph_counts_one_revision() {
    let a = docx::from_paragraphs(&["alpha", "gamma"]);
    let b = docx::from_paragraphs(&["alpha", "beta", "gamma"]);
    let result = WmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    assert_eq!(result.insertions, 1);
    assert_eq!(result.deletions, 0);
    assert_eq!(result.changes.len(), 1);
    assert_eq!(
        result.changes[0].change_type,
        WmlChangeType::ParagraphInserted
    );
    assert_eq!(result.changes[0].new_text.as_deref(), Some("beta"));
}

#[test]
fn comparison_is_deterministic() {
    let a = docx::from_paragraphs(&["one two three", "four five"]);
    let b = docx::from_paragraphs(&["one 2 three", "four five", "six"]);

    let first =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    let second =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();

    assert_eq!(
        serde_json::to_string(&first.changes).unwrap(),
        serde_json::to_string(&second.changes).unwrap()
    );
    assert_eq!(first.document, second.document);
}

#[test]
fn revision_ids_are_unique_and_contiguous_from_one() {
    let a = docx::from_paragraphs(&["The quick brown fox", "Keep me", "Delete me"]);
    let b = docx::from_paragraphs(&["The slow brown fox", "Keep me", "Brand new paragraph"]);

    let result =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    let output = doc(result.document.as_ref().unwrap());
    let tree = output
        .package()
        .xml_part(&output.main_part_uri())
        .unwrap();

    let mut ids = revision_ids(&tree);
    assert!(!ids.is_empty());
    ids.sort();
    let expected: Vec<i32> = (1..=ids.len() as i32).collect();
    assert_eq!(ids, expected, "ids must form a contiguous range from 1");
}

#[test]
fn accepting_all_revisions_recovers_the_newer_document() {
    let a = docx::from_paragraphs(&["The quick brown fox", "Removed paragraph", "Tail"]);
    let b = docx::from_paragraphs(&["The slow brown fox", "Tail", "Appended paragraph"]);

    let result =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    let accepted = transform_marked(result.document.as_ref().unwrap(), accept_revisions);

    let roundtrip = WmlComparer::compare(&accepted, &doc(&b), Some(&settings())).unwrap();
    assert!(
        roundtrip.is_identical(),
        "accept round-trip changes: {:?}",
        roundtrip.changes
    );
}

#[test]
fn rejecting_all_revisions_recovers_the_older_document() {
    let a = docx::from_paragraphs(&["The quick brown fox", "Removed paragraph", "Tail"]);
    let b = docx::from_paragraphs(&["The slow brown fox", "Tail", "Appended paragraph"]);

    let result =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    let rejected = transform_marked(result.document.as_ref().unwrap(), reject_revisions);

    let roundtrip = WmlComparer::compare(&doc(&a), &rejected, Some(&settings())).unwrap();
    assert!(
        roundtrip.is_identical(),
        "reject round-trip changes: {:?}",
        roundtrip.changes
    );
}

#[test]
fn marked_output_preserves_section_properties() {
    let a = docx::from_paragraphs(&["one"]);
    let b = docx::from_paragraphs(&["two"]);
    let result =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();

    let output = doc(result.document.as_ref().unwrap());
    let tree = output
        .package()
        .xml_part(&output.main_part_uri())
        .unwrap();
    let root = tree.root().unwrap();
    let ns = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    let body = tree
        .find_descendant(root, &redmark_core::xml::QName::new(ns, "body"))
        .unwrap();
    let children = tree.child_elements(body);
    let last = *children.last().unwrap();
    assert_eq!(
        tree.name(last),
        Some(&redmark_core::xml::QName::new(ns, "sectPr")),
        "sectPr must remain the final body child"
    );
}

#[test]
fn whole_paragraph_rewrite_counts_one_of_each() {
    let a = docx::from_paragraphs(&["completely original sentence here"]);
    let b = docx::from_paragraphs(&["utterly different words now appear"]);
    let result = WmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    assert_eq!(result.insertions, 1);
    assert_eq!(result.deletions, 1);
}

#[test]
fn revision_author_and_date_come_from_settings() {
    let a = docx::from_paragraphs(&["The quick brown fox"]);
    let b = docx::from_paragraphs(&["The slow brown fox"]);
    let result =
        WmlComparer::produce_marked_document(&doc(&a), &doc(&b), Some(&settings())).unwrap();

    let output = doc(result.document.as_ref().unwrap());
    let tree = output
        .package()
        .xml_part(&output.main_part_uri())
        .unwrap();
    let root = tree.root().unwrap();
    let ns = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    let ins = tree
        .find_descendant(root, &redmark_core::xml::QName::new(ns, "ins"))
        .unwrap();
    assert_eq!(
        tree.attr(ins, &redmark_core::xml::QName::new(ns, "author")),
        Some("tester")
    );
    assert_eq!(
        tree.attr(ins, &redmark_core::xml::QName::new(ns, "date")),
        Some("2026-01-15T09:00:00Z")
    );
}

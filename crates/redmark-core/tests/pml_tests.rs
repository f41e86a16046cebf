//! End-to-end PresentationML comparison scenarios over in-memory
//! fixtures.

mod common;

use common::pptx;
use pretty_assertions::assert_eq;
use redmark_core::pml::{PmlChangeType, PmlComparer, PmlComparerSettings, PmlDocument};

fn doc(bytes: &[u8]) -> PmlDocument {
    PmlDocument::from_bytes(bytes).expect("fixture should open")
}

fn settings() -> PmlComparerSettings {
    PmlComparerSettings::new().with_author("tester")
}

fn title_slide(title: &str, body: &str) -> String {
    let mut shapes = pptx::textbox(
        2,
        "Title 1",
        title,
        457200,
        274638,
        8229600,
        1143000,
        Some("title"),
    );
    shapes.push_str(&pptx::textbox(
        3,
        "Content 2",
        body,
        457200,
        1600200,
        8229600,
        4525963,
        None,
    ));
    shapes
}

#[test]
fn identical_presentations_yield_no_changes() {
    let bytes = pptx::build(&[&title_slide("Welcome", "Agenda items")]);
    let result = PmlComparer::compare(&doc(&bytes), &doc(&bytes), Some(&settings())).unwrap();
    assert!(result.is_identical());
}

#[test]
fn small_move_stays_under_default_tolerance() {
    // |dx| = 2000 EMU against the default 91440 EMU tolerance.
    let a = pptx::build(&[&pptx::textbox(2, "Box", "hello", 1000, 1000, 5000, 5000, None)]);
    let b = pptx::build(&[&pptx::textbox(2, "Box", "hello", 3000, 1000, 5000, 5000, None)]);

    let result = PmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    assert!(result.is_identical(), "changes: {:?}", result.changes);
}

#[test]
fn move_beyond_tolerance_reports_old_and_new_position() {
    let a = pptx::build(&[&pptx::textbox(2, "Box", "hello", 1000, 1000, 5000, 5000, None)]);
    let b = pptx::build(&[&pptx::textbox(2, "Box", "hello", 3000, 1000, 5000, 5000, None)]);

    let settings = settings().with_position_tolerance(1000);
    let result = PmlComparer::compare(&doc(&a), &doc(&b), Some(&settings)).unwrap();

    assert_eq!(result.total_changes(), 1);
    let change = &result.changes[0];
    assert_eq!(change.kind(), PmlChangeType::ShapeMoved);
    assert_eq!(change.old_x, Some(1000));
    assert_eq!(change.new_x, Some(3000));
}

#[test]
fn inserted_slide_does_not_disturb_alignment() {
    let s1 = title_slide("Slide one", "first body");
    let s2 = title_slide("Slide two", "second body");
    let s3 = title_slide("Slide three", "third body");
    let s_new = title_slide("Fresh material", "entirely new talking points");

    let a = pptx::build(&[&s1, &s2, &s3]);
    let b = pptx::build(&[&s1, &s_new, &s2, &s3]);

    let result = PmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();

    let inserted: Vec<_> = result
        .changes
        .iter()
        .filter(|c| c.kind() == PmlChangeType::SlideInserted)
        .collect();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].slide_index, Some(2));

    assert!(
        !result
            .changes
            .iter()
            .any(|c| c.kind() == PmlChangeType::SlideMoved),
        "surviving slides must align without move records"
    );
}

#[test]
fn text_change_in_matched_shape() {
    let a = pptx::build(&[&title_slide("Deck", "old body text")]);
    let b = pptx::build(&[&title_slide("Deck", "new body text")]);

    let result = PmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    assert_eq!(result.total_changes(), 1);
    let change = &result.changes[0];
    assert_eq!(change.kind(), PmlChangeType::TextChanged);
    assert_eq!(change.old_value.as_deref(), Some("old body text"));
    assert_eq!(change.new_value.as_deref(), Some("new body text"));
}

#[test]
fn deleted_slide_is_reported() {
    let s1 = title_slide("Keep", "kept body");
    let s2 = title_slide("Drop", "dropped body");
    let a = pptx::build(&[&s1, &s2]);
    let b = pptx::build(&[&s1]);

    let result = PmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    assert_eq!(result.slides_deleted(), 1);
    let deleted = result
        .changes
        .iter()
        .find(|c| c.kind() == PmlChangeType::SlideDeleted)
        .unwrap();
    assert_eq!(deleted.old_slide_index, Some(2));
}

#[test]
fn comparison_is_deterministic() {
    let a = pptx::build(&[&title_slide("One", "alpha"), &title_slide("Two", "beta")]);
    let b = pptx::build(&[&title_slide("One", "gamma"), &title_slide("Two", "beta")]);

    let first = PmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    let second = PmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    assert_eq!(
        serde_json::to_string(&first.changes).unwrap(),
        serde_json::to_string(&second.changes).unwrap()
    );
}

#[test]
fn marked_presentation_gains_overlays_and_summary_slide() {
    let a = pptx::build(&[&title_slide("Deck", "old body")]);
    let b = pptx::build(&[&title_slide("Deck", "new body")]);

    let (marked, result) =
        PmlComparer::compare_and_render(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    assert_eq!(result.total_changes(), 1);

    let pkg = marked.package();

    // Slide 1 gained an overlay shape labeled with the change.
    let slide = pkg.xml_part("ppt/slides/slide1.xml").unwrap();
    let slide_xml = redmark_core::xml::builder::serialize(&slide).unwrap();
    assert!(slide_xml.contains("Redmark overlay"));

    // A summary slide part exists and is listed in sldIdLst.
    assert!(pkg.has_part("ppt/slides/slideSummary1.xml"));
    let pres = pkg.xml_part("ppt/presentation.xml").unwrap();
    let root = pres.root().unwrap();
    let ns = "http://schemas.openxmlformats.org/presentationml/2006/main";
    let lst = pres
        .find_descendant(root, &redmark_core::xml::QName::new(ns, "sldIdLst"))
        .unwrap();
    assert_eq!(
        pres.find_children(lst, &redmark_core::xml::QName::new(ns, "sldId"))
            .len(),
        2
    );

    // Notes annotations were created for the affected slide.
    assert!(pkg
        .part_names()
        .iter()
        .any(|n| n.contains("notesSlide")));
}

#[test]
fn fuzzy_matching_pairs_renamed_shapes() {
    // Same geometry and text, different id and name: only the fuzzy pass
    // can pair these.
    let a = pptx::build(&[&pptx::textbox(2, "Old name", "shared text", 0, 0, 5000, 5000, None)]);
    let b = pptx::build(&[&pptx::textbox(7, "New name", "shared text", 0, 0, 5000, 5000, None)]);

    let result = PmlComparer::compare(&doc(&a), &doc(&b), Some(&settings())).unwrap();
    assert!(result.is_identical(), "changes: {:?}", result.changes);

    let mut no_fuzzy = settings();
    no_fuzzy.enable_fuzzy_shape_matching = false;
    let result = PmlComparer::compare(&doc(&a), &doc(&b), Some(&no_fuzzy)).unwrap();
    let kinds: Vec<PmlChangeType> = result.changes.iter().map(|c| c.kind()).collect();
    assert!(kinds.contains(&PmlChangeType::ShapeInserted));
    assert!(kinds.contains(&PmlChangeType::ShapeDeleted));
}

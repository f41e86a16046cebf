//! Presentation diff engine: slide-level structure, then per-slide shape
//! matching and type-specific content comparison.

use super::settings::PmlComparerSettings;
use super::shape_match::match_shapes;
use super::signatures::{PresentationSignature, ShapeKind, ShapeSignature, SlideSignature};
use super::slide_match::match_slides;
use super::types::{PmlChange, PmlChangeType};
use crate::cancel::CancelToken;
use crate::error::Result;

pub fn compute_diff(
    sig1: &PresentationSignature,
    sig2: &PresentationSignature,
    settings: &PmlComparerSettings,
    cancel: &CancelToken,
) -> Result<Vec<PmlChange>> {
    let mut changes = Vec::new();

    if (sig1.slide_cx, sig1.slide_cy) != (sig2.slide_cx, sig2.slide_cy) {
        let mut change = PmlChange::of(PmlChangeType::SlideSizeChanged);
        change.old_value = Some(format!("{}x{}", sig1.slide_cx, sig1.slide_cy));
        change.new_value = Some(format!("{}x{}", sig2.slide_cx, sig2.slide_cy));
        changes.push(change);
    }

    if !settings.compare_slide_structure {
        return Ok(changes);
    }

    let outcome = match_slides(sig1, sig2, settings);

    for &li in &outcome.deleted {
        let mut change = PmlChange::of(PmlChangeType::SlideDeleted);
        change.old_slide_index = Some(sig1.slides[li].index);
        changes.push(change);
    }
    for &ri in &outcome.inserted {
        let mut change = PmlChange::of(PmlChangeType::SlideInserted);
        change.slide_index = Some(sig2.slides[ri].index);
        changes.push(change);
    }
    for pair in &outcome.moved {
        let mut change = PmlChange::of(PmlChangeType::SlideMoved);
        change.old_slide_index = Some(sig1.slides[pair.left].index);
        change.slide_index = Some(sig2.slides[pair.right].index);
        changes.push(change);
    }

    let mut pairs = outcome.pairs.clone();
    pairs.sort_by_key(|p| p.right);
    for pair in pairs {
        cancel.check()?;
        diff_slide_pair(
            &sig1.slides[pair.left],
            &sig2.slides[pair.right],
            settings,
            &mut changes,
        );
    }

    Ok(changes)
}

fn diff_slide_pair(
    left: &SlideSignature,
    right: &SlideSignature,
    settings: &PmlComparerSettings,
    changes: &mut Vec<PmlChange>,
) {
    let slide_index = right.index;

    if left.layout_hash != right.layout_hash {
        let mut change = PmlChange::of(PmlChangeType::SlideLayoutChanged);
        change.slide_index = Some(slide_index);
        change.old_slide_index = Some(left.index);
        changes.push(change);
    }
    if left.background_hash != right.background_hash {
        let mut change = PmlChange::of(PmlChangeType::SlideBackgroundChanged);
        change.slide_index = Some(slide_index);
        changes.push(change);
    }
    if settings.compare_transitions && left.transition_hash != right.transition_hash {
        let mut change = PmlChange::of(PmlChangeType::SlideTransitionChanged);
        change.slide_index = Some(slide_index);
        changes.push(change);
    }
    if settings.compare_notes && left.notes_text != right.notes_text {
        let mut change = PmlChange::of(PmlChangeType::SlideNotesChanged);
        change.slide_index = Some(slide_index);
        change.old_value = left.notes_text.clone();
        change.new_value = right.notes_text.clone();
        changes.push(change);
    }

    if settings.compare_shape_structure {
        diff_shape_lists(&left.shapes, &right.shapes, slide_index, settings, changes);
    }
}

fn diff_shape_lists(
    shapes1: &[ShapeSignature],
    shapes2: &[ShapeSignature],
    slide_index: usize,
    settings: &PmlComparerSettings,
    changes: &mut Vec<PmlChange>,
) {
    let outcome = match_shapes(shapes1, shapes2, settings);

    for &li in &outcome.deleted {
        let shape = &shapes1[li];
        let mut change = PmlChange::of(PmlChangeType::ShapeDeleted);
        change.slide_index = Some(slide_index);
        change.shape_name = Some(shape.name.clone());
        change.shape_id = Some(shape.id);
        if let Some(t) = &shape.transform {
            change.old_x = Some(t.x);
            change.old_y = Some(t.y);
            change.old_cx = Some(t.cx);
            change.old_cy = Some(t.cy);
        }
        changes.push(change);
    }
    for &ri in &outcome.inserted {
        let shape = &shapes2[ri];
        let mut change = PmlChange::of(PmlChangeType::ShapeInserted);
        change.slide_index = Some(slide_index);
        change.shape_name = Some(shape.name.clone());
        change.shape_id = Some(shape.id);
        if let Some(t) = &shape.transform {
            change.new_x = Some(t.x);
            change.new_y = Some(t.y);
            change.new_cx = Some(t.cx);
            change.new_cy = Some(t.cy);
        }
        changes.push(change);
    }

    for pair in &outcome.pairs {
        diff_matched_shape(
            &shapes1[pair.left],
            &shapes2[pair.right],
            slide_index,
            pair.confidence,
            settings,
            changes,
        );
    }
}

fn diff_matched_shape(
    left: &ShapeSignature,
    right: &ShapeSignature,
    slide_index: usize,
    confidence: f64,
    settings: &PmlComparerSettings,
    changes: &mut Vec<PmlChange>,
) {
    let base = |kind: PmlChangeType| {
        let mut change = PmlChange::of(kind);
        change.slide_index = Some(slide_index);
        change.shape_name = Some(right.name.clone());
        change.shape_id = Some(right.id);
        change.match_confidence = Some(confidence);
        change
    };

    if settings.compare_shape_transforms {
        if let (Some(t1), Some(t2)) = (&left.transform, &right.transform) {
            let moved = (t1.x - t2.x).abs() > settings.position_tolerance
                || (t1.y - t2.y).abs() > settings.position_tolerance;
            if moved {
                let mut change = base(PmlChangeType::ShapeMoved);
                change.old_x = Some(t1.x);
                change.old_y = Some(t1.y);
                change.new_x = Some(t2.x);
                change.new_y = Some(t2.y);
                changes.push(change);
            }

            let resized = (t1.cx - t2.cx).abs() > settings.position_tolerance
                || (t1.cy - t2.cy).abs() > settings.position_tolerance;
            if resized {
                let mut change = base(PmlChangeType::ShapeResized);
                change.old_cx = Some(t1.cx);
                change.old_cy = Some(t1.cy);
                change.new_cx = Some(t2.cx);
                change.new_cy = Some(t2.cy);
                changes.push(change);
            }

            if t1.rotation != t2.rotation {
                let mut change = base(PmlChangeType::ShapeRotated);
                change.old_value = Some(t1.rotation.to_string());
                change.new_value = Some(t2.rotation.to_string());
                changes.push(change);
            }
        }
    }

    if left.z_order != right.z_order {
        let mut change = base(PmlChangeType::ShapeZOrderChanged);
        change.old_value = Some(left.z_order.to_string());
        change.new_value = Some(right.z_order.to_string());
        changes.push(change);
    }

    match (&left.text_body, &right.text_body) {
        (Some(b1), Some(b2)) => {
            if settings.compare_text_content && b1.plain_text != b2.plain_text {
                let mut change = base(PmlChangeType::TextChanged);
                change.old_value = Some(b1.plain_text.clone());
                change.new_value = Some(b2.plain_text.clone());
                changes.push(change);
            } else if settings.compare_text_formatting
                && b1.formatting_fingerprint() != b2.formatting_fingerprint()
            {
                changes.push(base(PmlChangeType::TextFormattingChanged));
            }
        }
        (Some(b1), None) if settings.compare_text_content && !b1.plain_text.is_empty() => {
            let mut change = base(PmlChangeType::TextChanged);
            change.old_value = Some(b1.plain_text.clone());
            changes.push(change);
        }
        (None, Some(b2)) if settings.compare_text_content && !b2.plain_text.is_empty() => {
            let mut change = base(PmlChangeType::TextChanged);
            change.new_value = Some(b2.plain_text.clone());
            changes.push(change);
        }
        _ => {}
    }

    if settings.compare_image_content
        && left.kind == ShapeKind::Picture
        && left.image_hash != right.image_hash
    {
        changes.push(base(PmlChangeType::ImageReplaced));
    }
    if settings.compare_tables
        && left.kind == ShapeKind::Table
        && left.table_hash != right.table_hash
    {
        changes.push(base(PmlChangeType::TableContentChanged));
    }
    if settings.compare_charts
        && left.kind == ShapeKind::Chart
        && left.chart_hash != right.chart_hash
    {
        changes.push(base(PmlChangeType::ChartDataChanged));
    }
    if settings.compare_shape_styles && left.style_hash != right.style_hash {
        changes.push(base(PmlChangeType::ShapeStyleChanged));
    }

    // Groups recurse into their children with the same matching rules.
    if let (Some(children1), Some(children2)) = (&left.children, &right.children) {
        diff_shape_lists(children1, children2, slide_index, settings, changes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::signatures::{TextBodySignature, Transform};
    use crate::hash::sha256_hex_str;

    fn textbox(id: u32, name: &str, text: &str, x: i64, y: i64) -> ShapeSignature {
        ShapeSignature {
            id,
            name: name.to_string(),
            kind: ShapeKind::TextBox,
            placeholder: None,
            z_order: 0,
            transform: Some(Transform {
                x,
                y,
                cx: 5000,
                cy: 5000,
                ..Transform::default()
            }),
            geometry_hash: None,
            text_body: Some(TextBodySignature {
                paragraphs: Vec::new(),
                plain_text: text.to_string(),
            }),
            image_hash: None,
            table_hash: None,
            chart_hash: None,
            style_hash: None,
            children: None,
            content_hash: sha256_hex_str(text),
        }
    }

    fn one_slide_deck(shapes: Vec<ShapeSignature>) -> PresentationSignature {
        let slide = SlideSignature {
            index: 1,
            part_uri: "ppt/slides/slide1.xml".to_string(),
            layout_hash: None,
            background_hash: None,
            transition_hash: None,
            title_text: Some("Only slide".to_string()),
            notes_text: None,
            content_hash: sha256_hex_str("deck"),
            shapes,
        };
        PresentationSignature {
            slide_cx: 9144000,
            slide_cy: 6858000,
            slides: vec![slide],
        }
    }

    #[test]
    fn move_below_tolerance_is_silent() {
        // |dx| = 2000 EMU, far under the default 91440 tolerance.
        let a = one_slide_deck(vec![textbox(1, "TextBox 1", "hello", 1000, 1000)]);
        let b = one_slide_deck(vec![textbox(1, "TextBox 1", "hello", 3000, 1000)]);
        let changes = compute_diff(
            &a,
            &b,
            &PmlComparerSettings::default(),
            &CancelToken::new(),
        )
        .unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn move_beyond_tolerance_is_reported_with_coordinates() {
        let a = one_slide_deck(vec![textbox(1, "TextBox 1", "hello", 1000, 1000)]);
        let b = one_slide_deck(vec![textbox(1, "TextBox 1", "hello", 3000, 1000)]);
        let settings = PmlComparerSettings::new().with_position_tolerance(1000);
        let changes = compute_diff(&a, &b, &settings, &CancelToken::new()).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), PmlChangeType::ShapeMoved);
        assert_eq!(changes[0].old_x, Some(1000));
        assert_eq!(changes[0].new_x, Some(3000));
    }

    #[test]
    fn text_change_is_reported() {
        let a = one_slide_deck(vec![textbox(1, "TextBox 1", "old words", 0, 0)]);
        let b = one_slide_deck(vec![textbox(1, "TextBox 1", "new words", 0, 0)]);
        let changes = compute_diff(
            &a,
            &b,
            &PmlComparerSettings::default(),
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), PmlChangeType::TextChanged);
        assert_eq!(changes[0].old_value.as_deref(), Some("old words"));
        assert_eq!(changes[0].new_value.as_deref(), Some("new words"));
    }

    #[test]
    fn slide_size_change_is_reported() {
        let a = one_slide_deck(vec![]);
        let mut b = one_slide_deck(vec![]);
        b.slide_cx = 12192000;
        let changes = compute_diff(
            &a,
            &b,
            &PmlComparerSettings::default(),
            &CancelToken::new(),
        )
        .unwrap();
        assert!(changes
            .iter()
            .any(|c| c.kind() == PmlChangeType::SlideSizeChanged));
    }
}

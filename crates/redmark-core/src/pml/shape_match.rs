//! Shape matching within a matched slide pair: placeholder identity,
//! name+type, name only, then fuzzy scoring.

use super::settings::PmlComparerSettings;
use super::signatures::ShapeSignature;
use crate::util::text::text_similarity;

#[derive(Debug, Clone, Copy)]
pub struct ShapePair {
    pub left: usize,
    pub right: usize,
    pub confidence: f64,
}

#[derive(Debug, Default)]
pub struct ShapeMatchOutcome {
    pub pairs: Vec<ShapePair>,
    pub deleted: Vec<usize>,
    pub inserted: Vec<usize>,
}

pub fn match_shapes(
    shapes1: &[ShapeSignature],
    shapes2: &[ShapeSignature],
    settings: &PmlComparerSettings,
) -> ShapeMatchOutcome {
    let mut used_left = vec![false; shapes1.len()];
    let mut used_right = vec![false; shapes2.len()];
    let mut pairs: Vec<ShapePair> = Vec::new();

    // Pass 1: identical placeholder (type, index).
    for (ri, right) in shapes2.iter().enumerate() {
        let Some(ph2) = &right.placeholder else { continue };
        if let Some(li) = shapes1.iter().position(|left| {
            left.placeholder.as_ref() == Some(ph2)
        }) {
            if !used_left[li] && !used_right[ri] {
                used_left[li] = true;
                used_right[ri] = true;
                pairs.push(ShapePair {
                    left: li,
                    right: ri,
                    confidence: 1.0,
                });
            }
        }
    }

    // Pass 2: same name and kind.
    claim_by(
        shapes1,
        shapes2,
        &mut used_left,
        &mut used_right,
        &mut pairs,
        0.95,
        |l, r| !l.name.is_empty() && l.name == r.name && l.kind == r.kind,
    );

    // Pass 3: same name only.
    claim_by(
        shapes1,
        shapes2,
        &mut used_left,
        &mut used_right,
        &mut pairs,
        0.80,
        |l, r| !l.name.is_empty() && l.name == r.name,
    );

    // Pass 4: fuzzy scoring.
    if settings.enable_fuzzy_shape_matching {
        let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
        for (li, left) in shapes1.iter().enumerate() {
            if used_left[li] {
                continue;
            }
            for (ri, right) in shapes2.iter().enumerate() {
                if used_right[ri] {
                    continue;
                }
                let score = fuzzy_shape_score(left, right, settings);
                if score >= settings.shape_similarity_threshold {
                    candidates.push((li, ri, score));
                }
            }
        }
        candidates.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
                .then(a.1.cmp(&b.1))
        });
        for (li, ri, score) in candidates {
            if !used_left[li] && !used_right[ri] {
                used_left[li] = true;
                used_right[ri] = true;
                pairs.push(ShapePair {
                    left: li,
                    right: ri,
                    confidence: score,
                });
            }
        }
    }

    pairs.sort_by_key(|p| p.right);

    ShapeMatchOutcome {
        deleted: (0..shapes1.len()).filter(|&li| !used_left[li]).collect(),
        inserted: (0..shapes2.len()).filter(|&ri| !used_right[ri]).collect(),
        pairs,
    }
}

fn claim_by<F>(
    shapes1: &[ShapeSignature],
    shapes2: &[ShapeSignature],
    used_left: &mut [bool],
    used_right: &mut [bool],
    pairs: &mut Vec<ShapePair>,
    confidence: f64,
    matches: F,
) where
    F: Fn(&ShapeSignature, &ShapeSignature) -> bool,
{
    for (ri, right) in shapes2.iter().enumerate() {
        if used_right[ri] {
            continue;
        }
        if let Some(li) = shapes1
            .iter()
            .enumerate()
            .position(|(li, left)| !used_left[li] && matches(left, right))
        {
            used_left[li] = true;
            used_right[ri] = true;
            pairs.push(ShapePair {
                left: li,
                right: ri,
                confidence,
            });
        }
    }
}

/// Fuzzy score: type must match; 0.2 baseline, up to 0.3 for position
/// proximity, up to 0.5 for content affinity.
pub fn fuzzy_shape_score(
    left: &ShapeSignature,
    right: &ShapeSignature,
    settings: &PmlComparerSettings,
) -> f64 {
    if left.kind != right.kind {
        return 0.0;
    }

    let mut score = 0.2;

    if let (Some(t1), Some(t2)) = (&left.transform, &right.transform) {
        let dx = (t1.x - t2.x).abs();
        let dy = (t1.y - t2.y).abs();
        if dx <= settings.position_tolerance && dy <= settings.position_tolerance {
            score += 0.3;
        } else if dx <= settings.position_tolerance * 5 && dy <= settings.position_tolerance * 5 {
            score += 0.1;
        }
    }

    match (&left.image_hash, &right.image_hash) {
        (Some(h1), Some(h2)) if h1 == h2 => score += 0.5,
        _ => match (&left.text_body, &right.text_body) {
            (Some(b1), Some(b2)) => {
                if b1.plain_text == b2.plain_text {
                    score += 0.5;
                } else {
                    score += 0.5 * text_similarity(&b1.plain_text, &b2.plain_text);
                }
            }
            (None, None) => {
                if left.content_hash == right.content_hash {
                    score += 0.5;
                }
            }
            _ => {}
        },
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::signatures::{Placeholder, ShapeKind, TextBodySignature, Transform};

    fn shape(id: u32, name: &str, kind: ShapeKind) -> ShapeSignature {
        ShapeSignature {
            id,
            name: name.to_string(),
            kind,
            placeholder: None,
            z_order: 0,
            transform: None,
            geometry_hash: None,
            text_body: None,
            image_hash: None,
            table_hash: None,
            chart_hash: None,
            style_hash: None,
            children: None,
            content_hash: format!("hash-{id}"),
        }
    }

    fn with_text(mut s: ShapeSignature, text: &str) -> ShapeSignature {
        s.text_body = Some(TextBodySignature {
            paragraphs: Vec::new(),
            plain_text: text.to_string(),
        });
        s
    }

    fn at(mut s: ShapeSignature, x: i64, y: i64) -> ShapeSignature {
        s.transform = Some(Transform {
            x,
            y,
            cx: 5000,
            cy: 5000,
            ..Transform::default()
        });
        s
    }

    #[test]
    fn placeholder_identity_wins() {
        let ph = Placeholder {
            ph_type: "title".to_string(),
            index: None,
        };
        let mut left = shape(1, "Old title", ShapeKind::TextBox);
        left.placeholder = Some(ph.clone());
        let mut right = shape(9, "Renamed title", ShapeKind::TextBox);
        right.placeholder = Some(ph);

        let outcome = match_shapes(&[left], &[right], &PmlComparerSettings::default());
        assert_eq!(outcome.pairs.len(), 1);
        assert!((outcome.pairs[0].confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn name_and_kind_match_scores_095() {
        let left = shape(1, "Picture 3", ShapeKind::Picture);
        let right = shape(2, "Picture 3", ShapeKind::Picture);
        let outcome = match_shapes(&[left], &[right], &PmlComparerSettings::default());
        assert_eq!(outcome.pairs.len(), 1);
        assert!((outcome.pairs[0].confidence - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn fuzzy_match_requires_same_kind() {
        let left = with_text(shape(1, "A", ShapeKind::TextBox), "same words");
        let right = with_text(shape(2, "B", ShapeKind::Picture), "same words");
        assert_eq!(
            fuzzy_shape_score(&left, &right, &PmlComparerSettings::default()),
            0.0
        );
    }

    #[test]
    fn fuzzy_match_pairs_nearby_identical_text() {
        let left = at(with_text(shape(1, "A", ShapeKind::TextBox), "hello"), 1000, 1000);
        let right = at(with_text(shape(2, "B", ShapeKind::TextBox), "hello"), 2000, 1000);
        let score = fuzzy_shape_score(&left, &right, &PmlComparerSettings::default());
        // 0.2 baseline + 0.3 position + 0.5 identical text.
        assert!((score - 1.0).abs() < f64::EPSILON);

        let outcome = match_shapes(&[left], &[right], &PmlComparerSettings::default());
        assert_eq!(outcome.pairs.len(), 1);
        assert!(outcome.deleted.is_empty());
        assert!(outcome.inserted.is_empty());
    }

    #[test]
    fn unmatched_shapes_become_insert_and_delete() {
        let left = with_text(shape(1, "Old", ShapeKind::TextBox), "alpha");
        let right = shape(2, "New picture", ShapeKind::Picture);
        let outcome = match_shapes(&[left], &[right], &PmlComparerSettings::default());
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.deleted, vec![0]);
        assert_eq!(outcome.inserted, vec![0]);
    }
}

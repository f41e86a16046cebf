//! Slide matching: exact title, fingerprint, weighted similarity, then
//! positional fallback; moved slides are those outside the longest
//! increasing subsequence of matched positions.

use super::settings::PmlComparerSettings;
use super::signatures::{PresentationSignature, SlideSignature};
use crate::util::text::{overlap_ratio, word_jaccard};

#[derive(Debug, Clone, Copy)]
pub struct SlidePair {
    /// 0-based indices into the two slide lists.
    pub left: usize,
    pub right: usize,
    pub confidence: f64,
}

#[derive(Debug, Default)]
pub struct SlideMatchOutcome {
    pub pairs: Vec<SlidePair>,
    /// 0-based indices of unmatched slides on each side.
    pub deleted: Vec<usize>,
    pub inserted: Vec<usize>,
    /// Matched pairs whose relative order changed.
    pub moved: Vec<SlidePair>,
}

pub fn match_slides(
    sig1: &PresentationSignature,
    sig2: &PresentationSignature,
    settings: &PmlComparerSettings,
) -> SlideMatchOutcome {
    let mut used_left = vec![false; sig1.slides.len()];
    let mut used_right = vec![false; sig2.slides.len()];
    let mut pairs: Vec<SlidePair> = Vec::new();

    // Pass 1: exact title text.
    for (ri, right) in sig2.slides.iter().enumerate() {
        let Some(title) = right.title_text.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        if let Some(li) = sig1.slides.iter().position(|left| {
            left.title_text.as_deref() == Some(title)
        }) {
            if !used_left[li] && !used_right[ri] {
                used_left[li] = true;
                used_right[ri] = true;
                pairs.push(SlidePair {
                    left: li,
                    right: ri,
                    confidence: 1.0,
                });
            }
        }
    }

    // Pass 2: content fingerprint.
    for (ri, right) in sig2.slides.iter().enumerate() {
        if used_right[ri] {
            continue;
        }
        if let Some(li) = (0..sig1.slides.len()).find(|&li| {
            !used_left[li] && sig1.slides[li].content_hash == right.content_hash
        }) {
            used_left[li] = true;
            used_right[ri] = true;
            pairs.push(SlidePair {
                left: li,
                right: ri,
                confidence: 1.0,
            });
        }
    }

    // Pass 3: weighted similarity matrix, best pairs first.
    if settings.use_slide_alignment_lcs {
        let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
        for li in 0..sig1.slides.len() {
            if used_left[li] {
                continue;
            }
            for ri in 0..sig2.slides.len() {
                if used_right[ri] {
                    continue;
                }
                let score = slide_similarity(&sig1.slides[li], &sig2.slides[ri]);
                if score >= settings.slide_similarity_threshold {
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
                pairs.push(SlidePair {
                    left: li,
                    right: ri,
                    confidence: score,
                });
            }
        }
    } else {
        // Positional fallback: pair leftovers in order.
        let mut left_free: Vec<usize> =
            (0..sig1.slides.len()).filter(|&li| !used_left[li]).collect();
        let mut right_free: Vec<usize> =
            (0..sig2.slides.len()).filter(|&ri| !used_right[ri]).collect();
        while let (Some(&li), Some(&ri)) = (left_free.first(), right_free.first()) {
            used_left[li] = true;
            used_right[ri] = true;
            pairs.push(SlidePair {
                left: li,
                right: ri,
                confidence: 0.0,
            });
            left_free.remove(0);
            right_free.remove(0);
        }
    }

    pairs.sort_by_key(|p| p.left);

    let deleted: Vec<usize> = (0..sig1.slides.len()).filter(|&li| !used_left[li]).collect();
    let inserted: Vec<usize> = (0..sig2.slides.len()).filter(|&ri| !used_right[ri]).collect();
    let moved = detect_moves(&pairs);

    SlideMatchOutcome {
        pairs,
        deleted,
        inserted,
        moved,
    }
}

/// Weighted similarity normalized by the maximum achievable score.
pub fn slide_similarity(left: &SlideSignature, right: &SlideSignature) -> f64 {
    let mut score = 0.0;
    let mut max_score = 0.0;

    if let (Some(t1), Some(t2)) = (left.title_text.as_deref(), right.title_text.as_deref()) {
        max_score += 3.0;
        if t1 == t2 {
            score += 3.0;
        } else {
            score += word_jaccard(t1, t2) * 2.0;
        }
    }

    max_score += 1.0;
    if left.content_hash == right.content_hash {
        score += 1.0;
    }

    max_score += 1.0;
    let count_delta = left.shapes.len().abs_diff(right.shapes.len());
    if count_delta == 0 {
        score += 1.0;
    } else if count_delta <= 2 {
        score += 0.5;
    }

    max_score += 1.0;
    score += overlap_ratio(&left.shape_kinds(), &right.shape_kinds());

    max_score += 2.0;
    score += overlap_ratio(&left.shape_names(), &right.shape_names()) * 2.0;

    if max_score == 0.0 {
        0.0
    } else {
        score / max_score
    }
}

/// Pairs sorted by left index whose right indices break the longest
/// increasing subsequence are reported as moves.
fn detect_moves(pairs: &[SlidePair]) -> Vec<SlidePair> {
    if pairs.len() < 2 {
        return Vec::new();
    }

    let rights: Vec<usize> = pairs.iter().map(|p| p.right).collect();
    let lis = longest_increasing_subsequence(&rights);
    pairs
        .iter()
        .enumerate()
        .filter(|(i, _)| !lis.contains(i))
        .map(|(_, p)| *p)
        .collect()
}

/// Indices of one longest strictly-increasing subsequence.
fn longest_increasing_subsequence(values: &[usize]) -> Vec<usize> {
    let n = values.len();
    let mut lengths = vec![1usize; n];
    let mut previous = vec![usize::MAX; n];

    for i in 1..n {
        for j in 0..i {
            if values[j] < values[i] && lengths[j] + 1 > lengths[i] {
                lengths[i] = lengths[j] + 1;
                previous[i] = j;
            }
        }
    }

    let Some((mut best, _)) = lengths.iter().enumerate().max_by_key(|(_, &len)| len) else {
        return Vec::new();
    };
    let mut chain = Vec::new();
    loop {
        chain.push(best);
        if previous[best] == usize::MAX {
            break;
        }
        best = previous[best];
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256_hex_str;

    fn slide(index: usize, title: Option<&str>, content: &str) -> SlideSignature {
        SlideSignature {
            index,
            part_uri: format!("ppt/slides/slide{index}.xml"),
            layout_hash: None,
            background_hash: None,
            transition_hash: None,
            title_text: title.map(str::to_string),
            notes_text: None,
            content_hash: sha256_hex_str(content),
            shapes: Vec::new(),
        }
    }

    fn presentation(slides: Vec<SlideSignature>) -> PresentationSignature {
        PresentationSignature {
            slide_cx: 9144000,
            slide_cy: 6858000,
            slides,
        }
    }

    #[test]
    fn titles_match_first() {
        let a = presentation(vec![slide(1, Some("Intro"), "a"), slide(2, Some("Data"), "b")]);
        let b = presentation(vec![slide(1, Some("Data"), "x"), slide(2, Some("Intro"), "y")]);
        let outcome = match_slides(&a, &b, &PmlComparerSettings::default());
        assert_eq!(outcome.pairs.len(), 2);
        assert!(outcome.deleted.is_empty());
        assert!(outcome.inserted.is_empty());
        // Both slides swapped position: at least one registers as moved.
        assert!(!outcome.moved.is_empty());
    }

    #[test]
    fn inserted_slide_with_no_kinship_is_reported() {
        let a = presentation(vec![
            slide(1, Some("S1"), "c1"),
            slide(2, Some("S2"), "c2"),
            slide(3, Some("S3"), "c3"),
        ]);
        let b = presentation(vec![
            slide(1, Some("S1"), "c1"),
            slide(2, Some("Brand new"), "unrelated"),
            slide(3, Some("S2"), "c2"),
            slide(4, Some("S3"), "c3"),
        ]);
        let outcome = match_slides(&a, &b, &PmlComparerSettings::default());
        assert_eq!(outcome.inserted, vec![1]);
        assert!(outcome.deleted.is_empty());
        // Existing slides align despite the index shift.
        assert!(outcome.moved.is_empty());
    }

    #[test]
    fn fingerprint_matches_untitled_slides() {
        let a = presentation(vec![slide(1, None, "same-content")]);
        let b = presentation(vec![slide(1, None, "same-content")]);
        let outcome = match_slides(&a, &b, &PmlComparerSettings::default());
        assert_eq!(outcome.pairs.len(), 1);
        assert!((outcome.pairs[0].confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lis_finds_longest_chain() {
        let indices = longest_increasing_subsequence(&[0, 2, 1, 3]);
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn similarity_scores_identical_slides_high() {
        let s1 = slide(1, Some("Title words here"), "same");
        let s2 = slide(1, Some("Title words here"), "same");
        assert!(slide_similarity(&s1, &s2) > 0.9);
    }
}

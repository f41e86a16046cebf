//! Property tests for the alignment primitives and the grouping
//! invariants.

mod common;

use proptest::prelude::*;
use redmark_core::lcs::{correlate, equal_length, Hashable, LcsOptions, SegmentKind};
use redmark_core::wml::{join_tokens, tokenize};

#[derive(Debug, Clone)]
struct Key(String);

impl Hashable for Key {
    fn key(&self) -> &str {
        &self.0
    }
}

fn keys(values: &[String]) -> Vec<Key> {
    values.iter().map(|v| Key(v.clone())).collect()
}

/// Classical dynamic-programming LCS length, as the reference oracle.
fn classic_lcs_len(left: &[String], right: &[String]) -> usize {
    let mut table = vec![vec![0usize; right.len() + 1]; left.len() + 1];
    for i in 1..=left.len() {
        for j in 1..=right.len() {
            table[i][j] = if left[i - 1] == right[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table[left.len()][right.len()]
}

fn small_seq() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 0..12)
        .prop_map(|v| v.into_iter().map(str::to_string).collect())
}

proptest! {
    /// Reconstructing each side from the segmentation reproduces the
    /// inputs exactly.
    #[test]
    fn segmentation_reconstructs_inputs(left in small_seq(), right in small_seq()) {
        let segments = correlate(&keys(&left), &keys(&right), &LcsOptions::new());

        let rebuilt_left: Vec<String> = segments
            .iter()
            .flat_map(|s| s.left.iter().map(|k| k.0.clone()))
            .collect();
        let rebuilt_right: Vec<String> = segments
            .iter()
            .flat_map(|s| s.right.iter().map(|k| k.0.clone()))
            .collect();

        prop_assert_eq!(rebuilt_left, left);
        prop_assert_eq!(rebuilt_right, right);
    }

    /// Equal segments pair items with identical hashes, and both sides of
    /// an Equal segment have the same length.
    #[test]
    fn equal_segments_are_balanced(left in small_seq(), right in small_seq()) {
        let segments = correlate(&keys(&left), &keys(&right), &LcsOptions::new());
        for segment in &segments {
            if segment.kind == SegmentKind::Equal {
                prop_assert_eq!(segment.left.len(), segment.right.len());
                for (l, r) in segment.left.iter().zip(&segment.right) {
                    prop_assert_eq!(&l.0, &r.0);
                }
            }
        }
    }

    /// The contiguous-run scheme never reports more common content than
    /// the classical LCS allows, and finds all of it when the sequences
    /// are equal.
    #[test]
    fn equal_length_is_bounded_by_classic_lcs(left in small_seq(), right in small_seq()) {
        let segments = correlate(&keys(&left), &keys(&right), &LcsOptions::new());
        let found = equal_length(&segments);
        let oracle = classic_lcs_len(&left, &right);
        prop_assert!(found <= oracle);
        if left == right {
            prop_assert_eq!(found, left.len());
        }
    }

    /// Correlation is deterministic.
    #[test]
    fn correlation_is_deterministic(left in small_seq(), right in small_seq()) {
        let first = correlate(&keys(&left), &keys(&right), &LcsOptions::new());
        let second = correlate(&keys(&left), &keys(&right), &LcsOptions::new());
        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            prop_assert_eq!(a.kind, b.kind);
            prop_assert_eq!(a.left.len(), b.left.len());
            prop_assert_eq!(a.right.len(), b.right.len());
        }
    }

    /// Tokenization preserves the word sequence of the input.
    #[test]
    fn tokenize_preserves_word_sequence(text in "[a-z ,\\.]{0,40}") {
        let tokens = tokenize(&text);
        let rebuilt = join_tokens(&tokens);

        let original_words: Vec<&str> = text.split_whitespace().collect();
        let rebuilt_words: Vec<&str> = rebuilt.split_whitespace().collect();
        prop_assert_eq!(original_words.join(" "), rebuilt_words.join(" "));
    }
}

#[test]
fn identity_comparison_of_generated_documents_is_empty() {
    use common::docx;
    use redmark_core::wml::{WmlComparer, WmlDocument};

    for paragraphs in [
        vec!["one"],
        vec!["one", "two", "three"],
        vec!["", "mixed content 12,34", "Test."],
    ] {
        let bytes = docx::from_paragraphs(&paragraphs);
        let document = WmlDocument::from_bytes(&bytes).unwrap();
        let result = WmlComparer::compare(&document, &document, None).unwrap();
        assert!(
            result.is_identical(),
            "self-compare of {paragraphs:?} produced {:?}",
            result.changes
        );
    }
}

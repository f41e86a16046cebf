//! Hash-based longest-common-subsequence alignment.
//!
//! The algorithm finds the longest run of consecutive items whose hashes
//! match, then recurses into the unmatched flanks. Typical inputs
//! (paragraph lists, sheet rows, word tokens) are short enough that this
//! recursive scheme is preferred over the Hunt-McIlroy/Myers variants.
//! Ties resolve to the smallest left index, then the smallest right index,
//! so the segmentation is deterministic.

/// Items comparable by hash. Hashes compare with `==`; content is never
/// compared byte-by-byte outside hashing.
pub trait Hashable {
    fn key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Equal,
    Deleted,
    Inserted,
}

/// One correlated run. `Equal` carries the matched items from both sides;
/// `Deleted` carries left items only, `Inserted` right items only.
#[derive(Debug, Clone)]
pub struct Segment<T> {
    pub kind: SegmentKind,
    pub left: Vec<T>,
    pub right: Vec<T>,
}

impl<T> Segment<T> {
    pub fn equal(left: Vec<T>, right: Vec<T>) -> Self {
        Self {
            kind: SegmentKind::Equal,
            left,
            right,
        }
    }

    pub fn deleted(left: Vec<T>) -> Self {
        Self {
            kind: SegmentKind::Deleted,
            left,
            right: Vec::new(),
        }
    }

    pub fn inserted(right: Vec<T>) -> Self {
        Self {
            kind: SegmentKind::Inserted,
            left: Vec::new(),
            right,
        }
    }

    pub fn len(&self) -> usize {
        match self.kind {
            SegmentKind::Equal | SegmentKind::Deleted => self.left.len(),
            SegmentKind::Inserted => self.right.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type SkipPredicate = Box<dyn Fn(&str) -> bool>;

/// Tuning knobs of spec'd behavior: anchors shorter than
/// `min_match_length` are rejected, a match must cover at least
/// `detail_threshold` of the longer input, and items the skip predicate
/// flags cannot open a match (though they may appear inside one).
#[derive(Default)]
pub struct LcsOptions {
    pub min_match_length: usize,
    pub detail_threshold: f64,
    pub skip_as_anchor: Option<SkipPredicate>,
}

impl LcsOptions {
    pub fn new() -> Self {
        Self {
            min_match_length: 1,
            detail_threshold: 0.0,
            skip_as_anchor: None,
        }
    }

    pub fn min_match_length(mut self, len: usize) -> Self {
        self.min_match_length = len;
        self
    }

    pub fn detail_threshold(mut self, threshold: f64) -> Self {
        self.detail_threshold = threshold;
        self
    }

    pub fn skip_as_anchor<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.skip_as_anchor = Some(Box::new(predicate));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    i1: usize,
    i2: usize,
    length: usize,
}

fn find_longest_match<T: Hashable>(
    left: &[T],
    right: &[T],
    options: &LcsOptions,
) -> Option<Anchor> {
    let mut best = Anchor {
        i1: 0,
        i2: 0,
        length: 0,
    };

    for i1 in 0..left.len() {
        if left.len() - i1 <= best.length {
            break;
        }
        for i2 in 0..right.len() {
            if right.len() - i2 <= best.length {
                break;
            }
            let mut length = 0usize;
            while i1 + length < left.len()
                && i2 + length < right.len()
                && left[i1 + length].key() == right[i2 + length].key()
            {
                length += 1;
            }
            // Strict '>' keeps the earliest (smallest i1, then i2) anchor
            // among equal-length candidates.
            if length > best.length {
                best = Anchor { i1, i2, length };
            }
        }
    }

    // Items the predicate flags cannot anchor the match; trim them from
    // the front but let them survive inside.
    if let Some(skip) = &options.skip_as_anchor {
        while best.length > 0 && skip(left[best.i1].key()) {
            best.i1 += 1;
            best.i2 += 1;
            best.length -= 1;
        }
    }

    if best.length == 0 || best.length < options.min_match_length {
        return None;
    }

    if options.detail_threshold > 0.0 {
        let max_len = left.len().max(right.len());
        if max_len > 0 && (best.length as f64 / max_len as f64) < options.detail_threshold {
            return None;
        }
    }

    Some(best)
}

/// Correlates two sequences into an ordered segmentation. Adjacent
/// segments of identical status are merged before return.
pub fn correlate<T: Hashable + Clone>(
    left: &[T],
    right: &[T],
    options: &LcsOptions,
) -> Vec<Segment<T>> {
    let mut segments = Vec::new();
    correlate_into(left, right, options, &mut segments);
    merge_adjacent(segments)
}

fn correlate_into<T: Hashable + Clone>(
    left: &[T],
    right: &[T],
    options: &LcsOptions,
    out: &mut Vec<Segment<T>>,
) {
    if left.is_empty() && right.is_empty() {
        return;
    }
    if left.is_empty() {
        out.push(Segment::inserted(right.to_vec()));
        return;
    }
    if right.is_empty() {
        out.push(Segment::deleted(left.to_vec()));
        return;
    }

    let Some(anchor) = find_longest_match(left, right, options) else {
        out.push(Segment::deleted(left.to_vec()));
        out.push(Segment::inserted(right.to_vec()));
        return;
    };

    correlate_into(&left[..anchor.i1], &right[..anchor.i2], options, out);

    out.push(Segment::equal(
        left[anchor.i1..anchor.i1 + anchor.length].to_vec(),
        right[anchor.i2..anchor.i2 + anchor.length].to_vec(),
    ));

    correlate_into(
        &left[anchor.i1 + anchor.length..],
        &right[anchor.i2 + anchor.length..],
        options,
        out,
    );
}

fn merge_adjacent<T>(segments: Vec<Segment<T>>) -> Vec<Segment<T>> {
    let mut merged: Vec<Segment<T>> = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.kind == segment.kind => {
                last.left.extend(segment.left);
                last.right.extend(segment.right);
            }
            _ => merged.push(segment),
        }
    }
    merged
}

/// Sum of `Equal` segment lengths; with hash-distinct alphabets this is
/// the classical LCS length.
pub fn equal_length<T>(segments: &[Segment<T>]) -> usize {
    segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Equal)
        .map(Segment::len)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Item(String);

    impl Hashable for Item {
        fn key(&self) -> &str {
            &self.0
        }
    }

    fn items(keys: &[&str]) -> Vec<Item> {
        keys.iter().map(|k| Item(k.to_string())).collect()
    }

    fn kinds(segments: &[Segment<Item>]) -> Vec<SegmentKind> {
        segments.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn identical_sequences_are_one_equal_segment() {
        let result = correlate(&items(&["a", "b", "c"]), &items(&["a", "b", "c"]), &LcsOptions::new());
        assert_eq!(kinds(&result), vec![SegmentKind::Equal]);
        assert_eq!(result[0].len(), 3);
    }

    #[test]
    fn insertion_in_middle() {
        let result = correlate(&items(&["a", "c"]), &items(&["a", "b", "c"]), &LcsOptions::new());
        assert_eq!(
            kinds(&result),
            vec![SegmentKind::Equal, SegmentKind::Inserted, SegmentKind::Equal]
        );
        assert_eq!(result[1].right[0].0, "b");
    }

    #[test]
    fn deletion_in_middle() {
        let result = correlate(&items(&["a", "b", "c"]), &items(&["a", "c"]), &LcsOptions::new());
        assert_eq!(
            kinds(&result),
            vec![SegmentKind::Equal, SegmentKind::Deleted, SegmentKind::Equal]
        );
    }

    #[test]
    fn disjoint_sequences_become_delete_then_insert() {
        let result = correlate(&items(&["a", "b"]), &items(&["x", "y"]), &LcsOptions::new());
        assert_eq!(kinds(&result), vec![SegmentKind::Deleted, SegmentKind::Inserted]);
    }

    #[test]
    fn empty_inputs() {
        assert!(correlate(&items(&[]), &items(&[]), &LcsOptions::new()).is_empty());
        let ins = correlate(&items(&[]), &items(&["a"]), &LcsOptions::new());
        assert_eq!(kinds(&ins), vec![SegmentKind::Inserted]);
        let del = correlate(&items(&["a"]), &items(&[]), &LcsOptions::new());
        assert_eq!(kinds(&del), vec![SegmentKind::Deleted]);
    }

    #[test]
    fn equal_lengths_reproduce_lcs_length() {
        let left = items(&["a", "b", "c", "d", "e"]);
        let right = items(&["a", "x", "c", "d", "y"]);
        let result = correlate(&left, &right, &LcsOptions::new());
        // "a" + "c d" = 3 common items.
        assert_eq!(equal_length(&result), 3);
    }

    #[test]
    fn reconstruction_reproduces_inputs() {
        let left = items(&["a", "b", "c", "d"]);
        let right = items(&["b", "c", "x", "d"]);
        let result = correlate(&left, &right, &LcsOptions::new());

        let rebuilt_left: Vec<String> = result
            .iter()
            .flat_map(|s| s.left.iter().map(|i| i.0.clone()))
            .collect();
        let rebuilt_right: Vec<String> = result
            .iter()
            .flat_map(|s| s.right.iter().map(|i| i.0.clone()))
            .collect();

        assert_eq!(rebuilt_left, vec!["a", "b", "c", "d"]);
        assert_eq!(rebuilt_right, vec!["b", "c", "x", "d"]);
    }

    #[test]
    fn min_match_length_rejects_short_anchors() {
        let options = LcsOptions::new().min_match_length(2);
        let result = correlate(&items(&["a", "b", "c"]), &items(&["x", "b", "y"]), &options);
        assert_eq!(kinds(&result), vec![SegmentKind::Deleted, SegmentKind::Inserted]);
    }

    #[test]
    fn detail_threshold_rejects_small_relative_matches() {
        let options = LcsOptions::new().detail_threshold(0.5);
        let left = items(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        let right = items(&["x", "y", "z", "d", "w"]);
        let result = correlate(&left, &right, &options);
        assert_eq!(kinds(&result), vec![SegmentKind::Deleted, SegmentKind::Inserted]);
    }

    #[test]
    fn skipped_items_cannot_open_a_match() {
        let options = LcsOptions::new().skip_as_anchor(|key| key == ".");
        let result = correlate(
            &items(&[".", "a", "b"]),
            &items(&[".", "a", "b"]),
            &options,
        );
        // The leading "." is trimmed from the anchor; only "a b" correlates.
        assert_eq!(equal_length(&result), 2);
    }

    #[test]
    fn skipped_items_survive_inside_a_match() {
        let options = LcsOptions::new().skip_as_anchor(|key| key == ".");
        let result = correlate(
            &items(&["a", ".", "b"]),
            &items(&["a", ".", "b"]),
            &options,
        );
        assert_eq!(kinds(&result), vec![SegmentKind::Equal]);
        assert_eq!(equal_length(&result), 3);
    }

    #[test]
    fn ties_prefer_earliest_indices() {
        // "b" appears twice on the right; the match must bind to the first.
        let left = items(&["b"]);
        let right = items(&["b", "x", "b"]);
        let result = correlate(&left, &right, &LcsOptions::new());
        assert_eq!(result[0].kind, SegmentKind::Equal);
        assert_eq!(
            kinds(&result),
            vec![SegmentKind::Equal, SegmentKind::Inserted]
        );
    }
}

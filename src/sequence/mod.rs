//! Sequence diff engine
//!
//! Minimal edit scripts between two ordered sequences of comparable items,
//! independent of deltas. The engine is a Myers O(ND) variant with the usual
//! speedups:
//!
//! 1. equal inputs short-circuit
//! 2. an optional [`CursorHint`] explains the change as one splice around the cursor
//! 3. common prefix and suffix are stripped
//! 4. trivial middles (empty, containment, single item, half match) are solved directly
//! 5. everything else goes through the bidirectional bisection
//!
//! The result is then cleaned up into canonical runs. Items that are UTF-16
//! code units never have a surrogate pair split across two runs.
//!
//! # Example
//!
//! ```rust
//! use deltakit_core::sequence::{self, Diff};
//!
//! let diffs = sequence::diff(&[1, 2, 3], &[1, 3]);
//! assert_eq!(
//!     diffs,
//!     vec![Diff::equal(vec![1]), Diff::delete(vec![2]), Diff::equal(vec![3])]
//! );
//! ```

mod cleanup;
mod cursor;
mod engine;

/// Element of a diffable sequence.
///
/// Only UTF-16 code units report surrogates; for every other item type the
/// engine never has to protect a pair.
pub trait DiffItem: Clone + PartialEq {
    /// First half of a surrogate pair
    fn is_high_surrogate(&self) -> bool {
        false
    }

    /// Second half of a surrogate pair
    fn is_low_surrogate(&self) -> bool {
        false
    }
}

impl DiffItem for u16 {
    fn is_high_surrogate(&self) -> bool {
        (0xD800..=0xDBFF).contains(self)
    }

    fn is_low_surrogate(&self) -> bool {
        (0xDC00..=0xDFFF).contains(self)
    }
}

macro_rules! impl_diff_item {
    ($($ty:ty),* $(,)?) => {
        $(impl DiffItem for $ty {})*
    };
}

impl_diff_item!(char, u8, u32, u64, i32, i64, usize, String);

/// Kind of a diff run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffOp {
    Delete,
    Insert,
    Equal,
}

/// One run of an edit script: the items it deletes, inserts or keeps
#[derive(Debug, Clone, PartialEq)]
pub struct Diff<T> {
    pub op: DiffOp,
    pub items: Vec<T>,
}

impl<T> Diff<T> {
    pub fn new(op: DiffOp, items: Vec<T>) -> Self {
        Self { op, items }
    }

    pub fn equal(items: Vec<T>) -> Self {
        Self::new(DiffOp::Equal, items)
    }

    pub fn insert(items: Vec<T>) -> Self {
        Self::new(DiffOp::Insert, items)
    }

    pub fn delete(items: Vec<T>) -> Self {
        Self::new(DiffOp::Delete, items)
    }
}

/// A span of items: `length` items starting at `index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub index: usize,
    pub length: usize,
}

impl Range {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }
}

/// Where the user's cursor was, used to pick the splice a user actually made
/// among several equally minimal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    /// Collapsed cursor in the old sequence
    Position(usize),

    /// Selection before and after the edit
    Selection { old: Range, new: Range },
}

/// Edit script turning `old` into `new`
pub fn diff<T: DiffItem>(old: &[T], new: &[T]) -> Vec<Diff<T>> {
    engine::diff_main(old, new, None, true)
}

/// Edit script turning `old` into `new`, preferring a splice at the cursor
pub fn diff_with_cursor<T: DiffItem>(old: &[T], new: &[T], cursor: CursorHint) -> Vec<Diff<T>> {
    engine::diff_main(old, new, Some(&cursor), true)
}

/// Character-level edit script between two strings
///
/// # Example
///
/// ```rust
/// use deltakit_core::sequence::{diff_text, DiffOp};
///
/// let diffs = diff_text("abc", "ab123c", None);
/// assert_eq!(
///     diffs,
///     vec![
///         (DiffOp::Equal, "ab".to_string()),
///         (DiffOp::Insert, "123".to_string()),
///         (DiffOp::Equal, "c".to_string()),
///     ]
/// );
/// ```
pub fn diff_text(old: &str, new: &str, cursor: Option<CursorHint>) -> Vec<(DiffOp, String)> {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();
    engine::diff_main(&old, &new, cursor.as_ref(), true)
        .into_iter()
        .map(|diff| (diff.op, diff.items.into_iter().collect()))
        .collect()
}

fn starts_with_pair_end<T: DiffItem>(items: &[T]) -> bool {
    items.first().is_some_and(DiffItem::is_low_surrogate)
}

fn ends_with_pair_start<T: DiffItem>(items: &[T]) -> bool {
    items.last().is_some_and(DiffItem::is_high_surrogate)
}

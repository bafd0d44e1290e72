//! Explain a change as a single splice at the user's cursor

use super::{ends_with_pair_start, starts_with_pair_end, CursorHint, Diff, DiffItem, Range};

/// Before/removed/added/after split of an edit
struct Splice<'a, T> {
    before: &'a [T],
    old_middle: &'a [T],
    new_middle: &'a [T],
    after: &'a [T],
}

/// Edit script consisting of one splice consistent with the cursor hint.
///
/// Tried in order: an insert or delete just before the old cursor, one just
/// after it, then a replacement of the old selection. `None` when the change
/// cannot be explained that way; inputs are assumed to differ.
pub(super) fn find_cursor_edit_diff<T: DiffItem>(
    old: &[T],
    new: &[T],
    hint: &CursorHint,
) -> Option<Vec<Diff<T>>> {
    let (old_range, new_range) = match *hint {
        CursorHint::Position(index) => (Range::new(index, 0), None),
        CursorHint::Selection { old, new } => (old, Some(new)),
    };

    if old_range.length == 0 && new_range.map_or(true, |range| range.length == 0) {
        let new_cursor = new_range.map(|range| range.index);
        if let Some(splice) = edit_before(old, new, old_range.index, new_cursor) {
            return make_edit_splice(splice);
        }
        if let Some(splice) = edit_after(old, new, old_range.index, new_cursor) {
            return make_edit_splice(splice);
        }
    }

    if old_range.length > 0 && new_range.is_some_and(|range| range.length == 0) {
        if let Some(splice) = replace_range(old, new, old_range) {
            return make_edit_splice(splice);
        }
    }

    None
}

/// Insert or delete right before the old cursor
fn edit_before<'a, T: DiffItem>(
    old: &'a [T],
    new: &'a [T],
    old_cursor: usize,
    expected_new_cursor: Option<usize>,
) -> Option<Splice<'a, T>> {
    if old_cursor > old.len() {
        return None;
    }
    let new_cursor = (old_cursor + new.len()).checked_sub(old.len())?;
    if expected_new_cursor.is_some_and(|cursor| cursor != new_cursor) || new_cursor > new.len() {
        return None;
    }

    let (old_before, old_after) = old.split_at(old_cursor);
    let (new_before, new_after) = new.split_at(new_cursor);
    if new_after != old_after {
        return None;
    }

    let prefix_length = old_cursor.min(new_cursor);
    let (old_prefix, old_middle) = old_before.split_at(prefix_length);
    let (new_prefix, new_middle) = new_before.split_at(prefix_length);
    if old_prefix != new_prefix {
        return None;
    }

    Some(Splice {
        before: old_prefix,
        old_middle,
        new_middle,
        after: old_after,
    })
}

/// Insert or forward delete right after the old cursor
fn edit_after<'a, T: DiffItem>(
    old: &'a [T],
    new: &'a [T],
    cursor: usize,
    expected_new_cursor: Option<usize>,
) -> Option<Splice<'a, T>> {
    if expected_new_cursor.is_some_and(|new_cursor| new_cursor != cursor)
        || cursor > old.len()
        || cursor > new.len()
    {
        return None;
    }

    let (old_before, old_after) = old.split_at(cursor);
    let (new_before, new_after) = new.split_at(cursor);
    if new_before != old_before {
        return None;
    }

    let suffix_length = old_after.len().min(new_after.len());
    let (old_middle, old_suffix) = old_after.split_at(old_after.len() - suffix_length);
    let (new_middle, new_suffix) = new_after.split_at(new_after.len() - suffix_length);
    if old_suffix != new_suffix {
        return None;
    }

    Some(Splice {
        before: old_before,
        old_middle,
        new_middle,
        after: old_suffix,
    })
}

/// The old selection was replaced by whatever now sits between the same
/// prefix and suffix
fn replace_range<'a, T: DiffItem>(old: &'a [T], new: &'a [T], range: Range) -> Option<Splice<'a, T>> {
    let end = range.index.checked_add(range.length)?;
    if end > old.len() {
        return None;
    }

    let old_prefix = &old[..range.index];
    let old_suffix = &old[end..];
    let prefix_length = old_prefix.len();
    let suffix_length = old_suffix.len();
    if new.len() < prefix_length + suffix_length {
        return None;
    }

    let new_prefix = &new[..prefix_length];
    let new_suffix = &new[new.len() - suffix_length..];
    if old_prefix != new_prefix || old_suffix != new_suffix {
        return None;
    }

    Some(Splice {
        before: old_prefix,
        old_middle: &old[prefix_length..old.len() - suffix_length],
        new_middle: &new[prefix_length..new.len() - suffix_length],
        after: old_suffix,
    })
}

/// Turn a splice into runs; refuse splices that would cut a surrogate pair
fn make_edit_splice<T: DiffItem>(splice: Splice<'_, T>) -> Option<Vec<Diff<T>>> {
    if ends_with_pair_start(splice.before) || starts_with_pair_end(splice.after) {
        return None;
    }

    let diffs = [
        Diff::equal(splice.before.to_vec()),
        Diff::delete(splice.old_middle.to_vec()),
        Diff::insert(splice.new_middle.to_vec()),
        Diff::equal(splice.after.to_vec()),
    ]
    .into_iter()
    .filter(|diff| !diff.items.is_empty())
    .collect();
    Some(diffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::DiffOp;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_position_insert_at_cursor() {
        let diffs = find_cursor_edit_diff(&chars("abc"), &chars("abXc"), &CursorHint::Position(2))
            .unwrap();
        assert_eq!(
            diffs,
            vec![
                Diff::equal(chars("ab")),
                Diff::insert(chars("X")),
                Diff::equal(chars("c")),
            ]
        );
    }

    #[test]
    fn test_position_not_matching_edit() {
        // Change happened far from the cursor
        let result = find_cursor_edit_diff(&chars("abcdef"), &chars("abcdeX"), &CursorHint::Position(1));
        assert!(result.is_none());
    }

    #[test]
    fn test_selection_with_mismatched_new_cursor() {
        let hint = CursorHint::Selection {
            old: Range::new(1, 0),
            new: Range::new(3, 0),
        };
        assert!(find_cursor_edit_diff(&chars("xxx"), &chars("xx"), &hint).is_none());
    }

    #[test]
    fn test_refuses_to_split_surrogate_pair() {
        // Cursor between the two halves of a pair
        let old = [0xD83Du16, 0xDE00];
        let new = [0xD83Du16, 0x0078, 0xDE00];
        assert!(find_cursor_edit_diff(&old, &new, &CursorHint::Position(1)).is_none());

        let old: Vec<u16> = "a😀".encode_utf16().collect();
        let new: Vec<u16> = "a😀b".encode_utf16().collect();
        let diffs = find_cursor_edit_diff(&old, &new, &CursorHint::Position(3)).unwrap();
        assert_eq!(diffs[0].op, DiffOp::Equal);
        assert_eq!(diffs[1], Diff::insert(vec![0x0062]));
    }
}

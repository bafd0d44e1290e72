//! Myers diff with prefix/suffix stripping, half-match splitting and
//! middle-snake bisection

use super::{cleanup, cursor, CursorHint, Diff, DiffItem, DiffOp};

/// Full diff of `text1` against `text2`.
///
/// `fix_unicode` is only set for the outermost call: recursive calls work on
/// fragments whose boundaries are repaired once, at the top.
pub(super) fn diff_main<T: DiffItem>(
    text1: &[T],
    text2: &[T],
    cursor: Option<&CursorHint>,
    fix_unicode: bool,
) -> Vec<Diff<T>> {
    if text1 == text2 {
        if text1.is_empty() {
            return Vec::new();
        }
        return vec![Diff::equal(text1.to_vec())];
    }

    if let Some(hint) = cursor {
        if let Some(diffs) = cursor::find_cursor_edit_diff(text1, text2, hint) {
            tracing::trace!(target: "deltakit.sequence", hint = ?hint, runs = diffs.len(), "cursor_edit_hit");
            return diffs;
        }
    }

    let prefix_length = common_prefix(text1, text2);
    let (prefix, text1) = text1.split_at(prefix_length);
    let text2 = &text2[prefix_length..];

    let suffix_length = common_suffix(text1, text2);
    let (text1, suffix) = text1.split_at(text1.len() - suffix_length);
    let text2 = &text2[..text2.len() - suffix_length];

    let mut diffs = Vec::new();
    if !prefix.is_empty() {
        diffs.push(Diff::equal(prefix.to_vec()));
    }
    diffs.extend(compute(text1, text2));
    if !suffix.is_empty() {
        diffs.push(Diff::equal(suffix.to_vec()));
    }

    cleanup::cleanup_merge(&mut diffs, fix_unicode);
    diffs
}

/// Diff two sequences known to share no common prefix or suffix
fn compute<T: DiffItem>(text1: &[T], text2: &[T]) -> Vec<Diff<T>> {
    if text1.is_empty() {
        return vec![Diff::insert(text2.to_vec())];
    }
    if text2.is_empty() {
        return vec![Diff::delete(text1.to_vec())];
    }

    let text1_longer = text1.len() > text2.len();
    let (long, short) = if text1_longer {
        (text1, text2)
    } else {
        (text2, text1)
    };

    if let Some(index) = index_of(long, short, 0) {
        // Shorter sequence sits inside the longer one
        let op = if text1_longer {
            DiffOp::Delete
        } else {
            DiffOp::Insert
        };
        let mut diffs = Vec::with_capacity(3);
        if index > 0 {
            diffs.push(Diff::new(op, long[..index].to_vec()));
        }
        diffs.push(Diff::equal(short.to_vec()));
        if index + short.len() < long.len() {
            diffs.push(Diff::new(op, long[index + short.len()..].to_vec()));
        }
        return diffs;
    }

    if short.len() == 1 {
        // Not contained, so the single item cannot be an equality
        return vec![Diff::delete(text1.to_vec()), Diff::insert(text2.to_vec())];
    }

    if let Some(half) = half_match(text1, text2) {
        let mut diffs = diff_main(half.text1_a, half.text2_a, None, false);
        diffs.push(Diff::equal(half.common.to_vec()));
        diffs.extend(diff_main(half.text1_b, half.text2_b, None, false));
        return diffs;
    }

    bisect(text1, text2)
}

/// Length of the common prefix; never ends between a surrogate pair
pub(super) fn common_prefix<T: DiffItem>(text1: &[T], text2: &[T]) -> usize {
    if text1.is_empty() || text2.is_empty() || text1[0] != text2[0] {
        return 0;
    }

    // Binary search
    let mut pointer_min = 0;
    let mut pointer_max = text1.len().min(text2.len());
    let mut pointer_mid = pointer_max;
    let mut pointer_start = 0;
    while pointer_min < pointer_mid {
        if text1[pointer_start..pointer_mid] == text2[pointer_start..pointer_mid] {
            pointer_min = pointer_mid;
            pointer_start = pointer_min;
        } else {
            pointer_max = pointer_mid;
        }
        pointer_mid = (pointer_max - pointer_min) / 2 + pointer_min;
    }

    if pointer_mid > 0 && text1[pointer_mid - 1].is_high_surrogate() {
        pointer_mid -= 1;
    }
    pointer_mid
}

/// Length of the common suffix; never starts between a surrogate pair
pub(super) fn common_suffix<T: DiffItem>(text1: &[T], text2: &[T]) -> usize {
    if text1.is_empty() || text2.is_empty() || text1.last() != text2.last() {
        return 0;
    }

    let (len1, len2) = (text1.len(), text2.len());
    let mut pointer_min = 0;
    let mut pointer_max = len1.min(len2);
    let mut pointer_mid = pointer_max;
    let mut pointer_end = 0;
    while pointer_min < pointer_mid {
        if text1[len1 - pointer_mid..len1 - pointer_end] == text2[len2 - pointer_mid..len2 - pointer_end]
        {
            pointer_min = pointer_mid;
            pointer_end = pointer_min;
        } else {
            pointer_max = pointer_mid;
        }
        pointer_mid = (pointer_max - pointer_min) / 2 + pointer_min;
    }

    if pointer_mid > 0 && text1[len1 - pointer_mid].is_low_surrogate() {
        pointer_mid -= 1;
    }
    pointer_mid
}

fn index_of<T: PartialEq>(haystack: &[T], needle: &[T], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from < haystack.len()).then_some(from);
    }
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|position| position + from)
}

/// Split of both inputs around a shared middle at least half as long as the
/// longer input
#[derive(Debug, PartialEq)]
pub(super) struct HalfMatch<'a, T> {
    pub text1_a: &'a [T],
    pub text1_b: &'a [T],
    pub text2_a: &'a [T],
    pub text2_b: &'a [T],
    pub common: &'a [T],
}

/// Candidate split in (long, short) orientation
struct Candidate<'a, T> {
    long_a: &'a [T],
    long_b: &'a [T],
    short_a: &'a [T],
    short_b: &'a [T],
    common: &'a [T],
}

/// Look for a common run covering at least half of the longer input.
///
/// This speedup can produce non-minimal diffs.
pub(super) fn half_match<'a, T: DiffItem>(text1: &'a [T], text2: &'a [T]) -> Option<HalfMatch<'a, T>> {
    let text1_longer = text1.len() > text2.len();
    let (long, short) = if text1_longer {
        (text1, text2)
    } else {
        (text2, text1)
    };
    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    // Seeds at the second and the third quarter of the longer input
    let second_quarter = half_match_at(long, short, long.len().div_ceil(4));
    let third_quarter = half_match_at(long, short, long.len().div_ceil(2));
    let best = match (second_quarter, third_quarter) {
        (None, None) => return None,
        (Some(candidate), None) | (None, Some(candidate)) => candidate,
        (Some(first), Some(second)) => {
            if first.common.len() > second.common.len() {
                first
            } else {
                second
            }
        }
    };

    let half = if text1_longer {
        HalfMatch {
            text1_a: best.long_a,
            text1_b: best.long_b,
            text2_a: best.short_a,
            text2_b: best.short_b,
            common: best.common,
        }
    } else {
        HalfMatch {
            text1_a: best.short_a,
            text1_b: best.short_b,
            text2_a: best.long_a,
            text2_b: best.long_b,
            common: best.common,
        }
    };
    Some(half)
}

fn half_match_at<'a, T: DiffItem>(long: &'a [T], short: &'a [T], start: usize) -> Option<Candidate<'a, T>> {
    let seed = &long[start..start + long.len() / 4];
    let mut best: Option<Candidate<'a, T>> = None;
    let mut best_length = 0;
    let mut from = 0;

    while let Some(index) = index_of(short, seed, from) {
        let prefix_length = common_prefix(&long[start..], &short[index..]);
        let suffix_length = common_suffix(&long[..start], &short[..index]);
        if best_length < prefix_length + suffix_length {
            best_length = prefix_length + suffix_length;
            best = Some(Candidate {
                long_a: &long[..start - suffix_length],
                long_b: &long[start + prefix_length..],
                short_a: &short[..index - suffix_length],
                short_b: &short[index + prefix_length..],
                common: &short[index - suffix_length..index + prefix_length],
            });
        }
        from = index + 1;
    }

    best.filter(|candidate| candidate.common.len() * 2 >= long.len())
}

/// Find the middle snake and diff both halves around it
fn bisect<T: DiffItem>(text1: &[T], text2: &[T]) -> Vec<Diff<T>> {
    let len1 = text1.len() as isize;
    let len2 = text2.len() as isize;
    let max_d = (len1 + len2 + 1) / 2;
    let v_offset = max_d;
    let v_length = 2 * max_d;
    let mut v1 = vec![-1isize; v_length as usize];
    let mut v2 = vec![-1isize; v_length as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = len1 - len2;
    // With an odd total length the front path collides with the reverse one
    let front = delta % 2 != 0;

    // Offsets for the start and end of the k loops; prevent mapping of space
    // beyond the grid
    let mut k1_start = 0;
    let mut k1_end = 0;
    let mut k2_start = 0;
    let mut k2_end = 0;

    for d in 0..max_d {
        // Walk the front path one step
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 >= 0
                && x1 < len1
                && y1 >= 0
                && y1 < len2
                && text1[x1 as usize] == text2[y1 as usize]
            {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;

            if x1 > len1 {
                // Ran off the right of the graph
                k1_end += 2;
            } else if y1 > len2 {
                // Ran off the bottom of the graph
                k1_start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                    // Mirror x2 onto top-left coordinate system
                    let x2 = len1 - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize);
                    }
                }
            }
            k1 += 2;
        }

        // Walk the reverse path one step
        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 >= 0
                && x2 < len1
                && y2 >= 0
                && y2 < len2
                && text1[(len1 - x2 - 1) as usize] == text2[(len2 - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;

            if x2 > len1 {
                // Ran off the left of the graph
                k2_end += 2;
            } else if y2 > len2 {
                // Ran off the top of the graph
                k2_start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    // Mirror x2 onto top-left coordinate system
                    let x2 = len1 - x2;
                    if x1 >= x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize);
                    }
                }
            }
            k2 += 2;
        }
    }

    // No commonality at all
    tracing::debug!(
        target: "deltakit.sequence",
        old_len = text1.len(),
        new_len = text2.len(),
        "bisect_without_overlap"
    );
    vec![Diff::delete(text1.to_vec()), Diff::insert(text2.to_vec())]
}

fn bisect_split<T: DiffItem>(text1: &[T], text2: &[T], x: usize, y: usize) -> Vec<Diff<T>> {
    let (text1_a, text1_b) = text1.split_at(x);
    let (text2_a, text2_b) = text2.split_at(y);

    let mut diffs = diff_main(text1_a, text2_a, None, false);
    diffs.extend(diff_main(text1_b, text2_b, None, false));
    diffs
}

//! Canonicalize a raw edit script: merge runs, factor out common affixes,
//! slide single edits across equalities

use super::engine::{common_prefix, common_suffix};
use super::{ends_with_pair_start, starts_with_pair_end, Diff, DiffItem, DiffOp};

/// Reorder and merge like runs until nothing changes.
///
/// With `fix_unicode`, run boundaries that fall inside a surrogate pair are
/// moved so both halves land in the same run.
pub(super) fn cleanup_merge<T: DiffItem>(diffs: &mut Vec<Diff<T>>, fix_unicode: bool) {
    loop {
        merge_pass(diffs, fix_unicode);
        if !shift_pass(diffs) {
            break;
        }
    }
}

fn merge_pass<T: DiffItem>(diffs: &mut Vec<Diff<T>>, fix_unicode: bool) {
    // Sentinel equality so the last edit group gets flushed
    diffs.push(Diff::equal(Vec::new()));

    let mut pointer = 0;
    let mut count_delete = 0;
    let mut count_insert = 0;
    let mut text_delete: Vec<T> = Vec::new();
    let mut text_insert: Vec<T> = Vec::new();

    while pointer < diffs.len() {
        if pointer < diffs.len() - 1 && diffs[pointer].items.is_empty() {
            diffs.remove(pointer);
            continue;
        }

        match diffs[pointer].op {
            DiffOp::Insert => {
                count_insert += 1;
                text_insert.extend_from_slice(&diffs[pointer].items);
                pointer += 1;
            }
            DiffOp::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(&diffs[pointer].items);
                pointer += 1;
            }
            DiffOp::Equal => {
                let mut previous_equality = pointer.checked_sub(count_insert + count_delete + 1);

                if fix_unicode {
                    if let Some(previous) = previous_equality {
                        if ends_with_pair_start(&diffs[previous].items) {
                            // Move the stray high surrogate into the edit group
                            if let Some(stray) = diffs[previous].items.pop() {
                                text_delete.insert(0, stray.clone());
                                text_insert.insert(0, stray);
                            }
                            if diffs[previous].items.is_empty() {
                                // Emptied equality: drop it and absorb the edits before it
                                diffs.remove(previous);
                                pointer -= 1;
                                let mut k = previous.checked_sub(1);
                                if let Some(index) = k.filter(|&index| diffs[index].op == DiffOp::Insert) {
                                    count_insert += 1;
                                    text_insert.splice(0..0, diffs[index].items.iter().cloned());
                                    k = index.checked_sub(1);
                                }
                                if let Some(index) = k.filter(|&index| diffs[index].op == DiffOp::Delete) {
                                    count_delete += 1;
                                    text_delete.splice(0..0, diffs[index].items.iter().cloned());
                                    k = index.checked_sub(1);
                                }
                                previous_equality = k;
                            }
                        }
                    }
                    if starts_with_pair_end(&diffs[pointer].items) {
                        // Move the stray low surrogate into the edit group
                        let stray = diffs[pointer].items.remove(0);
                        text_delete.push(stray.clone());
                        text_insert.push(stray);
                    }
                }

                if pointer < diffs.len() - 1 && diffs[pointer].items.is_empty() {
                    // Emptied equality in the middle: keep collecting until the next one
                    diffs.remove(pointer);
                    continue;
                }

                if !text_delete.is_empty() || !text_insert.is_empty() {
                    if !text_delete.is_empty() && !text_insert.is_empty() {
                        // Factor out a common prefix into the previous equality
                        let common = common_prefix(&text_insert, &text_delete);
                        if common != 0 {
                            let shared: Vec<T> = text_insert[..common].to_vec();
                            match previous_equality {
                                Some(previous) => diffs[previous].items.extend(shared),
                                None => {
                                    diffs.insert(0, Diff::equal(shared));
                                    pointer += 1;
                                }
                            }
                            text_insert.drain(..common);
                            text_delete.drain(..common);
                        }

                        // Factor out a common suffix into this equality
                        let common = common_suffix(&text_insert, &text_delete);
                        if common != 0 {
                            let shared = text_insert.split_off(text_insert.len() - common);
                            diffs[pointer].items.splice(0..0, shared);
                            text_delete.truncate(text_delete.len() - common);
                        }
                    }

                    // Replace the edit group with at most one delete and one insert
                    let start = pointer - (count_insert + count_delete);
                    let mut merged = Vec::with_capacity(2);
                    if !text_delete.is_empty() {
                        merged.push(Diff::delete(std::mem::take(&mut text_delete)));
                    }
                    if !text_insert.is_empty() {
                        merged.push(Diff::insert(std::mem::take(&mut text_insert)));
                    }
                    let replaced = merged.len();
                    diffs.splice(start..pointer, merged);
                    pointer = start + replaced;
                }

                if pointer != 0 && diffs[pointer - 1].op == DiffOp::Equal {
                    // Merge this equality into the previous one
                    let items = diffs.remove(pointer).items;
                    diffs[pointer - 1].items.extend(items);
                } else {
                    pointer += 1;
                }

                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }

    if diffs.last().is_some_and(|diff| diff.items.is_empty()) {
        diffs.pop();
    }
}

/// Slide single edits surrounded by equalities sideways to eliminate one of
/// them, e.g. `A<ins>BA</ins>C` becomes `<ins>AB</ins>AC`
fn shift_pass<T: DiffItem>(diffs: &mut Vec<Diff<T>>) -> bool {
    let mut changes = false;
    let mut pointer = 1;

    // First and last runs never need checking
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == DiffOp::Equal && diffs[pointer + 1].op == DiffOp::Equal {
            let previous_length = diffs[pointer - 1].items.len();
            let edit_length = diffs[pointer].items.len();
            let next_length = diffs[pointer + 1].items.len();

            if previous_length <= edit_length
                && diffs[pointer].items[edit_length - previous_length..] == diffs[pointer - 1].items[..]
            {
                // Shift the edit over the previous equality
                let previous = diffs.remove(pointer - 1).items;
                let edit = &mut diffs[pointer - 1].items;
                edit.truncate(edit_length - previous_length);
                edit.splice(0..0, previous.iter().cloned());
                diffs[pointer].items.splice(0..0, previous);
                changes = true;
            } else if next_length <= edit_length
                && diffs[pointer].items[..next_length] == diffs[pointer + 1].items[..]
            {
                // Shift the edit over the next equality
                let next = diffs.remove(pointer + 1).items;
                diffs[pointer - 1].items.extend_from_slice(&next);
                let edit = &mut diffs[pointer].items;
                edit.drain(..next_length);
                edit.extend(next);
                changes = true;
            }
        }
        pointer += 1;
    }

    changes
}

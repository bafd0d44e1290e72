//! Transform: rebase a concurrent changeset over this one

use super::attributes;
use super::builder::DeltaBuilder;
use super::op::{Op, OpKind, OpType, RetainPayload};
use super::Delta;

impl Delta {
    /// Rewrite `other`, made concurrently with `self` against the same base,
    /// so that it applies after `self`.
    ///
    /// `priority` says whether `self` happened first: it decides which insert
    /// goes in front at a shared position and whose attribute values win.
    ///
    /// # Example
    ///
    /// ```rust
    /// use deltakit_core::Delta;
    ///
    /// let a = Delta::builder().insert("a").build();
    /// let b = Delta::builder().insert("b").build();
    ///
    /// assert_eq!(a.transform(&b, true), Delta::builder().retain(1).insert("b").build());
    /// assert_eq!(a.transform(&b, false), Delta::builder().insert("b").build());
    /// ```
    pub fn transform(&self, other: &Delta, priority: bool) -> Delta {
        let mut this_iter = self.iter();
        let mut other_iter = other.iter();
        let mut delta = DeltaBuilder::with_capacity(other.ops.len());

        while this_iter.has_next() || other_iter.has_next() {
            if this_iter.peek_type() == OpType::Insert
                && (priority || other_iter.peek_type() != OpType::Insert)
            {
                delta.retain(this_iter.next_op().len());
                continue;
            }
            if other_iter.peek_type() == OpType::Insert {
                delta.push(other_iter.next_op());
                continue;
            }

            let length = this_iter.peek_length().min(other_iter.peek_length());
            let this_op = this_iter.next(length);
            let other_op = other_iter.next(length);

            // Our delete already removed whatever they retained or deleted
            if this_op.is_delete() {
                continue;
            }
            if other_op.is_delete() {
                delta.push(other_op);
                continue;
            }

            let attributes = attributes::transform(
                this_op.attributes.as_ref(),
                other_op.attributes.as_ref(),
                priority,
            );
            let payload = match (this_op.kind, other_op.kind) {
                (
                    OpKind::Retain(RetainPayload::Delta(this_inner)),
                    OpKind::Retain(RetainPayload::Delta(other_inner)),
                ) => {
                    let inner = this_inner.transform(&other_inner, priority);
                    if inner.is_empty() {
                        RetainPayload::Count(1)
                    } else {
                        RetainPayload::Delta(inner)
                    }
                }
                (_, OpKind::Retain(RetainPayload::Delta(other_inner))) => {
                    RetainPayload::Delta(other_inner)
                }
                _ => RetainPayload::Count(length),
            };
            delta.push(Op::retain(payload).with_attributes(attributes));
        }

        delta.build()
    }

    /// Where `index` ends up after this changeset is applied.
    ///
    /// With `priority`, an insert exactly at `index` leaves it in place;
    /// without, the index is pushed past the insert.
    pub fn transform_position(&self, index: usize, priority: bool) -> usize {
        let mut iter = self.iter();
        let mut index = index;
        let mut offset = 0;
        while iter.has_next() && offset <= index {
            let length = iter.peek_length();
            let next_type = iter.peek_type();
            iter.next_op();
            match next_type {
                OpType::Delete => {
                    index -= length.min(index - offset);
                    continue;
                }
                OpType::Insert if offset < index || !priority => {
                    index += length;
                }
                _ => {}
            }
            offset += length;
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::AttributeMap;
    use serde_json::{json, Value};

    fn attrs(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_insert_plus_insert() {
        let a = Delta::builder().insert("A").build();
        let b = Delta::builder().insert("B").build();
        assert_eq!(a.transform(&b, true), Delta::builder().retain(1).insert("B").build());
        assert_eq!(a.transform(&b, false), Delta::builder().insert("B").build());
    }

    #[test]
    fn test_insert_plus_retain() {
        let a = Delta::builder().insert("A").build();
        let b = Delta::builder()
            .retain_with(1, attrs(json!({"bold": true, "color": "red"})))
            .build();
        let expected = Delta::builder()
            .retain(1)
            .retain_with(1, attrs(json!({"bold": true, "color": "red"})))
            .build();
        assert_eq!(a.transform(&b, true), expected);
    }

    #[test]
    fn test_insert_plus_delete() {
        let a = Delta::builder().insert("A").build();
        let b = Delta::builder().delete(1).build();
        assert_eq!(a.transform(&b, true), Delta::builder().retain(1).delete(1).build());
    }

    #[test]
    fn test_delete_plus_insert() {
        let a = Delta::builder().delete(1).build();
        let b = Delta::builder().insert("B").build();
        assert_eq!(a.transform(&b, true), Delta::builder().insert("B").build());
    }

    #[test]
    fn test_delete_plus_retain() {
        let a = Delta::builder().delete(1).build();
        let b = Delta::builder()
            .retain_with(1, attrs(json!({"bold": true, "color": "red"})))
            .build();
        assert_eq!(a.transform(&b, true), Delta::new());
    }

    #[test]
    fn test_delete_plus_delete() {
        let a = Delta::builder().delete(1).build();
        let b = Delta::builder().delete(1).build();
        assert_eq!(a.transform(&b, true), Delta::new());
    }

    #[test]
    fn test_retain_plus_insert() {
        let a = Delta::builder().retain_with(1, attrs(json!({"color": "blue"}))).build();
        let b = Delta::builder().insert("B").build();
        assert_eq!(a.transform(&b, true), Delta::builder().insert("B").build());
    }

    #[test]
    fn test_retain_plus_retain() {
        let a = Delta::builder().retain_with(1, attrs(json!({"color": "blue"}))).build();
        let b = Delta::builder()
            .retain_with(1, attrs(json!({"bold": true, "color": "red"})))
            .build();
        assert_eq!(
            a.transform(&b, true),
            Delta::builder().retain_with(1, attrs(json!({"bold": true}))).build()
        );
        assert_eq!(b.transform(&a, true), Delta::new());
    }

    #[test]
    fn test_retain_plus_retain_without_priority() {
        let a = Delta::builder().retain_with(1, attrs(json!({"color": "blue"}))).build();
        let b = Delta::builder()
            .retain_with(1, attrs(json!({"bold": true, "color": "red"})))
            .build();
        assert_eq!(
            a.transform(&b, false),
            Delta::builder()
                .retain_with(1, attrs(json!({"bold": true, "color": "red"})))
                .build()
        );
        assert_eq!(
            b.transform(&a, false),
            Delta::builder().retain_with(1, attrs(json!({"color": "blue"}))).build()
        );
    }

    #[test]
    fn test_retain_plus_delete() {
        let a = Delta::builder().retain_with(1, attrs(json!({"color": "blue"}))).build();
        let b = Delta::builder().delete(1).build();
        assert_eq!(a.transform(&b, true), Delta::builder().delete(1).build());
    }

    #[test]
    fn test_alternating_edits() {
        let a = Delta::builder().retain(2).insert("si").delete(5).build();
        let b = Delta::builder().retain(1).insert("e").delete(5).retain(1).insert("ow").build();
        assert_eq!(
            a.transform(&b, false),
            Delta::builder().retain(1).insert("e").delete(1).retain(2).insert("ow").build()
        );
        assert_eq!(
            b.transform(&a, false),
            Delta::builder().retain(2).insert("si").delete(1).build()
        );
    }

    #[test]
    fn test_conflicting_appends() {
        let a = Delta::builder().retain(3).insert("aa").build();
        let b = Delta::builder().retain(3).insert("bb").build();
        assert_eq!(
            a.transform(&b, true),
            Delta::builder().retain(5).insert("bb").build()
        );
        assert_eq!(
            b.transform(&a, false),
            Delta::builder().retain(3).insert("aa").build()
        );
    }

    #[test]
    fn test_prepend_and_append() {
        let a = Delta::builder().insert("aa").build();
        let b = Delta::builder().retain(3).insert("bb").build();
        assert_eq!(
            a.transform(&b, false),
            Delta::builder().retain(5).insert("bb").build()
        );
        assert_eq!(b.transform(&a, false), Delta::builder().insert("aa").build());
    }

    #[test]
    fn test_trailing_deletes_with_differing_lengths() {
        let a = Delta::builder().retain(2).delete(1).build();
        let b = Delta::builder().delete(3).build();
        assert_eq!(a.transform(&b, false), Delta::builder().delete(2).build());
        assert_eq!(b.transform(&a, false), Delta::new());
    }

    #[test]
    fn test_nested_insert_plus_insert() {
        let inner_a = Delta::builder().insert("a").build();
        let inner_b = Delta::builder().insert("b").build();
        let a = Delta::builder().insert(inner_a).build();
        let b = Delta::builder().insert(inner_b.clone()).build();
        assert_eq!(
            a.transform(&b, true),
            Delta::builder().retain(1).insert(inner_b.clone()).build()
        );
        assert_eq!(a.transform(&b, false), Delta::builder().insert(inner_b).build());
    }

    #[test]
    fn test_nested_insert_plus_retain() {
        let inner_b = Delta::builder().insert("b").build();
        let a = Delta::builder().insert(Delta::builder().insert("a").build()).build();
        let b = Delta::builder()
            .retain_with(inner_b.clone(), attrs(json!({"bold": true, "color": "red"})))
            .build();
        let expected = Delta::builder()
            .retain(1)
            .retain_with(inner_b, attrs(json!({"bold": true, "color": "red"})))
            .build();
        assert_eq!(a.transform(&b, true), expected);
    }

    #[test]
    fn test_nested_insert_plus_delete() {
        let a = Delta::builder().insert(Delta::builder().insert("a").build()).build();
        let b = Delta::builder().delete(2).build();
        assert_eq!(a.transform(&b, false), Delta::builder().retain(1).delete(2).build());
    }

    #[test]
    fn test_nested_retain_plus_retain() {
        let a = Delta::builder().retain(Delta::builder().insert("a").build()).build();
        let b = Delta::builder()
            .retain_with(
                Delta::builder().insert("b").build(),
                attrs(json!({"bold": true, "color": "red"})),
            )
            .build();

        let expected_priority = Delta::builder()
            .retain_with(
                Delta::builder().retain(1).insert("b").build(),
                attrs(json!({"bold": true, "color": "red"})),
            )
            .build();
        assert_eq!(a.transform(&b, true), expected_priority);

        let expected = Delta::builder()
            .retain_with(
                Delta::builder().insert("b").build(),
                attrs(json!({"bold": true, "color": "red"})),
            )
            .build();
        assert_eq!(a.transform(&b, false), expected);
    }

    #[test]
    fn test_nested_retain_against_count_retain_stays_count() {
        let a = Delta::builder().retain(Delta::builder().insert("a").build()).build();
        let b = Delta::builder().retain_with(1, attrs(json!({"bold": true}))).build();
        assert_eq!(
            a.transform(&b, false),
            Delta::builder().retain_with(1, attrs(json!({"bold": true}))).build()
        );
    }

    #[test]
    fn test_nested_retains_cancelling_out_collapse_to_count() {
        let a = Delta::builder()
            .retain(Delta::builder().delete(1).build())
            .build();
        let b = Delta::builder()
            .retain_with(
                Delta::builder().delete(1).build(),
                attrs(json!({"bold": true})),
            )
            .build();
        assert_eq!(
            a.transform(&b, false),
            Delta::builder().retain_with(1, attrs(json!({"bold": true}))).build()
        );
    }

    #[test]
    fn test_immutability() {
        let a1 = Delta::builder().insert("A").build();
        let a2 = a1.clone();
        let b1 = Delta::builder().insert("B").build();
        let b2 = b1.clone();
        let expected = Delta::builder().retain(1).insert("B").build();
        assert_eq!(a1.transform(&b1, true), expected);
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }

    #[test]
    fn test_transform_position_insert_before() {
        let delta = Delta::builder().insert("A").build();
        assert_eq!(delta.transform_position(2, false), 3);
    }

    #[test]
    fn test_transform_position_insert_before_with_priority() {
        let delta = Delta::builder().insert("A").build();
        assert_eq!(delta.transform_position(0, true), 0);
        assert_eq!(delta.transform_position(0, false), 1);
    }

    #[test]
    fn test_transform_position_insert_after() {
        let delta = Delta::builder().retain(2).insert("A").build();
        assert_eq!(delta.transform_position(1, false), 1);
    }

    #[test]
    fn test_transform_position_delete_before_and_across() {
        let delta = Delta::builder().delete(2).build();
        assert_eq!(delta.transform_position(4, false), 2);
        let delta = Delta::builder().retain(1).delete(4).build();
        assert_eq!(delta.transform_position(2, false), 1);
    }

    #[test]
    fn test_transform_position_delete_after() {
        let delta = Delta::builder().retain(2).delete(2).build();
        assert_eq!(delta.transform_position(1, false), 1);
    }

    #[test]
    fn test_transform_position_insert_and_delete() {
        let delta = Delta::builder().retain(2).insert("A").delete(2).build();
        assert_eq!(delta.transform_position(2, false), 3);
        assert_eq!(delta.transform_position(3, true), 3);
        assert_eq!(delta.transform_position(4, false), 3);
    }

    #[test]
    fn test_transform_position_nested_units_count_once() {
        let delta = Delta::builder()
            .insert(Delta::builder().insert("long nested text").build())
            .build();
        assert_eq!(delta.transform_position(0, false), 1);
    }
}

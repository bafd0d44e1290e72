//! DeltaBuilder: the only place a run list is mutated
//!
//! Every push keeps the list canonical:
//!
//! 1. adjacent deletes merge
//! 2. an insert pushed after a delete moves in front of it
//! 3. adjacent runs of the same kind, attributes and (absent) key merge
//! 4. zero-length runs are dropped
//! 5. [`DeltaBuilder::build`] trims a trailing bare retain
//!
//! Once built, a [`Delta`] is immutable; algebra operations build fresh ones.

use super::attributes::AttributeMap;
use super::op::{InsertPayload, Op, OpKind, RetainPayload};
use super::Delta;

/// Accumulates runs in canonical form
#[derive(Debug, Clone, Default)]
pub struct DeltaBuilder {
    pub(super) ops: Vec<Op>,
}

impl DeltaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
        }
    }

    /// Append an insert run without attributes
    pub fn insert(&mut self, payload: impl Into<InsertPayload>) -> &mut Self {
        self.push(Op::insert(payload))
    }

    /// Append an attributed insert run
    pub fn insert_with(
        &mut self,
        payload: impl Into<InsertPayload>,
        attributes: AttributeMap,
    ) -> &mut Self {
        self.push(Op::insert(payload).with_attributes(Some(attributes)))
    }

    /// Append an insert run tagged with an identity key
    pub fn insert_keyed(
        &mut self,
        payload: impl Into<InsertPayload>,
        attributes: Option<AttributeMap>,
        key: u64,
    ) -> &mut Self {
        self.push(
            Op::insert(payload)
                .with_attributes(attributes)
                .with_key(Some(key)),
        )
    }

    /// Append a retain run without attributes
    pub fn retain(&mut self, payload: impl Into<RetainPayload>) -> &mut Self {
        self.push(Op::retain(payload))
    }

    /// Append an attributed retain run
    pub fn retain_with(
        &mut self,
        payload: impl Into<RetainPayload>,
        attributes: AttributeMap,
    ) -> &mut Self {
        self.push(Op::retain(payload).with_attributes(Some(attributes)))
    }

    /// Append a delete run
    pub fn delete(&mut self, length: usize) -> &mut Self {
        self.push(Op::delete(length))
    }

    /// Append any run, merging or reordering it to keep the list canonical
    pub fn push(&mut self, mut op: Op) -> &mut Self {
        if op.is_empty() {
            return self;
        }
        if op.attributes.as_ref().is_some_and(AttributeMap::is_empty) {
            op.attributes = None;
        }
        if op.is_delete() {
            op.attributes = None;
        }
        if !op.accepts_key() {
            op.key = None;
        }

        let mut index = self.ops.len();
        if let Some(last) = self.ops.last_mut() {
            if let (OpKind::Delete(last_length), OpKind::Delete(length)) = (&mut last.kind, &op.kind) {
                *last_length += length;
                return self;
            }

            // Insert and delete at the same position commute; insert goes first
            if last.is_delete() && op.is_insert() {
                index -= 1;
                if index == 0 {
                    self.ops.insert(0, op);
                    return self;
                }
            }
        }

        if index > 0 {
            let previous = &mut self.ops[index - 1];
            if merge_into(previous, &op) {
                return self;
            }
        }

        self.ops.insert(index, op);
        self
    }

    /// Append every run of `ops`
    pub fn extend<I>(&mut self, ops: I) -> &mut Self
    where
        I: IntoIterator<Item = Op>,
    {
        for op in ops {
            self.push(op);
        }
        self
    }

    /// Last run pushed so far
    pub fn last(&self) -> Option<&Op> {
        self.ops.last()
    }

    /// Drop a trailing retain that carries no attributes
    pub fn chop(&mut self) -> &mut Self {
        if self.ops.last().is_some_and(Op::is_bare_retain) {
            self.ops.pop();
        }
        self
    }

    /// Finish building: trims the trailing bare retain and hands out the delta
    pub fn build(&mut self) -> Delta {
        self.chop();
        Delta {
            ops: std::mem::take(&mut self.ops),
        }
    }
}

impl From<Delta> for DeltaBuilder {
    fn from(delta: Delta) -> Self {
        Self { ops: delta.ops }
    }
}

/// Fold `op` into `previous` when both are the same mergeable kind
fn merge_into(previous: &mut Op, op: &Op) -> bool {
    if previous.attributes != op.attributes || previous.key.is_some() || op.key.is_some() {
        return false;
    }
    match (&mut previous.kind, &op.kind) {
        (OpKind::Insert(InsertPayload::Text(text)), OpKind::Insert(InsertPayload::Text(more))) => {
            text.push_str(more);
            true
        }
        (OpKind::Insert(InsertPayload::Embed(count)), OpKind::Insert(InsertPayload::Embed(more))) => {
            *count += more;
            true
        }
        (OpKind::Retain(RetainPayload::Count(count)), OpKind::Retain(RetainPayload::Count(more))) => {
            *count = count.saturating_add(*more);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn attrs(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_insert_text() {
        let delta = Delta::builder().insert("test").build();
        assert_eq!(delta.ops(), &[Op::insert("test")]);
    }

    #[test]
    fn test_insert_empty_text_is_noop() {
        let delta = Delta::builder().insert("").build();
        assert!(delta.ops().is_empty());
    }

    #[test]
    fn test_zero_length_runs_are_dropped() {
        let delta = Delta::builder()
            .insert(0)
            .retain(0)
            .delete(0)
            .insert("a")
            .delete(0)
            .build();
        assert_eq!(delta.ops(), &[Op::insert("a")]);
    }

    #[test]
    fn test_insert_with_empty_attributes_is_plain() {
        let delta = Delta::builder().insert_with("a", AttributeMap::new()).build();
        assert_eq!(delta.ops(), &[Op::insert("a")]);
    }

    #[test]
    fn test_consecutive_deletes_merge() {
        let delta = Delta::builder().delete(2).delete(3).build();
        assert_eq!(delta.ops(), &[Op::delete(5)]);
    }

    #[test]
    fn test_consecutive_text_with_same_attributes_merges() {
        let bold = attrs(json!({"bold": true}));
        let delta = Delta::builder()
            .insert_with("a", bold.clone())
            .insert_with("b", bold.clone())
            .build();
        assert_eq!(
            delta.ops(),
            &[Op::insert("ab").with_attributes(Some(bold))]
        );
    }

    #[test]
    fn test_consecutive_text_with_different_attributes_stays_split() {
        let delta = Delta::builder()
            .insert_with("a", attrs(json!({"bold": true})))
            .insert("b")
            .build();
        assert_eq!(delta.ops().len(), 2);
    }

    #[test]
    fn test_consecutive_embeds_and_retains_merge() {
        let delta = Delta::builder()
            .retain(2)
            .retain(3)
            .insert(1)
            .insert(2)
            .build();
        assert_eq!(delta.ops(), &[Op::retain(5), Op::insert(3)]);
    }

    #[test]
    fn test_keyed_embeds_never_merge() {
        let delta = Delta::builder()
            .insert_keyed(1, None, 1)
            .insert_keyed(1, None, 2)
            .insert(1)
            .build();
        assert_eq!(delta.ops().len(), 3);
        assert_eq!(delta.ops()[0].key, Some(1));
        assert_eq!(delta.ops()[2].key, None);
    }

    #[test]
    fn test_key_dropped_where_meaningless() {
        let delta = Delta::builder().insert_keyed("text", None, 4).build();
        assert_eq!(delta.ops()[0].key, None);
    }

    #[test]
    fn test_insert_after_delete_is_reordered() {
        let delta = Delta::builder().delete(1).insert("a").build();
        assert_eq!(delta.ops(), &[Op::insert("a"), Op::delete(1)]);
    }

    #[test]
    fn test_insert_after_delete_merges_with_earlier_insert() {
        let delta = Delta::builder().insert("a").delete(1).insert("b").build();
        assert_eq!(delta.ops(), &[Op::insert("ab"), Op::delete(1)]);
    }

    #[test]
    fn test_insert_after_delete_with_different_attributes() {
        let bold = attrs(json!({"bold": true}));
        let delta = Delta::builder()
            .retain(1)
            .delete(1)
            .insert_with("a", bold.clone())
            .build();
        assert_eq!(
            delta.ops(),
            &[
                Op::retain(1),
                Op::insert("a").with_attributes(Some(bold)),
                Op::delete(1)
            ]
        );
    }

    #[test]
    fn test_build_chops_trailing_bare_retain() {
        let delta = Delta::builder().insert("a").retain(4).build();
        assert_eq!(delta.ops(), &[Op::insert("a")]);
    }

    #[test]
    fn test_build_keeps_attributed_trailing_retain() {
        let bold = attrs(json!({"bold": true}));
        let delta = Delta::builder().retain_with(4, bold.clone()).build();
        assert_eq!(
            delta.ops(),
            &[Op::retain(4).with_attributes(Some(bold))]
        );
    }

    #[test]
    fn test_build_keeps_trailing_delta_retain() {
        let inner = Delta::builder().insert("x").build();
        let delta = Delta::builder().retain(inner.clone()).build();
        assert_eq!(delta.ops(), &[Op::retain(inner)]);
    }
}

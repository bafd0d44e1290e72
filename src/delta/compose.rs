//! Compose: fold two sequential changes into one

use super::attributes;
use super::builder::DeltaBuilder;
use super::op::{InsertPayload, Op, OpKind, OpType, RetainPayload};
use super::Delta;
use crate::error::{DeltaError, Result};

impl Delta {
    /// Change equivalent to applying `self` and then `other`.
    ///
    /// # Errors
    ///
    /// [`DeltaError::IllegalComposition`] when `other` edits inside a unit
    /// that `self` inserted as plain text.
    pub fn compose(&self, other: &Delta) -> Result<Delta> {
        let mut this_iter = self.iter();
        let mut other_iter = other.iter();
        let mut delta = DeltaBuilder::with_capacity(self.ops.len() + other.ops.len());

        // Leading inserts covered by other's first bare retain pass through verbatim
        if let Some(first) = other_iter.peek() {
            if let (OpKind::Retain(RetainPayload::Count(first_retain)), None) =
                (&first.kind, &first.attributes)
            {
                let mut first_left = *first_retain;
                while this_iter.peek_type() == OpType::Insert && this_iter.peek_length() <= first_left
                {
                    first_left -= this_iter.peek_length();
                    delta.push(this_iter.next_op());
                }
                if first_retain - first_left > 0 {
                    other_iter.next(first_retain - first_left);
                }
            }
        }

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_type() == OpType::Insert {
                delta.push(other_iter.next_op());
                continue;
            }
            if this_iter.peek_type() == OpType::Delete {
                delta.push(this_iter.next_op());
                continue;
            }

            let length = this_iter.peek_length().min(other_iter.peek_length());
            let this_op = this_iter.next(length);
            let other_op = other_iter.next(length);

            match other_op.kind {
                OpKind::Retain(RetainPayload::Count(_)) => {
                    let keep_null = matches!(this_op.kind, OpKind::Retain(_));
                    let attributes = attributes::compose(
                        this_op.attributes.as_ref(),
                        other_op.attributes.as_ref(),
                        keep_null,
                    );
                    let kind = match this_op.kind {
                        OpKind::Retain(RetainPayload::Count(_)) => {
                            OpKind::Retain(RetainPayload::Count(length))
                        }
                        kind => kind,
                    };
                    let op = Op {
                        kind,
                        attributes,
                        key: this_op.key,
                    };
                    let pushed = (!other_iter.has_next()).then(|| op.clone());
                    delta.push(op);

                    // Other is exhausted and the run landed as is: the rest of this passes through
                    if pushed.is_some() && delta.last() == pushed.as_ref() {
                        return Ok(delta.extend(this_iter.rest()).build());
                    }
                }
                OpKind::Retain(RetainPayload::Delta(other_inner)) => {
                    delta.push(compose_nested(this_op, other_inner, other_op.attributes)?);
                }
                OpKind::Delete(_) => {
                    // An insert followed by its own deletion cancels out
                    if !this_op.is_insert() {
                        delta.push(Op::delete(length));
                    }
                }
                // Inserts in other and deletes in this are emitted before alignment
                OpKind::Insert(_) => {}
            }
        }

        Ok(delta.build())
    }
}

/// Apply a delta-valued retain to the aligned unit of the first change
fn compose_nested(
    this_op: Op,
    other_inner: Delta,
    other_attributes: Option<attributes::AttributeMap>,
) -> Result<Op> {
    let this_attributes = this_op.attributes.as_ref();
    let other_attributes = other_attributes.as_ref();

    let op = match this_op.kind {
        OpKind::Retain(RetainPayload::Count(_)) => Op::retain(other_inner)
            .with_attributes(attributes::compose(this_attributes, other_attributes, true)),
        OpKind::Retain(RetainPayload::Delta(this_inner)) => {
            let inner = this_inner.compose(&other_inner)?;
            let payload = if inner.len() == 0 {
                RetainPayload::Count(1)
            } else {
                RetainPayload::Delta(inner)
            };
            Op::retain(payload)
                .with_attributes(attributes::compose(this_attributes, other_attributes, false))
        }
        OpKind::Insert(InsertPayload::Delta(this_inner)) => {
            let inner = this_inner.compose(&other_inner)?;
            let payload = if inner.len() == 0 {
                InsertPayload::Embed(1)
            } else {
                InsertPayload::Delta(inner)
            };
            Op::insert(payload)
                .with_attributes(attributes::compose(this_attributes, other_attributes, false))
                .with_key(this_op.key)
        }
        // An opaque embed has no structure; the nested edit defines the content
        OpKind::Insert(InsertPayload::Embed(_)) => Op::insert(other_inner)
            .with_attributes(attributes::compose(this_attributes, other_attributes, true))
            .with_key(this_op.key),
        OpKind::Insert(InsertPayload::Text(text)) => {
            tracing::warn!(target: "deltakit.compose", text = %text, "delta_retain_on_text_insert");
            return Err(DeltaError::IllegalComposition(format!(
                "cannot apply a nested delta to text insert {:?}",
                text
            )));
        }
        OpKind::Delete(_) => {
            return Err(DeltaError::IllegalComposition(
                "nested delta aligned with a delete".to_string(),
            ))
        }
    };
    Ok(op)
}

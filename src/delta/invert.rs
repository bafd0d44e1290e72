//! Invert: the changeset that undoes another one

use super::attributes;
use super::builder::DeltaBuilder;
use super::op::{InsertPayload, Op, OpKind, RetainPayload};
use super::Delta;
use crate::error::{DeltaError, Result};

impl Delta {
    /// Changeset that reverts `self`, given the document `base` it was applied to.
    ///
    /// `base.compose(self)?.compose(&self.invert(base)?)? == base`
    ///
    /// # Errors
    ///
    /// [`DeltaError::IllegalComposition`] when a nested retain points at a
    /// unit of `base` that is not an embed.
    pub fn invert(&self, base: &Delta) -> Result<Delta> {
        let mut inverted = DeltaBuilder::with_capacity(self.ops.len());
        let mut base_index = 0;

        for op in &self.ops {
            match &op.kind {
                OpKind::Insert(_) => {
                    inverted.delete(op.len());
                }
                OpKind::Retain(RetainPayload::Count(length)) if op.attributes.is_none() => {
                    inverted.retain(*length);
                    base_index += length;
                }
                OpKind::Delete(length) | OpKind::Retain(RetainPayload::Count(length)) => {
                    for base_op in base.slice_ops(base_index, base_index + length) {
                        if op.is_delete() {
                            inverted.push(base_op);
                        } else {
                            let attributes = attributes::invert(
                                op.attributes.as_ref(),
                                base_op.attributes.as_ref(),
                            );
                            inverted.push(Op::retain(base_op.len()).with_attributes(attributes));
                        }
                    }
                    base_index += length;
                }
                OpKind::Retain(RetainPayload::Delta(inner)) => {
                    let base_op = base
                        .slice_ops(base_index, base_index + 1)
                        .into_iter()
                        .next();
                    inverted.push(invert_nested(op, inner, base_op)?);
                    base_index += 1;
                }
            }
        }

        Ok(inverted.build())
    }
}

fn invert_nested(op: &Op, inner: &Delta, base_op: Option<Op>) -> Result<Op> {
    let Some(base_op) = base_op else {
        tracing::warn!(target: "deltakit.invert", "nested_retain_past_end_of_base");
        return Err(DeltaError::IllegalComposition(
            "nested retain past the end of the base document".to_string(),
        ));
    };

    let attributes = attributes::invert(op.attributes.as_ref(), base_op.attributes.as_ref());

    let payload = match &base_op.kind {
        // The nested change turned an empty embed into content: remove it again
        OpKind::Insert(InsertPayload::Embed(_)) => {
            Delta::builder().delete(inner.len()).build()
        }
        OpKind::Insert(InsertPayload::Delta(base_inner)) => inner.invert(base_inner)?,
        kind => {
            tracing::warn!(target: "deltakit.invert", base = ?kind, "cannot_invert_nested_retain");
            return Err(DeltaError::IllegalComposition(format!(
                "cannot invert a nested retain over {:?}",
                kind
            )));
        }
    };

    Ok(Op::retain(payload).with_attributes(attributes))
}

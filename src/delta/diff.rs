//! Diff: minimal changeset between two documents
//!
//! Both documents are flattened into one atom per unit of length, diffed with
//! the sequence engine, and the resulting runs are replayed over the original
//! runs so attributes and nested documents come back intact.

use super::attributes;
use super::builder::DeltaBuilder;
use super::op::{InsertPayload, Op, OpKind, RetainPayload};
use super::Delta;
use crate::error::{DeltaError, Result};
use crate::sequence::{self, CursorHint, DiffItem, DiffOp};

/// One unit of a flattened document
#[derive(Debug, Clone, PartialEq)]
enum Atom {
    Char(char),
    Key(u64),
}

impl DiffItem for Atom {}

/// Stand-in for embeds without an identity key
const PLACEHOLDER: Atom = Atom::Char('\0');

impl Delta {
    /// Changeset turning this document into `other`.
    ///
    /// Embeds with the same identity key are matched across both documents,
    /// so a keyed sub-document that moved is inserted once rather than
    /// rewritten in place.
    ///
    /// # Errors
    ///
    /// [`DeltaError::InvalidOperand`] when either side is not a document.
    pub fn diff(&self, other: &Delta) -> Result<Delta> {
        self.diff_inner(other, None)
    }

    /// [`Delta::diff`], preferring the splice that matches the user's cursor
    pub fn diff_with_cursor(&self, other: &Delta, cursor: CursorHint) -> Result<Delta> {
        self.diff_inner(other, Some(cursor))
    }

    fn diff_inner(&self, other: &Delta, cursor: Option<CursorHint>) -> Result<Delta> {
        if std::ptr::eq(self, other) {
            return Ok(Delta::new());
        }

        let this_atoms = linearize(self, "with")?;
        let other_atoms = linearize(other, "on")?;
        let diffs = match cursor {
            Some(hint) => sequence::diff_with_cursor(&this_atoms, &other_atoms, hint),
            None => sequence::diff(&this_atoms, &other_atoms),
        };

        let mut this_iter = self.iter();
        let mut other_iter = other.iter();
        let mut delta = DeltaBuilder::new();

        for diff in diffs {
            let mut length = diff.items.len();
            while length > 0 {
                let op_length = match diff.op {
                    DiffOp::Insert => {
                        let op_length = other_iter.peek_length().min(length);
                        delta.push(other_iter.next(op_length));
                        op_length
                    }
                    DiffOp::Delete => {
                        let op_length = this_iter.peek_length().min(length);
                        this_iter.next(op_length);
                        delta.delete(op_length);
                        op_length
                    }
                    DiffOp::Equal => {
                        let op_length = this_iter
                            .peek_length()
                            .min(other_iter.peek_length())
                            .min(length);
                        let this_op = this_iter.next(op_length);
                        let other_op = other_iter.next(op_length);
                        let attributes =
                            attributes::diff(this_op.attributes.as_ref(), other_op.attributes.as_ref());

                        if this_op.kind == other_op.kind {
                            delta.push(Op::retain(op_length).with_attributes(attributes));
                        } else if let (
                            OpKind::Insert(InsertPayload::Delta(this_inner)),
                            OpKind::Insert(InsertPayload::Delta(other_inner)),
                        ) = (&this_op.kind, &other_op.kind)
                        {
                            let inner = this_inner.diff(other_inner)?;
                            let payload = if inner.is_empty() {
                                RetainPayload::Count(1)
                            } else {
                                RetainPayload::Delta(inner)
                            };
                            delta.push(Op::retain(payload).with_attributes(attributes));
                        } else {
                            // Same identity, different shape: replace outright
                            delta.push(other_op);
                            delta.delete(op_length);
                        }
                        op_length
                    }
                };
                length -= op_length;
            }
        }

        Ok(delta.build())
    }
}

/// One atom per unit of length; `side` names the operand in the error
fn linearize(delta: &Delta, side: &'static str) -> Result<Vec<Atom>> {
    let mut atoms = Vec::with_capacity(delta.len());
    for op in delta.ops() {
        let key_or_placeholder = || op.key.map_or(PLACEHOLDER, Atom::Key);
        match &op.kind {
            OpKind::Insert(InsertPayload::Text(text)) => atoms.extend(text.chars().map(Atom::Char)),
            OpKind::Insert(InsertPayload::Embed(count)) => {
                atoms.extend(std::iter::repeat_with(key_or_placeholder).take(*count))
            }
            OpKind::Insert(InsertPayload::Delta(_)) => atoms.push(key_or_placeholder()),
            OpKind::Retain(_) | OpKind::Delete(_) => return Err(DeltaError::InvalidOperand(side)),
        }
    }
    Ok(atoms)
}

//! Delta: rich-text documents and changesets as canonical run lists
//!
//! A delta is an ordered list of insert/retain/delete runs. The same type
//! plays two roles, told apart only by content:
//!
//! - **document**: inserts only, the actual content
//! - **changeset**: retains, inserts and deletes, a transformation
//!
//! Runs may carry a nested delta, either as inserted content (an embedded
//! sub-document) or as a retain that edits inside one embedded unit. From the
//! outside, such a unit is always exactly one position long.
//!
//! # Algebra
//!
//! - [`Delta::compose`]: `a.compose(b)` applies `a` then `b`
//! - [`Delta::transform`]: rebase a concurrent changeset
//! - [`Delta::invert`]: undo a changeset against the document it applied to
//! - [`Delta::diff`]: minimal changeset between two documents
//!
//! # Example
//!
//! ```rust
//! use deltakit_core::Delta;
//!
//! let doc = Delta::builder().insert("Hello").build();
//! let change = Delta::builder().retain(5).insert(" World").build();
//!
//! let result = doc.compose(&change).unwrap();
//! assert_eq!(result, Delta::builder().insert("Hello World").build());
//!
//! // Undo brings the document back
//! let undo = change.invert(&doc).unwrap();
//! assert_eq!(result.compose(&undo).unwrap(), doc);
//! ```

pub mod attributes;
mod builder;
mod compose;
mod descriptor;
mod diff;
mod invert;
pub mod iter;
pub mod op;
mod transform;

pub use attributes::AttributeMap;
pub use builder::DeltaBuilder;
pub use descriptor::{NestedDescriptor, OpDescriptor, PayloadDescriptor};
pub use iter::OpIter;
pub use op::{InsertPayload, Op, OpKind, OpType, RetainPayload};

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::ops::{Bound, RangeBounds};

/// An immutable, canonical run list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    /// Empty delta: the empty document, or the identity changeset
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a delta
    ///
    /// # Example
    ///
    /// ```rust
    /// use deltakit_core::Delta;
    ///
    /// let delta = Delta::builder().retain(2).delete(1).insert("x").build();
    /// // inserts always sit before a delete at the same position
    /// assert_eq!(delta.ops().len(), 3);
    /// assert!(delta.ops()[1].is_insert());
    /// ```
    pub fn builder() -> DeltaBuilder {
        DeltaBuilder::new()
    }

    /// Canonicalize an arbitrary run list
    pub fn from_ops<I>(ops: I) -> Self
    where
        I: IntoIterator<Item = Op>,
    {
        DeltaBuilder::new().extend(ops).build()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    pub fn iter(&self) -> OpIter<'_> {
        OpIter::new(&self.ops)
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Whether this delta is pure content (inserts only)
    pub fn is_document(&self) -> bool {
        self.ops.iter().all(Op::is_insert)
    }

    /// Sum of all run lengths
    pub fn len(&self) -> usize {
        self.ops.iter().map(Op::len).sum()
    }

    /// Net change in document length: inserts minus deletes
    pub fn change_length(&self) -> isize {
        self.ops.iter().fold(0isize, |length, op| match op.kind {
            OpKind::Insert(_) => length + op.len() as isize,
            OpKind::Delete(deleted) => length - deleted as isize,
            OpKind::Retain(_) => length,
        })
    }

    /// Sub-delta covering `range` of this delta's positions
    pub fn slice<R>(&self, range: R) -> Delta
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => iter::INFINITE_LENGTH,
        };
        Delta::from_ops(self.slice_ops(start, end))
    }

    /// Raw fragments covering `start..end`, split but not re-merged
    pub(crate) fn slice_ops(&self, start: usize, end: usize) -> Vec<Op> {
        let mut ops = Vec::new();
        let mut iter = self.iter();
        let mut index = 0;
        while index < end && iter.has_next() {
            let next = if index < start {
                iter.next(start - index)
            } else {
                let op = iter.next(end - index);
                ops.push(op.clone());
                op
            };
            index += next.len();
        }
        ops
    }

    /// This delta followed by `other`, merging at the seam
    pub fn concat(&self, other: &Delta) -> Delta {
        DeltaBuilder::from(self.clone())
            .extend(other.ops.iter().cloned())
            .build()
    }
}

impl From<Vec<Op>> for Delta {
    fn from(ops: Vec<Op>) -> Self {
        Delta::from_ops(ops)
    }
}

impl Serialize for Delta {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Delta", 1)?;
        state.serialize_field("ops", &self.ops)?;
        state.end()
    }
}

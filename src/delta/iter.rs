//! Cursor over the runs of a delta that can hand out partial runs
//!
//! Past the last run the iterator behaves as if the delta were padded with an
//! infinite bare retain, which is what lets compose and transform walk two
//! deltas of different lengths in lockstep.

use super::op::{InsertPayload, Op, OpKind, OpType, RetainPayload};

/// Length reported past the end of the runs
pub const INFINITE_LENGTH: usize = usize::MAX;

/// Single-pass cursor over a run slice
#[derive(Debug, Clone)]
pub struct OpIter<'a> {
    ops: &'a [Op],
    index: usize,
    offset: usize,
}

impl<'a> OpIter<'a> {
    pub fn new(ops: &'a [Op]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.peek_length() < INFINITE_LENGTH
    }

    /// Current run, if any, ignoring how much of it was already consumed
    pub fn peek(&self) -> Option<&'a Op> {
        self.ops.get(self.index)
    }

    /// Remaining length of the current run, or [`INFINITE_LENGTH`] past the end
    pub fn peek_length(&self) -> usize {
        match self.peek() {
            Some(op) => op.len() - self.offset,
            None => INFINITE_LENGTH,
        }
    }

    /// Type of the current run; retain past the end
    pub fn peek_type(&self) -> OpType {
        self.peek().map_or(OpType::Retain, Op::op_type)
    }

    /// Take the whole remainder of the current run
    pub fn next_op(&mut self) -> Op {
        self.next(INFINITE_LENGTH)
    }

    /// Take at most `max_length` units of the current run.
    ///
    /// Text splits by character, counts split arithmetically. Delta-valued
    /// runs are atomic and always come out whole. Attributes and key are
    /// copied onto every fragment.
    pub fn next(&mut self, max_length: usize) -> Op {
        let Some(op) = self.ops.get(self.index) else {
            return Op::retain(INFINITE_LENGTH);
        };

        let offset = self.offset;
        let remaining = op.len() - offset;
        let atomic = matches!(
            op.kind,
            OpKind::Retain(RetainPayload::Delta(_)) | OpKind::Insert(InsertPayload::Delta(_))
        );
        let length = if atomic || max_length >= remaining {
            self.index += 1;
            self.offset = 0;
            remaining
        } else {
            self.offset += max_length;
            max_length
        };

        let kind = match &op.kind {
            OpKind::Delete(_) => return Op::delete(length),
            OpKind::Retain(RetainPayload::Count(_)) => OpKind::Retain(RetainPayload::Count(length)),
            OpKind::Insert(InsertPayload::Text(text)) => {
                OpKind::Insert(InsertPayload::Text(char_slice(text, offset, length)))
            }
            OpKind::Insert(InsertPayload::Embed(_)) => OpKind::Insert(InsertPayload::Embed(length)),
            OpKind::Retain(RetainPayload::Delta(_)) | OpKind::Insert(InsertPayload::Delta(_)) => {
                op.kind.clone()
            }
        };

        Op {
            kind,
            attributes: op.attributes.clone(),
            key: op.key,
        }
    }

    /// Drain and return every remaining run without further splitting
    pub fn rest(&mut self) -> Vec<Op> {
        if !self.has_next() {
            return Vec::new();
        }
        let mut rest = Vec::with_capacity(self.ops.len() - self.index);
        if self.offset > 0 {
            rest.push(self.next_op());
        }
        rest.extend_from_slice(&self.ops[self.index..]);
        self.index = self.ops.len();
        self.offset = 0;
        rest
    }
}

fn char_slice(text: &str, start: usize, length: usize) -> String {
    text.chars().skip(start).take(length).collect()
}

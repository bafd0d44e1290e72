//! Op: one insert, retain or delete run of a delta
//!
//! Payloads are closed sum types, so every combination the algebra has to
//! handle is visible to the compiler:
//!
//! - insert: text, a count of opaque embeds, or one embedded sub-document
//! - retain: a count, or a nested delta edited inside one embedded unit
//! - delete: a count

use super::attributes::AttributeMap;
use super::Delta;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Payload of an insert run
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPayload {
    /// Ordered characters; length is the number of `char`s
    Text(String),

    /// `n` indivisible embedded units
    Embed(usize),

    /// One embedded sub-document
    Delta(Delta),
}

/// Payload of a retain run
#[derive(Debug, Clone, PartialEq)]
pub enum RetainPayload {
    /// Keep `n` units unchanged (possibly reformatting them)
    Count(usize),

    /// Edit the inside of the single embedded unit at the cursor
    Delta(Delta),
}

/// What a run does
#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    Insert(InsertPayload),
    Retain(RetainPayload),
    Delete(usize),
}

/// Discriminant of a run, as reported by the run iterator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Insert,
    Retain,
    Delete,
}

/// A single run: kind plus optional attributes and identity key
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    pub kind: OpKind,

    /// Formatting attributes; never `Some` of an empty map once inside a delta
    pub attributes: Option<AttributeMap>,

    /// Identity key correlating the same embedded unit across two versions
    pub key: Option<u64>,
}

impl Op {
    /// Insert run without attributes
    pub fn insert(payload: impl Into<InsertPayload>) -> Self {
        Self::from_kind(OpKind::Insert(payload.into()))
    }

    /// Retain run without attributes
    pub fn retain(payload: impl Into<RetainPayload>) -> Self {
        Self::from_kind(OpKind::Retain(payload.into()))
    }

    /// Delete run
    pub fn delete(length: usize) -> Self {
        Self::from_kind(OpKind::Delete(length))
    }

    fn from_kind(kind: OpKind) -> Self {
        Self {
            kind,
            attributes: None,
            key: None,
        }
    }

    /// Replace the attributes of this run
    pub fn with_attributes(mut self, attributes: Option<AttributeMap>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Replace the identity key of this run
    pub fn with_key(mut self, key: Option<u64>) -> Self {
        self.key = key;
        self
    }

    /// Length the run occupies in the surrounding document.
    ///
    /// Delta-valued runs always count as one unit, however large the nested
    /// document is.
    pub fn len(&self) -> usize {
        match &self.kind {
            OpKind::Delete(length) => *length,
            OpKind::Retain(RetainPayload::Count(length)) => *length,
            OpKind::Retain(RetainPayload::Delta(_)) => 1,
            OpKind::Insert(InsertPayload::Text(text)) => text.chars().count(),
            OpKind::Insert(InsertPayload::Embed(count)) => *count,
            OpKind::Insert(InsertPayload::Delta(_)) => 1,
        }
    }

    /// Whether the run occupies no length at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn op_type(&self) -> OpType {
        match self.kind {
            OpKind::Insert(_) => OpType::Insert,
            OpKind::Retain(_) => OpType::Retain,
            OpKind::Delete(_) => OpType::Delete,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self.kind, OpKind::Insert(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self.kind, OpKind::Delete(_))
    }

    /// Retain of a plain count with no attributes: a no-op over its span
    pub fn is_bare_retain(&self) -> bool {
        matches!(self.kind, OpKind::Retain(RetainPayload::Count(_))) && self.attributes.is_none()
    }

    /// Whether an identity key means anything on this run
    pub(crate) fn accepts_key(&self) -> bool {
        matches!(
            self.kind,
            OpKind::Insert(InsertPayload::Embed(1)) | OpKind::Insert(InsertPayload::Delta(_))
        )
    }
}

impl From<&str> for InsertPayload {
    fn from(text: &str) -> Self {
        InsertPayload::Text(text.to_string())
    }
}

impl From<String> for InsertPayload {
    fn from(text: String) -> Self {
        InsertPayload::Text(text)
    }
}

impl From<usize> for InsertPayload {
    fn from(count: usize) -> Self {
        InsertPayload::Embed(count)
    }
}

impl From<Delta> for InsertPayload {
    fn from(delta: Delta) -> Self {
        InsertPayload::Delta(delta)
    }
}

impl From<usize> for RetainPayload {
    fn from(count: usize) -> Self {
        RetainPayload::Count(count)
    }
}

impl From<Delta> for RetainPayload {
    fn from(delta: Delta) -> Self {
        RetainPayload::Delta(delta)
    }
}

// Run objects: {"insert": ..., "attributes": {...}, "key": n}
impl Serialize for Op {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        match &self.kind {
            OpKind::Insert(InsertPayload::Text(text)) => map.serialize_entry("insert", text)?,
            OpKind::Insert(InsertPayload::Embed(count)) => map.serialize_entry("insert", count)?,
            OpKind::Insert(InsertPayload::Delta(delta)) => map.serialize_entry("insert", delta)?,
            OpKind::Retain(RetainPayload::Count(count)) => map.serialize_entry("retain", count)?,
            OpKind::Retain(RetainPayload::Delta(delta)) => map.serialize_entry("retain", delta)?,
            OpKind::Delete(length) => map.serialize_entry("delete", length)?,
        }
        if let Some(attributes) = &self.attributes {
            map.serialize_entry("attributes", attributes)?;
        }
        if let Some(key) = self.key {
            map.serialize_entry("key", &key)?;
        }
        map.end()
    }
}

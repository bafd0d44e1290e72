//! Run descriptors: plain, loosely typed run records used to build a delta
//! from outside data (JSON, host bindings)
//!
//! A descriptor populates exactly one of `insert`, `retain` or `delete`.
//! Nested payloads may be given as an already built [`Delta`] or as a raw
//! list of descriptors, which is promoted to a nested delta on load.
//!
//! # Example
//!
//! ```rust
//! use deltakit_core::Delta;
//!
//! let delta: Delta = serde_json::from_str(
//!     r#"{"ops": [
//!         {"insert": "Hello", "attributes": {"bold": true}},
//!         {"insert": [{"insert": "caption"}], "key": 7}
//!     ]}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(delta.len(), 6);
//! assert_eq!(delta.ops()[1].key, Some(7));
//! ```

use super::attributes::AttributeMap;
use super::op::{InsertPayload, Op, OpKind, RetainPayload};
use super::Delta;
use crate::error::{DeltaError, Result};
use serde::{Deserialize, Deserializer};

/// One run as supplied from outside
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpDescriptor {
    pub insert: Option<PayloadDescriptor>,
    pub retain: Option<PayloadDescriptor>,
    pub delete: Option<usize>,
    pub attributes: Option<AttributeMap>,
    pub key: Option<u64>,
}

/// Insert or retain payload as supplied from outside
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PayloadDescriptor {
    Text(String),
    Count(usize),
    Nested(NestedDescriptor),
}

/// Nested document payload: raw descriptors or a built delta
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NestedDescriptor {
    Raw(Vec<OpDescriptor>),
    Built(Delta),
}

impl OpDescriptor {
    fn into_op(self) -> std::result::Result<Op, String> {
        let kind = match (self.insert, self.retain, self.delete) {
            (Some(payload), None, None) => OpKind::Insert(payload.into_insert()?),
            (None, Some(payload), None) => OpKind::Retain(payload.into_retain()?),
            (None, None, Some(length)) => OpKind::Delete(length),
            (None, None, None) => return Err("none of insert, retain, delete is set".to_string()),
            _ => return Err("more than one of insert, retain, delete is set".to_string()),
        };
        Ok(Op {
            kind,
            attributes: self.attributes,
            key: self.key,
        })
    }
}

impl PayloadDescriptor {
    fn into_insert(self) -> std::result::Result<InsertPayload, String> {
        Ok(match self {
            PayloadDescriptor::Text(text) => InsertPayload::Text(text),
            PayloadDescriptor::Count(count) => InsertPayload::Embed(count),
            PayloadDescriptor::Nested(nested) => InsertPayload::Delta(nested.into_delta()?),
        })
    }

    fn into_retain(self) -> std::result::Result<RetainPayload, String> {
        match self {
            PayloadDescriptor::Text(text) => Err(format!("text {:?} is not a retain payload", text)),
            PayloadDescriptor::Count(count) => Ok(RetainPayload::Count(count)),
            PayloadDescriptor::Nested(nested) => Ok(RetainPayload::Delta(nested.into_delta()?)),
        }
    }
}

impl NestedDescriptor {
    fn into_delta(self) -> std::result::Result<Delta, String> {
        match self {
            NestedDescriptor::Raw(descriptors) => {
                Delta::from_descriptors(descriptors).map_err(|err| format!("nested: {}", err))
            }
            NestedDescriptor::Built(delta) => Ok(delta),
        }
    }
}

impl From<Delta> for PayloadDescriptor {
    fn from(delta: Delta) -> Self {
        PayloadDescriptor::Nested(NestedDescriptor::Built(delta))
    }
}

impl From<Vec<OpDescriptor>> for PayloadDescriptor {
    fn from(descriptors: Vec<OpDescriptor>) -> Self {
        PayloadDescriptor::Nested(NestedDescriptor::Raw(descriptors))
    }
}

impl From<&str> for PayloadDescriptor {
    fn from(text: &str) -> Self {
        PayloadDescriptor::Text(text.to_string())
    }
}

impl From<usize> for PayloadDescriptor {
    fn from(count: usize) -> Self {
        PayloadDescriptor::Count(count)
    }
}

impl Delta {
    /// Build a canonical delta from run descriptors
    ///
    /// # Errors
    ///
    /// [`DeltaError::Descriptor`] naming the first offending run.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Delta>
    where
        I: IntoIterator<Item = OpDescriptor>,
    {
        let mut builder = Delta::builder();
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let op = descriptor
                .into_op()
                .map_err(|reason| DeltaError::Descriptor(format!("run {}: {}", index, reason)))?;
            builder.push(op);
        }
        Ok(builder.build())
    }

    /// Parse the `{"ops": [...]}` JSON form
    pub fn from_json(json: &str) -> Result<Delta> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the `{"ops": [...]}` JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct DeltaHelper {
            ops: Vec<OpDescriptor>,
        }

        let helper = DeltaHelper::deserialize(deserializer)?;
        Delta::from_descriptors(helper.ops).map_err(serde::de::Error::custom)
    }
}

//! Wire format for deltas
//!
//! Newline-delimited JSON, one positional array per run:
//!
//! | Run | Encoding |
//! |---|---|
//! | insert | `[payload]` or `[payload, attributes]` |
//! | retain | `[payload, 2]` or `[payload, attributes, 2]` |
//! | delete | `[length, 3]` |
//!
//! A payload is a string (text), a number (embed count or retain length), or
//! a list of run arrays (nested delta). Identity keys are not encoded; use
//! the serde JSON form of [`crate::Delta`] when they must travel.

pub mod serialize;

pub use serialize::{parse, stringify};

//! DeltaKit Core - Operational transform over rich-text deltas
//!
//! This is the Rust core of DeltaKit, compiled to both native and WASM.
//! It implements:
//! - Delta documents and changesets with nested sub-documents
//! - Attribute algebra (compose, transform, invert, diff)
//! - Compose, transform, invert and diff over deltas
//! - A generic Myers sequence diff with cursor hints
//! - Line-per-run wire encoding/decoding
//!
//! # Examples
//!
//! ```rust
//! use deltakit_core::Delta;
//!
//! let doc = Delta::builder().insert("Hello").build();
//!
//! // Two concurrent edits against the same document
//! let alice = Delta::builder().retain(5).insert("!").build();
//! let bob = Delta::builder().insert("Oh, ").build();
//!
//! let alice_then_bob = doc
//!     .compose(&alice)
//!     .unwrap()
//!     .compose(&alice.transform(&bob, true))
//!     .unwrap();
//! let bob_then_alice = doc
//!     .compose(&bob)
//!     .unwrap()
//!     .compose(&bob.transform(&alice, false))
//!     .unwrap();
//!
//! assert_eq!(alice_then_bob, bob_then_alice);
//! assert_eq!(alice_then_bob, Delta::builder().insert("Oh, Hello!").build());
//! ```

pub mod delta;
pub mod error;
pub mod protocol;
pub mod sequence;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use delta::{
    AttributeMap, Delta, DeltaBuilder, InsertPayload, Op, OpDescriptor, OpIter, OpKind, OpType,
    RetainPayload,
};
pub use error::{DeltaError, Result};
pub use sequence::{CursorHint, Range};

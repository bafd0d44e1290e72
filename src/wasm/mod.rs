//! WASM bindings for DeltaKit
//!
//! This module exposes the delta operation surface to JavaScript. Deltas
//! cross the boundary as JSON (`{"ops": [...]}`) or as the line-per-run wire
//! form.

#[cfg(feature = "wasm")]
pub mod bindings;

#[cfg(feature = "wasm")]
pub mod utils;

// Re-export main types
#[cfg(feature = "wasm")]
pub use bindings::WasmDelta;

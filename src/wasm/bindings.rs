//! JavaScript bindings for DeltaKit core types

use crate::delta::Delta;
use crate::error::DeltaError;
use crate::protocol;
use crate::sequence::{CursorHint, Range};
use wasm_bindgen::prelude::*;

fn to_js_error(context: &str, err: DeltaError) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

/// JavaScript-friendly wrapper for Delta
#[wasm_bindgen]
#[derive(Clone)]
pub struct WasmDelta {
    inner: Delta,
}

#[wasm_bindgen]
impl WasmDelta {
    /// Create an empty delta
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { inner: Delta::new() }
    }

    /// Load from the `{"ops": [...]}` JSON form
    #[wasm_bindgen(js_name = fromJSON)]
    pub fn from_json(json: &str) -> Result<WasmDelta, JsValue> {
        Delta::from_json(json)
            .map(|inner| WasmDelta { inner })
            .map_err(|e| to_js_error("Invalid delta JSON", e))
    }

    /// Load from the line-per-run wire form
    #[wasm_bindgen(js_name = parse)]
    pub fn parse(lines: &str) -> Result<WasmDelta, JsValue> {
        protocol::parse(lines)
            .map(|inner| WasmDelta { inner })
            .map_err(|e| to_js_error("Parse failed", e))
    }

    /// Export as JSON string
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.inner
            .to_json()
            .map_err(|e| to_js_error("JSON serialization failed", e))
    }

    /// Export in the line-per-run wire form
    #[wasm_bindgen(js_name = stringify)]
    pub fn stringify(&self) -> String {
        protocol::stringify(&self.inner)
    }

    /// Apply `other` after this delta
    #[wasm_bindgen(js_name = compose)]
    pub fn compose(&self, other: &WasmDelta) -> Result<WasmDelta, JsValue> {
        self.inner
            .compose(&other.inner)
            .map(|inner| WasmDelta { inner })
            .map_err(|e| to_js_error("Compose failed", e))
    }

    /// Rebase `other` so it applies after this delta
    #[wasm_bindgen(js_name = transform)]
    pub fn transform(&self, other: &WasmDelta, priority: bool) -> WasmDelta {
        WasmDelta {
            inner: self.inner.transform(&other.inner, priority),
        }
    }

    /// Shift a position across this delta
    #[wasm_bindgen(js_name = transformPosition)]
    pub fn transform_position(&self, index: usize, priority: bool) -> usize {
        self.inner.transform_position(index, priority)
    }

    /// Delta that undoes this one against `base`
    #[wasm_bindgen(js_name = invert)]
    pub fn invert(&self, base: &WasmDelta) -> Result<WasmDelta, JsValue> {
        self.inner
            .invert(&base.inner)
            .map(|inner| WasmDelta { inner })
            .map_err(|e| to_js_error("Invert failed", e))
    }

    /// Change turning this document into `other`
    #[wasm_bindgen(js_name = diff)]
    pub fn diff(&self, other: &WasmDelta) -> Result<WasmDelta, JsValue> {
        self.inner
            .diff(&other.inner)
            .map(|inner| WasmDelta { inner })
            .map_err(|e| to_js_error("Diff failed", e))
    }

    /// Diff guided by the cursor position before and after the edit
    #[wasm_bindgen(js_name = diffWithCursor)]
    pub fn diff_with_cursor(
        &self,
        other: &WasmDelta,
        old_index: usize,
        old_length: usize,
        new_index: usize,
    ) -> Result<WasmDelta, JsValue> {
        let hint = CursorHint::Selection {
            old: Range::new(old_index, old_length),
            new: Range::new(new_index, 0),
        };
        self.inner
            .diff_with_cursor(&other.inner, hint)
            .map(|inner| WasmDelta { inner })
            .map_err(|e| to_js_error("Diff failed", e))
    }

    /// Document length in units
    #[wasm_bindgen(js_name = length)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    /// Net change in document length
    #[wasm_bindgen(js_name = changeLength)]
    pub fn change_length(&self) -> i64 {
        self.inner.change_length() as i64
    }

    /// Whether this delta only inserts
    #[wasm_bindgen(js_name = isDocument)]
    pub fn is_document(&self) -> bool {
        self.inner.is_document()
    }

    /// Number of runs
    #[wasm_bindgen(js_name = opCount)]
    pub fn op_count(&self) -> usize {
        self.inner.ops().len()
    }
}

impl Default for WasmDelta {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Delta> for WasmDelta {
    fn from(inner: Delta) -> Self {
        Self { inner }
    }
}

impl WasmDelta {
    /// Borrow the wrapped delta
    pub fn as_delta(&self) -> &Delta {
        &self.inner
    }
}

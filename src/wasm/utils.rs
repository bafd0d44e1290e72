//! Module-level helpers for JavaScript hosts

use wasm_bindgen::prelude::*;

/// Route Rust panics to `console.error` so delta failures show a stack
#[wasm_bindgen(js_name = initPanicHook)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Version of the delta core compiled into this module
#[wasm_bindgen(js_name = coreVersion)]
pub fn core_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

//! Error types for WebAssembly bridge implementations

use bridge_traits::{BridgeError, TransportError};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// JavaScript error from web-sys or a plugin call
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Browser or shell object missing, e.g. `localStorage` or a plugin
    #[error("Not available: {0}")]
    NotAvailable(String),

    /// Plugin payload did not have the expected shape
    #[error("Unexpected payload: {0}")]
    Payload(String),
}

impl WasmError {
    /// Wrap a thrown JavaScript value with the operation that threw it.
    pub fn js(context: &str, err: JsValue) -> Self {
        WasmError::JavaScript(format!("{context}: {}", js_message(&err)))
    }
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAvailable(what) => BridgeError::NotAvailable(what),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for WasmError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        WasmError::Payload(err.to_string())
    }
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::JavaScript(js_message(&js_value))
    }
}

/// Shorthand for bridge calls that fail inside JavaScript.
pub(crate) fn js_error(context: &str, err: JsValue) -> BridgeError {
    WasmError::js(context, err).into()
}

/// Shorthand for transports, where a build failure means the request never left.
pub(crate) fn js_request_error(context: &str, err: JsValue) -> TransportError {
    TransportError::InvalidRequest(format!("{context}: {}", js_message(&err)))
}

pub(crate) fn js_message(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        message
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    }
}

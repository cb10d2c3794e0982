//! Shared helpers for WASM API operations
//!
//! Console logging that works in the browser and in native tests, and the
//! error/JSON conversions every export goes through.

use crate::errors::EmaError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ============================================================================
// Logging Macros
// ============================================================================

/// Log a debug message with [WASM] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log a warning message with [WASM] ⚠️ prefix
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

// ============================================================================
// Logging Helper Functions (called by macros)
// ============================================================================

// The browser console only exists on wasm32; native builds (tests) go through `log`.

pub fn log_debug(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&format!("[WASM] {}", msg).into());
    #[cfg(not(target_arch = "wasm32"))]
    log::debug!("[WASM] {}", msg);
}

pub fn log_info(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::info_1(&format!("[WASM] {}", msg).into());
    #[cfg(not(target_arch = "wasm32"))]
    log::info!("[WASM] {}", msg);
}

pub fn log_warn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&format!("[WASM] ⚠️ {}", msg).into());
    #[cfg(not(target_arch = "wasm32"))]
    log::warn!("[WASM] ⚠️ {}", msg);
}

pub fn log_error(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&format!("[WASM] ❌ {}", msg).into());
    #[cfg(not(target_arch = "wasm32"))]
    log::error!("[WASM] ❌ {}", msg);
}

// ============================================================================
// Error / JSON Helpers
// ============================================================================

/// Log an error and turn it into the string thrown to JavaScript
///
/// The message is prefixed with the error kind (`out_of_bounds: ...`) so
/// callers can branch on it.
pub fn to_js_error(context: &str, error: &EmaError) -> JsValue {
    let msg = format!("{}: {} ({})", error.kind(), error, context);
    wasm_error!("{}", msg);
    JsValue::from_str(&msg)
}

/// Parse an optional JSON settings string (`None` or blank means defaults)
pub fn parse_settings<T: DeserializeOwned + Default>(settings_json: Option<String>) -> Result<T, JsValue> {
    match settings_json {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(&json).map_err(|e| {
            let msg = format!("Settings parse error: {}", e);
            wasm_error!("{}", msg);
            JsValue::from_str(&msg)
        }),
        _ => Ok(T::default()),
    }
}

/// Serialize a result to the JSON string handed back to JavaScript
pub fn to_json<T: Serialize>(value: &T, error_context: &str) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        wasm_error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

//! Conversions shared by the bindings.

use anyhow::anyhow;
use imposc_core::ImposcError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::JsValue;

/// Reads a settings object, falling back to the defaults when none is given.
pub(crate) fn parse_settings<T>(value: JsValue) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_value(value).map_err(|e| anyhow!("Invalid settings object: {}", e))
}

pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

pub(crate) fn core_error(context: &str, err: ImposcError) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

pub(crate) fn bridge_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}

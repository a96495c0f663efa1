//! WASM bridge exposing the impact oscillator core to a browser charting client.
//!
//! The client draws the charts; everything here returns plain data.

mod series;
mod shared;
mod system;

pub use series::{impact_map, one_n_curves, one_n_multiplot, one_n_orbits, time_series};
pub use system::WasmImpactSystem;

use std::str::FromStr;
use wasm_bindgen::prelude::*;

/// Routes `log` records from the core to the browser console.
#[wasm_bindgen]
pub fn init_logging(level: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let level = log::Level::from_str(level)
        .map_err(|_| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    console_log::init_with_level(level)
        .map_err(|e| JsValue::from_str(&format!("Logger already initialised: {}", e)))
}

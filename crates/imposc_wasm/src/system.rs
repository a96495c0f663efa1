//! Stateful impact map wrapper for interactive use.

use crate::shared::{bridge_error, core_error, parse_settings, serialize};
use imposc_core::{ImpactPoint, ImpactSettings, MotionBetweenImpacts, SystemParameters};
use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmImpactSystem {
    motion: MotionBetweenImpacts,
}

impl WasmImpactSystem {
    fn build(
        omega: f64,
        r: f64,
        sigma: f64,
        phi: f64,
        v: f64,
        settings: ImpactSettings,
    ) -> Result<WasmImpactSystem, JsValue> {
        let motion = MotionBetweenImpacts::new(
            SystemParameters::new(omega, r, sigma),
            ImpactPoint::new(phi, v),
            settings,
        )
        .map_err(|e| core_error("Invalid impact system", e))?;
        Ok(WasmImpactSystem { motion })
    }
}

#[wasm_bindgen]
impl WasmImpactSystem {
    #[wasm_bindgen(constructor)]
    pub fn new(omega: f64, r: f64, sigma: f64, phi: f64, v: f64) -> Result<WasmImpactSystem, JsValue> {
        console_error_panic_hook::set_once();
        Self::build(omega, r, sigma, phi, v, ImpactSettings::default())
    }

    pub fn with_settings(
        omega: f64,
        r: f64,
        sigma: f64,
        phi: f64,
        v: f64,
        settings: JsValue,
    ) -> Result<WasmImpactSystem, JsValue> {
        console_error_panic_hook::set_once();
        let settings: ImpactSettings = parse_settings(settings).map_err(bridge_error)?;
        Self::build(omega, r, sigma, phi, v, settings)
    }

    pub fn set_impact(&mut self, phi: f64, v: f64) {
        self.motion.set_impact(ImpactPoint::new(phi, v));
    }

    /// `[phi, v]` of the current anchor impact.
    pub fn get_impact(&self) -> Vec<f64> {
        let impact = self.motion.impact();
        vec![impact.phi, impact.v]
    }

    /// `[x, v, t]` at time `t`.
    pub fn motion_at_time(&self, t: f64) -> Vec<f64> {
        let state = self.motion.motion_at_time(t);
        vec![state.x, state.v, state.t]
    }

    pub fn next_impact(&mut self) -> Result<Vec<f64>, JsValue> {
        let point = self
            .motion
            .next_impact()
            .map_err(|e| core_error("Impact search failed", e))?;
        Ok(vec![point.phi, point.v])
    }

    pub fn iterate(&mut self) -> Result<Vec<f64>, JsValue> {
        let point = self
            .motion
            .iterate()
            .map_err(|e| core_error("Impact search failed", e))?;
        Ok(vec![point.phi, point.v])
    }

    /// Applies the impact map `count` times and returns the impacts as `{ phi, v }` objects.
    pub fn impacts(&mut self, count: u32) -> Result<JsValue, JsValue> {
        let points = self
            .motion
            .impacts(count as usize)
            .map_err(|e| core_error("Impact search failed", e))?;
        serialize(&points)
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.motion.set_recording(recording);
    }

    pub fn get_recording(&self) -> bool {
        self.motion.recording()
    }

    pub fn step_count(&self) -> usize {
        self.motion.steps().len()
    }

    /// Recorded states flattened as `[t0, x0, v0, t1, x1, v1, ...]`.
    pub fn steps(&self) -> Float64Array {
        let flat: Vec<f64> = self
            .motion
            .steps()
            .iter()
            .flat_map(|state| [state.t, state.x, state.v])
            .collect();
        Float64Array::from(flat.as_slice())
    }
}

//! Chart data: impact maps ("scatter"), time series, and (1, n) response curves
//! ("ellipse" and "multiplot").

use crate::shared::{bridge_error, core_error, parse_settings, serialize};
use imposc_core::periodic::{OneNParams, PhysicalitySettings};
use imposc_core::series as core_series;
use imposc_core::{ImpactPoint, ImpactSettings, SystemParameters};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct OrbitPairPayload {
    upper: Option<ImpactPoint>,
    lower: Option<ImpactPoint>,
}

#[wasm_bindgen]
pub fn impact_map(
    omega: f64,
    r: f64,
    sigma: f64,
    phi: f64,
    v: f64,
    num_iterations: u32,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let settings: ImpactSettings = parse_settings(settings).map_err(bridge_error)?;
    let points = core_series::impact_map(
        SystemParameters::new(omega, r, sigma),
        ImpactPoint::new(phi, v),
        num_iterations as usize,
        settings,
    )
    .map_err(|e| core_error("Impact map failed", e))?;
    serialize(&points)
}

#[wasm_bindgen]
pub fn time_series(
    omega: f64,
    r: f64,
    sigma: f64,
    phi: f64,
    v: f64,
    transient: u32,
    num_impacts: u32,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let settings: ImpactSettings = parse_settings(settings).map_err(bridge_error)?;
    let states = core_series::time_series(
        SystemParameters::new(omega, r, sigma),
        ImpactPoint::new(phi, v),
        transient as usize,
        num_impacts as usize,
        settings,
    )
    .map_err(|e| core_error("Time series failed", e))?;
    serialize(&states)
}

/// `{ sigmas, velocities: [{ upper, lower }], label }` for one forcing frequency.
#[wasm_bindgen]
pub fn one_n_curves(
    n: u32,
    omega: f64,
    r: f64,
    num_points: u32,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let settings: PhysicalitySettings = parse_settings(settings).map_err(bridge_error)?;
    let curve = core_series::curves_for_fixed_omega(
        n,
        &SystemParameters::new(omega, r, 0.0),
        num_points as usize,
        settings,
    )
    .map_err(|e| core_error("Response curve failed", e))?;
    serialize(&curve)
}

#[wasm_bindgen]
pub fn one_n_multiplot(
    n: u32,
    omegas: Vec<f64>,
    r: f64,
    num_points: u32,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let settings: PhysicalitySettings = parse_settings(settings).map_err(bridge_error)?;
    let curves = core_series::response_curves(n, &omegas, r, num_points as usize, settings)
        .map_err(|e| core_error("Response curves failed", e))?;
    serialize(&curves)
}

/// Impact points of the physical (1, n) orbits at a single offset.
#[wasm_bindgen]
pub fn one_n_orbits(
    n: u32,
    omega: f64,
    r: f64,
    sigma: f64,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let settings: PhysicalitySettings = parse_settings(settings).map_err(bridge_error)?;
    let one_n = OneNParams::new(&SystemParameters::new(omega, r, sigma), n, settings)
        .map_err(|e| core_error("Invalid (1, n) orbit parameters", e))?;
    let (upper, lower) = one_n.orbits(sigma);
    serialize(&OrbitPairPayload { upper, lower })
}

//! Data series for plotting: impact maps, time series and (1, n) response curves.

use crate::error::{ImposcError, Result};
use crate::geometry::{ImpactPoint, StateOfMotion};
use crate::motion::{ImpactSettings, MotionBetweenImpacts};
use crate::parameters::SystemParameters;
use crate::periodic::{OneNParams, PhysicalitySettings, VelocityPair};
use log::debug;
use serde::{Deserialize, Serialize};

/// Physical (1, n) orbit velocities sampled across the offsets `[-sigma_s, sigma_s]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    pub sigmas: Vec<f64>,
    pub velocities: Vec<VelocityPair>,
    pub label: String,
}

/// Iterates the impact map `num_iterations` times from `start`.
pub fn impact_map(
    params: SystemParameters,
    start: ImpactPoint,
    num_iterations: usize,
    settings: ImpactSettings,
) -> Result<Vec<ImpactPoint>> {
    let mut motion = MotionBetweenImpacts::new(params, start, settings)?;
    motion.impacts(num_iterations)
}

/// Lets `transient` impacts pass, then records the motion across `num_impacts` more.
pub fn time_series(
    params: SystemParameters,
    start: ImpactPoint,
    transient: usize,
    num_impacts: usize,
    settings: ImpactSettings,
) -> Result<Vec<StateOfMotion>> {
    let mut motion = MotionBetweenImpacts::new(params, start, settings)?;
    motion.impacts(transient)?;

    motion.set_recording(true);
    motion.impacts(num_impacts)?;
    Ok(motion.take_steps())
}

/// Sweeps the obstacle offset uniformly across the (1, n) ellipse at fixed `omega` and `r`.
///
/// `params.sigma` is ignored.
pub fn curves_for_fixed_omega(
    n: u32,
    params: &SystemParameters,
    num_points: usize,
    settings: PhysicalitySettings,
) -> Result<ResponseCurve> {
    if num_points < 2 {
        return Err(ImposcError::InvalidSettings(
            "a response curve needs at least two points".to_string(),
        ));
    }

    let one_n = OneNParams::new(params, n, settings)?;
    let sigma_s = one_n.sigma_s();
    let delta = 2.0 * sigma_s / (num_points - 1) as f64;

    let sigmas: Vec<f64> = (0..num_points)
        .map(|i| i as f64 * delta - sigma_s)
        .collect();
    let velocities: Vec<VelocityPair> = sigmas
        .iter()
        .map(|&sigma| one_n.physical_velocities(sigma))
        .collect();

    let physical = velocities
        .iter()
        .filter(|pair| pair.upper.is_some() || pair.lower.is_some())
        .count();
    debug!(
        "(1, {n}) response curve for {one_n}: {physical} of {num_points} offsets carry a physical orbit"
    );

    Ok(ResponseCurve {
        sigmas,
        velocities,
        label: one_n.to_string(),
    })
}

/// One response curve per forcing frequency, sharing `r`, `n` and the sample count.
pub fn response_curves(
    n: u32,
    omegas: &[f64],
    r: f64,
    num_points: usize,
    settings: PhysicalitySettings,
) -> Result<Vec<ResponseCurve>> {
    omegas
        .iter()
        .map(|&omega| {
            curves_for_fixed_omega(n, &SystemParameters::new(omega, r, 0.0), num_points, settings)
        })
        .collect()
}

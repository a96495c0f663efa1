//! Phase arithmetic and points on the impact surface `x = sigma`.

use crate::error::{ImposcError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Duration of one forcing cycle.
pub fn forcing_period(omega: f64) -> Result<f64> {
    if omega == 0.0 {
        return Err(ImposcError::ZeroForcingFrequency);
    }
    Ok(2.0 * PI / omega)
}

/// Reduces an absolute time to a phase in `[0, 2π/|omega|)`.
///
/// Unforced motion has no period, so with `omega == 0` the time is returned unchanged.
pub fn phase(t: f64, omega: f64) -> f64 {
    if omega == 0.0 {
        t
    } else {
        t.rem_euclid(2.0 * PI / omega)
    }
}

/// A point on the impact surface. Positive `v` is directed into the obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactPoint {
    pub phi: f64,
    pub v: f64,
}

impl ImpactPoint {
    pub fn new(phi: f64, v: f64) -> Self {
        Self { phi, v }
    }
}

/// Displacement, velocity and unwrapped time of the oscillator between impacts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateOfMotion {
    pub x: f64,
    pub v: f64,
    pub t: f64,
}

impl StateOfMotion {
    /// Projects the state onto the impact surface.
    ///
    /// Only meaningful when `x == sigma`, but always computable since it depends on `omega` alone.
    pub fn to_impact_point(&self, omega: f64) -> ImpactPoint {
        ImpactPoint {
            phi: phase(self.t, omega),
            v: self.v,
        }
    }
}

//! Closed-form motion between impacts and the bisection search for the next impact.
//!
//! Between impacts the displacement is the sum of a free oscillation, fixed by the
//! conditions at the last impact, and the steady forced response:
//!
//! ```text
//! x(t) = cos_coeff * cos(t - phi) + sin_coeff * sin(t - phi) + gamma * cos(omega * t)
//! ```
//!
//! Iterating [`MotionBetweenImpacts::iterate`] traces the impact (Poincaré return) map.

use crate::error::{ImposcError, Result};
use crate::geometry::{ImpactPoint, StateOfMotion};
use crate::parameters::SystemParameters;
use log::debug;
use serde::{Deserialize, Serialize};

/// Settings controlling the search for the next impact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactSettings {
    /// Initial time step of the search.
    pub step_size: f64,
    /// The search stops once the bisected step falls below this size.
    pub limit: f64,
    /// Longest stretch of simulated time to search before giving up.
    pub max_time: f64,
    /// Recorded times this far behind their predecessor are shifted on by whole forcing periods.
    pub unwrap_tolerance: f64,
}

impl Default for ImpactSettings {
    fn default() -> Self {
        Self {
            step_size: 0.01,
            limit: 1e-6,
            max_time: 1000.0,
            unwrap_tolerance: 1e-3,
        }
    }
}

impl ImpactSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return Err(ImposcError::InvalidSettings(
                "step_size must be positive and finite".to_string(),
            ));
        }
        if !(self.limit > 0.0) {
            return Err(ImposcError::InvalidSettings(
                "limit must be positive".to_string(),
            ));
        }
        if self.limit >= self.step_size {
            return Err(ImposcError::InvalidSettings(
                "limit must be smaller than step_size".to_string(),
            ));
        }
        if !(self.max_time > 0.0 && self.max_time.is_finite()) {
            return Err(ImposcError::InvalidSettings(
                "max_time must be positive and finite".to_string(),
            ));
        }
        if !(self.unwrap_tolerance >= 0.0) {
            return Err(ImposcError::InvalidSettings(
                "unwrap_tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Motion of the oscillator from one impact to the next.
///
/// `cos_coeff` and `sin_coeff` are only valid for the current anchor impact and are
/// recomputed by every call to [`set_impact`](Self::set_impact).
#[derive(Debug, Clone)]
pub struct MotionBetweenImpacts {
    params: SystemParameters,
    settings: ImpactSettings,
    gamma: f64,
    impact: ImpactPoint,
    cos_coeff: f64,
    sin_coeff: f64,
    recording: bool,
    steps: Vec<StateOfMotion>,
}

impl MotionBetweenImpacts {
    pub fn new(
        params: SystemParameters,
        impact: ImpactPoint,
        settings: ImpactSettings,
    ) -> Result<Self> {
        settings.validate()?;

        let mut motion = Self {
            params,
            settings,
            gamma: params.gamma(),
            impact,
            cos_coeff: 0.0,
            sin_coeff: 0.0,
            recording: false,
            steps: Vec::new(),
        };
        motion.set_impact(impact);
        Ok(motion)
    }

    /// Anchors the motion at `point`, so that `x(point.phi) == sigma` and the velocity
    /// leaving the obstacle is `-r * point.v`.
    pub fn set_impact(&mut self, point: ImpactPoint) {
        let omega = self.params.omega;
        self.impact = point;
        self.cos_coeff = self.params.sigma - self.gamma * (omega * point.phi).cos();
        self.sin_coeff = -self.params.r * point.v + omega * self.gamma * (omega * point.phi).sin();
    }

    pub fn parameters(&self) -> &SystemParameters {
        &self.params
    }

    pub fn settings(&self) -> &ImpactSettings {
        &self.settings
    }

    pub fn impact(&self) -> ImpactPoint {
        self.impact
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn cos_coeff(&self) -> f64 {
        self.cos_coeff
    }

    pub fn sin_coeff(&self) -> f64 {
        self.sin_coeff
    }

    pub fn recording(&self) -> bool {
        self.recording
    }

    /// Switching recording on or off discards anything recorded so far.
    pub fn set_recording(&mut self, recording: bool) {
        if recording != self.recording {
            self.recording = recording;
            self.steps.clear();
        }
    }

    /// States sampled on the free side of the obstacle since recording was switched on.
    pub fn steps(&self) -> &[StateOfMotion] {
        &self.steps
    }

    pub fn take_steps(&mut self) -> Vec<StateOfMotion> {
        std::mem::take(&mut self.steps)
    }

    /// Evaluates the closed-form motion at time `t`. Does not check that `x <= sigma`.
    pub fn motion_at_time(&self, t: f64) -> StateOfMotion {
        let omega = self.params.omega;
        let lambda = t - self.impact.phi;
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let (sin_forcing, cos_forcing) = (omega * t).sin_cos();

        StateOfMotion {
            x: self.cos_coeff * cos_lambda + self.sin_coeff * sin_lambda + self.gamma * cos_forcing,
            v: self.sin_coeff * cos_lambda - self.cos_coeff * sin_lambda
                - omega * self.gamma * sin_forcing,
            t,
        }
    }

    /// Finds the next impact after the anchor by stepping forward until the obstacle is
    /// penetrated, then bisecting back and forth across the crossing.
    ///
    /// The returned point is the last sample with `x <= sigma`.
    pub fn next_impact(&mut self) -> Result<ImpactPoint> {
        let sigma = self.params.sigma;
        let start = self.impact.phi;

        let mut t = start;
        let mut impact_state = self.motion_at_time(t);
        self.record_state(impact_state);

        let mut step_size = self.settings.step_size;

        while step_size.abs() > self.settings.limit {
            t += step_size;

            let elapsed = t - start;
            if elapsed > self.settings.max_time {
                debug!(
                    "Impact search from phi = {}, v = {} gave up after {} time units",
                    self.impact.phi, self.impact.v, elapsed
                );
                return Err(ImposcError::NoImpactFound { elapsed });
            }

            let state = self.motion_at_time(t);

            if state.x > sigma {
                // Overshot the obstacle: reverse and halve.
                if step_size > 0.0 {
                    step_size *= -0.5;
                }
            } else {
                // Back on the free side after backtracking.
                if step_size < 0.0 {
                    step_size *= -0.5;
                }
                impact_state = state;
                self.record_state(state);
            }
        }

        Ok(impact_state.to_impact_point(self.params.omega))
    }

    /// Finds the next impact and re-anchors the motion there.
    pub fn iterate(&mut self) -> Result<ImpactPoint> {
        let next = self.next_impact()?;
        self.set_impact(next);
        Ok(next)
    }

    /// Applies the impact map `count` times, returning every impact in order.
    pub fn impacts(&mut self, count: usize) -> Result<Vec<ImpactPoint>> {
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(self.iterate()?);
        }
        Ok(points)
    }

    fn record_state(&mut self, mut state: StateOfMotion) {
        if !self.recording {
            return;
        }

        // Each search restarts from a wrapped phase, so shift it on to follow the last sample.
        // Without forcing, phases are raw times and never need shifting.
        if let (Some(previous), Ok(period)) = (self.steps.last(), self.params.forcing_period()) {
            let behind = previous.t - state.t - self.settings.unwrap_tolerance;
            if behind > 0.0 {
                let period = period.abs();
                state.t += (behind / period).ceil() * period;
            }
        }

        self.steps.push(state);
    }
}

//! Single-impact (1, n) periodic orbits, with n forcing cycles between impacts.
//!
//! Requiring an impact to repeat after exactly n forcing cycles reduces to a quadratic in
//! the impact velocity:
//!
//! ```text
//! (cs^2 + r_minus^2) v^2 + 4 cs sigma v + 4 (sigma^2 - gamma^2) = 0
//! ```
//!
//! For fixed `omega`, `r` and `n` its roots trace an ellipse in the `(sigma, v)` plane as the
//! obstacle offset varies. A real root is necessary but not sufficient for an orbit: roots
//! with `v <= 0` are meaningless, and along part of the ellipse the motion strikes the
//! obstacle before the n cycles are up. That boundary has no closed form, so candidates are
//! checked by running the impact map from them.
//!
//! Where the orbits are physical the upper branch is stable and the lower branch unstable.
//! The major axis of the ellipse is vertical when `omega == n`.

use crate::error::{ImposcError, Result};
use crate::geometry::{phase, ImpactPoint};
use crate::motion::{ImpactSettings, MotionBetweenImpacts};
use crate::parameters::SystemParameters;
use log::trace;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Relative slack, against the scale of the discriminant, within which a negative
/// discriminant is taken to be a double root.
const DOUBLE_ROOT_TOLERANCE: f64 = 1e-12;

/// Below this `1 - cos(period)` is treated as zero.
const DEGENERATE_PERIOD_TOLERANCE: f64 = 1e-12;

/// Tolerances for accepting a candidate orbit as a fixed point of the impact map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalitySettings {
    /// Allowed relative change in impact velocity over one return.
    pub velocity_tolerance: f64,
    /// Allowed change in impact phase, as a fraction of one forcing period.
    pub phase_tolerance: f64,
    /// Settings for the impact search run from each candidate.
    pub impact: ImpactSettings,
}

impl Default for PhysicalitySettings {
    fn default() -> Self {
        Self {
            velocity_tolerance: 1e-3,
            phase_tolerance: 1e-2,
            impact: ImpactSettings::default(),
        }
    }
}

impl PhysicalitySettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.velocity_tolerance > 0.0) {
            return Err(ImposcError::InvalidSettings(
                "velocity_tolerance must be positive".to_string(),
            ));
        }
        // Phases are compared on a circle, so no two differ by more than half a period.
        if !(self.phase_tolerance > 0.0 && self.phase_tolerance < 0.5) {
            return Err(ImposcError::InvalidSettings(
                "phase_tolerance must lie strictly between 0 and 0.5".to_string(),
            ));
        }
        self.impact.validate()
    }
}

/// The two roots of the velocity quadratic, larger first. `None` marks a missing or rejected root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityPair {
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

impl VelocityPair {
    pub const NONE: VelocityPair = VelocityPair {
        upper: None,
        lower: None,
    };

    pub fn map<F>(self, mut f: F) -> VelocityPair
    where
        F: FnMut(f64) -> Option<f64>,
    {
        VelocityPair {
            upper: self.upper.and_then(&mut f),
            lower: self.lower.and_then(&mut f),
        }
    }
}

/// Coefficients of the (1, n) orbit ellipse for fixed `omega`, `r` and `n`.
#[derive(Debug, Clone)]
pub struct OneNParams {
    omega: f64,
    r: f64,
    n: u32,
    r_minus: f64,
    period: f64,
    forcing_period: f64,
    cs: f64,
    gamma: f64,
    gamma2: f64,
    sigma_s: f64,
    settings: PhysicalitySettings,
}

impl OneNParams {
    /// `params.sigma` is ignored: the offset is the independent variable of the analysis.
    pub fn new(params: &SystemParameters, n: u32, settings: PhysicalitySettings) -> Result<Self> {
        params.require_forcing()?;
        if n == 0 {
            return Err(ImposcError::InvalidSettings(
                "n must be at least one forcing cycle".to_string(),
            ));
        }
        settings.validate()?;

        let omega = params.omega;
        let r = params.r;
        let forcing_period = params.forcing_period()?.abs();

        let r_minus = (1.0 - r) / omega;
        if r_minus == 0.0 {
            return Err(ImposcError::DegenerateOrbitCurve {
                n,
                reason: "with r = 1 the curve is unbounded",
            });
        }

        let period = 2.0 * PI * f64::from(n) / omega;
        let (sn, cn) = period.sin_cos();
        if (1.0 - cn).abs() < DEGENERATE_PERIOD_TOLERANCE {
            return Err(ImposcError::DegenerateOrbitCurve {
                n,
                reason: "n forcing cycles span a whole number of free oscillations",
            });
        }

        let cs = sn * (1.0 + r) / (1.0 - cn);
        let gamma = params.gamma();
        let gamma2 = gamma * gamma;
        let sigma_s = (gamma2 * (1.0 + (cs / r_minus).powi(2))).sqrt();

        Ok(Self {
            omega,
            r,
            n,
            r_minus,
            period,
            forcing_period,
            cs,
            gamma,
            gamma2,
            sigma_s,
            settings,
        })
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    /// Duration of n forcing cycles.
    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn cs(&self) -> f64 {
        self.cs
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Positive intercept of the ellipse with the `sigma` axis.
    pub fn sigma_s(&self) -> f64 {
        self.sigma_s
    }

    pub fn settings(&self) -> &PhysicalitySettings {
        &self.settings
    }

    pub fn discriminant(&self, sigma: f64) -> f64 {
        4.0 * (self.gamma2 * self.cs * self.cs
            - (sigma * sigma - self.gamma2) * self.r_minus * self.r_minus)
    }

    /// Candidate orbit velocities at offset `sigma`, without any physicality filtering.
    ///
    /// Both are `None` for complex roots and equal for a double root.
    pub fn velocities(&self, sigma: f64) -> VelocityPair {
        let divisor = self.cs * self.cs + self.r_minus * self.r_minus;

        let mut discriminant = self.discriminant(sigma);
        if discriminant < 0.0 {
            if discriminant < -DOUBLE_ROOT_TOLERANCE * 4.0 * self.gamma2 * divisor {
                return VelocityPair::NONE;
            }
            discriminant = 0.0;
        }

        let centre = -2.0 * self.cs * sigma / divisor;
        let half_width = discriminant.sqrt() / divisor;

        VelocityPair {
            upper: Some(centre + half_width),
            lower: Some(centre - half_width),
        }
    }

    /// Impact phase of the candidate orbit with velocity `v` at offset `sigma`.
    pub fn phase_for_velocity(&self, v: f64, sigma: f64) -> f64 {
        let arg = (sigma + self.cs * v / 2.0) / self.gamma;
        let mut angle = arg.clamp(-1.0, 1.0).acos();

        // acos only covers [0, π]; sin(angle) must oppose the sign of v / gamma.
        let s = angle.sin();
        let vg = v / self.gamma;
        if (vg > 0.0 && s > 0.0) || (vg < 0.0 && s < 0.0) {
            angle = 2.0 * PI - angle;
        }

        phase(angle / self.omega, self.omega)
    }

    pub fn point_for_velocity(&self, v: f64, sigma: f64) -> ImpactPoint {
        ImpactPoint::new(self.phase_for_velocity(v, sigma), v)
    }

    /// Checks that the candidate orbit is a fixed point of the impact map.
    pub fn is_physical(&self, v: f64, sigma: f64) -> bool {
        if !(v > 0.0) {
            return false;
        }

        let params = SystemParameters::new(self.omega, self.r, sigma);
        let start = self.point_for_velocity(v, sigma);
        let settings = ImpactSettings {
            max_time: self.settings.impact.max_time.max(2.0 * self.period),
            ..self.settings.impact
        };

        let next = match MotionBetweenImpacts::new(params, start, settings)
            .and_then(|mut motion| motion.next_impact())
        {
            Ok(next) => next,
            Err(err) => {
                trace!("Candidate (1, {}) orbit at sigma = {sigma}, v = {v}: {err}", self.n);
                return false;
            }
        };

        let physical = self.returns_to_start(start, next);

        trace!(
            "Candidate (1, {}) orbit at sigma = {sigma}: start = {start:?}, return = {next:?}, physical = {physical}",
            self.n
        );
        physical
    }

    /// Whether `next` repeats `start` within the velocity and phase tolerances.
    fn returns_to_start(&self, start: ImpactPoint, next: ImpactPoint) -> bool {
        let phase_shift = (next.phi - start.phi).abs();
        let phase_shift = phase_shift.min(self.forcing_period - phase_shift);

        (next.v - start.v).abs() / start.v < self.settings.velocity_tolerance
            && phase_shift < self.settings.phase_tolerance * self.forcing_period
    }

    pub fn nullify_unphysical(&self, v: f64, sigma: f64) -> Option<f64> {
        self.is_physical(v, sigma).then_some(v)
    }

    /// Velocities of the physical orbits at offset `sigma`.
    pub fn physical_velocities(&self, sigma: f64) -> VelocityPair {
        self.velocities(sigma)
            .map(|v| self.nullify_unphysical(v, sigma))
    }

    /// Impact points of the physical orbits at offset `sigma`, upper branch first.
    pub fn orbits(&self, sigma: f64) -> (Option<ImpactPoint>, Option<ImpactPoint>) {
        let velocities = self.physical_velocities(sigma);
        let point = |v: Option<f64>| v.map(|v| self.point_for_velocity(v, sigma));
        (point(velocities.upper), point(velocities.lower))
    }
}

impl fmt::Display for OneNParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ω = {}, r = {}, n = {}", self.omega, self.r, self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::forcing_period;

    fn one_n(omega: f64, r: f64, n: u32) -> OneNParams {
        OneNParams::new(
            &SystemParameters::new(omega, r, 0.0),
            n,
            PhysicalitySettings::default(),
        )
        .expect("one n params")
    }

    #[test]
    fn new_rejects_degenerate_inputs() {
        let settings = PhysicalitySettings::default();
        assert_eq!(
            OneNParams::new(&SystemParameters::new(0.0, 0.8, 0.0), 1, settings).unwrap_err(),
            ImposcError::ZeroForcingFrequency
        );
        assert!(matches!(
            OneNParams::new(&SystemParameters::new(2.0, 0.8, 0.0), 0, settings),
            Err(ImposcError::InvalidSettings(_))
        ));
        assert!(matches!(
            OneNParams::new(&SystemParameters::new(2.0, 0.8, 0.0), 2, settings),
            Err(ImposcError::DegenerateOrbitCurve { n: 2, .. })
        ));
        assert!(matches!(
            OneNParams::new(&SystemParameters::new(2.0, 1.0, 0.0), 1, settings),
            Err(ImposcError::DegenerateOrbitCurve { n: 1, .. })
        ));
        let bad_tolerance = PhysicalitySettings {
            velocity_tolerance: 0.0,
            ..PhysicalitySettings::default()
        };
        assert!(matches!(
            OneNParams::new(&SystemParameters::new(2.0, 0.8, 0.0), 1, bad_tolerance),
            Err(ImposcError::InvalidSettings(_))
        ));
    }

    #[test]
    fn sigma_s_for_omega_two() {
        let params = one_n(2.0, 0.8, 1);
        assert!((params.sigma_s() - 1.0 / 3.0).abs() < 1e-12);
        assert!(params.cs().abs() < 1e-12);
        assert_eq!(params.to_string(), "ω = 2, r = 0.8, n = 1");
    }

    #[test]
    fn roots_satisfy_the_velocity_quadratic() {
        for &(omega, n) in &[(1.8, 1), (2.2, 1), (2.8, 1), (3.5, 2), (5.5, 3)] {
            let params = one_n(omega, 0.8, n);
            let a = params.cs * params.cs + params.r_minus * params.r_minus;
            for i in 0..=10 {
                let sigma = params.sigma_s() * (-0.95 + 0.19 * f64::from(i));
                let b = 4.0 * params.cs * sigma;
                let c = 4.0 * (sigma * sigma - params.gamma2);
                let pair = params.velocities(sigma);
                for v in [pair.upper, pair.lower] {
                    let v = v.expect("real root inside the ellipse");
                    let residual = a * v * v + b * v + c;
                    assert!(residual.abs() < 1e-9 * (1.0 + c.abs()), "residual {residual}");
                }
                let upper = pair.upper.expect("upper");
                let lower = pair.lower.expect("lower");
                assert!(upper >= lower);
                assert!((upper + lower + b / a).abs() < 1e-9 * (1.0 + (b / a).abs()));
            }
        }
    }

    #[test]
    fn ellipse_closes_at_sigma_s() {
        for &(omega, n) in &[(1.8, 1), (2.0, 1), (2.2, 1), (3.5, 2)] {
            let params = one_n(omega, 0.8, n);
            for sigma in [params.sigma_s(), -params.sigma_s()] {
                let pair = params.velocities(sigma);
                let upper = pair.upper.expect("double root");
                let lower = pair.lower.expect("double root");
                assert!((upper - lower).abs() < 1e-4 * (1.0 + upper.abs()));
            }
            assert_eq!(params.velocities(1.01 * params.sigma_s()), VelocityPair::NONE);
            assert_eq!(params.velocities(-1.01 * params.sigma_s()), VelocityPair::NONE);
        }
    }

    #[test]
    fn phases_lie_within_one_forcing_period() {
        let params = one_n(2.2, 0.8, 1);
        let period = forcing_period(2.2).expect("period");
        for i in 0..=20 {
            let sigma = params.sigma_s() * (-1.0 + 0.1 * f64::from(i));
            let pair = params.velocities(sigma);
            for v in [pair.upper, pair.lower].into_iter().flatten() {
                let phi = params.phase_for_velocity(v, sigma);
                assert!((0.0..period).contains(&phi), "phi = {phi}");
            }
        }
    }

    #[test]
    fn velocities_at_zero_offset_for_omega_two() {
        let params = one_n(2.0, 0.8, 1);
        let pair = params.velocities(0.0);
        let upper = pair.upper.expect("upper");
        let lower = pair.lower.expect("lower");

        // Vieta: the roots sum to twice -2 cs sigma / divisor, which vanishes at sigma = 0.
        assert!((upper + lower).abs() < 1e-9);
        assert!(upper > 0.0);
        assert!(params.is_physical(upper, 0.0));
        assert!(!params.is_physical(lower, 0.0));
    }

    #[test]
    fn physicality_boundary_for_omega_two() {
        let params = one_n(2.0, 0.8, 1);
        for &(sigma, expected) in &[(0.0, true), (0.01, true), (-0.33, true), (-0.33333, false)] {
            let pair = params.velocities(sigma);
            let positive: Vec<f64> = [pair.upper, pair.lower]
                .into_iter()
                .flatten()
                .filter(|&v| v > 0.0)
                .collect();
            assert!(!positive.is_empty(), "no positive root at sigma = {sigma}");
            for v in positive {
                assert_eq!(params.is_physical(v, sigma), expected, "sigma = {sigma}, v = {v}");
            }
        }
    }

    #[test]
    fn physical_orbits_return_to_their_start() {
        let params = one_n(2.0, 0.8, 1);
        let settings = params.settings().impact;
        for sigma in [-0.33, -0.2, 0.0, 0.2] {
            let (upper, lower) = params.orbits(sigma);
            assert!(lower.is_none());
            let start = upper.expect("physical upper orbit");

            let mut motion = MotionBetweenImpacts::new(
                SystemParameters::new(2.0, 0.8, sigma),
                start,
                settings,
            )
            .expect("motion");
            let next = motion.next_impact().expect("impact");
            assert!((next.v - start.v).abs() < 1e-3 * start.v);
            assert!((next.phi - start.phi).abs() < 1e-2 * params.period());
        }
    }

    #[test]
    fn spurious_root_returns_elsewhere() {
        let params = one_n(2.0, 0.8, 1);
        let sigma = -0.33333;
        let v = params.velocities(sigma).upper.expect("upper");
        let start = params.point_for_velocity(v, sigma);

        let mut motion = MotionBetweenImpacts::new(
            SystemParameters::new(2.0, 0.8, sigma),
            start,
            params.settings().impact,
        )
        .expect("motion");
        let next = motion.next_impact().expect("impact");
        assert!((next.v - v).abs() > 1e-2 * v);
        assert_eq!(params.orbits(sigma), (None, None));
    }

    #[test]
    fn phase_tolerance_does_not_grow_with_cycle_count() {
        let params = one_n(2.1, 0.8, 60);
        let forcing_period = forcing_period(2.1).expect("period");
        let start = ImpactPoint::new(0.1, 1.0);

        let shifted = ImpactPoint::new(0.1 + 0.3 * forcing_period, 1.0);
        assert!(!params.returns_to_start(start, shifted));

        let wrapped = ImpactPoint::new(0.1 + forcing_period - 1e-3 * forcing_period, 1.0);
        assert!(params.returns_to_start(start, wrapped));

        let slower = ImpactPoint::new(0.1, 0.99);
        assert!(!params.returns_to_start(start, slower));
    }

    #[test]
    fn phase_tolerance_must_stay_below_half_a_period() {
        for phase_tolerance in [0.0, 0.5, 2.0, f64::NAN] {
            let settings = PhysicalitySettings {
                phase_tolerance,
                ..PhysicalitySettings::default()
            };
            assert!(matches!(
                OneNParams::new(&SystemParameters::new(2.0, 0.8, 0.0), 1, settings),
                Err(ImposcError::InvalidSettings(_))
            ));
        }
    }

    #[test]
    fn non_positive_velocities_are_unphysical() {
        let params = one_n(2.0, 0.8, 1);
        assert!(!params.is_physical(0.0, 0.0));
        assert!(!params.is_physical(-1.0, 0.0));
        assert!(!params.is_physical(f64::NAN, 0.0));
        assert_eq!(params.nullify_unphysical(-1.0, 0.0), None);
    }
}

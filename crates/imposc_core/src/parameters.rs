//! Dimensionless parameters of a forced impact oscillator with no damping between impacts.

use crate::error::{ImposcError, Result};
use crate::geometry::forcing_period;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemParameters {
    /// Forcing frequency.
    pub omega: f64,
    /// Coefficient of restitution applied at each impact.
    pub r: f64,
    /// Offset of the obstacle from the centre of motion.
    pub sigma: f64,
}

impl SystemParameters {
    pub fn new(omega: f64, r: f64, sigma: f64) -> Self {
        Self { omega, r, sigma }
    }

    /// Amplitude of the forcing term in the displacement between impacts.
    pub fn gamma(&self) -> f64 {
        gamma(self.omega)
    }

    pub fn forcing_period(&self) -> Result<f64> {
        forcing_period(self.omega)
    }

    /// Rejects parameter sets for which the forcing is not periodic.
    pub fn require_forcing(&self) -> Result<()> {
        if self.omega == 0.0 {
            return Err(ImposcError::ZeroForcingFrequency);
        }
        Ok(())
    }
}

/// `1 / (1 - omega^2)`, with the resonant case `|omega| == 1` pinned to 1.
pub fn gamma(omega: f64) -> f64 {
    if omega.abs() == 1.0 {
        1.0
    } else {
        1.0 / (1.0 - omega * omega)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_matches_closed_form_away_from_resonance() {
        assert!((gamma(2.0) + 1.0 / 3.0).abs() < 1e-15);
        assert!((gamma(0.5) - 4.0 / 3.0).abs() < 1e-15);
        assert_eq!(gamma(0.0), 1.0);
    }

    #[test]
    fn gamma_is_pinned_at_resonance() {
        assert_eq!(gamma(1.0), 1.0);
        assert_eq!(gamma(-1.0), 1.0);
    }

    #[test]
    fn require_forcing_rejects_zero_frequency() {
        let params = SystemParameters::new(0.0, 0.8, 0.0);
        assert_eq!(params.require_forcing(), Err(ImposcError::ZeroForcingFrequency));
        assert!(SystemParameters::new(2.0, 0.8, 0.0).require_forcing().is_ok());
    }
}

//! The `imposc_core` crate models a one-dimensional impact oscillator: a harmonically forced
//! oscillator whose motion is interrupted by instantaneous impacts with an obstacle at
//! `x = sigma`, each reversing the velocity and scaling it by the coefficient of restitution.
//!
//! Key components:
//! - **Parameters**: `SystemParameters` (forcing frequency, restitution, obstacle offset).
//! - **Geometry**: phase wrapping and the `ImpactPoint`/`StateOfMotion` value types.
//! - **Motion**: closed-form motion between impacts and the bisection search that drives the impact map.
//! - **Periodic**: algebraic (1, n) orbit candidates, validated against the impact map.
//! - **Series**: impact maps, time series and response curves ready for plotting.
pub mod error;
pub mod geometry;
pub mod motion;
pub mod parameters;
pub mod periodic;
pub mod series;

pub use error::{ImposcError, Result};
pub use geometry::{forcing_period, phase, ImpactPoint, StateOfMotion};
pub use motion::{ImpactSettings, MotionBetweenImpacts};
pub use parameters::SystemParameters;
pub use periodic::{OneNParams, PhysicalitySettings, VelocityPair};

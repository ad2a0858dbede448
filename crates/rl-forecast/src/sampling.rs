//! Triangular duration distributions.
//!
//! Two shapes exist. The standard shape widens with the risk register's
//! expected delay and never drops below 20% uncertainty. The forensic shape
//! takes its width from the modulated variance multiplier and is capped at
//! 50% but has no floor, so a variance below 1.0 narrows the distribution.

use rand::Rng;
use rl_analysis::SimulationParameters;

/// Smallest duration any draw may produce.
pub const MIN_DRAW_DAYS: f64 = 0.1;

/// Uncertainty floor of the standard shape.
pub const STANDARD_MIN_UNCERTAINTY: f64 = 0.2;

/// Uncertainty cap shared by both shapes.
pub const MAX_UNCERTAINTY: f64 = 0.5;

/// Uncertainty contributed per unit of forensic variance.
const FORENSIC_UNCERTAINTY_PER_VARIANCE: f64 = 0.2;

/// Standard-shape uncertainty: `max(0.2, min(0.5, expected_delay / base))`.
pub fn standard_uncertainty(base: f64, expected_delay: f64) -> f64 {
    let ratio = if base > 0.0 { expected_delay / base } else { 0.0 };
    ratio.min(MAX_UNCERTAINTY).max(STANDARD_MIN_UNCERTAINTY)
}

/// Forensic-shape uncertainty: `min(0.5, 0.2 * variance)`.
pub fn forensic_uncertainty(variance_multiplier: f64) -> f64 {
    (FORENSIC_UNCERTAINTY_PER_VARIANCE * variance_multiplier.max(0.0)).min(MAX_UNCERTAINTY)
}

/// A triangular distribution with `min <= mode <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangular {
    min: f64,
    mode: f64,
    max: f64,
}

impl Triangular {
    /// Build from three points in any order; they are sorted so the shape
    /// is always valid, even for a negative mode shift.
    pub fn new(min: f64, mode: f64, max: f64) -> Self {
        let mut points = [min, mode, max];
        points.sort_by(f64::total_cmp);
        Self {
            min: points[0],
            mode: points[1],
            max: points[2],
        }
    }

    /// Shape driven by the risk register.
    pub fn standard(base: f64, expected_delay: f64) -> Self {
        let u = standard_uncertainty(base, expected_delay);
        Self::new(
            (base * (1.0 - u)).max(MIN_DRAW_DAYS),
            base,
            base * (1.0 + u),
        )
    }

    /// Shape driven by modulated simulation parameters.
    pub fn forensic(params: &SimulationParameters) -> Self {
        let mode = params.mode();
        let u = forensic_uncertainty(params.variance_multiplier);
        Self::new(
            (mode * (1.0 - u)).max(MIN_DRAW_DAYS),
            mode,
            mode * (1.0 + u),
        )
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn mode(&self) -> f64 {
        self.mode
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Inverse CDF at `u` in `[0, 1]`.
    pub fn inverse_cdf(&self, u: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return self.mode;
        }
        let u = u.clamp(0.0, 1.0);
        let split = (self.mode - self.min) / span;
        if u < split {
            self.min + (u * span * (self.mode - self.min)).sqrt()
        } else {
            self.max - ((1.0 - u) * span * (self.max - self.mode)).sqrt()
        }
    }

    /// Draw one duration, floored at [`MIN_DRAW_DAYS`].
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.inverse_cdf(rng.gen::<f64>()).max(MIN_DRAW_DAYS)
    }
}

/// Per-activity sampling plan for one forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationDraw {
    pub shape: Triangular,
    /// Chance of a delay event that stretches the draw by 50–100%
    pub failure_probability: f64,
}

impl DurationDraw {
    pub fn standard(base: f64, expected_delay: f64) -> Self {
        Self {
            shape: Triangular::standard(base, expected_delay),
            failure_probability: 0.0,
        }
    }

    pub fn forensic(params: &SimulationParameters) -> Self {
        Self {
            shape: Triangular::forensic(params),
            failure_probability: params.failure_probability.clamp(0.0, 1.0),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let duration = self.shape.sample(rng);
        if self.failure_probability > 0.0 && rng.gen::<f64>() < self.failure_probability {
            duration * (1.0 + rng.gen_range(0.5..1.0))
        } else {
            duration
        }
    }
}

#[cfg(test)]
#[path = "sampling_test.rs"]
mod tests;

//! One Euro filter: adaptive low-pass smoothing for pointer jitter.
//!
//! Smooth when the hand is still, responsive when it moves fast.  One
//! independent instance runs per screen axis.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Tuning for the adaptive low-pass filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    /// Cutoff (Hz) used when the cursor is at rest.
    pub min_cutoff: f64,
    /// Cutoff gain per pixel/s of estimated speed.
    pub beta: f64,
    pub derivative_cutoff: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.007,
            derivative_cutoff: 1.0,
        }
    }
}

/// Adaptive low-pass filter for a single axis.
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    min_cutoff: f64,
    beta: f64,
    d_cutoff: f64,

    // State
    x_prev: f32,
    dx_prev: f64,
    t_prev: f64,
    initialized: bool,
}

impl OneEuroFilter {
    pub fn new(config: &SmootherConfig) -> Self {
        Self {
            min_cutoff: config.min_cutoff,
            beta: config.beta,
            d_cutoff: config.derivative_cutoff,
            x_prev: 0.0,
            dx_prev: 0.0,
            t_prev: 0.0,
            initialized: false,
        }
    }

    /// Smoothing factor for a sample interval and cutoff frequency.
    fn smoothing_factor(t_e: f64, cutoff: f64) -> f64 {
        let r = 2.0 * PI * cutoff * t_e;
        r / (r + 1.0)
    }

    /// Filter a single value.
    ///
    /// - `x`: raw input value
    /// - `t`: timestamp in seconds
    ///
    /// A timestamp that does not advance returns the previous output and
    /// leaves the state untouched.
    pub fn filter(&mut self, x: f32, t: f64) -> f32 {
        if !self.initialized {
            self.x_prev = x;
            self.t_prev = t;
            self.initialized = true;
            return x;
        }

        let t_e = t - self.t_prev;
        if t_e <= 0.0 {
            return self.x_prev;
        }

        // Speed is itself low-passed at `d_cutoff` before it widens the cutoff.
        let a_d = Self::smoothing_factor(t_e, self.d_cutoff);
        let dx = (x as f64 - self.x_prev as f64) / t_e;
        let dx_hat = a_d * dx + (1.0 - a_d) * self.dx_prev;

        let cutoff = self.min_cutoff + self.beta * dx_hat.abs();
        let a = Self::smoothing_factor(t_e, cutoff);
        let x_hat = (a * x as f64 + (1.0 - a) * self.x_prev as f64) as f32;

        self.x_prev = x_hat;
        self.dx_prev = dx_hat;
        self.t_prev = t;

        x_hat
    }

    /// Whether the filter has seen its first sample.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Forget all history; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.dx_prev = 0.0;
    }
}

/// Pair of One Euro filters for a 2D pointer position.
#[derive(Debug, Clone)]
pub struct OneEuroFilter2D {
    pub x: OneEuroFilter,
    pub y: OneEuroFilter,
}

impl OneEuroFilter2D {
    pub fn new(config: &SmootherConfig) -> Self {
        Self {
            x: OneEuroFilter::new(config),
            y: OneEuroFilter::new(config),
        }
    }

    pub fn filter(&mut self, pos: (f32, f32), t: f64) -> (f32, f32) {
        (self.x.filter(pos.0, t), self.y.filter(pos.1, t))
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

//! Numeric presentation of interpolated values for display consumers.
//!
//! - `|v| >= 1`: rounded to `decimals` places.
//! - `0 < |v| < 1`: rounded to `decimals` significant places after the
//!   leading digit (normalized scientific notation).
//! - `0`: literal zero.
//! - NaN / ±inf: `None`, serialized as `null`; never coerced to zero.

use serde::{Deserialize, Serialize};

/// Presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationOptions {
    pub decimals: usize,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self { decimals: 4 }
    }
}

/// Present one value.
pub fn present_value(value: f64, decimals: usize) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    if value == 0.0 {
        return Some(0.0);
    }
    let text = if value.abs() >= 1.0 {
        format!("{value:.decimals$}")
    } else {
        format!("{value:.decimals$e}")
    };
    text.parse().ok()
}

/// Present a slice of values with shared options.
pub fn present_values(values: &[f64], options: PresentationOptions) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|&v| present_value(v, options.decimals))
        .collect()
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves shared by the sampler and the native tween runtime.
//!
//! Both playback modes evaluate the exact same functions, so a paused frame
//! and a frame produced by a running tween never disagree.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Easing curve applied to the segment that ends at a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    /// Identity
    Linear,
    /// Smoothstep
    Ease,
    /// Quadratic ease-in
    EaseIn,
    /// Quadratic ease-out
    #[default]
    EaseOut,
    /// Quadratic ease-in-out
    EaseInOut,
    /// Bounce-out
    Bounce,
    /// Elastic-out (amplitude 1, period 0.3)
    Elastic,
}

impl Easing {
    /// Every supported easing, in display order
    pub const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::Ease,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::Bounce,
        Easing::Elastic,
    ];

    /// Wire name of the easing
    pub fn as_str(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Ease => "ease",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::Bounce => "bounce",
            Easing::Elastic => "elastic",
        }
    }

    /// Parse a wire name. Unknown names fall back to `ease-out`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => Easing::Linear,
            "ease" => Easing::Ease,
            "ease-in" => Easing::EaseIn,
            "ease-out" => Easing::EaseOut,
            "ease-in-out" => Easing::EaseInOut,
            "bounce" => Easing::Bounce,
            "elastic" => Easing::Elastic,
            other => {
                tracing::warn!("Unknown easing {:?}, using ease-out", other);
                Easing::EaseOut
            }
        }
    }

    /// Map normalized progress to eased progress.
    ///
    /// Input is clamped to `[0, 1]`. Every curve returns exactly 0 at 0 and
    /// exactly 1 at 1; bounce and elastic may leave `[0, 1]` in between.
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::Ease => t * t * (3.0 - 2.0 * t),
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::Bounce => bounce_out(t),
            Easing::Elastic => elastic_out(t),
        }
    }
}

/// Free-function form of [`Easing::apply`]
pub fn ease(kind: Easing, t: f64) -> f64 {
    kind.apply(t)
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;

    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else if t < 1.0 {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    } else {
        1.0
    }
}

fn elastic_out(t: f64) -> f64 {
    const PERIOD: f64 = 0.3;

    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let shift = PERIOD / 4.0;
    2f64.powf(-10.0 * t) * ((t - shift) * (2.0 * PI) / PERIOD).sin() + 1.0
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Easing {
    fn from(name: String) -> Self {
        Easing::from_name(&name)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_endpoints_are_exact() {
        for easing in Easing::ALL {
            assert!(easing.apply(0.0).abs() < EPS, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < EPS, "{easing} at 1");
        }
    }

    #[test]
    fn test_quadratic_curves() {
        assert!((Easing::EaseIn.apply(0.25) - 0.0625).abs() < EPS);
        assert!((Easing::EaseOut.apply(0.5) - 0.75).abs() < EPS);
        assert!((Easing::EaseInOut.apply(0.25) - 0.125).abs() < EPS);
        assert!((Easing::EaseInOut.apply(0.75) - 0.875).abs() < EPS);
        assert!((Easing::Ease.apply(0.5) - 0.5).abs() < EPS);
        assert!((Easing::Linear.apply(0.3) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::EaseIn.apply(2.0), 1.0);
        assert_eq!(Easing::Linear.apply(f64::NAN), 0.0);
    }

    #[test]
    fn test_bounce_piecewise_joins() {
        // Each parabola reaches 1 (or close) at its breakpoint
        assert!((bounce_out(1.0 / 2.75) - 1.0).abs() < 1e-9);
        assert!((bounce_out(2.0 / 2.75) - 1.0).abs() < 1e-9);
        assert!(bounce_out(0.9) > 0.9 && bounce_out(0.9) <= 1.0);
    }

    #[test]
    fn test_elastic_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::Elastic.apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_unknown_name_falls_back_to_ease_out() {
        assert_eq!(Easing::from_name("cubic-bezier(0,0,1,1)"), Easing::EaseOut);
        let parsed: Easing = serde_json::from_str("\"wobble\"").unwrap();
        assert_eq!(parsed, Easing::EaseOut);
    }

    #[test]
    fn test_wire_names_round_trip() {
        for easing in Easing::ALL {
            assert_eq!(Easing::from_name(easing.as_str()), easing);
        }
        assert_eq!(serde_json::to_string(&Easing::EaseInOut).unwrap(), "\"ease-in-out\"");
    }
}

//! Color ramp (gradient) evaluation.

use serde::{Deserialize, Serialize};
use swatch_api_core::blend::{lerp_array, smoothstep};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RampInterpolation {
    #[default]
    Linear,
    Constant,
    Ease,
}

/// One stop of a ramp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RampElement {
    pub position: f32,
    pub color: [f32; 4],
}

/// Gradient of colors over [0, 1].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    #[serde(default)]
    pub interpolation: RampInterpolation,
    #[serde(default)]
    pub elements: Vec<RampElement>,
}

impl ColorRamp {
    pub fn new(interpolation: RampInterpolation, mut elements: Vec<RampElement>) -> Self {
        elements.sort_by(|a, b| a.position.total_cmp(&b.position));
        ColorRamp {
            interpolation,
            elements,
        }
    }

    /// Sample the ramp at `factor`, clamped to [0, 1].
    ///
    /// Stops are assumed sorted by position (see [`ColorRamp::new`]). An empty
    /// ramp is opaque black.
    pub fn evaluate(&self, factor: f32) -> [f32; 4] {
        let t = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        let (first, last) = match (self.elements.first(), self.elements.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0.0, 0.0, 0.0, 1.0],
        };
        if t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }

        // First stop strictly after t; the one before it brackets from below.
        let upper = self
            .elements
            .iter()
            .position(|e| e.position > t)
            .unwrap_or(self.elements.len() - 1);
        let lo = &self.elements[upper - 1];
        let hi = &self.elements[upper];

        match self.interpolation {
            RampInterpolation::Constant => lo.color,
            RampInterpolation::Linear | RampInterpolation::Ease => {
                let span = hi.position - lo.position;
                let mut local = if span > 0.0 { (t - lo.position) / span } else { 0.0 };
                if self.interpolation == RampInterpolation::Ease {
                    local = smoothstep(local);
                }
                lerp_array(&lo.color, &hi.color, local)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_to_white(interpolation: RampInterpolation) -> ColorRamp {
        ColorRamp::new(
            interpolation,
            vec![
                RampElement {
                    position: 1.0,
                    color: [1.0, 1.0, 1.0, 1.0],
                },
                RampElement {
                    position: 0.0,
                    color: [0.0, 0.0, 0.0, 1.0],
                },
            ],
        )
    }

    #[test]
    fn linear_ramp_interpolates_between_stops() {
        let ramp = black_to_white(RampInterpolation::Linear);
        assert_eq!(ramp.evaluate(0.25), [0.25, 0.25, 0.25, 1.0]);
    }

    #[test]
    fn constant_ramp_holds_lower_stop() {
        let ramp = black_to_white(RampInterpolation::Constant);
        assert_eq!(ramp.evaluate(0.9), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(ramp.evaluate(1.0), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn factor_outside_unit_range_is_clamped() {
        let ramp = black_to_white(RampInterpolation::Linear);
        assert_eq!(ramp.evaluate(-3.0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(ramp.evaluate(7.0), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn ease_ramp_matches_linear_at_midpoint() {
        let ramp = black_to_white(RampInterpolation::Ease);
        assert_eq!(ramp.evaluate(0.5), [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn empty_ramp_is_black() {
        assert_eq!(ColorRamp::default().evaluate(0.5), [0.0, 0.0, 0.0, 1.0]);
    }
}

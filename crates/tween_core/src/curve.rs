//! Sampled control curves
//!
//! A [`Curve`] is an ordered list of keys used as a custom shape or ease.
//! It does not need to be monotonic or stay inside `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::easing::Shape;
use crate::error::{Result, TweenError};

/// A single key on a curve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Time position
    pub time: f32,
    /// Curve value at this key
    pub value: f32,
    /// Shape used when transitioning TO this key
    #[serde(default)]
    pub segment: Shape,
}

impl CurveKey {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            segment: Shape::Linear,
        }
    }
}

/// A sampled curve evaluated at normalized time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    keys: Vec<CurveKey>,
}

impl Curve {
    /// Create an empty curve
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity curve from (0, 0) to (1, 1)
    pub fn linear() -> Self {
        Self::new().key(0.0, 0.0).key(1.0, 1.0)
    }

    /// Add a key with a linear segment (builder pattern)
    pub fn key(self, time: f32, value: f32) -> Self {
        self.key_with(time, value, Shape::Linear)
    }

    /// Add a key whose incoming segment follows `segment`
    pub fn key_with(mut self, time: f32, value: f32, segment: Shape) -> Self {
        self.keys.push(CurveKey {
            time,
            value,
            segment,
        });
        // Keep keys sorted by time
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        self
    }

    /// Get the keys, sorted by time
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check that the curve can be evaluated
    pub fn validate(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(TweenError::EmptyCurve);
        }
        Ok(())
    }

    /// Evaluate the curve at `t`
    ///
    /// Times before the first key or after the last key hold the edge value.
    /// An empty curve evaluates to `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return t;
        };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // Find surrounding keys
        let mut prev = first;
        let mut next = last;
        for key in &self.keys {
            if key.time <= t {
                prev = key;
            }
            if key.time >= t {
                next = key;
                break;
            }
        }

        let span = next.time - prev.time;
        if span.abs() < f32::EPSILON {
            return prev.value;
        }

        let local = (t - prev.time) / span;
        let eased = next.segment.apply(local);
        prev.value + (next.value - prev.value) * eased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_curve_is_identity() {
        let curve = Curve::linear();
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((curve.evaluate(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_keys_are_sorted_and_clamped() {
        let curve = Curve::new().key(1.0, 2.0).key(0.0, -1.0).key(0.5, 0.0);
        let times: Vec<f32> = curve.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);

        assert_eq!(curve.evaluate(-1.0), -1.0);
        assert_eq!(curve.evaluate(2.0), 2.0);
        assert!((curve.evaluate(0.25) + 0.5).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_monotonic_curve() {
        let curve = Curve::new().key(0.0, 0.0).key(0.5, 1.5).key(1.0, 1.0);
        assert!(curve.evaluate(0.5) > 1.0);
        assert!((curve.evaluate(0.75) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_segment_shape_applies_to_incoming_span() {
        let curve = Curve::new()
            .key(0.0, 0.0)
            .key_with(1.0, 1.0, Shape::Quad);
        assert!((curve.evaluate(0.5) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_empty_curve_fails_validation() {
        assert_eq!(Curve::new().validate(), Err(TweenError::EmptyCurve));
        assert!(Curve::linear().validate().is_ok());
        assert_eq!(Curve::new().evaluate(0.3), 0.3);
    }
}

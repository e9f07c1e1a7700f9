//! Easing functions for tweens
//!
//! A [`Shape`] maps normalized time to progress and may overshoot `[0, 1]`
//! (Back, Elastic). An [`Ease`] decides where along the shape the
//! acceleration happens by composing the shape function.

use std::f32::consts::PI;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::curve::Curve;

const BACK_C1: f32 = 1.70158;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const BOUNCE_N1: f32 = 7.5625;
const BOUNCE_D1: f32 = 2.75;

/// Caller-supplied shape function
#[derive(Clone)]
pub struct ShapeFn(Rc<dyn Fn(f32) -> f32>);

impl ShapeFn {
    pub fn new(f: impl Fn(f32) -> f32 + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, t: f32) -> f32 {
        (self.0)(t)
    }
}

impl fmt::Debug for ShapeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShapeFn(..)")
    }
}

impl PartialEq for ShapeFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Caller-supplied ease: receives normalized time and the shape function
#[derive(Clone)]
pub struct EaseFn(Rc<dyn Fn(f32, &dyn Fn(f32) -> f32) -> f32>);

impl EaseFn {
    pub fn new(f: impl Fn(f32, &dyn Fn(f32) -> f32) -> f32 + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, t: f32, shape: &dyn Fn(f32) -> f32) -> f32 {
        (self.0)(t, shape)
    }
}

impl fmt::Debug for EaseFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EaseFn(..)")
    }
}

impl PartialEq for EaseFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Shape ("type") of a tween curve
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Linear,
    Quad,
    Cubic,
    Quart,
    Quint,
    Sine,
    Circ,
    Expo,
    Back,
    Elastic,
    Bounce,
    CubicBezier(f32, f32, f32, f32),
    /// Caller-supplied function
    #[serde(skip)]
    Custom(ShapeFn),
    /// Sampled control curve
    Curve(Curve),
}

impl Shape {
    /// Build a custom shape from a function
    pub fn custom(f: impl Fn(f32) -> f32 + 'static) -> Self {
        Shape::Custom(ShapeFn::new(f))
    }

    /// Evaluate the shape at normalized time `t`
    ///
    /// Named shapes are pinned to exactly 0 at `t == 0` and exactly 1 at
    /// `t == 1`.
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Shape::Custom(f) => f.call(t),
            Shape::Curve(curve) => curve.evaluate(t),
            _ if t == 0.0 => 0.0,
            _ if t == 1.0 => 1.0,
            Shape::Linear => t,
            Shape::Quad => t * t,
            Shape::Cubic => t * t * t,
            Shape::Quart => t * t * t * t,
            Shape::Quint => t * t * t * t * t,
            Shape::Sine => 1.0 - (t * PI / 2.0).cos(),
            Shape::Circ => 1.0 - (1.0 - t * t).sqrt(),
            Shape::Expo => 2f32.powf(10.0 * t - 10.0),
            Shape::Back => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Shape::Elastic => {
                -(2f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
            }
            Shape::Bounce => bounce(t),
            Shape::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
        }
    }

    /// Get the curve carried by this shape, if any
    pub fn curve(&self) -> Option<&Curve> {
        match self {
            Shape::Curve(curve) => Some(curve),
            _ => None,
        }
    }

    /// All named shapes, in declaration order
    pub fn named() -> [Shape; 11] {
        [
            Shape::Linear,
            Shape::Quad,
            Shape::Cubic,
            Shape::Quart,
            Shape::Quint,
            Shape::Sine,
            Shape::Circ,
            Shape::Expo,
            Shape::Back,
            Shape::Elastic,
            Shape::Bounce,
        ]
    }
}

/// Ease applied around a [`Shape`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    #[default]
    In,
    Out,
    InOut,
    OutIn,
    /// Caller-supplied function of `(t, shape)`
    #[serde(skip)]
    Custom(EaseFn),
    /// Curve applied to the shape's own output
    Curve(Curve),
}

impl Ease {
    /// Build a custom ease from a function of `(t, shape)`
    pub fn custom(f: impl Fn(f32, &dyn Fn(f32) -> f32) -> f32 + 'static) -> Self {
        Ease::Custom(EaseFn::new(f))
    }

    /// Apply the ease to normalized time `t` using `shape`
    ///
    /// The result is not clamped so overshooting shapes keep their overshoot.
    pub fn apply(&self, t: f32, shape: &Shape) -> f32 {
        let s = |x: f32| shape.apply(x);
        match self {
            Ease::In => s(t),
            Ease::Out => 1.0 - s(1.0 - t),
            Ease::InOut => {
                if t < 0.5 {
                    0.5 * s(2.0 * t)
                } else {
                    1.0 - 0.5 * s(2.0 - 2.0 * t)
                }
            }
            Ease::OutIn => {
                if t < 0.5 {
                    0.5 * (1.0 - s(1.0 - 2.0 * t))
                } else {
                    0.5 + 0.5 * s(2.0 * t - 1.0)
                }
            }
            Ease::Custom(f) => f.call(t, &s),
            Ease::Curve(curve) => curve.evaluate(s(t)),
        }
    }

    /// Get the curve carried by this ease, if any
    pub fn curve(&self) -> Option<&Curve> {
        match self {
            Ease::Curve(curve) => Some(curve),
            _ => None,
        }
    }
}

fn bounce(mut t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        t -= 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        t -= 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        t -= 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

/// One axis of a cubic bezier with end points fixed at 0 and 1, in
/// polynomial form `((a*u + b)*u + c)*u`
#[derive(Clone, Copy)]
struct BezierAxis {
    a: f64,
    b: f64,
    c: f64,
}

impl BezierAxis {
    fn new(p1: f32, p2: f32) -> Self {
        let (p1, p2) = (f64::from(p1), f64::from(p2));
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        Self {
            a: 1.0 - c - b,
            b,
            c,
        }
    }

    fn at(&self, u: f64) -> f64 {
        ((self.a * u + self.b) * u + self.c) * u
    }

    fn derivative(&self, u: f64) -> f64 {
        (3.0 * self.a * u + 2.0 * self.b) * u + self.c
    }

    /// Parameter `u` in [0, 1] where this axis reaches `x`
    fn solve(&self, x: f64) -> f64 {
        const EPSILON: f64 = 1e-7;

        let mut u = x;
        for _ in 0..8 {
            let error = self.at(u) - x;
            if error.abs() < EPSILON {
                return u;
            }
            let d = self.derivative(u);
            if d.abs() < EPSILON {
                break;
            }
            u -= error / d;
        }

        // Newton stalled on a flat slope, bisect instead
        let (mut lo, mut hi) = (0.0, 1.0);
        u = x;
        for _ in 0..20 {
            let value = self.at(u);
            if (value - x).abs() < EPSILON {
                break;
            }
            if value < x {
                lo = u;
            } else {
                hi = u;
            }
            u = 0.5 * (lo + hi);
        }
        u
    }
}

/// CSS `cubic-bezier(x1, y1, x2, y2)` timing function
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let u = BezierAxis::new(x1, x2).solve(f64::from(t));
    BezierAxis::new(y1, y2).at(u) as f32
}

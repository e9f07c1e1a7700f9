//! Animatable value types
//!
//! The [`Interpolate`] trait is the compile-time capability a property needs
//! from its value: blend towards another value and, optionally, add a delta
//! for additive tweens. [`Value`] covers the cases where the concrete type is
//! only known at runtime.

use std::fmt;

use crate::error::{Result, TweenError};
use crate::math::{Color, Quat, Vec2, Vec3, Vec4};

/// Values that can be animated by a tween property
pub trait Interpolate: Clone + fmt::Debug + 'static {
    /// Blend from `self` to `to` by weight `t`
    ///
    /// `t` may fall outside `[0, 1]` when the easing overshoots.
    fn lerp(&self, to: &Self, t: f32) -> Self;

    /// `self + delta`, or `None` when the type has no addition
    fn add_delta(&self, _delta: &Self) -> Option<Self> {
        None
    }

    /// Check that `self` and `other` can be interpolated together
    fn check_compatible(&self, _other: &Self) -> Result<()> {
        Ok(())
    }

    /// Short name of the value kind, used in error messages
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl Interpolate for f32 {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t
    }

    fn add_delta(&self, delta: &Self) -> Option<Self> {
        Some(self + delta)
    }

    fn kind(&self) -> &'static str {
        "f32"
    }
}

impl Interpolate for f64 {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t as f64
    }

    fn add_delta(&self, delta: &Self) -> Option<Self> {
        Some(self + delta)
    }

    fn kind(&self) -> &'static str {
        "f64"
    }
}

// Integers blend in f64 and round to the nearest step
macro_rules! impl_interpolate_int {
    ($($ty:ty),+) => {
        $(
            impl Interpolate for $ty {
                fn lerp(&self, to: &Self, t: f32) -> Self {
                    let a = *self as f64;
                    let b = *to as f64;
                    (a + (b - a) * t as f64).round() as $ty
                }

                fn add_delta(&self, delta: &Self) -> Option<Self> {
                    self.checked_add(*delta)
                }

                fn kind(&self) -> &'static str {
                    stringify!($ty)
                }
            }
        )+
    };
}

impl_interpolate_int!(i32, i64);

macro_rules! impl_interpolate_linear {
    ($($ty:ident => $name:literal),+) => {
        $(
            impl Interpolate for $ty {
                fn lerp(&self, to: &Self, t: f32) -> Self {
                    *self + (*to - *self) * t
                }

                fn add_delta(&self, delta: &Self) -> Option<Self> {
                    Some(*self + *delta)
                }

                fn kind(&self) -> &'static str {
                    $name
                }
            }
        )+
    };
}

impl_interpolate_linear!(Vec2 => "vec2", Vec3 => "vec3", Vec4 => "vec4", Color => "color");

impl Interpolate for Quat {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        self.slerp(to, t)
    }

    fn kind(&self) -> &'static str {
        "quat"
    }
}

/// A value whose concrete type is chosen at runtime
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Color(Color),
    Quat(Quat),
}

impl Value {
    /// Build the narrowest value that holds `components`
    ///
    /// One to four components map to `Float`, `Vec2`, `Vec3` and `Vec4`.
    pub fn from_components(components: &[f32]) -> Option<Self> {
        match *components {
            [x] => Some(Value::Float(x)),
            [x, y] => Some(Value::Vec2(Vec2::new(x, y))),
            [x, y, z] => Some(Value::Vec3(Vec3::new(x, y, z))),
            [x, y, z, w] => Some(Value::Vec4(Vec4::new(x, y, z, w))),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl Interpolate for Value {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        match (self, to) {
            (Value::Float(a), Value::Float(b)) => Value::Float(a.lerp(b, t)),
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(a.lerp(b, t)),
            (Value::Vec3(a), Value::Vec3(b)) => Value::Vec3(a.lerp(b, t)),
            (Value::Vec4(a), Value::Vec4(b)) => Value::Vec4(a.lerp(b, t)),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
            (Value::Quat(a), Value::Quat(b)) => Value::Quat(a.lerp(b, t)),
            // Mismatched kinds are rejected at configuration time
            _ => *self,
        }
    }

    fn add_delta(&self, delta: &Self) -> Option<Self> {
        match (self, delta) {
            (Value::Float(a), Value::Float(b)) => a.add_delta(b).map(Value::Float),
            (Value::Vec2(a), Value::Vec2(b)) => a.add_delta(b).map(Value::Vec2),
            (Value::Vec3(a), Value::Vec3(b)) => a.add_delta(b).map(Value::Vec3),
            (Value::Vec4(a), Value::Vec4(b)) => a.add_delta(b).map(Value::Vec4),
            (Value::Color(a), Value::Color(b)) => a.add_delta(b).map(Value::Color),
            _ => None,
        }
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if std::mem::discriminant(self) == std::mem::discriminant(other) {
            Ok(())
        } else {
            Err(TweenError::UnsupportedType {
                from: self.kind(),
                to: other.kind(),
            })
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Float(v) => v.kind(),
            Value::Vec2(v) => v.kind(),
            Value::Vec3(v) => v.kind(),
            Value::Vec4(v) => v.kind(),
            Value::Color(v) => v.kind(),
            Value::Quat(v) => v.kind(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{:.4}", v),
            Value::Vec2(v) => write!(f, "({:.4}, {:.4})", v.x, v.y),
            Value::Vec3(v) => write!(f, "({:.4}, {:.4}, {:.4})", v.x, v.y, v.z),
            Value::Vec4(v) => write!(f, "({:.4}, {:.4}, {:.4}, {:.4})", v.x, v.y, v.z, v.w),
            Value::Color(c) => write!(f, "rgba({:.4}, {:.4}, {:.4}, {:.4})", c.r, c.g, c.b, c.a),
            Value::Quat(q) => write!(f, "quat({:.4}, {:.4}, {:.4}, {:.4})", q.x, q.y, q.z, q.w),
        }
    }
}

macro_rules! impl_value_from {
    ($($variant:ident($ty:ty)),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )+
    };
}

impl_value_from!(
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Color(Color),
    Quat(Quat)
);

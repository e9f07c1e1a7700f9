//! Tween Engine Core
//!
//! Time-driven property animation: tweens interpolate values over time and
//! notify listeners as they start, update, loop and finish.
//!
//! # Features
//!
//! - **Easing**: named shapes (Quad through Bounce, cubic bezier) composed
//!   with In/Out/InOut/OutIn eases, or custom functions and sampled curves
//! - **Properties**: detached, callback or member-bound values with delay,
//!   from-current and additive modes
//! - **Tweens**: parallel or chained playback with finite or infinite loops
//! - **Scheduler**: per-thread registry driven by one `tick(dt)` per frame
//!
//! # Example
//!
//! ```ignore
//! use tween_core::{Ease, Scheduler, Shape};
//!
//! let scheduler = Scheduler::new();
//! let tween = scheduler.create_tween().chain();
//! let fade = tween.new_property(0.0f32, 1.0, 0.5).shape(Shape::Sine);
//! tween.new_property(1.0f32, 2.0, 1.0).ease(Ease::InOut);
//! tween.play();
//!
//! while scheduler.tick(1.0 / 60.0) {}
//! assert_eq!(fade.current_value(), 1.0);
//! ```

pub mod config;
pub mod curve;
pub mod easing;
pub mod error;
pub mod math;
pub mod member;
pub mod observer;
pub mod property;
pub mod scheduler;
pub mod tween;
pub mod values;

pub use config::{PropertyDefaults, TweenSettings};
pub use curve::{Curve, CurveKey};
pub use easing::{Ease, EaseFn, Shape, ShapeFn};
pub use error::{ConfigError, Result, TweenError};
pub use math::{Color, Quat, Vec2, Vec3, Vec4};
pub use member::{targets, MemberAccessor, Members};
pub use observer::ListenerId;
pub use property::{Property, PropertyId, PropertyState};
pub use scheduler::{
    get_scheduler, is_scheduler_initialized, reset_global_scheduler, set_global_scheduler,
    try_get_scheduler, Scheduler,
};
pub use tween::{PlayMode, Tween, TweenConfig, TweenId, TweenState};
pub use values::{Interpolate, Value};

//! Named member binding
//!
//! A bound property drives one member of a host object. Target types expose
//! their animatable members through [`Members`]; the accessor is resolved
//! once when the property is created and then used on every update.
//!
//! ```ignore
//! struct Sprite {
//!     position: Vec3,
//!     tint: Color,
//! }
//!
//! impl_members!(Sprite {
//!     Vec3 => { "position" => position },
//!     Color => { "color" => tint },
//! });
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{Result, TweenError};
use crate::values::Interpolate;

/// Getter/setter pair for one member of `T` holding a `V`
pub struct MemberAccessor<T, V> {
    name: &'static str,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T, V> MemberAccessor<T, V> {
    pub const fn new(name: &'static str, get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        Self { name, get, set }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, target: &T) -> V {
        (self.get)(target)
    }

    pub fn set(&self, target: &mut T, value: V) {
        (self.set)(target, value)
    }
}

impl<T, V> Clone for MemberAccessor<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for MemberAccessor<T, V> {}

impl<T, V> fmt::Debug for MemberAccessor<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberAccessor")
            .field("name", &self.name)
            .finish()
    }
}

/// Types that expose named members of value type `V`
pub trait Members<V: Interpolate>: Sized + 'static {
    /// Resolve a member by name
    fn member(name: &str) -> Option<MemberAccessor<Self, V>>;
}

/// Implement [`Members`] for field-backed members
///
/// Each value type gets its own block; a member maps a name to a field path.
#[macro_export]
macro_rules! impl_members {
    ($target:ty { $($value:ty => { $($name:literal => $($field:ident).+),* $(,)? }),* $(,)? }) => {
        $(
            impl $crate::Members<$value> for $target {
                fn member(name: &str) -> Option<$crate::MemberAccessor<Self, $value>> {
                    match name {
                        $(
                            $name => Some($crate::MemberAccessor::new(
                                $name,
                                |t: &Self| t.$($field).+.clone(),
                                |t: &mut Self, v: $value| t.$($field).+ = v,
                            )),
                        )*
                        _ => None,
                    }
                }
            }
        )*
    };
}

/// Type-erased access to a bound member
pub(crate) trait BoundMember<V> {
    fn name(&self) -> &str;
    fn read(&self) -> Result<V>;
    fn write(&self, value: V) -> Result<()>;
    fn is_alive(&self) -> bool;
}

/// Weak binding of a member accessor to a shared target
pub(crate) struct Binding<T, V> {
    target: Weak<RefCell<T>>,
    accessor: MemberAccessor<T, V>,
}

impl<T, V> Binding<T, V> {
    pub(crate) fn new(target: &Rc<RefCell<T>>, accessor: MemberAccessor<T, V>) -> Self {
        Self {
            target: Rc::downgrade(target),
            accessor,
        }
    }

    fn upgrade(&self) -> Result<Rc<RefCell<T>>> {
        self.target
            .upgrade()
            .ok_or_else(|| TweenError::TargetDropped(self.accessor.name.to_string()))
    }
}

impl<T, V> BoundMember<V> for Binding<T, V> {
    fn name(&self) -> &str {
        self.accessor.name
    }

    fn read(&self) -> Result<V> {
        let target = self.upgrade()?;
        let guard = target
            .try_borrow()
            .map_err(|_| TweenError::TargetBusy(self.accessor.name.to_string()))?;
        Ok(self.accessor.get(&guard))
    }

    fn write(&self, value: V) -> Result<()> {
        let target = self.upgrade()?;
        let mut guard = target
            .try_borrow_mut()
            .map_err(|_| TweenError::TargetBusy(self.accessor.name.to_string()))?;
        self.accessor.set(&mut guard, value);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

/// Resolve `name` on `T`, producing a binding or a `MemberNotFound` error
pub(crate) fn resolve<T, V>(target: &Rc<RefCell<T>>, name: &str) -> Result<Binding<T, V>>
where
    T: Members<V>,
    V: Interpolate,
{
    match T::member(name) {
        Some(accessor) => Ok(Binding::new(target, accessor)),
        None => Err(TweenError::MemberNotFound {
            target: std::any::type_name::<T>(),
            member: name.to_string(),
            value: std::any::type_name::<V>(),
        }),
    }
}

/// Well-known member names for common host components
pub mod targets {
    /// Transform members
    pub mod transform {
        pub const POSITION: &str = "position";
        pub const LOCAL_POSITION: &str = "localPosition";
        pub const ROTATION: &str = "rotation";
        pub const LOCAL_ROTATION: &str = "localRotation";
        pub const EULER_ANGLES: &str = "eulerAngles";
        pub const LOCAL_EULER_ANGLES: &str = "localEulerAngles";
        pub const LOCAL_SCALE: &str = "localScale";
    }

    /// Renderer members
    pub mod renderer {
        pub const COLOR: &str = "color";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Color, Vec3};

    #[derive(Default)]
    struct Sprite {
        position: Vec3,
        tint: Color,
        opacity: f32,
    }

    crate::impl_members!(Sprite {
        Vec3 => { "position" => position },
        Color => { "color" => tint },
        f32 => { "opacity" => opacity, "position.x" => position.x },
    });

    #[test]
    fn test_resolve_and_write() {
        let sprite = Rc::new(RefCell::new(Sprite::default()));
        let binding: Binding<Sprite, Vec3> = resolve(&sprite, "position").unwrap();
        binding.write(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(sprite.borrow().position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(binding.read().unwrap(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_nested_field_path() {
        let sprite = Rc::new(RefCell::new(Sprite::default()));
        let binding: Binding<Sprite, f32> = resolve(&sprite, "position.x").unwrap();
        binding.write(4.0).unwrap();
        assert_eq!(sprite.borrow().position.x, 4.0);
        assert_eq!(sprite.borrow().opacity, 0.0);
    }

    #[test]
    fn test_missing_member() {
        let sprite = Rc::new(RefCell::new(Sprite::default()));
        let err = resolve::<Sprite, Vec3>(&sprite, "scale").err().unwrap();
        assert!(matches!(err, TweenError::MemberNotFound { ref member, .. } if member == "scale"));
        assert!(err.is_missing_target());

        // Right name, wrong value type
        assert!(resolve::<Sprite, f32>(&sprite, "color").is_err());
    }

    #[test]
    fn test_dropped_and_busy_target() {
        let sprite = Rc::new(RefCell::new(Sprite::default()));
        let binding: Binding<Sprite, Color> = resolve(&sprite, "color").unwrap();

        {
            let _guard = sprite.borrow_mut();
            assert_eq!(
                binding.write(Color::RED),
                Err(TweenError::TargetBusy("color".to_string()))
            );
        }

        drop(sprite);
        assert!(!binding.is_alive());
        assert_eq!(
            binding.write(Color::RED),
            Err(TweenError::TargetDropped("color".to_string()))
        );
    }
}

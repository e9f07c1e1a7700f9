//! Tween properties
//!
//! A [`Property`] animates one value from a start to an end over a duration.
//! Each update eases the normalized progress and hands the interpolated
//! value to one of three dispatch strategies:
//!
//! - **Detached**: nothing is written; read [`Property::current_value`] or
//!   listen with [`Property::on_value`]
//! - **Callback**: a closure receives every value
//! - **Bound**: a named member of a shared target is written through a
//!   [`MemberAccessor`](crate::MemberAccessor)
//!
//! Properties are cheap handles. Clones refer to the same animation, so the
//! handle returned by [`Tween::new_property`](crate::Tween::new_property) can
//! be configured fluently and kept for inspection.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::config::PropertyDefaults;
use crate::curve::Curve;
use crate::easing::{Ease, Shape};
use crate::error::TweenError;
use crate::member::{self, BoundMember, Members};
use crate::observer::{ListenerId, Observers};
use crate::tween::{Tween, TweenInner};
use crate::values::Interpolate;

static NEXT_PROPERTY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique property identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u64);

impl PropertyId {
    fn next() -> Self {
        Self(NEXT_PROPERTY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "property#{}", self.0)
    }
}

/// Playback state of a property
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PropertyState {
    #[default]
    Idle,
    Playing,
    Paused,
    Finished,
}

impl PropertyState {
    /// Started and not yet finished
    pub fn is_active(&self) -> bool {
        matches!(self, PropertyState::Playing | PropertyState::Paused)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PropertyEvent {
    Start,
    Update,
    Finish,
}

enum Dispatch<V> {
    Detached,
    Callback(Rc<dyn Fn(&V)>),
    Bound(Box<dyn BoundMember<V>>),
}

struct PropertyData<V> {
    start: V,
    end: V,
    /// Delta added to the captured start in additive mode
    increase: Option<V>,
    current: V,
    duration: f32,
    delay: f32,
    shape: Shape,
    ease: Ease,
    elapsed: f32,
    state: PropertyState,
    from_current: bool,
    /// Start already read this play (absolute mode captures once)
    captured: bool,
    error: Option<TweenError>,
}

impl<V: Interpolate> PropertyData<V> {
    fn target(&self) -> V {
        match &self.increase {
            Some(delta) => self
                .start
                .add_delta(delta)
                .unwrap_or_else(|| self.end.clone()),
            None => self.end.clone(),
        }
    }

    fn value_at(&self, weight: f32) -> V {
        self.start.lerp(&self.target(), weight)
    }
}

struct PropertyInner<V> {
    id: PropertyId,
    data: RefCell<PropertyData<V>>,
    dispatch: Dispatch<V>,
    owner: RefCell<Weak<TweenInner>>,
    next: RefCell<SmallVec<[Rc<dyn AnyProperty>; 2]>>,
    /// Successor wired by a chained tween; rebuilt on every play
    chain_next: RefCell<Option<Rc<dyn AnyProperty>>>,
    observers: Observers<PropertyEvent, Property<V>>,
}

/// One animated value
pub struct Property<V> {
    inner: Rc<PropertyInner<V>>,
}

impl<V: Interpolate> Clone for Property<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Interpolate> fmt::Debug for Property<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.data.borrow();
        f.debug_struct("Property")
            .field("id", &self.inner.id)
            .field("state", &data.state)
            .field("current", &data.current)
            .field("duration", &data.duration)
            .finish()
    }
}

impl<V: Interpolate> Property<V> {
    fn with_dispatch(dispatch: Dispatch<V>, start: V, end: V, duration: f32) -> Self {
        let property = Self {
            inner: Rc::new(PropertyInner {
                id: PropertyId::next(),
                data: RefCell::new(PropertyData {
                    current: start.clone(),
                    start,
                    end,
                    increase: None,
                    duration: duration.max(0.0),
                    delay: 0.0,
                    shape: Shape::default(),
                    ease: Ease::default(),
                    elapsed: 0.0,
                    state: PropertyState::Idle,
                    from_current: false,
                    captured: false,
                    error: None,
                }),
                dispatch,
                owner: RefCell::new(Weak::new()),
                next: RefCell::new(SmallVec::new()),
                chain_next: RefCell::new(None),
                observers: Observers::new(),
            }),
        };

        let check = {
            let data = property.inner.data.borrow();
            data.start.check_compatible(&data.end)
        };
        if let Err(err) = check {
            property.record_error(err);
        }
        property
    }

    /// Create a detached property
    pub fn new(start: V, end: V, duration: f32) -> Self {
        Self::with_dispatch(Dispatch::Detached, start, end, duration)
    }

    /// Create a property that passes every value to `callback`
    pub fn with_callback(
        callback: impl Fn(&V) + 'static,
        start: V,
        end: V,
        duration: f32,
    ) -> Self {
        Self::with_dispatch(Dispatch::Callback(Rc::new(callback)), start, end, duration)
    }

    /// Create a property bound to member `name` of `target`
    ///
    /// The start value is read from the member when the property starts.
    pub fn bound<T: Members<V>>(target: &Rc<RefCell<T>>, name: &str, end: V, duration: f32) -> Self {
        let (dispatch, start, error) = match member::resolve::<T, V>(target, name) {
            Ok(binding) => {
                // Provisional start until the member is read at play time
                let start = binding.read().unwrap_or_else(|_| end.clone());
                (Dispatch::Bound(Box::new(binding)), start, None)
            }
            Err(err) => (Dispatch::Detached, end.clone(), Some(err)),
        };

        let property = Self::with_dispatch(dispatch, start, end, duration);
        property.inner.data.borrow_mut().from_current = true;
        if let Some(err) = error {
            property.record_error(err);
        }
        property
    }

    /// Create a property bound to member `name` of `target` with an explicit
    /// start value
    pub fn bound_from<T: Members<V>>(
        target: &Rc<RefCell<T>>,
        name: &str,
        start: V,
        end: V,
        duration: f32,
    ) -> Self {
        let (dispatch, error) = match member::resolve::<T, V>(target, name) {
            Ok(binding) => (Dispatch::Bound(Box::new(binding)), None),
            Err(err) => (Dispatch::Detached, Some(err)),
        };

        let property = Self::with_dispatch(dispatch, start, end, duration);
        if let Some(err) = error {
            property.record_error(err);
        }
        property
    }

    pub(crate) fn apply_defaults(&self, defaults: &PropertyDefaults) {
        self.set_delay(defaults.delay);
        self.set_shape(defaults.shape.clone());
        self.set_ease(defaults.ease.clone());
    }

    fn record_error(&self, err: TweenError) {
        tracing::error!(property = %self.inner.id, "{}", err);
        let mut data = self.inner.data.borrow_mut();
        if data.error.is_none() {
            data.error = Some(err);
        }
    }

    fn is_bound(&self) -> bool {
        matches!(self.inner.dispatch, Dispatch::Bound(_))
    }

    // Builder methods

    /// Wait `seconds` after starting before moving
    pub fn delay(self, seconds: f32) -> Self {
        self.set_delay(seconds);
        self
    }

    pub fn duration(self, seconds: f32) -> Self {
        self.set_duration(seconds);
        self
    }

    pub fn shape(self, shape: Shape) -> Self {
        self.set_shape(shape);
        self
    }

    pub fn ease(self, ease: Ease) -> Self {
        self.set_ease(ease);
        self
    }

    /// Use a caller-supplied shape function
    pub fn custom_shape(self, f: impl Fn(f32) -> f32 + 'static) -> Self {
        self.shape(Shape::custom(f))
    }

    /// Use a caller-supplied ease of `(t, shape)`
    pub fn custom_ease(self, f: impl Fn(f32, &dyn Fn(f32) -> f32) -> f32 + 'static) -> Self {
        self.ease(Ease::custom(f))
    }

    /// Use a sampled curve as the shape
    pub fn shape_curve(self, curve: Curve) -> Self {
        self.shape(Shape::Curve(curve))
    }

    /// Apply a sampled curve to the shape's output
    pub fn ease_curve(self, curve: Curve) -> Self {
        self.ease(Ease::Curve(curve))
    }

    /// Start from `value` instead of the current value
    ///
    /// Additive bound properties always read their start from the target, so
    /// the value is ignored for them.
    pub fn from(self, value: V) -> Self {
        let check = value.check_compatible(&self.inner.data.borrow().end);
        if let Err(err) = check {
            self.record_error(err);
            return self;
        }

        let additive = self.is_additive();
        if additive && self.is_bound() {
            tracing::warn!(
                property = %self.inner.id,
                "additive bound property reads its start from the target, ignoring from()"
            );
            return self;
        }

        let mut data = self.inner.data.borrow_mut();
        data.start = value.clone();
        data.current = value;
        // Additive mode keeps capturing so loops accumulate from here
        data.from_current = additive;
        drop(data);
        self
    }

    /// Read the start value when the property starts
    ///
    /// Bound properties read their member; others continue from their own
    /// current value.
    pub fn from_current(self) -> Self {
        self.inner.data.borrow_mut().from_current = true;
        self
    }

    /// Treat `delta` as an offset added to the captured start
    ///
    /// Additive mode always captures the start value when the property
    /// starts, so every loop continues from where the previous one ended.
    pub fn additive(self, delta: V) -> Self {
        let check = {
            let data = self.inner.data.borrow();
            data.start.check_compatible(&delta).and_then(|_| {
                match data.start.add_delta(&delta) {
                    Some(_) => Ok(()),
                    None => Err(TweenError::UnsupportedAdditive(delta.kind())),
                }
            })
        };
        if let Err(err) = check {
            self.record_error(err);
            return self;
        }

        if self.is_bound() && !self.is_from_current() {
            tracing::warn!(
                property = %self.inner.id,
                "additive bound property reads its start from the target, ignoring from()"
            );
        }

        let mut data = self.inner.data.borrow_mut();
        data.increase = Some(delta);
        data.from_current = true;
        drop(data);
        self
    }

    /// Interpolate towards the absolute end value
    ///
    /// Start selection is left as it is.
    pub fn absolute(self) -> Self {
        self.inner.data.borrow_mut().increase = None;
        self
    }

    /// Link `next` to start when this property finishes
    pub fn then<W: Interpolate>(self, next: &Property<W>) -> Self {
        self.add_next(next);
        self
    }

    // Mutating setters

    pub fn set_delay(&self, seconds: f32) {
        self.inner.data.borrow_mut().delay = seconds.max(0.0);
    }

    pub fn set_duration(&self, seconds: f32) {
        self.inner.data.borrow_mut().duration = seconds.max(0.0);
    }

    pub fn set_shape(&self, shape: Shape) {
        if let Some(Err(err)) = shape.curve().map(Curve::validate) {
            self.record_error(err);
        }
        self.inner.data.borrow_mut().shape = shape;
    }

    pub fn set_ease(&self, ease: Ease) {
        if let Some(Err(err)) = ease.curve().map(Curve::validate) {
            self.record_error(err);
        }
        self.inner.data.borrow_mut().ease = ease;
    }

    /// Change the end value (the delta in additive mode is unaffected)
    pub fn set_end(&self, end: V) {
        let check = self.inner.data.borrow().start.check_compatible(&end);
        match check {
            Ok(()) => self.inner.data.borrow_mut().end = end,
            Err(err) => self.record_error(err),
        }
    }

    /// Link `next` to start when this property finishes
    ///
    /// Links run in insertion order; linking the same property twice has no
    /// effect.
    pub fn add_next<W: Interpolate>(&self, next: &Property<W>) {
        let id = next.id();
        let mut links = self.inner.next.borrow_mut();
        if links.iter().any(|p| p.id() == id) {
            return;
        }
        links.push(Rc::new(next.clone()));
    }

    // Accessors

    pub fn id(&self) -> PropertyId {
        self.inner.id
    }

    pub fn state(&self) -> PropertyState {
        self.inner.data.borrow().state
    }

    /// Whether `start()` has run since the last rewind
    pub fn has_started(&self) -> bool {
        self.state() != PropertyState::Idle
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PropertyState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state() == PropertyState::Paused
    }

    pub fn is_finished(&self) -> bool {
        self.state() == PropertyState::Finished
    }

    pub fn current_value(&self) -> V {
        self.inner.data.borrow().current.clone()
    }

    pub fn start_value(&self) -> V {
        self.inner.data.borrow().start.clone()
    }

    /// Value reached at full weight (start + delta in additive mode)
    pub fn end_value(&self) -> V {
        self.inner.data.borrow().target()
    }

    pub fn duration_secs(&self) -> f32 {
        self.inner.data.borrow().duration
    }

    pub fn delay_secs(&self) -> f32 {
        self.inner.data.borrow().delay
    }

    /// Time accumulated since start, delay included
    pub fn elapsed(&self) -> f32 {
        self.inner.data.borrow().elapsed
    }

    pub fn is_additive(&self) -> bool {
        self.inner.data.borrow().increase.is_some()
    }

    pub fn is_from_current(&self) -> bool {
        self.inner.data.borrow().from_current
    }

    /// First configuration or binding error recorded on this property
    pub fn error(&self) -> Option<TweenError> {
        self.inner.data.borrow().error.clone()
    }

    /// Owning tween, if it is still alive
    pub fn owner(&self) -> Option<Tween> {
        self.inner.owner.borrow().upgrade().map(Tween::from_inner)
    }

    // Observers

    pub fn on_start(&self, f: impl Fn(&Property<V>) + 'static) -> ListenerId {
        self.inner.observers.add(PropertyEvent::Start, f)
    }

    pub fn on_update(&self, f: impl Fn(&Property<V>) + 'static) -> ListenerId {
        self.inner.observers.add(PropertyEvent::Update, f)
    }

    pub fn on_finish(&self, f: impl Fn(&Property<V>) + 'static) -> ListenerId {
        self.inner.observers.add(PropertyEvent::Finish, f)
    }

    /// Receive every value as it is applied
    pub fn on_value(&self, f: impl Fn(&V) + 'static) -> ListenerId {
        self.inner
            .observers
            .add(PropertyEvent::Update, move |p: &Property<V>| {
                f(&p.current_value())
            })
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.observers.remove(id)
    }

    fn emit(&self, event: PropertyEvent) {
        self.inner.observers.emit(event, self);
    }

    // Lifecycle

    /// Start playing
    ///
    /// Does nothing while already playing or paused.
    pub fn start(&self) {
        if self.state().is_active() {
            return;
        }

        self.capture_start();
        {
            let mut data = self.inner.data.borrow_mut();
            data.state = PropertyState::Playing;
            data.elapsed = 0.0;
        }
        tracing::trace!(property = %self.inner.id, "property start");
        self.emit(PropertyEvent::Start);

        // A start listener may already have stopped us
        if !self.is_playing() {
            return;
        }

        if let Some(err) = self.blocking_error() {
            tracing::warn!(property = %self.inner.id, "skipping property: {}", err);
            self.finish(false, true);
            return;
        }

        let instant = {
            let data = self.inner.data.borrow();
            data.duration <= 0.0 && data.delay <= 0.0
        };
        if instant {
            self.finish(true, true);
        }
    }

    fn capture_start(&self) {
        let (from_current, additive, captured) = {
            let data = self.inner.data.borrow();
            (data.from_current, data.increase.is_some(), data.captured)
        };
        if !from_current || (captured && !additive) {
            return;
        }

        let value = match &self.inner.dispatch {
            Dispatch::Bound(binding) => match binding.read() {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(property = %self.inner.id, "cannot read start: {}", err);
                    return;
                }
            },
            _ => self.inner.data.borrow().current.clone(),
        };

        let mut data = self.inner.data.borrow_mut();
        data.start = value.clone();
        data.current = value;
        data.captured = true;
    }

    fn blocking_error(&self) -> Option<TweenError> {
        if let Some(err) = self.error() {
            return Some(err);
        }
        match &self.inner.dispatch {
            Dispatch::Bound(binding) if !binding.is_alive() => {
                Some(TweenError::TargetDropped(binding.name().to_string()))
            }
            _ => None,
        }
    }

    fn apply(&self, value: &V) -> crate::Result<()> {
        match &self.inner.dispatch {
            Dispatch::Detached => Ok(()),
            Dispatch::Callback(callback) => {
                callback(value);
                Ok(())
            }
            Dispatch::Bound(binding) => binding.write(value.clone()),
        }
    }

    /// Advance by `dt` seconds
    ///
    /// Does nothing unless playing. Progress is clamped before easing; the
    /// eased weight is not, so overshooting shapes overshoot the end value.
    pub fn update(&self, dt: f32) {
        {
            let mut data = self.inner.data.borrow_mut();
            if data.state != PropertyState::Playing {
                return;
            }
            data.elapsed += dt;
            if data.elapsed <= data.delay {
                return;
            }
        }

        let (value, done) = {
            let data = self.inner.data.borrow();
            let local = (data.elapsed - data.delay).clamp(0.0, data.duration);
            let t = if data.duration > 0.0 {
                (local / data.duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let weight = data.ease.apply(t, &data.shape);
            (data.value_at(weight), local >= data.duration)
        };
        self.inner.data.borrow_mut().current = value.clone();

        if let Err(err) = self.apply(&value) {
            tracing::warn!(property = %self.inner.id, "stopping property: {}", err);
            self.finish(false, true);
            return;
        }
        self.emit(PropertyEvent::Update);

        if done {
            self.finish(true, true);
        }
    }

    /// Stop playing, optionally snapping to the end value
    ///
    /// Fires finish, starts linked properties and reports to the owning
    /// tween. Does nothing unless playing or paused.
    pub fn stop(&self, set_to_final: bool) {
        self.finish(set_to_final, true);
    }

    fn finish(&self, set_to_final: bool, cascade: bool) {
        if !self.state().is_active() {
            return;
        }

        if set_to_final && self.error().is_none() {
            self.write_final();
        }
        self.inner.data.borrow_mut().state = PropertyState::Finished;
        tracing::trace!(property = %self.inner.id, "property finish");
        self.emit(PropertyEvent::Finish);

        if !cascade {
            return;
        }

        let chained = self.inner.chain_next.borrow().clone();
        let linked: SmallVec<[Rc<dyn AnyProperty>; 2]> = self.inner.next.borrow().clone();
        for next in chained.iter().chain(linked.iter()) {
            next.start();
        }

        if let Some(owner) = self.owner() {
            owner.property_finished(self.inner.id);
        }
    }

    fn write_final(&self) {
        let value = self.inner.data.borrow().value_at(1.0);
        self.inner.data.borrow_mut().current = value.clone();
        if let Err(err) = self.apply(&value) {
            tracing::debug!(property = %self.inner.id, "final value not applied: {}", err);
        }
    }

    /// Write the end value without changing state
    pub fn set_to_final(&self) {
        if self.error().is_none() {
            self.write_final();
        }
    }

    pub fn pause(&self) {
        let mut data = self.inner.data.borrow_mut();
        if data.state == PropertyState::Playing {
            data.state = PropertyState::Paused;
        }
    }

    pub fn resume(&self) {
        let mut data = self.inner.data.borrow_mut();
        if data.state == PropertyState::Paused {
            data.state = PropertyState::Playing;
        }
    }
}

/// Value-type-erased property operations used by tweens
pub(crate) trait AnyProperty {
    fn id(&self) -> PropertyId;
    fn start(&self);
    fn update(&self, dt: f32);
    fn finish(&self, set_to_final: bool, cascade: bool);
    /// Back to idle for a fresh play
    fn rewind(&self);
    fn chain_next(&self) -> Option<Rc<dyn AnyProperty>>;
    fn set_chain_next(&self, next: Option<Rc<dyn AnyProperty>>);
    fn set_owner(&self, owner: Weak<TweenInner>);
}

impl<V: Interpolate> AnyProperty for Property<V> {
    fn id(&self) -> PropertyId {
        self.inner.id
    }

    fn start(&self) {
        Property::start(self)
    }

    fn update(&self, dt: f32) {
        Property::update(self, dt)
    }

    fn finish(&self, set_to_final: bool, cascade: bool) {
        Property::finish(self, set_to_final, cascade)
    }

    fn rewind(&self) {
        let mut data = self.inner.data.borrow_mut();
        data.state = PropertyState::Idle;
        data.elapsed = 0.0;
        data.captured = false;
    }

    fn chain_next(&self) -> Option<Rc<dyn AnyProperty>> {
        self.inner.chain_next.borrow().clone()
    }

    fn set_chain_next(&self, next: Option<Rc<dyn AnyProperty>>) {
        *self.inner.chain_next.borrow_mut() = next;
    }

    fn set_owner(&self, owner: Weak<TweenInner>) {
        *self.inner.owner.borrow_mut() = owner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_members;
    use crate::math::Vec3;
    use std::cell::Cell;

    #[derive(Default)]
    struct Node {
        position: Vec3,
        alpha: f32,
    }

    impl_members!(Node {
        Vec3 => { "position" => position },
        f32 => { "alpha" => alpha },
    });

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&Property<f32>) + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move |_: &Property<f32>| c.set(c.get() + 1))
    }

    #[test]
    fn test_linear_progress() {
        let p = Property::new(0.0f32, 10.0, 2.0);
        p.start();
        p.update(1.0);
        assert!((p.current_value() - 5.0).abs() < 1e-6);
        assert!(p.is_playing());
        p.update(1.0);
        assert_eq!(p.current_value(), 10.0);
        assert!(p.is_finished());
    }

    #[test]
    fn test_double_start_is_idempotent() {
        let p = Property::new(0.0f32, 10.0, 2.0);
        let (starts, listener) = counter();
        p.on_start(listener);

        p.start();
        p.update(0.5);
        p.start();
        assert_eq!(starts.get(), 1);
        assert_eq!(p.elapsed(), 0.5);
    }

    #[test]
    fn test_stop_before_start_is_noop() {
        let p = Property::new(0.0f32, 10.0, 1.0);
        let (finishes, listener) = counter();
        p.on_finish(listener);
        p.stop(true);
        assert_eq!(finishes.get(), 0);
        assert_eq!(p.current_value(), 0.0);
        assert_eq!(p.state(), PropertyState::Idle);
    }

    #[test]
    fn test_delay_holds_value() {
        let p = Property::new(0.0f32, 10.0, 1.0).delay(0.5);
        p.start();
        p.update(0.5);
        assert_eq!(p.current_value(), 0.0);
        p.update(0.5);
        assert!((p.current_value() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_duration_finishes_on_start() {
        let p = Property::new(0.0f32, 3.0, 0.0);
        let (finishes, listener) = counter();
        p.on_finish(listener);
        p.start();
        assert!(p.is_finished());
        assert_eq!(p.current_value(), 3.0);
        assert_eq!(finishes.get(), 1);
    }

    #[test]
    fn test_overshoot_is_not_clamped() {
        let p = Property::new(0.0f32, 1.0, 1.0)
            .shape(Shape::Back)
            .ease(Ease::Out);
        p.start();
        let mut peak = 0.0f32;
        for _ in 0..12 {
            p.update(0.1);
            peak = peak.max(p.current_value());
        }
        assert!(peak > 1.0);
        assert_eq!(p.current_value(), 1.0);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let p = Property::new(0.0f32, 10.0, 1.0);
        p.start();
        p.update(0.25);
        p.pause();
        p.update(0.5);
        assert_eq!(p.elapsed(), 0.25);
        p.resume();
        p.update(0.25);
        assert!((p.current_value() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_callback_receives_values() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let p = Property::with_callback(move |v: &f32| sink.borrow_mut().push(*v), 0.0, 4.0, 1.0);
        p.start();
        p.update(0.5);
        p.update(0.5);
        assert_eq!(*seen.borrow(), vec![2.0, 4.0, 4.0]);
    }

    #[test]
    fn test_on_value_and_remove_listener() {
        let p = Property::new(0.0f32, 1.0, 1.0);
        let last = Rc::new(Cell::new(-1.0f32));
        let sink = last.clone();
        let id = p.on_value(move |v| sink.set(*v));

        p.start();
        p.update(0.5);
        assert_eq!(last.get(), 0.5);

        assert!(p.remove_listener(id));
        p.update(0.25);
        assert_eq!(last.get(), 0.5);
    }

    #[test]
    fn test_next_properties_start_in_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let a = Property::new(0.0f32, 1.0, 1.0);
        let b = Property::new(0.0f32, 1.0, 1.0);
        let c = Property::new(0.0f32, 1.0, 1.0);
        for (tag, p) in [("b", &b), ("c", &c)] {
            let order = order.clone();
            p.on_start(move |_| order.borrow_mut().push(tag));
        }
        let a = a.then(&b).then(&c).then(&b);

        a.start();
        assert!(!b.has_started());
        a.update(1.0);
        assert_eq!(*order.borrow(), vec!["b", "c"]);
        assert!(b.is_playing() && c.is_playing());
    }

    #[test]
    fn test_bound_reads_start_at_play_time() {
        let node = Rc::new(RefCell::new(Node::default()));
        let p = Property::bound(&node, "alpha", 1.0f32, 1.0);

        node.borrow_mut().alpha = 0.5;
        p.start();
        assert_eq!(p.start_value(), 0.5);
        p.update(0.5);
        assert!((node.borrow().alpha - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_bound_from_uses_literal_start() {
        let node = Rc::new(RefCell::new(Node::default()));
        node.borrow_mut().position = Vec3::new(9.0, 9.0, 9.0);
        let p = Property::bound_from(&node, "position", Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 1.0);
        p.start();
        p.update(0.5);
        assert_eq!(node.borrow().position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_additive_from_current() {
        let node = Rc::new(RefCell::new(Node::default()));
        let p = Property::bound(&node, "alpha", 100.0f32, 1.0).additive(5.0);

        node.borrow_mut().alpha = 10.0;
        p.start();
        p.update(1.0);
        assert_eq!(node.borrow().alpha, 15.0);
        assert_eq!(p.end_value(), 15.0);
    }

    #[test]
    fn test_additive_bound_ignores_explicit_start_in_either_order() {
        let node = Rc::new(RefCell::new(Node::default()));
        let before = Property::bound(&node, "alpha", 0.0f32, 1.0)
            .from(3.0)
            .additive(5.0);
        let after = Property::bound(&node, "alpha", 0.0f32, 1.0)
            .additive(5.0)
            .from(3.0);
        assert!(before.is_from_current());
        assert!(after.is_from_current());

        for p in [&before, &after] {
            node.borrow_mut().alpha = 10.0;
            p.start();
            p.update(1.0);
            assert_eq!(p.start_value(), 10.0);
            assert_eq!(node.borrow().alpha, 15.0);
        }
    }

    #[test]
    fn test_additive_on_quaternion_is_config_error() {
        use crate::math::Quat;
        let p = Property::new(Quat::IDENTITY, Quat::IDENTITY, 1.0).additive(Quat::IDENTITY);
        assert_eq!(p.error(), Some(TweenError::UnsupportedAdditive("quat")));
        assert!(!p.is_additive());
    }

    #[test]
    fn test_missing_member_finishes_without_effect() {
        let node = Rc::new(RefCell::new(Node::default()));
        let p = Property::bound(&node, "scale", Vec3::ONE, 1.0);
        assert!(matches!(p.error(), Some(TweenError::MemberNotFound { .. })));

        let (starts, on_start) = {
            let count = Rc::new(Cell::new(0));
            let c = count.clone();
            (count, move |_: &Property<Vec3>| c.set(c.get() + 1))
        };
        p.on_start(on_start);
        p.start();
        assert_eq!(starts.get(), 1);
        assert!(p.is_finished());
        assert_eq!(node.borrow().position, Vec3::ZERO);
    }

    #[test]
    fn test_dropped_target_finishes_on_start() {
        let node = Rc::new(RefCell::new(Node::default()));
        let p = Property::bound(&node, "alpha", 1.0f32, 1.0);
        drop(node);

        let (starts, on_start) = counter();
        let (finishes, on_finish) = counter();
        p.on_start(on_start);
        p.on_finish(on_finish);

        p.start();
        assert_eq!(starts.get(), 1);
        assert_eq!(finishes.get(), 1);
        assert!(p.is_finished());
    }

    #[test]
    fn test_busy_target_stops_without_panic() {
        let node = Rc::new(RefCell::new(Node::default()));
        let p = Property::bound(&node, "alpha", 1.0f32, 1.0);
        p.start();
        let guard = node.borrow_mut();
        p.update(0.5);
        drop(guard);
        assert!(p.is_finished());
        assert_eq!(node.borrow().alpha, 0.0);
    }

    #[test]
    fn test_empty_curve_is_config_error() {
        let p = Property::new(0.0f32, 1.0, 1.0).shape_curve(Curve::new());
        assert_eq!(p.error(), Some(TweenError::EmptyCurve));

        let seen = Rc::new(Cell::new(false));
        let flag = seen.clone();
        p.on_update(move |_| flag.set(true));
        p.start();
        assert!(p.is_finished());
        assert!(!seen.get());
    }

    #[test]
    fn test_set_to_final_keeps_state() {
        let p = Property::new(0.0f32, 8.0, 1.0);
        p.start();
        p.set_to_final();
        assert_eq!(p.current_value(), 8.0);
        assert!(p.is_playing());
    }
}

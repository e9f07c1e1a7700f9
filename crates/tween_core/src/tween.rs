//! Tweens
//!
//! A [`Tween`] groups properties and plays them either all at once
//! ([`PlayMode::Parallel`]) or one after another ([`PlayMode::Chain`]),
//! optionally looping. Tweens are created through a [`Scheduler`], which
//! updates them once per tick while they are registered.
//!
//! ```ignore
//! let tween = Tween::create().chain().looped(3);
//! tween.new_property(0.0f32, 1.0, 0.5).shape(Shape::Cubic);
//! tween.new_property(1.0f32, 0.0, 0.5).ease(Ease::Out);
//! tween.on_finish(|_| println!("done"));
//! tween.play();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::{PropertyDefaults, TweenSettings};
use crate::error::{Result, TweenError};
use crate::member::Members;
use crate::observer::{ListenerId, Observers};
use crate::property::{AnyProperty, Property, PropertyId};
use crate::scheduler::{get_scheduler, Scheduler, SchedulerInner};
use crate::values::Interpolate;

static NEXT_TWEEN_ID: AtomicU64 = AtomicU64::new(1);

/// Unique tween identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

impl TweenId {
    fn next() -> Self {
        Self(NEXT_TWEEN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tween#{}", self.0)
    }
}

/// How a tween runs its properties
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// All properties start together
    #[default]
    Parallel,
    /// Each property starts when the previous one finishes
    Chain,
}

/// Playback state of a tween
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TweenState {
    #[default]
    Idle,
    Playing,
    Paused,
    Finished,
}

impl TweenState {
    /// Played and not yet finished
    pub fn is_active(&self) -> bool {
        matches!(self, TweenState::Playing | TweenState::Paused)
    }
}

/// Tween configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenConfig {
    pub mode: PlayMode,
    pub looping: bool,
    /// Number of cycles when looping, negative for infinite
    pub iterations: i32,
    /// Unregister from the scheduler once finished
    pub destroy_on_finish: bool,
    /// Keep playing through `Scheduler::on_scene_unloaded`
    pub survive_scene_unload: bool,
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            mode: PlayMode::Parallel,
            looping: false,
            iterations: -1,
            destroy_on_finish: true,
            survive_scene_unload: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TweenEvent {
    Start,
    Update,
    Finish,
    LoopFinish,
}

struct TweenData {
    properties: Vec<Rc<dyn AnyProperty>>,
    config: TweenConfig,
    property_defaults: PropertyDefaults,
    state: TweenState,
    /// Properties that reported a finish this cycle, each counted once
    finished: SmallVec<[PropertyId; 4]>,
    expected: usize,
    elapsed: f32,
    iteration: u32,
}

pub(crate) struct TweenInner {
    id: TweenId,
    data: RefCell<TweenData>,
    scheduler: Weak<SchedulerInner>,
    observers: Observers<TweenEvent, Tween>,
}

/// A group of animated properties played as a unit
#[derive(Clone)]
pub struct Tween {
    inner: Rc<TweenInner>,
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.data.borrow();
        f.debug_struct("Tween")
            .field("id", &self.inner.id)
            .field("state", &data.state)
            .field("config", &data.config)
            .field("properties", &data.properties.len())
            .finish()
    }
}

impl PartialEq for Tween {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Tween {}

impl Tween {
    /// Create a tween registered with the thread's global scheduler
    pub fn create() -> Self {
        get_scheduler().create_tween()
    }

    pub(crate) fn new_in(scheduler: Weak<SchedulerInner>, settings: &TweenSettings) -> Self {
        Self {
            inner: Rc::new(TweenInner {
                id: TweenId::next(),
                data: RefCell::new(TweenData {
                    properties: Vec::new(),
                    config: settings.tween,
                    property_defaults: settings.property.clone(),
                    state: TweenState::Idle,
                    finished: SmallVec::new(),
                    expected: 0,
                    elapsed: 0.0,
                    iteration: 0,
                }),
                scheduler,
                observers: Observers::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<TweenInner>) -> Self {
        Self { inner }
    }

    fn scheduler(&self) -> Option<Scheduler> {
        self.inner.scheduler.upgrade().map(Scheduler::from_inner)
    }

    // Builder methods

    /// Start all properties together
    pub fn parallel(self) -> Self {
        self.set_mode(PlayMode::Parallel);
        self
    }

    /// Start each property when the previous one finishes
    pub fn chain(self) -> Self {
        self.set_mode(PlayMode::Chain);
        self
    }

    /// Loop for `iterations` cycles (negative for infinite)
    pub fn looped(self, iterations: i32) -> Self {
        self.set_loop(true, iterations);
        self
    }

    pub fn survive_scene_unload(self) -> Self {
        self.set_survive_scene_unload(true);
        self
    }

    pub fn destroy_on_finish(self, destroy: bool) -> Self {
        self.set_destroy_on_finish(destroy);
        self
    }

    /// Replace the whole configuration
    pub fn with_config(self, config: TweenConfig) -> Self {
        self.inner.data.borrow_mut().config = config;
        self
    }

    // Mutating setters

    pub fn set_mode(&self, mode: PlayMode) {
        self.inner.data.borrow_mut().config.mode = mode;
    }

    pub fn set_parallel(&self, parallel: bool) {
        self.set_mode(if parallel {
            PlayMode::Parallel
        } else {
            PlayMode::Chain
        });
    }

    pub fn set_chain(&self, chain: bool) {
        self.set_parallel(!chain);
    }

    pub fn set_loop(&self, looping: bool, iterations: i32) {
        let mut data = self.inner.data.borrow_mut();
        data.config.looping = looping;
        data.config.iterations = iterations;
    }

    pub fn set_survive_scene_unload(&self, survive: bool) {
        self.inner.data.borrow_mut().config.survive_scene_unload = survive;
    }

    pub fn set_destroy_on_finish(&self, destroy: bool) {
        self.inner.data.borrow_mut().config.destroy_on_finish = destroy;
    }

    // Accessors

    pub fn id(&self) -> TweenId {
        self.inner.id
    }

    pub fn config(&self) -> TweenConfig {
        self.inner.data.borrow().config
    }

    pub fn state(&self) -> TweenState {
        self.inner.data.borrow().state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == TweenState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state() == TweenState::Paused
    }

    pub fn is_finished(&self) -> bool {
        self.state() == TweenState::Finished
    }

    /// Seconds spent playing since the last `play()`
    pub fn elapsed(&self) -> f32 {
        self.inner.data.borrow().elapsed
    }

    /// Completed cycles since the last `play()`
    pub fn current_iteration(&self) -> u32 {
        self.inner.data.borrow().iteration
    }

    /// Properties finished in the current cycle
    pub fn finished_count(&self) -> usize {
        self.inner.data.borrow().finished.len()
    }

    /// Properties expected to finish per cycle
    pub fn expected_count(&self) -> usize {
        self.inner.data.borrow().expected
    }

    pub fn property_count(&self) -> usize {
        self.inner.data.borrow().properties.len()
    }

    // Properties

    fn adopt<V: Interpolate>(&self, property: Property<V>) -> Property<V> {
        let defaults = self.inner.data.borrow().property_defaults.clone();
        property.apply_defaults(&defaults);
        self.add_property(&property);
        property
    }

    /// Add a detached property animating from `start` to `end`
    pub fn new_property<V: Interpolate>(&self, start: V, end: V, duration: f32) -> Property<V> {
        self.adopt(Property::new(start, end, duration))
    }

    /// Add a property that passes every value to `callback`
    pub fn new_callback_property<V: Interpolate>(
        &self,
        callback: impl Fn(&V) + 'static,
        start: V,
        end: V,
        duration: f32,
    ) -> Property<V> {
        self.adopt(Property::with_callback(callback, start, end, duration))
    }

    /// Add a property driving member `name` of `target`, starting from the
    /// member's value at play time
    pub fn new_bound_property<T, V>(
        &self,
        target: &Rc<RefCell<T>>,
        name: &str,
        end: V,
        duration: f32,
    ) -> Property<V>
    where
        T: Members<V>,
        V: Interpolate,
    {
        self.adopt(Property::bound(target, name, end, duration))
    }

    /// Add a property driving member `name` of `target` from `start`
    pub fn new_bound_property_from<T, V>(
        &self,
        target: &Rc<RefCell<T>>,
        name: &str,
        start: V,
        end: V,
        duration: f32,
    ) -> Property<V>
    where
        T: Members<V>,
        V: Interpolate,
    {
        self.adopt(Property::bound_from(target, name, start, end, duration))
    }

    /// Attach an existing property
    ///
    /// A property belongs to one tween at a time; attaching it here detaches
    /// it from its previous owner. Properties attached while playing wait
    /// for the next `play()`.
    pub fn add_property<V: Interpolate>(&self, property: &Property<V>) -> &Self {
        let id = property.id();
        if let Some(previous) = property.owner() {
            if previous == *self {
                return self;
            }
            // Keeps running, but now reports here
            previous.detach(id);
        }

        let handle: Rc<dyn AnyProperty> = Rc::new(property.clone());
        handle.set_owner(Rc::downgrade(&self.inner));
        self.inner.data.borrow_mut().properties.push(handle);
        self
    }

    /// Detach a property owned by this tween
    ///
    /// Returns [`TweenError::PropertyNotOwned`] when the property belongs to
    /// another tween or to none.
    pub fn remove_property<V: Interpolate>(&self, property: &Property<V>) -> Result<()> {
        let id = property.id();
        if !self.contains_property(id) {
            return Err(TweenError::PropertyNotOwned(id.as_u64()));
        }
        if let Some(removed) = self.detach(id) {
            removed.finish(false, false);
        }
        Ok(())
    }

    fn contains_property(&self, id: PropertyId) -> bool {
        self.inner
            .data
            .borrow()
            .properties
            .iter()
            .any(|p| p.id() == id)
    }

    /// Drop a property from the list, keeping chain links and counters
    /// consistent
    fn detach(&self, id: PropertyId) -> Option<Rc<dyn AnyProperty>> {
        let removed = {
            let mut data = self.inner.data.borrow_mut();
            let index = data.properties.iter().position(|p| p.id() == id)?;
            let removed = data.properties.remove(index);

            // Not yet counted this cycle, so it will never report
            if data.state.is_active() && !data.finished.contains(&id) {
                data.expected = data.expected.saturating_sub(1);
            }
            removed
        };

        removed.set_owner(Weak::new());
        let successor = removed.chain_next();
        removed.set_chain_next(None);

        let properties = self.inner.data.borrow().properties.clone();
        for p in &properties {
            if p.chain_next().is_some_and(|next| next.id() == id) {
                p.set_chain_next(successor.clone());
            }
        }
        Some(removed)
    }

    /// Count a property completion reported during this cycle
    pub(crate) fn property_finished(&self, id: PropertyId) {
        let remove = {
            let mut data = self.inner.data.borrow_mut();
            if !data.state.is_active() || data.finished.contains(&id) {
                return;
            }
            data.finished.push(id);
            !data.config.looping && data.config.destroy_on_finish
        };
        if remove {
            // Already counted, so detach must not shrink the expectation
            let handle = {
                let mut data = self.inner.data.borrow_mut();
                let index = data.properties.iter().position(|p| p.id() == id);
                index.map(|i| data.properties.remove(i))
            };
            if let Some(handle) = handle {
                handle.set_owner(Weak::new());
            }
        }
    }

    // Observers

    pub fn on_start(&self, f: impl Fn(&Tween) + 'static) -> ListenerId {
        self.inner.observers.add(TweenEvent::Start, f)
    }

    pub fn on_update(&self, f: impl Fn(&Tween) + 'static) -> ListenerId {
        self.inner.observers.add(TweenEvent::Update, f)
    }

    pub fn on_finish(&self, f: impl Fn(&Tween) + 'static) -> ListenerId {
        self.inner.observers.add(TweenEvent::Finish, f)
    }

    /// Fires at each loop boundary except the last, which fires finish
    pub fn on_loop_finish(&self, f: impl Fn(&Tween) + 'static) -> ListenerId {
        self.inner.observers.add(TweenEvent::LoopFinish, f)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.observers.remove(id)
    }

    fn emit(&self, event: TweenEvent) {
        self.inner.observers.emit(event, self);
    }

    // Lifecycle

    /// Start playing
    ///
    /// Does nothing while already playing or paused. A finished tween that
    /// destroys itself on finish is spent and stays finished; one kept with
    /// `destroy_on_finish(false)` plays again from the start and re-registers
    /// with its scheduler if it had been removed.
    pub fn play(&self) -> &Self {
        let (properties, config) = {
            let mut data = self.inner.data.borrow_mut();
            if data.state.is_active() {
                return self;
            }
            if data.state == TweenState::Finished && data.config.destroy_on_finish {
                tracing::debug!(tween = %self.inner.id, "ignoring play on a destroyed tween");
                return self;
            }
            data.state = TweenState::Playing;
            data.finished.clear();
            data.expected = data.properties.len();
            data.elapsed = 0.0;
            data.iteration = 0;
            (data.properties.clone(), data.config)
        };

        if let Some(scheduler) = self.scheduler() {
            scheduler.add(self);
        }
        tracing::debug!(
            tween = %self.inner.id,
            properties = properties.len(),
            mode = ?config.mode,
            "tween play"
        );
        self.emit(TweenEvent::Start);
        if !self.is_playing() {
            return self;
        }

        if config.looping && config.iterations == 0 {
            self.stop(false);
            return self;
        }

        for p in &properties {
            p.rewind();
            p.set_chain_next(None);
        }
        if config.mode == PlayMode::Chain {
            for pair in properties.windows(2) {
                pair[0].set_chain_next(Some(pair[1].clone()));
            }
        }
        self.start_cycle(&properties, config.mode);
        self
    }

    fn start_cycle(&self, properties: &[Rc<dyn AnyProperty>], mode: PlayMode) {
        match mode {
            PlayMode::Parallel => {
                for p in properties {
                    p.start();
                }
            }
            PlayMode::Chain => {
                if let Some(first) = properties.first() {
                    first.start();
                }
            }
        }
    }

    /// Advance by `dt` seconds
    ///
    /// Does nothing unless playing. Properties update in reverse order over
    /// a snapshot, so they may detach themselves while running.
    pub fn update(&self, dt: f32) {
        let properties = {
            let mut data = self.inner.data.borrow_mut();
            if data.state != TweenState::Playing {
                return;
            }
            data.elapsed += dt;
            data.properties.clone()
        };

        self.emit(TweenEvent::Update);
        for p in properties.iter().rev() {
            p.update(dt);
        }
        self.complete_cycle();
    }

    fn complete_cycle(&self) {
        let (next_cycle, properties, mode) = {
            let mut data = self.inner.data.borrow_mut();
            if data.state != TweenState::Playing || data.finished.len() < data.expected {
                return;
            }
            data.iteration += 1;
            let budget_left = data.config.looping
                && (data.config.iterations < 0
                    || i64::from(data.iteration) < i64::from(data.config.iterations));
            if budget_left {
                data.finished.clear();
            }
            (budget_left, data.properties.clone(), data.config.mode)
        };

        if !next_cycle {
            self.stop(true);
            return;
        }

        tracing::trace!(tween = %self.inner.id, iteration = self.current_iteration(), "tween loop");
        self.emit(TweenEvent::LoopFinish);
        if self.is_playing() {
            self.start_cycle(&properties, mode);
        }
    }

    /// Stop playing, optionally snapping running properties to their end
    /// values
    ///
    /// Linked properties are not started. Does nothing unless playing or
    /// paused.
    pub fn stop(&self, set_to_final: bool) {
        let (properties, destroy) = {
            let mut data = self.inner.data.borrow_mut();
            if !data.state.is_active() {
                return;
            }
            data.state = TweenState::Finished;
            (data.properties.clone(), data.config.destroy_on_finish)
        };

        for p in &properties {
            p.finish(set_to_final, false);
        }
        tracing::debug!(tween = %self.inner.id, "tween finish");
        self.emit(TweenEvent::Finish);

        if destroy {
            if let Some(scheduler) = self.scheduler() {
                scheduler.remove(self);
            }
        }
    }

    pub fn pause(&self) -> &Self {
        let mut data = self.inner.data.borrow_mut();
        if data.state == TweenState::Playing {
            data.state = TweenState::Paused;
        }
        drop(data);
        self
    }

    pub fn resume(&self) -> &Self {
        let mut data = self.inner.data.borrow_mut();
        if data.state == TweenState::Paused {
            data.state = TweenState::Playing;
        }
        drop(data);
        self
    }
}

//! Tween scheduler
//!
//! Holds every registered tween and advances them once per tick. The host
//! calls [`Scheduler::tick`] once per frame with the elapsed seconds.
//!
//! Each thread has its own global scheduler, created on first use by
//! [`get_scheduler`]. Tests and embedders that want isolation create their
//! own with [`Scheduler::new`] or swap the global with
//! [`set_global_scheduler`] / [`reset_global_scheduler`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::TweenSettings;
use crate::tween::{Tween, TweenId};

thread_local! {
    static GLOBAL_SCHEDULER: RefCell<Option<Scheduler>> = const { RefCell::new(None) };
}

/// Get the thread's global scheduler, creating it on first use
pub fn get_scheduler() -> Scheduler {
    GLOBAL_SCHEDULER.with(|global| {
        global
            .borrow_mut()
            .get_or_insert_with(|| {
                tracing::debug!("creating global tween scheduler");
                Scheduler::new()
            })
            .clone()
    })
}

/// Get the thread's global scheduler if one exists
pub fn try_get_scheduler() -> Option<Scheduler> {
    GLOBAL_SCHEDULER.with(|global| global.borrow().clone())
}

/// Check if the global scheduler has been created on this thread
pub fn is_scheduler_initialized() -> bool {
    GLOBAL_SCHEDULER.with(|global| global.borrow().is_some())
}

/// Install `scheduler` as the thread's global scheduler
///
/// Returns the scheduler it replaces.
pub fn set_global_scheduler(scheduler: Scheduler) -> Option<Scheduler> {
    GLOBAL_SCHEDULER.with(|global| global.borrow_mut().replace(scheduler))
}

/// Remove the thread's global scheduler
///
/// The next [`get_scheduler`] call creates a fresh one. Tweens keep the old
/// scheduler alive only through the returned handle.
pub fn reset_global_scheduler() -> Option<Scheduler> {
    GLOBAL_SCHEDULER.with(|global| global.borrow_mut().take())
}

pub(crate) struct SchedulerInner {
    tweens: RefCell<IndexMap<TweenId, Tween>>,
    paused: Cell<bool>,
    settings: RefCell<TweenSettings>,
}

/// Registry of active tweens
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_settings(TweenSettings::default())
    }

    /// Create a scheduler whose tweens start from `settings`
    pub fn with_settings(settings: TweenSettings) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                tweens: RefCell::new(IndexMap::new()),
                paused: Cell::new(false),
                settings: RefCell::new(settings),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<SchedulerInner>) -> Self {
        Self { inner }
    }

    pub fn settings(&self) -> TweenSettings {
        self.inner.settings.borrow().clone()
    }

    /// Replace the settings used for tweens created from now on
    pub fn set_settings(&self, settings: TweenSettings) {
        *self.inner.settings.borrow_mut() = settings;
    }

    /// Create a tween and register it
    pub fn create_tween(&self) -> Tween {
        let tween = Tween::new_in(Rc::downgrade(&self.inner), &self.inner.settings.borrow());
        self.add(&tween);
        tween
    }

    /// Register a tween (no-op if already registered)
    pub fn add(&self, tween: &Tween) {
        let mut tweens = self.inner.tweens.borrow_mut();
        if !tweens.contains_key(&tween.id()) {
            tweens.insert(tween.id(), tween.clone());
        }
    }

    /// Unregister a tween (no-op if absent)
    pub fn remove(&self, tween: &Tween) {
        self.inner.tweens.borrow_mut().shift_remove(&tween.id());
    }

    pub fn contains(&self, tween: &Tween) -> bool {
        self.inner.tweens.borrow().contains_key(&tween.id())
    }

    pub fn tween_count(&self) -> usize {
        self.inner.tweens.borrow().len()
    }

    /// Registered tweens in registration order
    pub fn tweens(&self) -> Vec<Tween> {
        self.inner.tweens.borrow().values().cloned().collect()
    }

    /// Advance every registered tween by `dt` seconds
    ///
    /// Tweens update in reverse registration order over a snapshot, so they
    /// may register or unregister tweens while running. Returns whether any
    /// tween is still playing.
    pub fn tick(&self, dt: f32) -> bool {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!("ignoring invalid tick delta {}", dt);
            0.0
        };

        if !self.inner.paused.get() {
            let snapshot = self.tweens();
            for tween in snapshot.iter().rev() {
                tween.update(dt);
            }
        }

        self.has_active_tweens()
    }

    /// Check if any registered tween is playing
    pub fn has_active_tweens(&self) -> bool {
        self.inner.tweens.borrow().values().any(Tween::is_playing)
    }

    /// Freeze every tween until [`resume_all`](Self::resume_all)
    pub fn pause_all(&self) {
        self.inner.paused.set(true);
    }

    pub fn resume_all(&self) {
        self.inner.paused.set(false);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.get()
    }

    /// Stop every registered tween, snapping properties to their end values
    pub fn stop_all(&self) {
        let snapshot = self.tweens();
        tracing::debug!("stopping {} tweens", snapshot.len());
        for tween in snapshot.iter().rev() {
            tween.stop(true);
        }
    }

    /// Stop every tween not marked to survive a scene unload
    pub fn on_scene_unloaded(&self) {
        let snapshot = self.tweens();
        for tween in snapshot.iter().rev() {
            if !tween.config().survive_scene_unload {
                tween.stop(true);
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let scheduler = Scheduler::new();
        let tween = scheduler.create_tween();
        assert_eq!(scheduler.tween_count(), 1);

        scheduler.add(&tween);
        assert_eq!(scheduler.tween_count(), 1);

        scheduler.remove(&tween);
        scheduler.remove(&tween);
        assert_eq!(scheduler.tween_count(), 0);
        assert!(!scheduler.contains(&tween));
    }

    #[test]
    fn test_tick_reports_activity() {
        let scheduler = Scheduler::new();
        let tween = scheduler.create_tween();
        tween.new_property(0.0f32, 1.0, 1.0);
        assert!(!scheduler.tick(0.1));

        tween.play();
        assert!(scheduler.tick(0.5));
        assert!(!scheduler.tick(0.5));
        assert_eq!(scheduler.tween_count(), 0);
    }

    #[test]
    fn test_pause_all_freezes_ticks() {
        let scheduler = Scheduler::new();
        let tween = scheduler.create_tween();
        let p = tween.new_property(0.0f32, 1.0, 1.0);
        tween.play();

        scheduler.pause_all();
        assert!(scheduler.is_paused());
        scheduler.tick(0.5);
        assert_eq!(p.current_value(), 0.0);

        scheduler.resume_all();
        scheduler.tick(0.5);
        assert!((p.current_value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_delta_is_ignored() {
        let scheduler = Scheduler::new();
        let tween = scheduler.create_tween();
        let p = tween.new_property(0.0f32, 1.0, 1.0);
        tween.play();

        scheduler.tick(-1.0);
        scheduler.tick(f32::NAN);
        assert_eq!(p.current_value(), 0.0);
        assert_eq!(tween.elapsed(), 0.0);
    }

    #[test]
    fn test_global_scheduler_reset() {
        reset_global_scheduler();
        assert!(!is_scheduler_initialized());

        let tween = Tween::create();
        assert!(is_scheduler_initialized());
        assert!(get_scheduler().contains(&tween));

        let previous = reset_global_scheduler();
        assert!(previous.is_some_and(|s| s.contains(&tween)));
        assert!(try_get_scheduler().is_none());
        assert_eq!(get_scheduler().tween_count(), 0);
    }

    #[test]
    fn test_set_global_scheduler() {
        let mine = Scheduler::new();
        set_global_scheduler(mine.clone());
        let tween = Tween::create();
        assert!(mine.contains(&tween));
        reset_global_scheduler();
    }
}

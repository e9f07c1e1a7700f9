//! Lifecycle observer lists
//!
//! Each tween and property owns one [`Observers`] list holding every
//! listener it has, tagged by event. Listeners run in registration order and
//! may register or remove listeners (including themselves) while an event is
//! being dispatched.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle returned when registering a listener
    pub struct ListenerId;
}

type Listener<A> = Rc<dyn Fn(&A)>;

pub(crate) struct Observers<E, A> {
    listeners: RefCell<SlotMap<ListenerId, (E, Listener<A>)>>,
    order: RefCell<Vec<ListenerId>>,
}

impl<E: Copy + PartialEq, A: 'static> Observers<E, A> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: RefCell::new(SlotMap::with_key()),
            order: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, event: E, listener: impl Fn(&A) + 'static) -> ListenerId {
        let listener: Listener<A> = Rc::new(listener);
        let id = self.listeners.borrow_mut().insert((event, listener));
        self.order.borrow_mut().push(id);
        id
    }

    /// Returns false when `id` was not registered
    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        if self.listeners.borrow_mut().remove(id).is_none() {
            return false;
        }
        self.order.borrow_mut().retain(|other| *other != id);
        true
    }

    #[cfg(test)]
    pub(crate) fn count(&self, event: E) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|(e, _)| *e == event)
            .count()
    }

    /// Invoke every listener registered for `event`
    ///
    /// Listeners added during dispatch wait for the next emit; listeners
    /// removed during dispatch are skipped.
    pub(crate) fn emit(&self, event: E, arg: &A) {
        let snapshot: SmallVec<[ListenerId; 4]> = {
            let listeners = self.listeners.borrow();
            self.order
                .borrow()
                .iter()
                .copied()
                .filter(|id| matches!(listeners.get(*id), Some((e, _)) if *e == event))
                .collect()
        };

        for id in snapshot {
            // Clone out so no borrow is held while the listener runs
            let listener = self.listeners.borrow().get(id).map(|(_, l)| l.clone());
            if let Some(listener) = listener {
                listener(arg);
            }
        }
    }
}

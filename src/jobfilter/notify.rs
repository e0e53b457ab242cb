//! Publish point for filter changes.
//!
//! Views that show jobs subscribe here and re-evaluate visibility when the
//! derived filter state changes. Emission happens after the cache has been
//! refreshed, so listeners always see the new state.

use crate::state::FilterState;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEvent {
    FiltersChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(FilterEvent, &FilterState)>;

#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(FilterEvent, &FilterState) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: FilterEvent, state: &FilterState) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event, state);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FilterRegistry;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn emits_to_every_listener_until_unsubscribed() {
        let state = FilterState::defaults(&FilterRegistry::standard());
        let mut notifier = ChangeNotifier::new();
        let hits = Rc::new(Cell::new(0));

        let first = {
            let hits = Rc::clone(&hits);
            notifier.subscribe(move |event, _| {
                assert_eq!(event, FilterEvent::FiltersChanged);
                hits.set(hits.get() + 1);
            })
        };
        {
            let hits = Rc::clone(&hits);
            notifier.subscribe(move |_, _| hits.set(hits.get() + 10));
        }

        notifier.emit(FilterEvent::FiltersChanged, &state);
        assert_eq!(hits.get(), 11);

        assert!(notifier.unsubscribe(first));
        assert!(!notifier.unsubscribe(first));
        notifier.emit(FilterEvent::FiltersChanged, &state);
        assert_eq!(hits.get(), 21);
        assert_eq!(notifier.listener_count(), 1);
    }

    #[test]
    fn listeners_see_the_state() {
        let registry = FilterRegistry::standard();
        let state = FilterState::defaults(&registry);
        let mut notifier = ChangeNotifier::new();
        let seen = Rc::new(Cell::new(0));
        let seen_in = Rc::clone(&seen);
        notifier.subscribe(move |_, s| seen_in.set(s.result_statuses.len()));

        notifier.emit(FilterEvent::FiltersChanged, &state);
        assert_eq!(seen.get(), state.result_statuses.len());
    }
}

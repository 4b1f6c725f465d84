//! The single-subscriber tick scheduler.

use crate::common::SubscriptionId;
use slotmap::SlotMap;
use tracing::{debug, trace};

/// Holds at most one tick handler and hands it out once per tick.
///
/// Subscribing always replaces the previous handler in the same call, so there
/// is never a moment where two handlers are installed or none is installed
/// during a mode switch. Handlers are returned to the caller rather than
/// invoked here, which lets the caller run them against state it owns.
pub struct TickScheduler<H> {
    subscribers: SlotMap<SubscriptionId, H>,
    active: Option<SubscriptionId>,
    tick_count: u64,
    dispatched: u64,
}

impl<H: Copy> TickScheduler<H> {
    pub fn new() -> Self {
        Self {
            subscribers: SlotMap::with_key(),
            active: None,
            tick_count: 0,
            dispatched: 0,
        }
    }

    /// Installs `handler` as the only subscriber.
    ///
    /// Returns the new handle and, if one was replaced, the old handle.
    pub fn subscribe(&mut self, handler: H) -> (SubscriptionId, Option<SubscriptionId>) {
        let replaced = self.active.take().and_then(|old| {
            self.subscribers.remove(old).map(|_| {
                debug!("Tick subscription {:?} replaced.", old);
                old
            })
        });
        let id = self.subscribers.insert(handler);
        self.active = Some(id);
        debug!("Tick subscription {:?} installed.", id);
        (id, replaced)
    }

    /// Removes the subscriber if `id` is still the active one.
    ///
    /// Returns `true` if the subscriber was found and removed. A stale handle
    /// is a no-op.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.active != Some(id) {
            return false;
        }
        self.active = None;
        let removed = self.subscribers.remove(id).is_some();
        if removed {
            debug!("Tick subscription {:?} removed.", id);
        }
        removed
    }

    /// Advances the tick counter and returns the handler to run, if any.
    pub fn advance(&mut self) -> Option<(SubscriptionId, H)> {
        self.tick_count += 1;
        let id = self.active?;
        let handler = *self.subscribers.get(id)?;
        self.dispatched += 1;
        trace!("Tick #{} dispatched to {:?}.", self.tick_count, id);
        Some((id, handler))
    }

    pub fn active(&self) -> Option<SubscriptionId> {
        self.active
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Total ticks seen, including ticks with no subscriber.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Total handler dispatches.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

impl<H: Copy> Default for TickScheduler<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_replaces_the_previous_handler() {
        let mut scheduler: TickScheduler<u8> = TickScheduler::new();
        let (first, replaced) = scheduler.subscribe(1);
        assert_eq!(replaced, None);
        let (second, replaced) = scheduler.subscribe(2);
        assert_eq!(replaced, Some(first));
        assert_ne!(first, second);
        assert_eq!(scheduler.subscriber_count(), 1);
        assert_eq!(scheduler.advance(), Some((second, 2)));
    }

    #[test]
    fn stale_handle_cannot_remove_the_successor() {
        let mut scheduler: TickScheduler<u8> = TickScheduler::new();
        let (old, _) = scheduler.subscribe(1);
        let (new, _) = scheduler.subscribe(2);
        assert!(!scheduler.unsubscribe(old));
        assert_eq!(scheduler.active(), Some(new));
        assert!(scheduler.unsubscribe(new));
        assert_eq!(scheduler.active(), None);
        assert_eq!(scheduler.subscriber_count(), 0);
    }

    #[test]
    fn ticks_without_subscriber_are_counted_but_not_dispatched() {
        let mut scheduler: TickScheduler<u8> = TickScheduler::new();
        assert_eq!(scheduler.advance(), None);
        scheduler.subscribe(7);
        scheduler.advance();
        assert_eq!(scheduler.tick_count(), 2);
        assert_eq!(scheduler.dispatched(), 1);
    }
}

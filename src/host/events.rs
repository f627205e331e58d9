//! The host's "modules changed" notification channel
//!
//! Notifications published by the host are queued and delivered to the
//! subscribers present at delivery time, on the host's next tick. A
//! notification with no subscribers is dropped.

use std::collections::VecDeque;
use std::fmt;

/// Payload of a "modules changed" notification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulesChanged {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ModulesChanged {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl fmt::Display for ModulesChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} -{}", self.added.len(), self.removed.len())
    }
}

/// Handle returned by [`ChangeChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Default)]
pub struct ChangeChannel {
    next_id: u64,
    subscribers: Vec<SubscriptionId>,
    pending: VecDeque<ModulesChanged>,
}

impl ChangeChannel {
    pub fn subscribe(&mut self) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(id);
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| *s != id);
        self.subscribers.len() != before
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Queue a notification for delivery on the next tick
    pub fn publish(&mut self, change: ModulesChanged) {
        self.pending.push_back(change);
    }

    /// Drain pending notifications, fanned out to current subscribers
    pub fn deliver(&mut self) -> Vec<(SubscriptionId, ModulesChanged)> {
        let mut delivered = Vec::new();
        while let Some(change) = self.pending.pop_front() {
            for id in &self.subscribers {
                delivered.push((*id, change.clone()));
            }
        }
        delivered
    }
}

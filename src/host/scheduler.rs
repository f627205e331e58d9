//! Deferred-call queue drained on the host's idle ticks

use std::collections::VecDeque;

/// FIFO of deferred work items
///
/// Items pushed while a tick is being processed run on a later tick, never
/// re-entrantly. There is no cancellation.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an item for a later tick
    pub fn defer(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Take the next item due on this tick
    pub fn next(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

//! Host resolution bridge
//!
//! Subscribes to the host's change channel, triggers dependency resolution
//! and reports the first notification exactly once. The subscription is
//! dropped before the notification is handed on, so later host churn never
//! re-triggers the handoff.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::host::{Host, ModulesChanged, SubscriptionId};

#[derive(Debug)]
pub struct ResolutionBridge {
    timeout: Duration,
    subscription: Option<SubscriptionId>,
    /// None while waiting means the timeout is beyond what `Instant` can hold
    deadline: Option<Instant>,
    waiting: bool,
}

impl ResolutionBridge {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            subscription: None,
            deadline: None,
            waiting: false,
        }
    }

    /// Subscribe, then fire the host's resolver
    pub fn begin(&mut self, host: &mut dyn Host) {
        let id = host.changes().subscribe();
        self.subscription = Some(id);
        self.deadline = Instant::now().checked_add(self.timeout);
        self.waiting = true;
        info!(timeout_secs = self.timeout.as_secs(), "waiting for host dependency resolution");
        host.resolve_dependencies();
    }

    /// Whether a notification or the deadline is still outstanding
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Pick this bridge's notification out of a host delivery
    ///
    /// Returns the change at most once; the subscription is gone by then.
    pub fn take_notification(
        &mut self,
        host: &mut dyn Host,
        delivered: &[(SubscriptionId, ModulesChanged)],
    ) -> Option<ModulesChanged> {
        let id = self.subscription?;
        let (_, change) = delivered.iter().find(|(to, _)| *to == id)?;

        self.cancel(host);
        info!(%change, "host finished dependency resolution");
        Some(change.clone())
    }

    /// True once, when the deadline passes without a notification
    pub fn poll_deadline(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if self.waiting && now >= deadline => {
                warn!(timeout_secs = self.timeout.as_secs(), "host did not report resolution in time");
                self.deadline = None;
                self.waiting = false;
                true
            }
            _ => false,
        }
    }

    /// Drop the subscription and stop waiting
    pub fn cancel(&mut self, host: &mut dyn Host) {
        if let Some(id) = self.subscription.take() {
            host.changes().unsubscribe(id);
        }
        self.deadline = None;
        self.waiting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::ModuleExports;
    use crate::test_fixtures::FakeHost;

    #[test]
    fn test_first_notification_only() {
        let mut host = FakeHost::new().on_resolve("com.modkit.core", ModuleExports::default());
        let mut bridge = ResolutionBridge::new(Duration::from_secs(5));

        bridge.begin(&mut host);
        assert_eq!(host.resolve_calls, 1);
        assert!(bridge.is_waiting());

        let delivered = host.changes().deliver();
        let change = bridge.take_notification(&mut host, &delivered).unwrap();
        assert_eq!(change.added, vec!["com.modkit.core".to_string()]);
        assert!(!bridge.is_waiting());
        assert_eq!(host.changes().subscriber_count(), 0);

        // Later churn reaches nobody
        host.resolve_dependencies();
        let delivered = host.changes().deliver();
        assert!(delivered.is_empty());
        assert!(bridge.take_notification(&mut host, &delivered).is_none());
    }

    #[test]
    fn test_notification_is_not_synchronous() {
        let mut host = FakeHost::new();
        let mut bridge = ResolutionBridge::new(Duration::from_secs(5));
        bridge.begin(&mut host);

        assert!(bridge.take_notification(&mut host, &[]).is_none());
        assert!(bridge.is_waiting());
    }

    #[test]
    fn test_deadline_fires_once() {
        let mut host = FakeHost::new().silent();
        let mut bridge = ResolutionBridge::new(Duration::from_millis(10));
        bridge.begin(&mut host);

        let later = Instant::now() + Duration::from_secs(1);
        assert!(bridge.poll_deadline(later));
        assert!(!bridge.poll_deadline(later));
        assert!(!bridge.is_waiting());

        bridge.cancel(&mut host);
        assert_eq!(host.changes().subscriber_count(), 0);
    }

    #[test]
    fn test_oversized_timeout_waits_without_deadline() {
        let mut host = FakeHost::new().silent();
        let mut bridge = ResolutionBridge::new(Duration::MAX);
        bridge.begin(&mut host);

        assert!(bridge.is_waiting());
        let much_later = Instant::now() + Duration::from_secs(365 * 24 * 3600);
        assert!(!bridge.poll_deadline(much_later));
        assert!(bridge.is_waiting());

        bridge.cancel(&mut host);
        assert!(!bridge.is_waiting());
    }
}

//! Authentication state change notifications

use tokio::sync::broadcast;

/// Default capacity of the broadcast channel. Slow subscribers past this many
/// pending changes observe `RecvError::Lagged` and should re-read the store.
const CHANNEL_CAPACITY: usize = 16;

/// What happened to the stored token pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChange {
    /// A token pair was written (login or refresh)
    Updated,
    /// The token pair was removed (logout or failed refresh)
    Cleared,
}

/// Receives one call per token store mutation
#[cfg_attr(test, mockall::automock)]
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, change: AuthChange);
}

impl<F> ChangeNotifier for F
where
    F: Fn(AuthChange) + Send + Sync,
{
    fn notify(&self, change: AuthChange) {
        self(change);
    }
}

/// Process-wide fan-out of auth changes over a tokio broadcast channel
///
/// Clones share the same channel, so a notifier handed to a [`TokenStore`]
/// can be cloned beforehand to hand out subscriptions.
///
/// [`TokenStore`]: super::TokenStore
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<AuthChange>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn notify(&self, change: AuthChange) {
        // No receivers is not an error: nobody is watching auth state yet.
        let receivers = self.sender.send(change).unwrap_or(0);
        trace!(?change, receivers, "Broadcast auth change");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_every_subscriber_sees_change() {
        let notifier = BroadcastNotifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.clone().subscribe();

        notifier.notify(AuthChange::Cleared);

        assert_eq!(first.try_recv().unwrap(), AuthChange::Cleared);
        assert_eq!(second.try_recv().unwrap(), AuthChange::Cleared);
    }

    #[test]
    fn test_notify_without_subscribers() {
        BroadcastNotifier::new().notify(AuthChange::Updated);
    }

    #[test]
    fn test_closure_notifier() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let notifier = move |change: AuthChange| sink.lock().unwrap().push(change);

        notifier.notify(AuthChange::Updated);

        assert_eq!(*seen.lock().unwrap(), vec![AuthChange::Updated]);
    }
}

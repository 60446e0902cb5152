//! Change notification events
//!
//! Every mutating repository operation publishes the table it touched on a
//! broadcast channel. Query results held by the service layer are recomputed
//! and re-delivered whenever one of these events arrives, which is how
//! observable result streams re-enter the command layer.

use tokio::sync::broadcast;

/// Capacity of the change event channel. Slow subscribers that fall more
/// than this far behind see a `Lagged` error and simply recompute.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Identifies the table a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEvent {
    Diaries,
    Tags,
    Todos,
    Categories,
    Settings,
}

/// Shared publisher for table change events.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<DataEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish a change. Having no subscribers is a normal condition.
    pub fn notify(&self, event: DataEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No subscribers for {:?} change event", event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.notify(DataEvent::Diaries);
        notifier.notify(DataEvent::Tags);

        assert_eq!(rx.recv().await.unwrap(), DataEvent::Diaries);
        assert_eq!(rx.recv().await.unwrap(), DataEvent::Tags);
    }

    #[tokio::test]
    async fn test_notify_without_subscribers_is_harmless() {
        let notifier = ChangeNotifier::new();
        notifier.notify(DataEvent::Settings);
    }
}

//! Fan-out of navigator change notifications.

use stepwise_types::NavigatorEvent;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Holds one sender per subscriber; senders whose receiver was dropped are
/// pruned on the next emit.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Vec<UnboundedSender<NavigatorEvent>>,
}

impl EventHub {
    pub fn subscribe(&mut self) -> UnboundedReceiver<NavigatorEvent> {
        let (sender, receiver) = unbounded_channel();
        self.subscribers.push(sender);
        receiver
    }

    pub fn emit(&mut self, event: NavigatorEvent) {
        self.subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

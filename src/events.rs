//! Slideshow event listeners.
//!
//! A [`Subscription`] registers a listener when it is created and removes it
//! again when it is dropped, so a listener never outlives its owner.

use crate::media::ItemId;
use async_std::channel::{self, Receiver, RecvError, Sender};
use log::debug;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Changes to the slideshow window observable by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideshowEvent {
    /// A thumbnail became resident.
    Loaded { index: usize, id: ItemId },
    /// An acquisition failed; the slot stays empty until the next pass.
    Failed { index: usize, id: ItemId },
    /// A resident or pending thumbnail was dropped from the window.
    Evicted { index: usize, id: ItemId },
    /// The focused position changed.
    FocusChanged { index: usize, previous: usize },
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    senders: Vec<(u64, Sender<SlideshowEvent>)>,
}

/// Fan-out point for [`SlideshowEvent`]s.
#[derive(Clone, Default)]
pub struct EventHub {
    listeners: Arc<Mutex<Listeners>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener that lives as long as the returned subscription.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = channel::unbounded();
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.senders.push((id, sender));
        debug!("Listener {} subscribed", id);

        Subscription {
            id,
            receiver,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Delivers `event` to every live listener, dropping closed ones.
    pub fn emit(&self, event: SlideshowEvent) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners
            .senders
            .retain(|(_, sender)| sender.try_send(event.clone()).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .len()
    }
}

/// Receiving end of one listener.
pub struct Subscription {
    id: u64,
    receiver: Receiver<SlideshowEvent>,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Waits for the next event. Fails once the hub is gone and drained.
    pub async fn recv(&self) -> Result<SlideshowEvent, RecvError> {
        self.receiver.recv().await
    }

    /// Returns an already delivered event without waiting.
    pub fn try_recv(&self) -> Option<SlideshowEvent> {
        self.receiver.try_recv().ok()
    }

    /// Drains every event delivered so far.
    pub fn drain(&self) -> Vec<SlideshowEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Removes the listener now instead of at drop.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut listeners = listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.senders.retain(|(id, _)| *id != self.id);
            debug!("Listener {} unsubscribed", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_every_listener() {
        let hub = EventHub::new();
        let first = hub.subscribe();
        let second = hub.subscribe();

        hub.emit(SlideshowEvent::FocusChanged { index: 2, previous: 1 });

        assert_eq!(
            first.drain(),
            vec![SlideshowEvent::FocusChanged { index: 2, previous: 1 }]
        );
        assert_eq!(second.drain().len(), 1);
    }

    #[test]
    fn dropping_a_subscription_removes_the_listener() {
        let hub = EventHub::new();
        let kept = hub.subscribe();
        let dropped = hub.subscribe();
        assert_eq!(hub.listener_count(), 2);

        dropped.unsubscribe();
        assert_eq!(hub.listener_count(), 1);

        hub.emit(SlideshowEvent::Evicted { index: 0, id: ItemId(1) });
        assert_eq!(kept.drain().len(), 1);
    }

    #[async_std::test]
    async fn recv_fails_after_hub_is_dropped() {
        let hub = EventHub::new();
        let subscription = hub.subscribe();
        hub.emit(SlideshowEvent::Loaded { index: 0, id: ItemId(7) });
        drop(hub);

        assert_eq!(
            subscription.recv().await,
            Ok(SlideshowEvent::Loaded { index: 0, id: ItemId(7) })
        );
        assert!(subscription.recv().await.is_err());
    }
}

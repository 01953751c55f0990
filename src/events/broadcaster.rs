//! Non-blocking fan-out of events to bounded observer channels

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

use super::Event;

/// Receiving end handed to an observer. `recv` returning `None` means the
/// scheduler has stopped and no further events will arrive.
pub type EventReceiver = mpsc::Receiver<Event>;

/// Set of subscriber channels.
///
/// Sends use `try_send`: a full buffer drops the event for that subscriber only,
/// so a slow observer can never stall the scheduler.
#[derive(Debug, Default)]
pub struct Broadcaster {
    subscribers: Vec<mpsc::Sender<Event>>,
    closed: bool,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer; non-positive buffer sizes become 1
    pub fn subscribe(&mut self, buffer: usize) -> EventReceiver {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        if self.closed {
            debug!("Subscription after close, returning a closed channel");
            return rx;
        }
        self.subscribers.push(tx);
        rx
    }

    /// Deliver an event to every subscriber without waiting
    pub fn broadcast(&mut self, event: &Event) {
        self.subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("Subscriber buffer full, dropping {:?} event", event.kind);
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Subscriber went away, removing it");
                false
            }
        });
    }

    /// Drop every sender so observers see the end of the stream. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let count = self.subscribers.len();
        self.subscribers.clear();
        debug!("Closed {} subscriber channels", count);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionState;

    fn work() -> Event {
        Event::state_change(SessionState::Work)
    }

    #[test]
    fn every_subscriber_gets_a_copy() {
        let mut broadcaster = Broadcaster::new();
        let mut a = broadcaster.subscribe(4);
        let mut b = broadcaster.subscribe(4);

        broadcaster.broadcast(&work());

        assert_eq!(a.try_recv().unwrap().state, SessionState::Work);
        assert_eq!(b.try_recv().unwrap().state, SessionState::Work);
    }

    #[test]
    fn full_subscriber_only_loses_its_own_events() {
        let mut broadcaster = Broadcaster::new();
        let mut slow = broadcaster.subscribe(1);
        let mut fast = broadcaster.subscribe(8);

        for _ in 0..3 {
            broadcaster.broadcast(&work());
        }

        assert!(slow.try_recv().is_ok());
        assert!(slow.try_recv().is_err());
        let mut received = 0;
        while fast.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
        assert_eq!(broadcaster.subscriber_count(), 2);
    }

    #[test]
    fn zero_buffer_becomes_one() {
        let mut broadcaster = Broadcaster::new();
        let mut rx = broadcaster.subscribe(0);
        broadcaster.broadcast(&work());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut broadcaster = Broadcaster::new();
        let rx = broadcaster.subscribe(1);
        drop(rx);
        broadcaster.broadcast(&work());
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn close_ends_every_stream() {
        let mut broadcaster = Broadcaster::new();
        let mut rx = broadcaster.subscribe(2);
        broadcaster.broadcast(&work());
        broadcaster.close();
        broadcaster.close();

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());

        let mut late = broadcaster.subscribe(2);
        assert!(late.recv().await.is_none());
    }
}

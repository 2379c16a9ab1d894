//! Point-to-point transport interface and link status notifications

use crate::core::PeerAddress;
use crate::hardware::TransportResult;
use std::sync::mpsc::{self, Receiver, Sender};

/// Open/close notification raised by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Opened,
    Closed,
}

/// Status callback handed to the transport.
///
/// Safe to call from whatever context the transport reports events in: it
/// only queues the event and never blocks. The connection lifecycle drains
/// the queue on its next tick and is the only writer of link state.
#[derive(Debug, Clone)]
pub struct LinkCallback {
    tx: Sender<LinkEvent>,
}

impl LinkCallback {
    /// Create a callback and the receiving end of its event queue
    pub fn channel() -> (Self, Receiver<LinkEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    pub fn notify(&self, event: LinkEvent) {
        // The receiver only goes away when the lifecycle is dropped, at
        // which point nobody cares about link state any more
        let _ = self.tx.send(event);
    }
}

/// Byte-stream duplex link to the peer (Bluetooth serial profile or similar)
pub trait Transport {
    /// Bring the radio/driver up under the given device name
    fn begin(&mut self, device_name: &str) -> bool;

    /// Install the open/close status callback
    fn register_callback(&mut self, callback: LinkCallback);

    /// Dial the peer; bounded by the transport's own timeout
    fn connect(&mut self, address: &PeerAddress) -> bool;

    /// (Re)start listening/advertising for the peer
    fn listen(&mut self) -> bool;

    /// Whether a peer is currently attached
    fn has_client(&self) -> bool;

    /// Number of inbound bytes waiting
    fn available(&self) -> usize;

    /// Read until `terminator` (consumed, not stored) or until `buffer` is
    /// full, whichever comes first. Returns the number of bytes stored.
    fn read_line_until(&mut self, terminator: u8, buffer: &mut [u8]) -> usize;

    /// Queue bytes for the peer
    fn write(&mut self, data: &[u8]) -> TransportResult<()>;

    /// Discard all pending inbound bytes
    fn flush_input(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_queues_events_in_order() {
        let (callback, rx) = LinkCallback::channel();
        let clone = callback.clone();
        callback.notify(LinkEvent::Opened);
        clone.notify(LinkEvent::Closed);

        assert_eq!(rx.try_recv(), Ok(LinkEvent::Opened));
        assert_eq!(rx.try_recv(), Ok(LinkEvent::Closed));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_callback_survives_dropped_receiver() {
        let (callback, rx) = LinkCallback::channel();
        drop(rx);
        callback.notify(LinkEvent::Opened);
    }
}

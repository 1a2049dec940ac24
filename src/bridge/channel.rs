//! Transport channel between the UI thread and the render worker
//!
//! Two unbounded FIFO queues, one per direction. The UI-to-worker direction
//! carries an optional transfer list next to each envelope; only `init` may
//! use it, and the handle moves with the message instead of being copied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use super::protocol::{kind, Envelope, ToMain, ToWorker};
use super::surface::SurfaceHandle;
use crate::error::BridgeError;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one channel, shared by both of its ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

/// One UI-to-worker message plus its transfer list
#[derive(Debug)]
pub struct Packet {
    pub envelope: Envelope,
    pub transfer: Option<SurfaceHandle>,
}

impl Packet {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            transfer: None,
        }
    }
}

/// Create a connected pair of ports
pub fn channel() -> (MainPort, WorkerPort) {
    let id = ChannelId(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed));
    let (to_worker, from_main) = crossbeam_channel::unbounded();
    let (to_main, from_worker) = crossbeam_channel::unbounded();
    (
        MainPort {
            id,
            tx: to_worker,
            rx: from_worker,
        },
        WorkerPort {
            id,
            tx: to_main,
            rx: from_main,
        },
    )
}

/// UI-thread end of the channel
#[derive(Clone)]
pub struct MainPort {
    id: ChannelId,
    tx: Sender<Packet>,
    rx: Receiver<Envelope>,
}

impl MainPort {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Post an envelope, moving `transfer` along with it
    pub fn post_message(
        &self,
        envelope: Envelope,
        transfer: Option<SurfaceHandle>,
    ) -> Result<(), BridgeError> {
        if transfer.is_some() && envelope.kind != kind::INIT {
            return Err(BridgeError::InvalidTransfer(envelope.kind));
        }
        self.tx
            .send(Packet { envelope, transfer })
            .map_err(|_| BridgeError::ChannelClosed)
    }

    pub fn send(&self, message: &ToWorker) -> Result<(), BridgeError> {
        self.post_message(message.to_envelope()?, None)
    }

    /// Next worker-to-UI envelope, if one is queued
    pub fn try_recv(&self) -> Result<Option<Envelope>, BridgeError> {
        match self.rx.try_recv() {
            Ok(envelope) => Ok(Some(envelope)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(BridgeError::ChannelClosed),
        }
    }
}

/// Worker end of the channel
pub struct WorkerPort {
    id: ChannelId,
    tx: Sender<Envelope>,
    rx: Receiver<Packet>,
}

impl WorkerPort {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Handle for posting control signals back to the UI thread
    pub fn outbox(&self) -> Outbox {
        Outbox(self.tx.clone())
    }

    /// Wait up to `timeout` for the next packet; `Ok(None)` on timeout
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Packet>, BridgeError> {
        match self.rx.recv_timeout(timeout) {
            Ok(packet) => Ok(Some(packet)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::ChannelClosed),
        }
    }

    pub fn try_recv(&self) -> Result<Option<Packet>, BridgeError> {
        match self.rx.try_recv() {
            Ok(packet) => Ok(Some(packet)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(BridgeError::ChannelClosed),
        }
    }
}

/// Cloneable worker-to-UI sender
#[derive(Clone)]
pub struct Outbox(Sender<Envelope>);

impl Outbox {
    pub fn post(&self, message: &ToMain) -> Result<(), BridgeError> {
        self.0
            .send(message.to_envelope()?)
            .map_err(|_| BridgeError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::protocol::ResizePayload;
    use crate::bridge::surface::{CanvasElement, HostElement};

    #[test]
    fn messages_arrive_in_order() {
        let (main, worker) = channel();
        for width in [1, 2, 3] {
            main.send(&ToWorker::Resize(ResizePayload { width, height: 1 }))
                .unwrap();
        }
        let widths: Vec<u32> = std::iter::from_fn(|| worker.try_recv().unwrap())
            .map(|p| p.envelope.decode::<ResizePayload>().unwrap().width)
            .collect();
        assert_eq!(widths, [1, 2, 3]);
    }

    #[test]
    fn transfer_only_rides_on_init() {
        let (main, _worker) = channel();
        let canvas = CanvasElement::new(1, 1, 1.0);
        let handle = canvas.transfer_control_to_offscreen().unwrap();
        let resize = ToWorker::Resize(ResizePayload {
            width: 1,
            height: 1,
        })
        .to_envelope()
        .unwrap();
        assert!(matches!(
            main.post_message(resize, Some(handle)),
            Err(BridgeError::InvalidTransfer(k)) if k == "resize"
        ));
    }

    #[test]
    fn control_signals_flow_back() {
        let (main, worker) = channel();
        worker.outbox().post(&ToMain::DomEventsDisconnect).unwrap();
        let envelope = main.try_recv().unwrap().unwrap();
        assert_eq!(envelope.kind, kind::DOM_EVENTS_DISCONNECT);
        assert!(main.try_recv().unwrap().is_none());
    }

    #[test]
    fn dropping_worker_closes_channel() {
        let (main, worker) = channel();
        drop(worker);
        assert!(matches!(main.try_recv(), Err(BridgeError::ChannelClosed)));
        assert!(main
            .send(&ToWorker::Resize(ResizePayload {
                width: 1,
                height: 1
            }))
            .is_err());
    }
}

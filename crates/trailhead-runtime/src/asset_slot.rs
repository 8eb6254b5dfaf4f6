//! One-shot hand-off of asynchronously loaded assets into the frame loop
//!
//! A loader (possibly on another thread) owns the `AssetPublisher` and may
//! publish at most once; publishing consumes it. The frame loop owns the
//! `AssetSlot` and polls it every frame without blocking. A publisher dropped
//! without publishing means the asset never arrives, which the slot reports
//! the same way as "not yet".

use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError};

/// Loader side of the hand-off
pub struct AssetPublisher<T> {
    sender: Sender<T>,
}

/// Frame-loop side of the hand-off
pub struct AssetSlot<T> {
    receiver: Option<Receiver<T>>,
}

/// Create a connected publisher/slot pair
pub fn asset_channel<T>() -> (AssetPublisher<T>, AssetSlot<T>) {
    let (sender, receiver) = bounded(1);
    (
        AssetPublisher { sender },
        AssetSlot {
            receiver: Some(receiver),
        },
    )
}

impl<T> AssetPublisher<T> {
    /// Deliver the asset. Fails only if the slot was already dropped (session torn down).
    pub fn publish(self, asset: T) -> bool {
        self.sender.send(asset).is_ok()
    }
}

impl<T> AssetSlot<T> {
    /// A slot that will never deliver
    pub fn empty() -> Self {
        Self { receiver: None }
    }

    /// Take the asset if it has arrived since the last poll. Never blocks.
    ///
    /// Returns `Some` at most once over the slot's lifetime.
    pub fn poll(&mut self) -> Option<T> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(asset) => {
                self.receiver = None;
                Some(asset)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::debug!("AssetSlot: publisher dropped without delivering");
                self.receiver = None;
                None
            }
        }
    }

    /// True once the slot can no longer deliver (delivered or abandoned)
    pub fn is_closed(&self) -> bool {
        self.receiver.is_none()
    }
}

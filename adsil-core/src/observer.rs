//! Weakly-held observers notified of frame changes (§3/§4.H).

use std::sync::{Arc, Weak};

use crate::frame::Frame;

/// Implementers must be safe to call from the player's foreground update
/// thread and must not re-enter the player's mutation methods (§6).
pub trait FrameObserver: Send + Sync {
    fn on_frame_changed(&self, frame: &Frame);
}

/// Append-only list of weak observer references, held as
/// `std::sync::Weak` so the player (which drives a background prefetch
/// task) can hold the list without pinning it to a single-threaded
/// executor. There is no explicit unregister; an observer drops out once
/// its last strong handle is dropped, and the next notification compacts
/// it away.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Weak<dyn FrameObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: &Arc<dyn FrameObserver>) {
        self.observers.push(Arc::downgrade(observer));
    }

    /// Call every live observer, dropping expired entries as it goes.
    pub fn notify(&mut self, frame: &Frame) {
        self.observers.retain(|weak| match weak.upgrade() {
            Some(observer) => {
                observer.on_frame_changed(frame);
                true
            }
            None => false,
        });
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

//! Shared latest-frame slot between the capture thread and the detection
//! loop.
//!
//! The capture thread publishes complete decoded frames; the detection loop
//! reads whichever frame is newest without blocking. Frames are swapped
//! behind a mutex as `Arc`s, so a reader always observes a complete frame,
//! old or new, never a torn one. The sequence number lets a caller tell a
//! repeated frame from a fresh one; no freshness is guaranteed.

use std::sync::{Arc, Mutex};

use image::RgbImage;

#[derive(Default)]
struct Slot {
    frame: Option<Arc<RgbImage>>,
    seq: u64,
}

/// Single-writer, any-reader holder of the most recent complete frame.
#[derive(Default)]
pub struct FrameSlot {
    inner: Mutex<Slot>,
}

/// A complete frame as last published, with its publish sequence number.
#[derive(Clone)]
pub struct LatestFrame {
    pub image: Arc<RgbImage>,
    pub seq: u64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    // Replaces the held frame. Most recent write wins. Lock poisoning is
    // survivable here: the slot only ever holds complete frames.
    pub fn publish(&self, image: RgbImage) {
        let mut slot = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slot.seq += 1;
        slot.frame = Some(Arc::new(image));
    }

    /// Non-blocking read of the most recently published frame. `None`
    /// means no frame has ever been captured (camera not yet delivering,
    /// or hardware failure) and the caller should skip the cycle.
    pub fn latest(&self) -> Option<LatestFrame> {
        let slot = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slot.frame.as_ref().map(|frame| LatestFrame {
            image: Arc::clone(frame),
            seq: slot.seq,
        })
    }
}

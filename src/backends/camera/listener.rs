// SPDX-License-Identifier: GPL-3.0-only

//! Synchronized frame hand-off between the driver and the display thread
//!
//! The driver's acquisition thread pushes individual frames through
//! [`FrameListener::on_new_frame`]. Once every subscribed kind is present the
//! set becomes available to [`SyncFrameListener::wait_for_new_frame`]. A newer
//! frame of a kind replaces a pending older one, so the consumer always sees
//! the most recent set.
//!
//! Only one frame set may be held at a time: it has to go back through
//! [`SyncFrameListener::release`] before the next one is handed out.

use super::types::{Frame, FrameKind, FrameSet};
use crate::errors::FrameError;
use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Receiver side of the driver's push model
pub trait FrameListener: Send + Sync {
    /// Called from the driver thread for every decoded frame.
    ///
    /// Returns `false` if the frame kind is not subscribed and was dropped.
    fn on_new_frame(&self, kind: FrameKind, frame: Frame) -> bool;
}

/// Counters for frame set hand-off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    /// Frame sets handed out by `wait_for_new_frame`
    pub acquired: u64,
    /// Frame sets given back through `release`
    pub released: u64,
    /// Pending frames overwritten by a newer frame of the same kind
    pub replaced: u64,
}

#[derive(Default)]
struct ListenerState {
    pending: HashMap<FrameKind, Frame>,
    outstanding: bool,
    stats: ListenerStats,
}

/// Blocking multi-kind frame listener
pub struct SyncFrameListener {
    subscribed: Vec<FrameKind>,
    state: Mutex<ListenerState>,
    ready: Condvar,
}

impl SyncFrameListener {
    /// Create a listener waiting for all of `kinds` before a set is ready
    pub fn new(kinds: &[FrameKind]) -> Self {
        let mut subscribed = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !subscribed.contains(kind) {
                subscribed.push(*kind);
            }
        }
        Self {
            subscribed,
            state: Mutex::new(ListenerState::default()),
            ready: Condvar::new(),
        }
    }

    /// Frame kinds this listener waits for
    pub fn subscribed(&self) -> &[FrameKind] {
        &self.subscribed
    }

    /// Whether a complete frame set is waiting
    pub fn has_new_frame(&self) -> bool {
        let state = self.lock();
        self.is_complete(&state)
    }

    /// Block until a complete frame set is available and take it.
    ///
    /// There is no timeout: if the driver never delivers, this never returns.
    pub fn wait_for_new_frame(&self) -> Result<FrameSet, FrameError> {
        let mut state = self.lock();
        if state.outstanding {
            return Err(FrameError::Outstanding);
        }

        while !self.is_complete(&state) {
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let frames = std::mem::take(&mut state.pending);
        state.outstanding = true;
        state.stats.acquired += 1;
        trace!(acquired = state.stats.acquired, "Frame set acquired");

        Ok(FrameSet::from_map(frames))
    }

    /// Give a frame set back so the next one can be handed out
    pub fn release(&self, frames: FrameSet) {
        drop(frames);
        let mut state = self.lock();
        if !state.outstanding {
            debug!("Release called without an outstanding frame set");
            return;
        }
        state.outstanding = false;
        state.stats.released += 1;
    }

    /// Snapshot of the hand-off counters
    pub fn stats(&self) -> ListenerStats {
        self.lock().stats
    }

    fn is_complete(&self, state: &ListenerState) -> bool {
        self.subscribed
            .iter()
            .all(|kind| state.pending.contains_key(kind))
    }

    fn lock(&self) -> MutexGuard<'_, ListenerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameListener for SyncFrameListener {
    fn on_new_frame(&self, kind: FrameKind, frame: Frame) -> bool {
        if !self.subscribed.contains(&kind) {
            return false;
        }

        let mut state = self.lock();
        if state.pending.insert(kind, frame).is_some() {
            state.stats.replaced += 1;
        }
        if self.is_complete(&state) {
            self.ready.notify_one();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::FramePixelFormat;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn frame(sequence: u64) -> Frame {
        Frame {
            width: 1,
            height: 1,
            format: FramePixelFormat::Float,
            data: vec![0; 4],
            sequence,
            captured_at: Instant::now(),
        }
    }

    fn deliver_all(listener: &SyncFrameListener, sequence: u64) {
        for kind in FrameKind::ALL {
            listener.on_new_frame(kind, frame(sequence));
        }
    }

    #[test]
    fn test_set_ready_only_when_complete() {
        let listener = SyncFrameListener::new(&FrameKind::ALL);
        listener.on_new_frame(FrameKind::Color, frame(0));
        listener.on_new_frame(FrameKind::Depth, frame(0));
        assert!(!listener.has_new_frame());

        listener.on_new_frame(FrameKind::Ir, frame(0));
        assert!(listener.has_new_frame());
    }

    #[test]
    fn test_unsubscribed_kind_rejected() {
        let listener = SyncFrameListener::new(&[FrameKind::Depth]);
        assert!(!listener.on_new_frame(FrameKind::Color, frame(0)));
        assert!(listener.on_new_frame(FrameKind::Depth, frame(0)));
    }

    #[test]
    fn test_duplicate_kinds_subscribed_once() {
        let listener =
            SyncFrameListener::new(&[FrameKind::Color, FrameKind::Ir, FrameKind::Color]);
        assert_eq!(listener.subscribed(), &[FrameKind::Color, FrameKind::Ir]);

        listener.on_new_frame(FrameKind::Color, frame(0));
        listener.on_new_frame(FrameKind::Ir, frame(0));
        let set = listener.wait_for_new_frame().unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_newer_frame_replaces_pending() {
        let listener = SyncFrameListener::new(&FrameKind::ALL);
        listener.on_new_frame(FrameKind::Depth, frame(1));
        listener.on_new_frame(FrameKind::Depth, frame(2));
        listener.on_new_frame(FrameKind::Ir, frame(2));
        listener.on_new_frame(FrameKind::Color, frame(2));

        let set = listener.wait_for_new_frame().unwrap();
        assert_eq!(set.get(FrameKind::Depth).unwrap().sequence, 2);
        assert_eq!(listener.stats().replaced, 1);
        listener.release(set);
    }

    #[test]
    fn test_second_acquire_without_release_fails() {
        let listener = SyncFrameListener::new(&FrameKind::ALL);
        deliver_all(&listener, 0);
        let set = listener.wait_for_new_frame().unwrap();

        deliver_all(&listener, 1);
        assert_eq!(
            listener.wait_for_new_frame().unwrap_err(),
            FrameError::Outstanding
        );

        listener.release(set);
        let next = listener.wait_for_new_frame().unwrap();
        assert_eq!(next.get(FrameKind::Color).unwrap().sequence, 1);
        listener.release(next);

        let stats = listener.stats();
        assert_eq!(stats.acquired, 2);
        assert_eq!(stats.released, 2);
    }

    #[test]
    fn test_wait_blocks_until_driver_delivers() {
        let listener = Arc::new(SyncFrameListener::new(&FrameKind::ALL));
        let producer = Arc::clone(&listener);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            deliver_all(&producer, 7);
        });

        let set = listener.wait_for_new_frame().unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(FrameKind::Ir).unwrap().sequence, 7);
        listener.release(set);
        handle.join().unwrap();
    }

    #[test]
    fn test_stray_release_does_not_count() {
        let listener = SyncFrameListener::new(&FrameKind::ALL);
        listener.release(FrameSet::default());
        assert_eq!(listener.stats().released, 0);
    }
}

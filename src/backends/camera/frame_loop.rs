// SPDX-License-Identifier: GPL-3.0-only
//! Driver-side acquisition thread
//!
//! Drivers run their sensor readout on a dedicated thread and push frames
//! into a [`FrameListener`](super::FrameListener). This module owns that
//! thread's lifecycle and pacing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Action returned by the acquisition callback to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Keep acquiring
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a paced acquisition loop running on its own thread
///
/// The callback receives the zero-based cycle number and is invoked at most
/// once per `period`. A zero period runs the loop flat out.
pub struct AcquisitionLoop {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl AcquisitionLoop {
    pub fn start<F>(name: &str, period: Duration, mut cycle_fn: F) -> Self
    where
        F: FnMut(u64) -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_signal);
        let thread_name = name.to_string();

        info!(name = %name, period_ms = period.as_millis() as u64, "Starting acquisition loop");

        let thread_handle = thread::spawn(move || {
            let mut cycle = 0u64;
            let mut next_deadline = Instant::now();

            loop {
                if thread_stop.load(Ordering::SeqCst) {
                    debug!(name = %thread_name, "Stop signal received");
                    break;
                }

                if cycle_fn(cycle) == LoopAction::Stop {
                    debug!(name = %thread_name, cycle, "Loop requested stop");
                    break;
                }
                cycle += 1;

                next_deadline += period;
                let now = Instant::now();
                if next_deadline > now {
                    thread::sleep(next_deadline - now);
                } else {
                    // Fell behind; do not try to catch up with a burst
                    next_deadline = now;
                }
            }

            info!(name = %thread_name, cycles = cycle, "Acquisition loop exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Check if the loop thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting acquisition loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Signal the loop to stop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending the stop signal
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take()
            && let Err(e) = handle.join()
        {
            warn!(name = %self.name, "Acquisition thread panicked: {:?}", e);
        }
    }
}

impl Drop for AcquisitionLoop {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "AcquisitionLoop dropped, stopping thread");
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_loop_stops_itself() {
        let counter = Arc::new(AtomicU64::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut acquisition = AcquisitionLoop::start("test-loop", Duration::ZERO, move |cycle| {
            counter_clone.store(cycle, Ordering::SeqCst);
            if cycle >= 10 {
                LoopAction::Stop
            } else {
                LoopAction::Continue
            }
        });

        acquisition.join();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert!(!acquisition.is_running());
    }

    #[test]
    fn test_stop_signal() {
        let counter = Arc::new(AtomicU64::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut acquisition =
            AcquisitionLoop::start("test-loop", Duration::from_millis(5), move |_| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                LoopAction::Continue
            });

        thread::sleep(Duration::from_millis(40));
        acquisition.stop();

        let after_stop = counter.load(Ordering::SeqCst);
        assert!(after_stop > 0);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_period_paces_cycles() {
        let counter = Arc::new(AtomicU64::new(0));
        let counter_clone = Arc::clone(&counter);

        let acquisition =
            AcquisitionLoop::start("test-paced", Duration::from_millis(50), move |_| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                LoopAction::Continue
            });

        thread::sleep(Duration::from_millis(120));
        assert!(acquisition.is_running());
        drop(acquisition);

        // ~3 cycles in 120ms at 50ms pacing, never dozens
        assert!(counter.load(Ordering::SeqCst) <= 5);
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Cooperative shutdown signal

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag asking the display loop to exit
///
/// Set from the Ctrl+C handler or the window close event; the capture loop
/// checks it at the top of every tick.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let handler_copy = token.clone();
        assert!(!token.is_cancelled());

        handler_copy.cancel();
        assert!(token.is_cancelled());
    }
}

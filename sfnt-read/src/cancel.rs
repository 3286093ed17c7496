//! Cooperative cancellation

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::ReadError;

/// A shared flag used to abandon in-flight work.
///
/// The token is passed explicitly to every operation that can take a while
/// and is polled between files, between the fonts of a collection, between
/// name records and between buffer fills while computing checksums. Clones
/// share the same flag, so a token can be handed to a worker thread and
/// cancelled from another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of all work observing this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Returns [`ReadError::Cancelled`] if cancellation was requested.
    #[inline]
    pub fn check(&self) -> Result<(), ReadError> {
        if self.is_cancelled() {
            Err(ReadError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let worker = token.clone();
        assert!(worker.check().is_ok());
        token.cancel();
        assert!(worker.is_cancelled());
        assert!(matches!(worker.check(), Err(ReadError::Cancelled)));
    }

    #[test]
    fn cancel_from_another_thread() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}

//! Hot reload plumbing.
//!
//! A file watcher runs on its own thread and must not touch components. It
//! holds a [`RefreshTrigger`] and sends [`RefreshRequest`]s; the UI thread
//! owns the [`RefreshQueue`] and drains it, typically through
//! [`App::process_refresh_requests`](crate::app::App::process_refresh_requests).
//! Filtering duplicate file events is the watcher's job.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Why a refresh was requested, usually the changed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub source: String,
}

impl RefreshRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Sending half, handed to watcher threads.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    tx: UnboundedSender<RefreshRequest>,
}

impl RefreshTrigger {
    /// Ask the UI thread to refresh. Returns `false` once the queue is gone.
    pub fn request(&self, source: impl Into<String>) -> bool {
        self.tx.send(RefreshRequest::new(source)).is_ok()
    }
}

/// Receiving half, owned by the UI thread.
#[derive(Debug)]
pub struct RefreshQueue {
    tx: UnboundedSender<RefreshRequest>,
    rx: UnboundedReceiver<RefreshRequest>,
}

impl Default for RefreshQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// A new trigger feeding this queue.
    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger {
            tx: self.tx.clone(),
        }
    }

    /// Every request pending right now, without waiting.
    pub fn drain(&mut self) -> Vec<RefreshRequest> {
        let mut pending = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(request) => pending.push(request),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        if !pending.is_empty() {
            debug!(count = pending.len(), "drained refresh requests");
        }
        pending
    }

    /// Wait for the next request.
    pub async fn recv(&mut self) -> Option<RefreshRequest> {
        self.rx.recv().await
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn drain_collects_pending_requests() {
        let mut queue = RefreshQueue::new();
        let trigger = queue.trigger();
        assert!(queue.drain().is_empty());

        assert!(trigger.request("home.view"));
        assert!(trigger.clone().request("home.css"));
        assert_eq!(
            queue.drain(),
            vec![RefreshRequest::new("home.view"), RefreshRequest::new("home.css")]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn trigger_outlives_queue() {
        let queue = RefreshQueue::new();
        let trigger = queue.trigger();
        drop(queue);
        assert!(!trigger.request("gone.view"));
    }

    #[test]
    fn trigger_is_send() {
        fn assert_send<T: Send + Clone + 'static>() {}
        assert_send::<RefreshTrigger>();
    }

    #[tokio::test]
    async fn requests_cross_threads() {
        let mut queue = RefreshQueue::new();
        let trigger = queue.trigger();
        let watcher = std::thread::spawn(move || trigger.request("list.view"));

        let request = tokio::time::timeout(Duration::from_secs(5), queue.recv())
            .await
            .unwrap();
        assert_eq!(request, Some(RefreshRequest::new("list.view")));
        assert!(watcher.join().unwrap());
    }
}

//! Camera stream ownership.
//!
//! The active video stream has exactly one owner. Acquisition hands out a
//! lease that stops the stream when dropped, so release happens on every
//! exit path of a mode switch or teardown instead of depending on an ad hoc
//! flag.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A live video stream handle, provided by the capture collaborator.
pub trait CameraStream: Send + Sync {
    /// Device label for display and logs.
    fn label(&self) -> &str;

    /// Stops the underlying stream. Must be idempotent.
    fn stop(&self);
}

type StreamSlot = Arc<Mutex<Option<Arc<dyn CameraStream>>>>;

/// Single owner of the active camera stream.
#[derive(Clone, Default)]
pub struct CameraController {
    active: StreamSlot,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a stream, stopping any previously active one.
    ///
    /// The returned lease releases the stream when dropped.
    pub fn acquire(&self, stream: Arc<dyn CameraStream>) -> CameraLease {
        let mut active = lock(&self.active);
        if let Some(previous) = active.take() {
            previous.stop();
        }
        *active = Some(stream.clone());
        drop(active);

        CameraLease {
            slot: self.active.clone(),
            stream,
        }
    }

    /// Label of the currently active stream, if any.
    pub fn active_label(&self) -> Option<String> {
        lock(&self.active).as_ref().map(|s| s.label().to_string())
    }
}

/// Scoped ownership of one acquired stream.
pub struct CameraLease {
    slot: StreamSlot,
    stream: Arc<dyn CameraStream>,
}

impl CameraLease {
    pub fn label(&self) -> &str {
        self.stream.label()
    }
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        let mut slot = lock(&self.slot);
        // Only release if this lease still owns the slot; a newer acquire
        // already stopped this stream.
        let owns_slot = slot
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &self.stream));
        if owns_slot {
            slot.take();
            self.stream.stop();
        }
    }
}

fn lock(slot: &StreamSlot) -> MutexGuard<'_, Option<Arc<dyn CameraStream>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockStream {
        label: String,
        stops: AtomicUsize,
    }

    impl MockStream {
        fn new(label: &str) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                stops: AtomicUsize::new(0),
            })
        }

        fn stop_count(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    impl CameraStream for MockStream {
        fn label(&self) -> &str {
            &self.label
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_lease_drop_releases_stream() {
        let controller = CameraController::new();
        let stream = MockStream::new("front");

        let lease = controller.acquire(stream.clone());
        assert_eq!(controller.active_label().as_deref(), Some("front"));

        drop(lease);
        assert_eq!(stream.stop_count(), 1);
        assert!(controller.active_label().is_none());
    }

    #[test]
    fn test_mode_switch_stops_previous_stream() {
        let controller = CameraController::new();
        let first = MockStream::new("front");
        let second = MockStream::new("rear");

        let first_lease = controller.acquire(first.clone());
        let second_lease = controller.acquire(second.clone());

        assert_eq!(first.stop_count(), 1);
        assert_eq!(controller.active_label().as_deref(), Some("rear"));

        // The stale lease must not stop the new stream or double-stop its own.
        drop(first_lease);
        assert_eq!(first.stop_count(), 1);
        assert_eq!(controller.active_label().as_deref(), Some("rear"));

        drop(second_lease);
        assert_eq!(second.stop_count(), 1);
    }

    #[test]
    fn test_release_on_early_exit_path() {
        fn flaky(controller: &CameraController, stream: Arc<MockStream>) -> Result<(), ()> {
            let _lease = controller.acquire(stream);
            Err(())
        }

        let controller = CameraController::new();
        let stream = MockStream::new("front");

        let _ = flaky(&controller, stream.clone());
        assert_eq!(stream.stop_count(), 1);
        assert!(controller.active_label().is_none());
    }
}

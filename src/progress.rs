use std::sync::Arc;

/// Events emitted while synchronizing with a gpodder-compatible backend
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A request to the sync backend is starting
    Requesting { endpoint: String },

    /// Subscription changes have been received
    SubscriptionsReceived { added: usize, removed: usize },

    /// Episode actions have been received
    EpisodeActionsReceived { count: usize },

    /// A batch of episode actions is being uploaded
    UploadingBatch {
        /// Index of this batch, starting at 0
        batch_index: usize,
        total_batches: usize,
        actions_in_batch: usize,
    },

    /// A batch of episode actions was accepted
    BatchUploaded { batch_index: usize },

    /// Uploading stopped at a failed batch; later batches were not sent
    BatchFailed { batch_index: usize, error: String },

    /// The synchronization run completed
    SyncCompleted { timestamp: i64 },
}

/// Trait for reporting progress events during synchronization.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Reporter that keeps every event for later inspection
    #[derive(Default)]
    pub struct RecordingReporter {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingReporter {
        pub fn events(&self) -> Vec<ProgressEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}

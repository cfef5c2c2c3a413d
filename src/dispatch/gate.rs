//! Availability gate
//!
//! Single-slot signal between the event bridge and the dispatch flow.
//! Posting stores at most one release; waiting consumes it.

use demo_runner_shared::DispatchError;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::trace;

/// Largest count the gate can hold
pub const GATE_MAX_COUNT: usize = 1;

/// Binary semaphore released by the event bridge
#[derive(Debug, Clone)]
pub struct AvailabilityGate {
    notify: Arc<Notify>,
}

impl AvailabilityGate {
    /// Create a gate holding `initial` pending releases, capped at `max`.
    ///
    /// Only a single-slot gate can be built; any other shape is a resource error.
    pub fn create(initial: usize, max: usize) -> Result<Self, DispatchError> {
        if max != GATE_MAX_COUNT {
            return Err(DispatchError::Resource(format!(
                "gate supports a maximum count of {}, requested {}",
                GATE_MAX_COUNT, max
            )));
        }
        if initial > max {
            return Err(DispatchError::Resource(format!(
                "initial count {} exceeds maximum {}",
                initial, max
            )));
        }

        let gate = Self {
            notify: Arc::new(Notify::new()),
        };
        if initial == 1 {
            gate.post();
        }
        Ok(gate)
    }

    /// Mark the gate available. Never blocks; extra posts are absorbed.
    pub fn post(&self) {
        trace!("gate posted");
        self.notify.notify_one();
    }

    /// Block until a post has happened since the last successful wait
    pub async fn wait(&self) {
        self.notify.notified().await;
        trace!("gate released");
    }

    /// Release this handle; the gate is gone once every holder destroyed theirs
    pub fn destroy(self) {
        trace!("gate destroyed");
    }
}

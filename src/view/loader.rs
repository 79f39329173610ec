//! Background lazy loading for the demo.
//!
//! Requests go to a worker thread over a channel. The worker sleeps to
//! simulate latency and sends the outcome back; the event loop drains
//! outcomes once per tick and hands them to
//! [`TreeGrid::resolve_lazy_load`](crate::grid::TreeGrid::resolve_lazy_load).

use super::demo::lazy_children;
use crate::model::{LoadError, NodeId, NodeSpec};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// A lazy load to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Node being loaded.
    pub node: NodeId,
    /// Generation the result must carry.
    pub generation: u64,
    /// Key of the node, used to derive child keys.
    pub key: String,
    /// Level of the node.
    pub level: usize,
}

/// Result of a [`LoadRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// Node that was loaded.
    pub node: NodeId,
    /// Generation of the request.
    pub generation: u64,
    /// Children or the failure.
    pub result: Result<Vec<NodeSpec>, LoadError>,
}

/// Handle to the loader thread.
pub struct LazyLoader {
    requests: Sender<LoadRequest>,
    outcomes: Receiver<LoadOutcome>,
    pending: usize,
}

impl LazyLoader {
    /// Start a loader thread.
    ///
    /// With `fail`, about a third of the loads fail. Which ones is a
    /// function of the node key and generation, so retries may succeed.
    pub fn spawn(delay: Duration, fail: bool) -> Self {
        let (requests, inbox) = mpsc::channel::<LoadRequest>();
        let (outbox, outcomes) = mpsc::channel();
        thread::spawn(move || {
            // Ends when the handle is dropped.
            for request in inbox {
                thread::sleep(delay);
                let outcome = perform(&request, fail);
                if outbox.send(outcome).is_err() {
                    break;
                }
            }
        });
        Self {
            requests,
            outcomes,
            pending: 0,
        }
    }

    /// Queue a load.
    pub fn request(&mut self, request: LoadRequest) {
        debug!(node = %request.node, generation = request.generation, "queueing lazy load");
        match self.requests.send(request) {
            Ok(()) => self.pending += 1,
            Err(err) => warn!(node = %err.0.node, "lazy loader thread is gone"),
        }
    }

    /// Outcomes that arrived since the last call.
    pub fn drain(&mut self) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        self.pending = self.pending.saturating_sub(outcomes.len());
        outcomes
    }

    /// Loads requested but not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

fn perform(request: &LoadRequest, fail: bool) -> LoadOutcome {
    let result = if fail && fails(request) {
        Err(LoadError::new(format!("could not fetch {}", request.key)))
    } else {
        Ok(lazy_children(&request.key, request.level + 1))
    };
    LoadOutcome {
        node: request.node,
        generation: request.generation,
        result,
    }
}

fn fails(request: &LoadRequest) -> bool {
    let mut hasher = DefaultHasher::new();
    request.key.hash(&mut hasher);
    request.generation.hash(&mut hasher);
    hasher.finish() % 3 == 0
}

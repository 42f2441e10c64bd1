//! Asynchronous resource loading for image elements.
//!
//! DESIGN
//! ======
//! The board never awaits anything. When an image element is inserted the
//! board queues a `ResourceCommand::Load` stamped with the element's current
//! generation; when it is removed, a `Cancel`. The engine forwards those
//! commands to a `ResourceLoader`, which runs each load as a tokio task and
//! reports completions over an unbounded channel.
//!
//! Completions are delivered back to the board on the input thread. The
//! board discards any completion whose element is gone or whose generation
//! no longer matches, so a slow load can never write into a removed or
//! re-inserted element.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::element::ElementId;

/// A load to start for one element generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub id: ElementId,
    pub generation: u64,
    pub source: String,
}

/// Work the board asks the loader to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceCommand {
    Load(ResourceRequest),
    Cancel(ElementId),
}

/// Errors produced while fetching a resource.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("resource {0} is empty")]
    Empty(String),
}

/// A finished load, tagged with the generation it was requested for.
#[derive(Debug)]
pub struct ResourceCompletion {
    pub id: ElementId,
    pub generation: u64,
    pub result: Result<Arc<[u8]>, ResourceError>,
}

/// What the board did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOutcome {
    /// Stored in the resource cache.
    Applied,
    /// The load failed for a live element; nothing was stored.
    Failed,
    /// The element was removed or re-inserted since the request; discarded.
    Stale,
}

/// Runs resource loads on a tokio runtime and collects their completions.
pub struct ResourceLoader {
    handle: Handle,
    tx: mpsc::UnboundedSender<ResourceCompletion>,
    rx: mpsc::UnboundedReceiver<ResourceCompletion>,
    in_flight: HashMap<ElementId, (u64, JoinHandle<()>)>,
    base_dir: Option<PathBuf>,
}

impl ResourceLoader {
    /// A loader spawning onto `handle`.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { handle, tx, rx, in_flight: HashMap::new(), base_dir: None }
    }

    /// Resolve relative sources against `dir`.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Number of loads started and not yet received.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn run(&mut self, command: ResourceCommand) {
        match command {
            ResourceCommand::Load(request) => self.request(request),
            ResourceCommand::Cancel(id) => self.cancel(&id),
        }
    }

    /// Start loading `request.source`, replacing any load already running for the element.
    pub fn request(&mut self, request: ResourceRequest) {
        self.cancel(&request.id);
        let path = self.resolve(&request.source);
        let tx = self.tx.clone();
        let id = request.id.clone();
        let generation = request.generation;
        debug!(%id, generation, path = %path.display(), "resource load started");
        let task = self.handle.spawn(async move {
            let result = match tokio::fs::read(&path).await {
                Ok(bytes) if bytes.is_empty() => Err(ResourceError::Empty(path.display().to_string())),
                Ok(bytes) => Ok(Arc::<[u8]>::from(bytes)),
                Err(source) => Err(ResourceError::Read { path, source }),
            };
            if tx.send(ResourceCompletion { id, generation, result }).is_err() {
                debug!("resource loader dropped; completion discarded");
            }
        });
        self.in_flight.insert(request.id, (generation, task));
    }

    /// Abort the in-flight load for `id`, if any.
    pub fn cancel(&mut self, id: &ElementId) {
        if let Some((generation, task)) = self.in_flight.remove(id) {
            task.abort();
            debug!(%id, generation, "resource load cancelled");
        }
    }

    /// A completion that is already available, without waiting.
    pub fn try_next(&mut self) -> Option<ResourceCompletion> {
        match self.rx.try_recv() {
            Ok(completion) => Some(self.settle(completion)),
            Err(_) => None,
        }
    }

    /// Wait for the next completion. `None` once nothing is in flight.
    pub async fn next(&mut self) -> Option<ResourceCompletion> {
        if self.in_flight.is_empty() {
            return self.try_next();
        }
        let completion = self.rx.recv().await?;
        Some(self.settle(completion))
    }

    fn settle(&mut self, completion: ResourceCompletion) -> ResourceCompletion {
        if self.in_flight.get(&completion.id).is_some_and(|(g, _)| *g == completion.generation) {
            self.in_flight.remove(&completion.id);
        }
        if let Err(err) = &completion.result {
            warn!(id = %completion.id, error = %err, "resource load failed");
        }
        completion
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = PathBuf::from(source);
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }
}

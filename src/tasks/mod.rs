use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::task::JoinHandle;
use tracing::{error, info_span, Instrument};

pub mod email;
pub mod enrichment;
pub mod generator;

/// Detached work that outlives the request which scheduled it.
///
/// Handles are kept so tests (and shutdown) can wait for everything that was
/// spawned; request handlers never await them.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut.instrument(info_span!("background_task", task)));
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Waits until every spawned task, including ones spawned while draining,
    /// has finished.
    pub async fn drain(&self) {
        loop {
            let pending: Vec<_> = {
                let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
                handles.drain(..).collect()
            };
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    error!(error = %e, "background task panicked or was cancelled");
                }
            }
        }
    }
}

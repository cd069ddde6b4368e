use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::model::Batch;

use super::{DataSource, FetchRequest};

/// A finished fetch, tagged with the session generation it was issued for.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub request: FetchRequest,
    pub result: Result<Batch, String>,
}

/// Runs fetches on worker threads and hands finished outcomes back to the
/// thread that polls it. Nothing here touches the graph model.
pub struct DataFeeder {
    source: Arc<dyn DataSource>,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
    in_flight: usize,
}

impl DataFeeder {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn dispatch(&mut self, generation: u64, request: FetchRequest) {
        info!(generation, %request, "dispatching fetch");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let worker_request = request.clone();
        let spawned = thread::Builder::new()
            .name("graph-fetch".to_owned())
            .spawn(move || {
                let result = source
                    .fetch(&worker_request)
                    .map_err(|error| format!("{:#}", anyhow::Error::new(error)));
                let _ = tx.send(FetchOutcome {
                    generation,
                    request: worker_request,
                    result,
                });
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(error) => {
                warn!(%error, %request, "failed to spawn fetch worker");
                self.reject(generation, request, format!("failed to spawn fetch worker: {error}"));
            }
        }
    }

    /// Queues a failed outcome for a request that never reached the source.
    fn reject(&mut self, generation: u64, request: FetchRequest, message: String) {
        let outcome = FetchOutcome {
            generation,
            request,
            result: Err(message),
        };
        if self.tx.send(outcome).is_ok() {
            self.in_flight += 1;
        }
    }

    pub fn poll(&mut self) -> Vec<FetchOutcome> {
        let outcomes = self.rx.try_iter().collect::<Vec<_>>();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Blocks until one outcome arrives or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<FetchOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }
}

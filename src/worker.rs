//! Background loader worker.
//!
//! One dedicated thread takes [`LoadRequest`]s off a queue and answers each
//! with exactly one [`WorkerMessage`] on the reply channel handed back by
//! [`LoaderWorker::queue_request`]. Requests are processed one at a time in
//! the order they were queued.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use log::{error, info, warn};

use crate::config::LoaderConfig;
use crate::data::{LoadRequest, WorkerMessage};
use crate::errors::{Error, Result};
use crate::etl::grid_loader::GridLoaderEtl;
use crate::etl::Etl;
use crate::fetch::{Fetcher, SourceFetcher};

const THREAD_NAME: &str = "osm-grid-loader";

#[derive(Debug, Clone, PartialEq)]
pub struct LoadResponse {
    pub request_id: u64,
    pub message: WorkerMessage,
}

struct Job {
    request_id: u64,
    request: LoadRequest,
    reply: Sender<LoadResponse>,
}

/// Handle to the single response of a queued request.
pub struct PendingLoad {
    request_id: u64,
    rx: Receiver<LoadResponse>,
}

impl PendingLoad {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn wait(self) -> Result<LoadResponse> {
        self.rx.recv().map_err(|_| Error::WorkerGone)
    }

    /// `Ok(None)` when the response did not arrive in time.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<LoadResponse>> {
        match self.rx.recv_timeout(timeout) {
            Ok(response) => Ok(Some(response)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::WorkerGone),
        }
    }
}

pub struct LoaderWorker {
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    next_request_id: AtomicU64,
}

impl LoaderWorker {
    pub fn spawn(config: LoaderConfig) -> Result<Self> {
        let fetcher = SourceFetcher::new(&config);
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher<F: Fetcher + 'static>(config: LoaderConfig, fetcher: F) -> Result<Self> {
        let (jobs, queue) = unbounded::<Job>();
        let fetcher: Arc<dyn Fetcher> = Arc::new(fetcher);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run_jobs(queue, config, fetcher))?;

        Ok(LoaderWorker {
            jobs: Some(jobs),
            handle: Some(handle),
            next_request_id: AtomicU64::new(1),
        })
    }

    pub fn queue_request(&self, request: LoadRequest) -> PendingLoad {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = bounded(1);
        let job = Job {
            request_id,
            request,
            reply,
        };

        // If the worker is gone the job (and its reply sender) is dropped, so
        // `wait` reports `WorkerGone`.
        if let Some(jobs) = &self.jobs {
            if jobs.send(job).is_err() {
                warn!(request_id = request_id; "Loader worker is not running, request dropped");
            }
        }

        PendingLoad { request_id, rx }
    }

    /// Stops taking requests and waits for the queued ones to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Loader worker thread panicked");
            }
        }
    }
}

impl Drop for LoaderWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_jobs(queue: Receiver<Job>, config: LoaderConfig, fetcher: Arc<dyn Fetcher>) {
    info!("Loader worker started");
    for job in queue {
        info!(request_id = job.request_id, url = job.request.data_url.as_str(); "Received load request");

        let message = panic::catch_unwind(AssertUnwindSafe(|| {
            load_grid(&job.request, &config, fetcher.as_ref())
        }))
        .unwrap_or_else(|payload| WorkerMessage::Error {
            error: panic_message(payload.as_ref()),
        });

        if let WorkerMessage::Error { error } = &message {
            error!(request_id = job.request_id, err = error.as_str(); "Error loading or processing data");
        }

        let response = LoadResponse {
            request_id: job.request_id,
            message,
        };
        if job.reply.send(response).is_err() {
            warn!(request_id = job.request_id; "Caller dropped the reply channel");
        }
    }
    info!("Loader worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("loader panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("loader panicked: {}", message)
    } else {
        "loader panicked".to_string()
    }
}

/// Runs one load request to completion and folds any failure into an
/// `ERROR` message.
pub fn load_grid(request: &LoadRequest, config: &LoaderConfig, fetcher: &dyn Fetcher) -> WorkerMessage {
    match GridLoaderEtl::new(config, fetcher, request).process() {
        Ok(grid_data) => WorkerMessage::Success {
            grid_data: Box::new(grid_data),
        },
        Err(err) => WorkerMessage::Error {
            error: err.to_string(),
        },
    }
}

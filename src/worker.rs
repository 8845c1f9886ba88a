//! Worker thread management
//!
//! Runs compositions on dedicated worker threads so the interface stays
//! responsive, and decodes input pairs concurrently on the tokio runtime.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};

use crate::compose::style::StyleConfig;
use crate::compose::{Composition, Compositor};
use crate::image_loader::{load_image_from_bytes, DecodedImage};

/// Messages sent from main thread to workers
#[derive(Debug)]
pub enum WorkerMessage {
    /// Compose the two images with a style snapshot
    ComposeRequest {
        id: u64,
        image_a: DecodedImage,
        image_b: DecodedImage,
        style: StyleConfig,
    },
    /// Shutdown signal
    Shutdown,
}

/// Responses sent from workers to main thread
#[derive(Debug)]
pub enum WorkerResponse {
    ComposeComplete {
        id: u64,
        composition: Box<Composition>,
        render_time: u64,
    },
    /// Error occurred
    Error { id: u64, message: String },
}

/// Handle to worker threads and channels
pub struct WorkerHandle {
    pub request_tx: Sender<WorkerMessage>,
    pub response_rx: Receiver<WorkerResponse>,
    threads: Vec<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn worker_count(&self) -> usize {
        self.threads.len()
    }

    /// Shutdown all worker threads
    pub fn shutdown(self) {
        for _ in &self.threads {
            let _ = self.request_tx.send(WorkerMessage::Shutdown);
        }

        for handle in self.threads {
            let _ = handle.join();
        }
    }
}

/// Spawn worker threads sharing one compositor
pub fn spawn_workers(compositor: Arc<Compositor>) -> Result<WorkerHandle> {
    let (request_tx, request_rx) = unbounded::<WorkerMessage>();
    let (response_tx, response_rx) = unbounded::<WorkerResponse>();

    let num_workers = num_cpus().clamp(1, 4);
    let mut threads = Vec::with_capacity(num_workers);

    for id in 0..num_workers {
        let rx = request_rx.clone();
        let tx = response_tx.clone();
        let compositor = Arc::clone(&compositor);

        let handle = thread::Builder::new()
            .name(format!("compose-worker-{}", id))
            .spawn(move || worker_loop(&compositor, rx, tx))
            .context("Failed to spawn worker thread")?;

        threads.push(handle);
    }
    debug!("spawned {} compose worker(s)", num_workers);

    Ok(WorkerHandle {
        request_tx,
        response_rx,
        threads,
    })
}

/// Main worker loop - processes messages until shutdown
fn worker_loop(compositor: &Compositor, rx: Receiver<WorkerMessage>, tx: Sender<WorkerResponse>) {
    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMessage::Shutdown => break,

            WorkerMessage::ComposeRequest {
                id,
                image_a,
                image_b,
                style,
            } => {
                let start = Instant::now();

                let response = match compositor.compose(&image_a, &image_b, &style) {
                    Ok(composition) => {
                        let render_time = start.elapsed().as_millis() as u64;
                        info!(
                            "composed {}x{} in {}ms",
                            composition.width, composition.height, render_time
                        );
                        WorkerResponse::ComposeComplete {
                            id,
                            composition: Box::new(composition),
                            render_time,
                        }
                    }
                    Err(e) => WorkerResponse::Error {
                        id,
                        message: e.to_string(),
                    },
                };

                let _ = tx.send(response);
            }
        }
    }
}

/// Decode two image files concurrently.
///
/// Both reads run as independent tasks and are joined; the first failure
/// is reported once both have finished.
pub async fn decode_pair(path_a: PathBuf, path_b: PathBuf) -> Result<(DecodedImage, DecodedImage)> {
    let (a, b) = tokio::join!(decode_file(path_a), decode_file(path_b));
    Ok((a?, b?))
}

async fn decode_file(path: PathBuf) -> Result<DecodedImage> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read image: {:?}", path))?;
    tokio::task::spawn_blocking(move || load_image_from_bytes(&bytes))
        .await
        .map_err(|e| anyhow!("Decode task failed: {}", e))?
        .with_context(|| format!("Failed to load image: {:?}", path))
}

/// Get number of CPUs (fallback to 1)
fn num_cpus() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

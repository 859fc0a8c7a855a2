//! Background fetch worker. Owns the backtest source; all network and disk
//! reads happen here.
//!
//! Communication with the main thread is via `mpsc` channels. The worker
//! runs report fetches inside a private rayon pool (not the global pool).

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};
use tradelog_client::{BacktestSource, FetchError, LoadTicket, ReportBatch, ReportSession};
use tradelog_core::BacktestListing;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    FetchList,
    LoadReport(LoadTicket),
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Listing(Result<Vec<BacktestListing>, FetchError>),
    Report(ReportBatch),
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    source: Box<dyn BacktestSource>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .thread_name(|i| format!("tradelog-fetch-{i}"))
        .build()
        .map_err(io::Error::other)?;

    thread::Builder::new()
        .name("tradelog-worker".into())
        .spawn(move || worker_loop(source.as_ref(), &pool, rx, tx))
}

fn worker_loop(
    source: &dyn BacktestSource,
    pool: &rayon::ThreadPool,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    info!(source = source.name(), "worker started");
    loop {
        let response = match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::FetchList) => WorkerResponse::Listing(source.list()),
            Ok(WorkerCommand::LoadReport(ticket)) => {
                debug!(id = ticket.id(), generation = ticket.generation(), "loading report");
                WorkerResponse::Report(pool.install(|| ReportSession::fetch_report(source, ticket)))
            }
        };
        if tx.send(response).is_err() {
            break;
        }
    }
    info!("worker stopped");
}

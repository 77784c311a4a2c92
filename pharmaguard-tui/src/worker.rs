//! Background worker thread: all network I/O runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! handles one command at a time, so at most one request is ever in flight.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use pharmaguard_core::{
    AnalysisBackend, ClientError, FailurePolicy, HealthStatus, Outcome, Submission,
};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Analyze {
        submission: Submission,
        policy: FailurePolicy,
    },
    Health,
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    AnalysisDone { outcome: Outcome },
    Health(Result<HealthStatus, ClientError>),
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    backend: Box<dyn AnalysisBackend>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("pharmaguard-worker".into())
        .spawn(move || worker_loop(backend.as_ref(), rx, tx))
}

fn worker_loop(
    backend: &dyn AnalysisBackend,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    tracing::debug!(backend = %backend.describe(), "worker started");
    loop {
        let response = match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Analyze { submission, policy }) => WorkerResponse::AnalysisDone {
                outcome: submission.run(backend, policy),
            },
            Ok(WorkerCommand::Health) => WorkerResponse::Health(backend.health()),
        };
        // The UI hung up; nothing left to report to.
        if tx.send(response).is_err() {
            break;
        }
    }
    tracing::debug!("worker stopped");
}

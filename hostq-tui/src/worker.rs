//! Background worker thread: every service call runs off the UI thread.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Each run
//! is dispatched on its own short-lived thread, so a slow call for one view
//! never holds up another.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use hostq_core::domain::OptimizationResponse;
use hostq_core::{DemoView, OptimizationService, RunRequest, RunTicket, ServiceError};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Run {
        view: DemoView,
        ticket: RunTicket,
        request: RunRequest,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    RunFinished {
        view: DemoView,
        ticket: RunTicket,
        outcome: Result<OptimizationResponse, ServiceError>,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    service: Arc<dyn OptimizationService>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("hostq-worker".into())
        .spawn(move || {
            worker_loop(rx, tx, service);
        })
}

fn worker_loop(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    service: Arc<dyn OptimizationService>,
) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Run {
                view,
                ticket,
                request,
            }) => dispatch_run(view, ticket, request, &tx, &service),
        }
    }
    debug!("worker loop exited");
}

fn dispatch_run(
    view: DemoView,
    ticket: RunTicket,
    request: RunRequest,
    tx: &Sender<WorkerResponse>,
    service: &Arc<dyn OptimizationService>,
) {
    let run_tx = tx.clone();
    let run_service = Arc::clone(service);
    let name = format!("hostq-run-{}-{}", view.index() + 1, ticket.0);

    let spawned = thread::Builder::new().name(name).spawn(move || {
        let started = Instant::now();
        let outcome = run_service.simulate(&request);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(_) => info!(?view, %ticket, service = run_service.name(), elapsed_ms, "run finished"),
            Err(e) => warn!(?view, %ticket, service = run_service.name(), elapsed_ms, error = %e, "run failed"),
        }
        // The UI may already be gone on shutdown.
        let _ = run_tx.send(WorkerResponse::RunFinished {
            view,
            ticket,
            outcome,
        });
    });

    if let Err(e) = spawned {
        error!(?view, %ticket, error = %e, "could not spawn run thread");
        let _ = tx.send(WorkerResponse::RunFinished {
            view,
            ticket,
            outcome: Err(ServiceError::Rejected(format!(
                "could not start run thread: {e}"
            ))),
        });
    }
}

//! ballast-api — HTTP front end for the reconciler.
//!
//! Thin axum layer over [`Reconciler`]: it parses requests, runs the
//! reconciler on the request task, and maps [`ErrorKind`] to status codes.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Status page |
//! | POST | `/scale` | Converge to `{"targetCapacity": n}` (blocks until done) |
//! | GET | `/status` | Provider view + run-state |
//! | GET | `/health` | Liveness |
//!
//! [`ErrorKind`]: ballast_reconcile::ErrorKind

pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use ballast_reconcile::{CancellationToken, Reconciler};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub reconciler: Arc<Reconciler>,
    /// Cancelled on daemon shutdown; each request works on a child token.
    pub shutdown: CancellationToken,
}

/// Build the complete router.
pub fn build_router(reconciler: Arc<Reconciler>, shutdown: CancellationToken) -> Router {
    let state = ApiState {
        reconciler,
        shutdown,
    };

    Router::new()
        .route("/", get(pages::index))
        .route("/scale", post(handlers::scale))
        .route("/status", get(handlers::status))
        .route("/health", get(handlers::health))
        .with_state(state)
}

//! Serve command handler.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::backend::Backend;
use crate::server::{self, AppState};

/// Serves `backend` until the process is stopped.
pub fn handle_serve(backend: Arc<dyn Backend>, token: &str, listen: SocketAddr) -> Result<()> {
    let handle = server::start(AppState::new(backend, token), listen)
        .with_context(|| format!("failed to listen on {}", listen))?;

    println!("Serving notes on http://{}", handle.addr());
    handle.wait().context("server stopped with an error")
}

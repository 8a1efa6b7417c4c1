//! REST server exposing a backend over HTTP.
//!
//! Routes:
//!
//! | method | path              | operation             |
//! |--------|-------------------|-----------------------|
//! | GET    | `/?filter=`       | list                  |
//! | GET    | `/search?query=`  | full-text search      |
//! | GET    | `/{name}`         | fetch one note        |
//! | POST   | `/`               | create (JSON note)    |
//! | PUT    | `/{name}`         | update (`data` field) |
//! | DELETE | `/{name}`         | delete                |
//!
//! Every request except `OPTIONS` must carry `Authorization: Bearer <token>`.

mod auth;
mod routes;

use crate::backend::Backend;
use axum::Router;
use axum::middleware;
use axum::routing::get;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn Backend>,
    token: Arc<str>,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, token: &str) -> Self {
        Self {
            backend,
            token: Arc::from(token),
        }
    }

    fn validate_token(&self, token: Option<&str>) -> bool {
        token.is_some_and(|t| t == &*self.token)
    }
}

/// Builds the router with auth and CORS layers applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::list_notes).post(routes::create_note))
        .route("/search", get(routes::search_notes))
        .route(
            "/{name}",
            get(routes::get_note)
                .put(routes::update_note)
                .delete(routes::delete_note),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Handle to a server running on its own thread.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<io::Result<()>>>,
}

impl ServerHandle {
    /// Returns the address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops the server and waits for it to finish.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// Blocks until the server exits on its own.
    pub fn wait(mut self) -> io::Result<()> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("server thread panicked"))),
            None => Ok(()),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Binds `addr` and serves `state` on a dedicated thread and runtime.
///
/// Binding happens before this returns, so a port of 0 yields the actual
/// port through [`ServerHandle::addr`].
pub fn start(state: AppState, addr: SocketAddr) -> io::Result<ServerHandle> {
    let listener = std::net::TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let thread = std::thread::spawn(move || -> io::Result<()> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener)?;
            tracing::info!(addr = %local_addr, "note server listening");

            axum::serve(listener, router(state))
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                    tracing::info!("note server shutting down");
                })
                .await
        })
    });

    Ok(ServerHandle {
        addr: local_addr,
        shutdown_tx: Some(shutdown_tx),
        thread: Some(thread),
    })
}

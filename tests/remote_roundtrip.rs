//! Remote backend against a live server backed by a local store.

mod common;

use common::harness::TestEnv;
use note::backend::{Backend, BackendError, LocalBackend, RemoteBackend, StoreLayout};
use note::domain::Note;
use note::server::{self, AppState, ServerHandle};
use predicates::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

const TOKEN: &str = "roundtrip-token";

struct LiveServer {
    _dir: TempDir,
    local: Arc<LocalBackend>,
    handle: ServerHandle,
}

impl LiveServer {
    fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let local = Arc::new(LocalBackend::new(StoreLayout::new(
            dir.path().join("config"),
            dir.path().join("data"),
        )));
        local.init().unwrap();

        let state = AppState::new(local.clone(), TOKEN);
        let handle = server::start(state, "127.0.0.1:0".parse().unwrap()).unwrap();
        Self {
            _dir: dir,
            local,
            handle,
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.handle.addr())
    }

    fn client(&self, token: &str) -> RemoteBackend {
        RemoteBackend::new(&self.url(), token).unwrap()
    }
}

// ===========================================
// Backend contract over HTTP
// ===========================================

#[test]
fn todo_scenario_over_http() {
    let server = LiveServer::start();
    let remote = server.client(TOKEN);
    remote.init().unwrap();

    remote.create(&Note::new("todo", "buy milk").unwrap()).unwrap();

    let listed = remote.list("").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name(), "todo");

    let note = remote.get("todo").unwrap();
    assert_eq!(note.data(), Some(&b"buy milk"[..]));
    assert!(note.check().is_ok());

    remote.update("todo", b"buy bread").unwrap();
    assert_eq!(remote.get("todo").unwrap().data(), Some(&b"buy bread"[..]));

    let found = remote.search("BREAD").unwrap();
    assert_eq!(found.len(), 1);

    remote.delete(&remote.get("todo").unwrap()).unwrap();
    assert!(remote.list("").unwrap().is_empty());
    assert!(server.local.list("").unwrap().is_empty());
}

#[test]
fn errors_map_back_to_backend_errors() {
    let server = LiveServer::start();
    let remote = server.client(TOKEN);
    remote.create(&Note::new("todo", "buy milk").unwrap()).unwrap();

    assert!(matches!(
        remote.get("ghost"),
        Err(BackendError::NotFound(name)) if name == "ghost"
    ));
    assert!(matches!(
        remote.create(&Note::new("todo", "again").unwrap()),
        Err(BackendError::NoteExist(_))
    ));
    assert!(matches!(
        remote.update("todo", b"buy milk"),
        Err(BackendError::NotModified(_))
    ));
}

#[test]
fn tampered_note_comes_back_as_integrity_failure() {
    let server = LiveServer::start();
    let remote = server.client(TOKEN);
    let note = Note::new("todo", "buy milk").unwrap();
    remote.create(&note).unwrap();

    let blob = server.local.layout().blob_path(note.id().as_str()).unwrap();
    std::fs::write(blob, "tampered").unwrap();

    let recovered = remote.get("todo").unwrap_err().recover_note().unwrap();
    assert_eq!(recovered.name(), "todo");
    assert_eq!(recovered.id(), note.id());

    remote.delete(&recovered).unwrap();
    assert!(server.local.list("").unwrap().is_empty());
}

#[test]
fn deleting_a_stale_note_keeps_the_current_one() {
    let server = LiveServer::start();
    let remote = server.client(TOKEN);
    remote.create(&Note::new("todo", "buy milk").unwrap()).unwrap();
    let stale = remote.get("todo").unwrap();
    remote.update("todo", b"buy bread").unwrap();

    remote.delete(&stale).unwrap();
    assert_eq!(remote.get("todo").unwrap().data(), Some(&b"buy bread"[..]));

    remote.delete(&remote.get("todo").unwrap()).unwrap();
    assert!(server.local.list("").unwrap().is_empty());
}

#[test]
fn names_needing_escaping_survive_the_trip() {
    let server = LiveServer::start();
    let remote = server.client(TOKEN);

    remote.create(&Note::new("work/plan#1", "ship it").unwrap()).unwrap();
    assert_eq!(
        remote.get("work/plan#1").unwrap().data(),
        Some(&b"ship it"[..])
    );
}

#[test]
fn wrong_token_is_unauthorized() {
    let server = LiveServer::start();
    let remote = server.client("wrong");

    assert!(matches!(remote.list(""), Err(BackendError::Unauthorized)));
}

// ===========================================
// CLI against a live server
// ===========================================

#[test]
fn cli_uses_remote_backend() {
    let server = LiveServer::start();
    let env = TestEnv::new();
    let url = server.url();

    env.cmd()
        .args(["--remote", url.as_str(), "--token", TOKEN])
        .add("todo", "buy milk")
        .assert()
        .success();

    env.cmd()
        .args(["--remote", url.as_str(), "--token", TOKEN])
        .view("todo")
        .assert()
        .success()
        .stdout("buy milk");

    // Nothing was written to the client's own store.
    assert!(!env.index_path().exists());
    assert_eq!(server.local.list("").unwrap().len(), 1);

    env.cmd()
        .args(["--remote", url.as_str(), "--token", "wrong"])
        .ls()
        .assert()
        .failure()
        .stderr(predicate::str::contains("unauthenticated"));
}

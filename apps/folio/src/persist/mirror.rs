//! Fire-and-forget boundary between the collection store and the remote
//! mirror.
//!
//! Store mutations run synchronously; remote I/O must not sit on that path.
//! The store pushes commands onto an unbounded channel and moves on. A single
//! spawned worker drains the queue in submission order and logs-and-discards
//! every failure. There are no retries and no acknowledgments; the in-memory
//! state stays
//! authoritative. Dropping the last handle lets the worker finish the queue
//! and exit, which is how the process flushes pending writes on shutdown.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::resume::Resume;
use crate::persist::remote::RemoteStore;

#[derive(Debug)]
pub enum MirrorCommand {
    /// Write this document under its derived storage key.
    Upsert(Box<Resume>),
    /// Delete the record stored under the key derived from this title.
    Remove(String),
}

#[derive(Clone)]
pub struct MirrorHandle {
    tx: mpsc::UnboundedSender<MirrorCommand>,
}

impl MirrorHandle {
    /// A handle plus the raw receiving end. Production code wires the
    /// receiver to a worker via [`spawn_mirror`]; tests inspect it directly.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MirrorCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MirrorHandle { tx }, rx)
    }

    pub fn upsert(&self, doc: &Resume) {
        self.send(MirrorCommand::Upsert(Box::new(doc.clone())));
    }

    pub fn remove(&self, title: &str) {
        self.send(MirrorCommand::Remove(title.to_string()));
    }

    fn send(&self, command: MirrorCommand) {
        if self.tx.send(command).is_err() {
            debug!("mirror worker is gone, dropping remote write");
        }
    }
}

/// Spawns the worker that executes mirror commands against the remote store.
/// The returned task completes once every handle is dropped and the queue has
/// drained.
pub fn spawn_mirror(remote: RemoteStore) -> (MirrorHandle, JoinHandle<()>) {
    let (handle, mut rx) = MirrorHandle::channel();
    let task = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                MirrorCommand::Upsert(doc) => {
                    if let Err(err) = remote.upsert(&doc).await {
                        warn!("remote upsert of '{}' failed: {err}", doc.display_title);
                    }
                }
                MirrorCommand::Remove(title) => {
                    if let Err(err) = remote.remove(&title).await {
                        warn!("remote delete of '{title}' failed: {err}");
                    }
                }
            }
        }
        debug!("mirror queue drained");
    });
    (handle, task)
}

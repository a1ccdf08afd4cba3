//! One-time startup merge of the remote store into the local collection.

use tracing::{info, warn};

use crate::persist::remote::RemoteStore;
use crate::store::collection::CollectionStore;

/// Runs exactly once per process, after local hydration.
///
/// A non-empty remote list merges remote-wins by identity: matching ids are
/// replaced in full (no field-level merge, no timestamp comparison; a stale
/// remote copy can overwrite newer local edits, which is accepted), unknown
/// ids are appended. An empty remote store is seeded with every local
/// document. Any transport or payload failure aborts silently, leaving
/// local-only state in effect for the session.
pub async fn reconcile(store: &mut CollectionStore, remote: &RemoteStore) {
    let remote_docs = match remote.list().await {
        Ok(docs) => docs,
        Err(err) => {
            warn!("remote fetch failed, keeping local-only state: {err}");
            return;
        }
    };

    if remote_docs.is_empty() {
        if !store.documents().is_empty() {
            info!(
                "remote store is empty, seeding it with {} local document(s)",
                store.documents().len()
            );
            for doc in store.documents() {
                store.mirror().upsert(doc);
            }
        }
        return;
    }

    info!(
        "merging {} remote document(s) into the local collection",
        remote_docs.len()
    );
    store.merge_remote(remote_docs);
}

//! Local persistence adapter: one JSON file holding the whole collection.
//!
//! The slot is written after every collection mutation and read exactly once
//! at startup. It never fails the operation that triggered it: a write
//! failure is logged and swallowed, an unreadable file hydrates to the
//! default collection.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::LocalSlotError;
use crate::models::resume::{normalize, Resume};
use crate::store::collection::CollectionState;

/// Title given to the single document of a freshly initialized collection.
const DEFAULT_DOCUMENT_TITLE: &str = "New Resume";

pub struct LocalSlot {
    path: PathBuf,
}

impl LocalSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalSlot { path: path.into() }
    }

    /// Reads the slot. Missing or corrupt files fall back to the default
    /// collection; every stored document is normalized against the blank
    /// template so older schema versions gain the fields they lack.
    pub fn load(&self) -> CollectionState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() == io::ErrorKind::NotFound {
                    info!(
                        "no collection at {}, starting with a blank resume",
                        self.path.display()
                    );
                } else {
                    warn!("could not read {}: {err}", self.path.display());
                }
                return Self::default_state();
            }
        };

        match Self::parse(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "collection at {} is unreadable ({err}), starting fresh",
                    self.path.display()
                );
                Self::default_state()
            }
        }
    }

    /// Serializes the full collection into the slot, logging and swallowing
    /// any failure.
    pub fn save(&self, state: &CollectionState) {
        if let Err(err) = self.try_save(state) {
            warn!(
                "failed to persist collection to {}: {err}",
                self.path.display()
            );
        }
    }

    fn try_save(&self, state: &CollectionState) -> Result<(), LocalSlotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn parse(raw: &str) -> Result<CollectionState, LocalSlotError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct StoredState {
            #[serde(default)]
            documents: Vec<Value>,
            #[serde(default)]
            active_identity: Option<Uuid>,
        }

        let stored: StoredState = serde_json::from_str(raw)?;
        if stored.documents.is_empty() {
            return Ok(Self::default_state());
        }

        let template = Resume::blank();
        let documents: Vec<Resume> = stored
            .documents
            .iter()
            .map(|doc| normalize(doc, &template))
            .collect();
        // A stored active identity naming no document falls back to the first.
        let active_identity = stored
            .active_identity
            .filter(|id| documents.iter().any(|d| d.id == *id))
            .unwrap_or(documents[0].id);

        Ok(CollectionState {
            documents,
            active_identity,
        })
    }

    /// One blank resume titled "New Resume", active.
    pub fn default_state() -> CollectionState {
        let mut doc = Resume::blank();
        doc.display_title = DEFAULT_DOCUMENT_TITLE.to_string();
        CollectionState {
            active_identity: doc.id,
            documents: vec![doc],
        }
    }
}

//! Remote file-store client.
//!
//! The remote side is a key-value store over documents keyed by a filename
//! derived from the display title. Four operations, no auth, no concurrency
//! tokens, every write a full-document overwrite. The in-memory collection
//! stays the source of truth; the remote store is an external mirror only.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::errors::RemoteStoreError;
use crate::models::resume::{normalize, Resume};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Derives the remote storage key from a display title: characters outside
/// `[A-Za-z0-9-_ ]` are stripped, then every whitespace run collapses to a
/// single underscore (leading and trailing runs included).
pub fn sanitize_title(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    let mut pending_separator = false;
    for c in title.chars() {
        if !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ' ') {
            continue;
        }
        if c == ' ' {
            pending_separator = true;
        } else {
            if pending_separator {
                key.push('_');
                pending_separator = false;
            }
            key.push(c);
        }
    }
    if pending_separator {
        key.push('_');
    }
    key
}

#[derive(Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Self {
        RemoteStore {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches every document in the remote store. Documents are normalized
    /// against the blank template before they are handed to the caller.
    pub async fn list(&self) -> Result<Vec<Resume>, RemoteStoreError> {
        let response = self
            .client
            .get(format!("{}/collection-items", self.base_url))
            .send()
            .await?;
        let response = check_status(response).await?;
        let raw: Vec<Value> = response.json().await?;
        let template = Resume::blank();
        Ok(raw.iter().map(|doc| normalize(doc, &template)).collect())
    }

    /// Writes one full document under its derived storage key.
    pub async fn upsert(&self, doc: &Resume) -> Result<(), RemoteStoreError> {
        debug!(
            "upserting '{}' as {}",
            doc.display_title,
            sanitize_title(&doc.display_title)
        );
        let response = self
            .client
            .post(format!("{}/collection-items", self.base_url))
            .json(doc)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Deletes the document stored under the key derived from `title`.
    pub async fn remove(&self, title: &str) -> Result<(), RemoteStoreError> {
        let key = sanitize_title(title);
        let response = self
            .client
            .delete(format!("{}/collection-items/{key}", self.base_url))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(RemoteStoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::stub;

    #[test]
    fn test_sanitize_strips_disallowed_characters() {
        assert_eq!(sanitize_title("Résumé: 2026!"), "Rsum_2026");
        assert_eq!(sanitize_title("plain"), "plain");
        assert_eq!(sanitize_title("dash-under_score"), "dash-under_score");
    }

    #[test]
    fn test_sanitize_collapses_whitespace_runs() {
        assert_eq!(sanitize_title("Staff  Engineer   2026"), "Staff_Engineer_2026");
        assert_eq!(sanitize_title("a b"), "a_b");
    }

    #[test]
    fn test_sanitize_keeps_leading_and_trailing_runs() {
        assert_eq!(sanitize_title("  padded  "), "_padded_");
        assert_eq!(sanitize_title(" "), "_");
    }

    #[test]
    fn test_sanitize_empty_title_is_empty_key() {
        assert_eq!(sanitize_title(""), "");
    }

    #[tokio::test]
    async fn test_upsert_list_remove_round_trip() {
        let (base_url, files) = stub::start().await;
        let remote = RemoteStore::new(&base_url);

        let mut doc = Resume::blank();
        doc.display_title = "Wire Test".to_string();
        doc.summary = "over the wire".to_string();
        remote.upsert(&doc).await.unwrap();
        assert!(files.lock().unwrap().contains_key("Wire_Test"));

        let listed = remote.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, doc.id);
        assert_eq!(listed[0].summary, "over the wire");

        remote.remove("Wire Test").await.unwrap();
        assert!(remote.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_without_title_is_an_api_error() {
        let (base_url, _files) = stub::start().await;
        let remote = RemoteStore::new(&base_url);

        let doc = Resume::blank(); // empty display title
        let err = remote.upsert(&doc).await.unwrap_err();
        assert!(matches!(err, RemoteStoreError::Api { status: 422, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_a_transport_error() {
        // Nothing listens on this port.
        let remote = RemoteStore::new("http://127.0.0.1:9");
        let err = remote.list().await.unwrap_err();
        assert!(matches!(err, RemoteStoreError::Http(_)));
    }
}

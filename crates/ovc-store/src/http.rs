//! HTTP client for the blob storage service.
//!
//! Uploads go to a publisher endpoint, downloads and existence checks to an
//! aggregator endpoint. The two are separate hosts in production; tests may
//! point both at the same server.

use async_trait::async_trait;
use ovc_types::BlobId;
use serde::Deserialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::BlobStore;

/// Blob store client over the publisher/aggregator HTTP API.
pub struct HttpBlobStore {
    publisher: String,
    aggregator: String,
    http: reqwest::Client,
}

/// Upload response: the store reports either a fresh blob object or a
/// previously certified one. Both carry a usable id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PutResponse {
    newly_created: Option<NewlyCreated>,
    already_certified: Option<AlreadyCertified>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewlyCreated {
    blob_object: BlobObject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobObject {
    blob_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlreadyCertified {
    blob_id: String,
}

impl HttpBlobStore {
    /// Create a client against the given publisher and aggregator base URLs.
    pub fn new(publisher: impl Into<String>, aggregator: impl Into<String>) -> Self {
        Self {
            publisher: trim_slash(publisher.into()),
            aggregator: trim_slash(aggregator.into()),
            http: reqwest::Client::new(),
        }
    }

    fn blob_url(&self, id: &BlobId) -> String {
        format!("{}/v1/blobs/{}", self.aggregator, id)
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, bytes: &[u8], retention_epochs: u64) -> StoreResult<BlobId> {
        let url = format!("{}/v1/blobs?epochs={}", self.publisher, retention_epochs);
        let response = self
            .http
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "publisher returned {}",
                response.status()
            )));
        }

        let reply: PutResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("malformed upload response: {e}")))?;

        let blob_id = reply
            .newly_created
            .map(|n| n.blob_object.blob_id)
            .or(reply.already_certified.map(|a| a.blob_id))
            .ok_or_else(|| {
                StoreError::Unavailable("upload response carried no blob id".into())
            })?;

        debug!(blob = %blob_id, size = bytes.len(), "stored blob");
        Ok(BlobId::new(blob_id))
    }

    async fn get(&self, id: &BlobId) -> StoreResult<Vec<u8>> {
        let response = self
            .http
            .get(self.blob_url(id))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "aggregator returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn exists(&self, id: &BlobId) -> bool {
        match self.http.head(self.blob_url(id)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_are_normalized() {
        let store = HttpBlobStore::new("https://pub.example//", "https://agg.example/");
        assert_eq!(
            store.blob_url(&BlobId::new("abc")),
            "https://agg.example/v1/blobs/abc"
        );
        assert_eq!(store.publisher, "https://pub.example");
    }

    #[test]
    fn put_response_shapes_parse() {
        let fresh: PutResponse = serde_json::from_str(
            r#"{"newlyCreated":{"blobObject":{"blobId":"b-1"}}}"#,
        )
        .unwrap();
        assert_eq!(fresh.newly_created.unwrap().blob_object.blob_id, "b-1");

        let known: PutResponse =
            serde_json::from_str(r#"{"alreadyCertified":{"blobId":"b-2"}}"#).unwrap();
        assert_eq!(known.already_certified.unwrap().blob_id, "b-2");
    }
}

use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::storage::StorageClient;

pub struct UploadItem<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub body: Bytes,
}

/// Stores one file and returns a presigned url for reading it back.
pub async fn store_upload(
    storage: &dyn StorageClient,
    item: UploadItem<'_>,
    url_ttl_secs: u64,
) -> anyhow::Result<String> {
    let key = object_key(item.filename);
    storage
        .put_object(&key, item.body, item.content_type)
        .await
        .with_context(|| format!("put_object {key}"))?;
    storage
        .presign_get(&key, url_ttl_secs)
        .await
        .with_context(|| format!("presign url for {key}"))
}

fn object_key(filename: &str) -> String {
    format!("uploads/{}-{}", Uuid::new_v4(), sanitize_filename(filename))
}

/// Keeps the last path segment and replaces anything outside `[A-Za-z0-9._-]`.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if clean.trim_matches('.').is_empty() {
        "file".into()
    } else {
        clean
    }
}

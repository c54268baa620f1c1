use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::{ServerDlError, ServerDlResult};

/// Streams remote files to disk, optionally validating SHA-1.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` to `dest`, creating or truncating the file.
    ///
    /// The body is written chunk by chunk. When `sha1_expected` is given the
    /// digest is computed while writing; on mismatch the file is removed.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> ServerDlResult<u64> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServerDlError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut hasher = sha1_expected.map(|_| Sha1::new());
        let mut written = 0u64;

        // Scope the handle so it is closed before any cleanup below.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| ServerDlError::io(dest, e))?;

            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                if let Some(hasher) = hasher.as_mut() {
                    hasher.update(&chunk);
                }
                file.write_all(&chunk)
                    .await
                    .map_err(|e| ServerDlError::io(dest, e))?;
                written += chunk.len() as u64;
            }

            file.flush().await.map_err(|e| ServerDlError::io(dest, e))?;
        }

        if let (Some(expected), Some(hasher)) = (sha1_expected, hasher) {
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                let _ = tokio::fs::remove_file(dest).await;
                return Err(ServerDlError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, written);
        Ok(written)
    }
}

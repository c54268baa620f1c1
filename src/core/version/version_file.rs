// ─── Version File ───
// The per-version Mojang JSON; only the server download matters here.

use serde::Deserialize;

use crate::core::error::ServerDlResult;
use crate::core::http::fetch_json;

/// Subset of a Mojang version JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: Option<String>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    #[serde(default)]
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    pub url: String,
}

impl VersionJson {
    pub async fn fetch(client: &reqwest::Client, url: &str) -> ServerDlResult<Self> {
        fetch_json(client, url).await
    }

    /// Dedicated server artifact, absent for versions that never shipped one.
    pub fn server(&self) -> Option<&DownloadArtifact> {
        self.downloads.as_ref().and_then(|d| d.server.as_ref())
    }
}

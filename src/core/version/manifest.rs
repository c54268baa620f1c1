// ─── Version Manifest ───
// Handles fetching and parsing the Mojang version manifest v2.

use serde::Deserialize;
use tracing::debug;

use crate::core::error::ServerDlResult;
use crate::core::http::fetch_json;

/// Top-level Mojang version manifest. Versions are listed newest first.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: Option<String>,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl VersionManifest {
    pub async fn fetch(client: &reqwest::Client, url: &str) -> ServerDlResult<Self> {
        let manifest: VersionManifest = fetch_json(client, url).await?;
        debug!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// All version IDs in manifest order.
    pub fn ids(&self) -> Vec<String> {
        self.versions.iter().map(|v| v.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_manifest() {
        let json = r#"{
            "latest": { "release": "1.21.1", "snapshot": "24w33a" },
            "versions": [
                { "id": "24w33a", "type": "snapshot", "url": "https://example.com/24w33a.json" },
                { "id": "1.21.1", "type": "release", "url": "https://example.com/1.21.1.json",
                  "sha1": "abc123", "releaseTime": "2024-08-08T12:24:45+00:00" }
            ]
        }"#;
        let manifest: VersionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.ids(), vec!["24w33a", "1.21.1"]);

        let entry = manifest.find_version("1.21.1").unwrap();
        assert_eq!(entry.version_type.as_deref(), Some("release"));
        assert_eq!(entry.sha1.as_deref(), Some("abc123"));
        assert!(manifest.find_version("1.0-missing").is_none());
    }
}

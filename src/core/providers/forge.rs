use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::provider::ServerProvider;
use super::{order, ServerPackage};
use crate::core::config::Endpoints;
use crate::core::error::{ServerDlError, ServerDlResult};
use crate::core::http::{fetch_json, json_object_keys};
use crate::core::maven::MavenArtifact;

/// Game versions whose Forge build ships as a `universal.zip` patch.
const UNIVERSAL_ZIP_VERSIONS: &[&str] = &[
    "1.5.1", "1.5", "1.4.7", "1.4.6", "1.4.5", "1.4.4", "1.4.3", "1.4.2", "1.4.1", "1.4.0",
    "1.3.2",
];

/// Game versions whose Forge build ships as a `server.zip` patch.
const SERVER_ZIP_VERSIONS: &[&str] = &["1.2.5", "1.2.4", "1.2.3", "1.1"];

/// Forge, resolved through the promotions `maven-metadata.json`, which maps
/// each game version to its raw build strings (`<mc>-<loader>[-<branch>]`),
/// oldest first.
pub struct ForgeProvider {
    client: reqwest::Client,
    metadata_url: String,
    maven_base: String,
}

impl ForgeProvider {
    pub fn new(client: reqwest::Client, endpoints: &Endpoints) -> Self {
        Self {
            client,
            metadata_url: endpoints.forge_metadata.clone(),
            maven_base: endpoints.forge_maven.clone(),
        }
    }

    async fn metadata(&self) -> ServerDlResult<Value> {
        fetch_json(&self.client, &self.metadata_url).await
    }

    /// Raw build strings for a game version, oldest first.
    fn raw_builds(&self, metadata: &Value, game_version: &str) -> ServerDlResult<Vec<String>> {
        let key = to_forge_name(game_version);
        let builds = metadata
            .get(key)
            .ok_or_else(|| ServerDlError::UnsupportedGameVersion(game_version.to_string()))?;

        serde_json::from_value(builds.clone()).map_err(|e| ServerDlError::Manifest {
            url: self.metadata_url.clone(),
            reason: format!("builds of {}: {}", key, e),
        })
    }

    /// Artifact URL for a game version and loader version.
    pub async fn download_url(&self, game_version: &str, loader_version: &str) -> ServerDlResult<String> {
        let metadata = self.metadata().await?;
        let raw_builds = self.raw_builds(&metadata, game_version)?;

        let raw = raw_builds
            .iter()
            .rev()
            .find(|raw| loader_of(raw) == Some(loader_version))
            .ok_or_else(|| ServerDlError::LoaderNotFound {
                game: game_version.to_string(),
                loader: loader_version.to_string(),
            })?;

        let coord = format!(
            "net.minecraftforge:forge:{}:{}",
            raw,
            artifact_suffix(game_version)
        );
        let url = MavenArtifact::parse(&coord)?.url(&self.maven_base);
        debug!("Forge {} for {}: {}", loader_version, game_version, url);
        Ok(url)
    }
}

#[async_trait]
impl ServerProvider for ForgeProvider {
    async fn versions(&self, latest_first: bool) -> ServerDlResult<Vec<String>> {
        let metadata = self.metadata().await?;
        let versions = json_object_keys(&metadata, &self.metadata_url)?
            .into_iter()
            .map(|v| from_forge_name(&v).to_string())
            .collect();
        Ok(order(versions, latest_first))
    }

    async fn loaders(&self, game_version: &str, latest_first: bool) -> ServerDlResult<Vec<String>> {
        let metadata = self.metadata().await?;
        let loaders = self
            .raw_builds(&metadata, game_version)?
            .iter()
            .map(|raw| {
                loader_of(raw)
                    .map(str::to_string)
                    .ok_or_else(|| ServerDlError::InvalidLoaderVersion(raw.clone()))
            })
            .collect::<ServerDlResult<Vec<_>>>()?;
        Ok(order(loaders, latest_first))
    }

    async fn resolve(&self, game_version: &str, loader_version: &str) -> ServerDlResult<ServerPackage> {
        let url = self.download_url(game_version, loader_version).await?;
        ServerPackage::from_loader_url(url.clone())
            .ok_or_else(|| ServerDlError::Manifest {
                url,
                reason: "unexpected Forge artifact type".into(),
            })
    }
}

/// Official game version -> key used by the Forge metadata.
fn to_forge_name(game_version: &str) -> &str {
    match game_version {
        "1.7.10-pre4" => "1.7.10_pre4",
        "1.4" => "1.4.0",
        other => other,
    }
}

/// Forge metadata key -> official game version.
fn from_forge_name(forge_version: &str) -> &str {
    match forge_version {
        "1.7.10_pre4" => "1.7.10-pre4",
        "1.4.0" => "1.4",
        other => other,
    }
}

/// `1.7.10-10.13.3.1401-1710ls` -> `10.13.3.1401`
fn loader_of(raw: &str) -> Option<&str> {
    raw.split('-').nth(1)
}

/// Classifier and packaging of the server artifact for a game version.
fn artifact_suffix(game_version: &str) -> &'static str {
    let forge_name = to_forge_name(game_version);
    if UNIVERSAL_ZIP_VERSIONS.contains(&forge_name) {
        "universal@zip"
    } else if SERVER_ZIP_VERSIONS.contains(&forge_name) {
        "server@zip"
    } else {
        "installer"
    }
}

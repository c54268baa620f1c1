use async_trait::async_trait;
use tracing::debug;

use super::provider::ServerProvider;
use super::{order, ServerPackage};
use crate::core::config::Endpoints;
use crate::core::error::{ServerDlError, ServerDlResult};
use crate::core::http::fetch_text;
use crate::core::maven::{MavenArtifact, MavenMetadata};

const GROUP_ID: &str = "net.neoforged";
const ARTIFACT_ID: &str = "neoforge";

/// NeoForge installers, listed by the releases repository's
/// `maven-metadata.xml`. The game version is encoded in the loader version.
pub struct NeoForgeProvider {
    client: reqwest::Client,
    maven_base: String,
}

impl NeoForgeProvider {
    pub fn new(client: reqwest::Client, endpoints: &Endpoints) -> Self {
        Self {
            client,
            maven_base: endpoints.neoforge_maven.trim_end_matches('/').to_string(),
        }
    }

    /// Every published loader version, oldest first.
    async fn all_loaders(&self) -> ServerDlResult<Vec<String>> {
        let url = MavenMetadata::url(&self.maven_base, GROUP_ID, ARTIFACT_ID);
        let xml = fetch_text(&self.client, &url).await?;
        Ok(MavenMetadata::parse(&xml)?.versions().to_vec())
    }

    /// Installer URL for a game and loader version.
    pub async fn download_url(&self, game_version: &str, loader_version: &str) -> ServerDlResult<String> {
        let loaders = self.loaders(game_version, true).await?;
        if !loaders.iter().any(|l| l == loader_version) {
            return Err(ServerDlError::LoaderNotFound {
                game: game_version.to_string(),
                loader: loader_version.to_string(),
            });
        }

        let coord = format!("{}:{}:{}:installer", GROUP_ID, ARTIFACT_ID, loader_version);
        let url = MavenArtifact::parse(&coord)?.url(&self.maven_base);
        debug!("NeoForge {} for {}: {}", loader_version, game_version, url);
        Ok(url)
    }
}

#[async_trait]
impl ServerProvider for NeoForgeProvider {
    async fn versions(&self, latest_first: bool) -> ServerDlResult<Vec<String>> {
        let mut versions: Vec<String> = Vec::new();
        for loader in self.all_loaders().await? {
            let game = game_version_of(&loader)?;
            if !versions.contains(&game) {
                versions.push(game);
            }
        }
        Ok(order(versions, latest_first))
    }

    async fn loaders(&self, game_version: &str, latest_first: bool) -> ServerDlResult<Vec<String>> {
        let mut matching = Vec::new();
        for loader in self.all_loaders().await? {
            if game_version_of(&loader)? == game_version {
                matching.push(loader);
            }
        }

        if matching.is_empty() {
            return Err(ServerDlError::UnsupportedGameVersion(game_version.to_string()));
        }
        Ok(order(matching, latest_first))
    }

    async fn resolve(&self, game_version: &str, loader_version: &str) -> ServerDlResult<ServerPackage> {
        let url = self.download_url(game_version, loader_version).await?;
        Ok(ServerPackage::Installer { url })
    }
}

/// Game version a NeoForge loader targets.
///
/// `21.1.72` -> `1.21.1`, `21.0.1-beta` -> `1.21`,
/// `0.25w14craftmine.3-beta` -> `25w14craftmine` (snapshots carry a `0.` prefix).
fn game_version_of(loader: &str) -> ServerDlResult<String> {
    let invalid = || ServerDlError::InvalidLoaderVersion(loader.to_string());

    if let Some(rest) = loader.strip_prefix("0.") {
        let (snapshot, _) = rest.rsplit_once('.').ok_or_else(invalid)?;
        return Ok(snapshot.to_string());
    }

    let (release, _) = loader.rsplit_once('.').ok_or_else(invalid)?;
    let release = release.strip_suffix(".0").unwrap_or(release);
    Ok(format!("1.{}", release))
}

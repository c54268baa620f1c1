use async_trait::async_trait;
use serde::Deserialize;

use super::provider::ServerProvider;
use super::{order, ServerPackage};
use crate::core::config::Endpoints;
use crate::core::error::{ServerDlError, ServerDlResult};
use crate::core::http::fetch_json;

/// Element of the Fabric Meta `versions/{game,loader,installer}` lists.
#[derive(Debug, Deserialize)]
struct FabricVersion {
    version: String,
}

pub struct FabricProvider {
    client: reqwest::Client,
    meta_base: String,
}

impl FabricProvider {
    pub fn new(client: reqwest::Client, endpoints: &Endpoints) -> Self {
        Self {
            client,
            meta_base: endpoints.fabric_meta.trim_end_matches('/').to_string(),
        }
    }

    /// Fabric Meta lists are published newest first.
    async fn list(&self, kind: &str) -> ServerDlResult<Vec<String>> {
        let url = format!("{}/versions/{}", self.meta_base, kind);
        let entries: Vec<FabricVersion> = fetch_json(&self.client, &url).await?;
        Ok(entries.into_iter().map(|e| e.version).collect())
    }

    /// Loader versions; not tied to a game version.
    pub async fn loader_versions(&self, latest_first: bool) -> ServerDlResult<Vec<String>> {
        Ok(order(self.list("loader").await?, !latest_first))
    }

    /// Server launcher jar for a game and loader version, built with the
    /// newest installer.
    pub async fn download_url(&self, game_version: &str, loader_version: &str) -> ServerDlResult<String> {
        if !self.list("game").await?.iter().any(|v| v == game_version) {
            return Err(ServerDlError::UnsupportedGameVersion(game_version.to_string()));
        }

        if !self.list("loader").await?.iter().any(|v| v == loader_version) {
            return Err(ServerDlError::LoaderNotFound {
                game: game_version.to_string(),
                loader: loader_version.to_string(),
            });
        }

        let installers = self.list("installer").await?;
        let installer = installers.first().ok_or_else(|| ServerDlError::Manifest {
            url: format!("{}/versions/installer", self.meta_base),
            reason: "no installer versions published".into(),
        })?;

        Ok(format!(
            "{}/versions/loader/{}/{}/{}/server/jar",
            self.meta_base, game_version, loader_version, installer
        ))
    }
}

#[async_trait]
impl ServerProvider for FabricProvider {
    async fn versions(&self, latest_first: bool) -> ServerDlResult<Vec<String>> {
        Ok(order(self.list("game").await?, !latest_first))
    }

    async fn loaders(&self, _game_version: &str, latest_first: bool) -> ServerDlResult<Vec<String>> {
        self.loader_versions(latest_first).await
    }

    async fn resolve(&self, game_version: &str, loader_version: &str) -> ServerDlResult<ServerPackage> {
        let url = self.download_url(game_version, loader_version).await?;
        Ok(ServerPackage::ServerJar { url, sha1: None })
    }
}

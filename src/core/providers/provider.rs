use async_trait::async_trait;

use crate::core::config::Endpoints;
use crate::core::error::ServerDlResult;

use super::{
    fabric::FabricProvider, forge::ForgeProvider, neoforge::NeoForgeProvider,
    paper::PaperProvider, vanilla::VanillaProvider, ServerPackage, ServerType,
};

#[async_trait]
pub trait ServerProvider: Send + Sync {
    /// Game versions this provider publishes servers for.
    async fn versions(&self, latest_first: bool) -> ServerDlResult<Vec<String>>;

    /// Loader versions (or build numbers) available for `game_version`.
    async fn loaders(&self, game_version: &str, latest_first: bool)
        -> ServerDlResult<Vec<String>>;

    /// Resolve what to download for a game version and loader/build.
    async fn resolve(
        &self,
        game_version: &str,
        loader_version: &str,
    ) -> ServerDlResult<ServerPackage>;
}

/// Dispatcher sin Box<dyn>
pub enum Provider {
    Vanilla(VanillaProvider),
    Paper(PaperProvider),
    Forge(ForgeProvider),
    Fabric(FabricProvider),
    NeoForge(NeoForgeProvider),
}

impl Provider {
    pub fn new(server: ServerType, client: reqwest::Client, endpoints: &Endpoints) -> Self {
        match server {
            ServerType::Vanilla => Self::Vanilla(VanillaProvider::new(client, endpoints)),
            ServerType::Paper => Self::Paper(PaperProvider::new(client, endpoints)),
            ServerType::Forge => Self::Forge(ForgeProvider::new(client, endpoints)),
            ServerType::Fabric => Self::Fabric(FabricProvider::new(client, endpoints)),
            ServerType::NeoForge => Self::NeoForge(NeoForgeProvider::new(client, endpoints)),
        }
    }

    pub async fn versions(&self, latest_first: bool) -> ServerDlResult<Vec<String>> {
        match self {
            Provider::Vanilla(p) => p.versions(latest_first).await,
            Provider::Paper(p) => p.versions(latest_first).await,
            Provider::Forge(p) => p.versions(latest_first).await,
            Provider::Fabric(p) => p.versions(latest_first).await,
            Provider::NeoForge(p) => p.versions(latest_first).await,
        }
    }

    pub async fn loaders(
        &self,
        game_version: &str,
        latest_first: bool,
    ) -> ServerDlResult<Vec<String>> {
        match self {
            Provider::Vanilla(p) => p.loaders(game_version, latest_first).await,
            Provider::Paper(p) => p.loaders(game_version, latest_first).await,
            Provider::Forge(p) => p.loaders(game_version, latest_first).await,
            Provider::Fabric(p) => p.loaders(game_version, latest_first).await,
            Provider::NeoForge(p) => p.loaders(game_version, latest_first).await,
        }
    }

    pub async fn resolve(
        &self,
        game_version: &str,
        loader_version: &str,
    ) -> ServerDlResult<ServerPackage> {
        match self {
            Provider::Vanilla(p) => p.resolve(game_version, loader_version).await,
            Provider::Paper(p) => p.resolve(game_version, loader_version).await,
            Provider::Forge(p) => p.resolve(game_version, loader_version).await,
            Provider::Fabric(p) => p.resolve(game_version, loader_version).await,
            Provider::NeoForge(p) => p.resolve(game_version, loader_version).await,
        }
    }
}

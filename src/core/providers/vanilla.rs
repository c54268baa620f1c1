use async_trait::async_trait;
use tracing::debug;

use super::provider::ServerProvider;
use super::{order, ServerPackage};
use crate::core::config::Endpoints;
use crate::core::error::{ServerDlError, ServerDlResult};
use crate::core::version::{VersionJson, VersionManifest};

/// Official Mojang server jars, resolved through the version manifest.
pub struct VanillaProvider {
    client: reqwest::Client,
    manifest_url: String,
}

impl VanillaProvider {
    pub fn new(client: reqwest::Client, endpoints: &Endpoints) -> Self {
        Self {
            client,
            manifest_url: endpoints.mojang_manifest.clone(),
        }
    }

    /// Server jar URL and checksum for a game version.
    pub async fn server_download(&self, game_version: &str) -> ServerDlResult<ServerPackage> {
        let manifest = VersionManifest::fetch(&self.client, &self.manifest_url).await?;

        let entry = manifest
            .find_version(game_version)
            .ok_or_else(|| ServerDlError::UnsupportedGameVersion(game_version.to_string()))?;

        let detail = VersionJson::fetch(&self.client, &entry.url).await?;
        let server = detail
            .server()
            .ok_or_else(|| ServerDlError::UnsupportedGameVersion(game_version.to_string()))?;

        debug!("Vanilla {} server jar: {}", game_version, server.url);
        Ok(ServerPackage::ServerJar {
            url: server.url.clone(),
            sha1: server.sha1.clone(),
        })
    }
}

#[async_trait]
impl ServerProvider for VanillaProvider {
    async fn versions(&self, latest_first: bool) -> ServerDlResult<Vec<String>> {
        let manifest = VersionManifest::fetch(&self.client, &self.manifest_url).await?;
        Ok(order(manifest.ids(), !latest_first))
    }

    /// Vanilla has no loaders.
    async fn loaders(&self, _game_version: &str, _latest_first: bool) -> ServerDlResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn resolve(&self, game_version: &str, _loader_version: &str) -> ServerDlResult<ServerPackage> {
        self.server_download(game_version).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn mojang() -> MockServer {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/mc/game/version_manifest_v2.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "versions": [
                    { "id": "1.21.1", "type": "release", "url": format!("{base}/v/1.21.1.json") },
                    { "id": "1.12.2", "type": "release", "url": format!("{base}/v/1.12.2.json") },
                    { "id": "a1.0.4", "type": "old_alpha", "url": format!("{base}/v/a1.0.4.json") }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v/1.12.2.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1.12.2",
                "downloads": {
                    "server": {
                        "sha1": "886945bfb2b978778c3a0288fd7fab09d315b25f",
                        "size": 30222121,
                        "url": "https://piston-data.mojang.com/v1/objects/886945bf/server.jar"
                    }
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v/a1.0.4.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "a1.0.4",
                "downloads": { "client": { "url": "https://example.com/client.jar" } }
            })))
            .mount(&server)
            .await;
        server
    }

    fn provider(server: &MockServer) -> VanillaProvider {
        VanillaProvider::new(reqwest::Client::new(), &Endpoints::rooted_at(&server.uri()))
    }

    #[tokio::test]
    async fn versions_in_both_orders() {
        let server = mojang().await;
        let provider = provider(&server);

        let latest = provider.versions(true).await.unwrap();
        let oldest = provider.versions(false).await.unwrap();

        assert_eq!(latest, vec!["1.21.1", "1.12.2", "a1.0.4"]);
        assert_eq!(oldest, vec!["a1.0.4", "1.12.2", "1.21.1"]);
    }

    #[tokio::test]
    async fn resolves_server_jar_with_checksum() {
        let server = mojang().await;

        let package = provider(&server).resolve("1.12.2", "").await.unwrap();

        assert_eq!(
            package,
            ServerPackage::ServerJar {
                url: "https://piston-data.mojang.com/v1/objects/886945bf/server.jar".into(),
                sha1: Some("886945bfb2b978778c3a0288fd7fab09d315b25f".into()),
            }
        );
    }

    #[tokio::test]
    async fn unknown_version_is_unsupported() {
        let server = mojang().await;

        let err = provider(&server).resolve("invalid version", "").await.unwrap_err();

        assert!(matches!(err, ServerDlError::UnsupportedGameVersion(v) if v == "invalid version"));
    }

    #[tokio::test]
    async fn version_without_server_is_unsupported() {
        let server = mojang().await;

        let err = provider(&server).resolve("a1.0.4", "").await.unwrap_err();

        assert!(matches!(err, ServerDlError::UnsupportedGameVersion(_)));
    }
}

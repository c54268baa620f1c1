use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use super::provider::ServerProvider;
use super::{order, ServerPackage};
use crate::core::config::Endpoints;
use crate::core::error::{ServerDlError, ServerDlResult};
use crate::core::http::fetch_json;

#[derive(Debug, Deserialize)]
struct PaperBuildList {
    #[serde(default)]
    builds: Vec<u32>,
}

/// `GET /v3/projects/paper/versions/<v>/builds/<n>` on success.
#[derive(Debug, Deserialize)]
struct PaperBuild {
    downloads: HashMap<String, PaperDownload>,
}

#[derive(Debug, Deserialize)]
struct PaperDownload {
    url: String,
}

/// Error body returned with 404 by the Fill API.
#[derive(Debug, Deserialize)]
struct PaperApiError {
    #[serde(default)]
    error: String,
}

const SERVER_DOWNLOAD_KEY: &str = "server:default";

pub struct PaperProvider {
    client: reqwest::Client,
    api_base: String,
    fill_base: String,
}

impl PaperProvider {
    pub fn new(client: reqwest::Client, endpoints: &Endpoints) -> Self {
        Self {
            client,
            api_base: endpoints.paper_api.trim_end_matches('/').to_string(),
            fill_base: endpoints.paper_fill.trim_end_matches('/').to_string(),
        }
    }

    /// Build numbers for a game version, highest first when `latest_first`.
    pub async fn builds(&self, game_version: &str, latest_first: bool) -> ServerDlResult<Vec<u32>> {
        let url = format!("{}/projects/paper/versions/{}", self.api_base, game_version);

        let list: PaperBuildList = fetch_json(&self.client, &url).await.map_err(|e| match e {
            ServerDlError::UnexpectedStatus { status: 404, .. } => {
                ServerDlError::UnsupportedGameVersion(game_version.to_string())
            }
            other => other,
        })?;

        let mut builds = list.builds;
        builds.sort_unstable();
        if latest_first {
            builds.reverse();
        }
        Ok(builds)
    }

    /// Download URL of a specific build.
    pub async fn download_url(&self, game_version: &str, build: u32) -> ServerDlResult<String> {
        let url = format!(
            "{}/projects/paper/versions/{}/builds/{}",
            self.fill_base, game_version, build
        );

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => {
                let body: PaperBuild = serde_json::from_slice(&response.bytes().await?)?;
                body.downloads
                    .get(SERVER_DOWNLOAD_KEY)
                    .map(|d| d.url.clone())
                    .ok_or_else(|| ServerDlError::Manifest {
                        url,
                        reason: format!("missing \"{}\" download", SERVER_DOWNLOAD_KEY),
                    })
            }
            StatusCode::NOT_FOUND => {
                let body: PaperApiError = serde_json::from_slice(&response.bytes().await?)?;
                match body.error.as_str() {
                    "version_not_found" => {
                        Err(ServerDlError::UnsupportedGameVersion(game_version.to_string()))
                    }
                    "build_not_found" => Err(ServerDlError::BuildNotFound {
                        game: game_version.to_string(),
                        build,
                    }),
                    _ => Err(ServerDlError::UnexpectedStatus { url, status: 404 }),
                }
            }
            other => Err(ServerDlError::UnexpectedStatus {
                url,
                status: other.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl ServerProvider for PaperProvider {
    /// Every version of every version group, in API order (newest first).
    async fn versions(&self, latest_first: bool) -> ServerDlResult<Vec<String>> {
        let url = format!("{}/projects/paper", self.fill_base);
        let project: Value = fetch_json(&self.client, &url).await?;

        let groups = project
            .get("versions")
            .and_then(Value::as_object)
            .ok_or_else(|| ServerDlError::Manifest {
                url: url.clone(),
                reason: "missing \"versions\" object".into(),
            })?;

        let mut versions = Vec::new();
        for (group, list) in groups {
            let list: Vec<String> =
                serde_json::from_value(list.clone()).map_err(|e| ServerDlError::Manifest {
                    url: url.clone(),
                    reason: format!("version group {}: {}", group, e),
                })?;
            versions.extend(list);
        }

        Ok(order(versions, !latest_first))
    }

    async fn loaders(&self, game_version: &str, latest_first: bool) -> ServerDlResult<Vec<String>> {
        let builds = self.builds(game_version, latest_first).await?;
        Ok(builds.into_iter().map(|b| b.to_string()).collect())
    }

    async fn resolve(&self, game_version: &str, loader_version: &str) -> ServerDlResult<ServerPackage> {
        let build: u32 = loader_version.trim().parse().map_err(|_| {
            ServerDlError::InvalidLoaderVersion(format!(
                "invalid build number for paper: {}",
                loader_version
            ))
        })?;

        let url = self.download_url(game_version, build).await?;
        Ok(ServerPackage::ServerJar { url, sha1: None })
    }
}

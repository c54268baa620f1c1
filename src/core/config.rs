use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{ServerDlError, ServerDlResult};
use crate::core::maven::{FORGE_MAVEN, NEOFORGE_MAVEN};

const APP_DIR_NAME: &str = "mcserverdl";
const CONFIG_FILE: &str = "config.json";

pub const APP_USER_AGENT: &str = concat!("mcserverdl/", env!("CARGO_PKG_VERSION"));

/// Provider endpoints. Every field defaults to the public API, so a config
/// file only needs the entries it overrides (mirrors, local test servers).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    /// Mojang `version_manifest_v2.json`.
    pub mojang_manifest: String,
    /// PaperMC v2 API root (build listings).
    pub paper_api: String,
    /// PaperMC Fill v3 API root (projects, build downloads).
    pub paper_fill: String,
    /// Forge `maven-metadata.json` promotions file.
    pub forge_metadata: String,
    pub forge_maven: String,
    /// Fabric Meta v2 root.
    pub fabric_meta: String,
    pub neoforge_maven: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mojang_manifest: "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json"
                .into(),
            paper_api: "https://api.papermc.io/v2".into(),
            paper_fill: "https://fill.papermc.io/v3".into(),
            forge_metadata:
                "https://files.minecraftforge.net/net/minecraftforge/forge/maven-metadata.json"
                    .into(),
            forge_maven: FORGE_MAVEN.into(),
            fabric_meta: "https://meta.fabricmc.net/v2".into(),
            neoforge_maven: NEOFORGE_MAVEN.into(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at one base URL, keeping each default's path.
    /// Used to aim all providers at a single mirror or mock server.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            mojang_manifest: format!("{}/mc/game/version_manifest_v2.json", base),
            paper_api: format!("{}/v2", base),
            paper_fill: format!("{}/v3", base),
            forge_metadata: format!("{}/net/minecraftforge/forge/maven-metadata.json", base),
            forge_maven: base.to_string(),
            fabric_meta: format!("{}/fabric/v2", base),
            neoforge_maven: format!("{}/releases", base),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: APP_USER_AGENT.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the per-user file
    /// under the platform config directory is used when present; a broken
    /// per-user file is reported and ignored.
    pub fn load(explicit: Option<&Path>) -> ServerDlResult<Self> {
        if let Some(path) = explicit {
            return Self::read_from(path);
        }

        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        match Self::read_from(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("Ignoring config at {:?}: {}", path, e);
                Ok(Self::default())
            }
        }
    }

    fn read_from(path: &Path) -> ServerDlResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ServerDlError::io(path, e))?;
        let config = serde_json::from_str(&raw).map_err(|source| ServerDlError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE))
}

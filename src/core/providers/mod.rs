pub mod fabric;
pub mod forge;
pub mod neoforge;
pub mod paper;
pub mod provider;
pub mod vanilla;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use provider::{Provider, ServerProvider};

/// Supported server distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    Vanilla,
    Paper,
    Forge,
    Fabric,
    #[value(name = "neoforge")]
    NeoForge,
}

impl ServerType {
    /// Whether a loader version or build number selects the download.
    pub fn has_loaders(self) -> bool {
        !matches!(self, ServerType::Vanilla)
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerType::Vanilla => write!(f, "vanilla"),
            ServerType::Paper => write!(f, "paper"),
            ServerType::Forge => write!(f, "forge"),
            ServerType::Fabric => write!(f, "fabric"),
            ServerType::NeoForge => write!(f, "neoforge"),
        }
    }
}

/// What a provider hands back for a game/loader pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPackage {
    /// Ready-to-run server jar.
    ServerJar { url: String, sha1: Option<String> },
    /// Installer jar, run with `--installServer` to produce the server.
    Installer { url: String },
    /// Patch archive merged on top of the vanilla server jar.
    Overlay { url: String },
}

impl ServerPackage {
    /// Classify a loader artifact URL by its extension.
    pub fn from_loader_url(url: String) -> Option<Self> {
        if url.ends_with(".jar") {
            Some(ServerPackage::Installer { url })
        } else if url.ends_with(".zip") {
            Some(ServerPackage::Overlay { url })
        } else {
            None
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ServerPackage::ServerJar { url, .. }
            | ServerPackage::Installer { url }
            | ServerPackage::Overlay { url } => url,
        }
    }
}

pub(crate) fn order(mut items: Vec<String>, reverse: bool) -> Vec<String> {
    if reverse {
        items.reverse();
    }
    items
}

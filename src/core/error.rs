use std::path::PathBuf;
use thiserror::Error;

use crate::core::archive::MergeError;

/// Central error type for the downloader.
/// Every module outside the merge engine returns `Result<T, ServerDlError>`.
#[derive(Debug, Error)]
pub enum ServerDlError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("The specified path {0:?} is an existing file; please provide a directory path")]
    TargetIsFile(PathBuf),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Unexpected status {status} when fetching {url}")]
    UnexpectedStatus { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Decoding ────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Unexpected manifest layout at {url}: {reason}")]
    Manifest { url: String, reason: String },

    // ── Resolution ──────────────────────────────────────
    #[error("Unsupported game version: {0}")]
    UnsupportedGameVersion(String),

    #[error("Loader version {loader} not found for version {game}")]
    LoaderNotFound { game: String, loader: String },

    #[error("Build number {build} not found for version {game}")]
    BuildNotFound { game: String, build: u32 },

    #[error("Invalid loader version format: {0}")]
    InvalidLoaderVersion(String),

    #[error("{server} has no loader or build versions")]
    NoLoaders { server: String },

    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── Archive ─────────────────────────────────────────
    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    // ── Config ──────────────────────────────────────────
    #[error("Invalid config file {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type ServerDlResult<T> = Result<T, ServerDlError>;

impl From<std::io::Error> for ServerDlError {
    fn from(source: std::io::Error) -> Self {
        ServerDlError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl ServerDlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ServerDlError::Io {
            path: path.into(),
            source,
        }
    }
}

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::result::ZipError;

/// Which side of a merge an archive plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveRole {
    Base,
    Overlay,
    Output,
}

impl fmt::Display for ArchiveRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveRole::Base => write!(f, "base"),
            ArchiveRole::Overlay => write!(f, "overlay"),
            ArchiveRole::Output => write!(f, "output"),
        }
    }
}

/// Failure of a single merge call. Every variant is terminal: the output
/// archive must be treated as unusable.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to open {role} archive{}: {source}", describe_path(.path))]
    Open {
        role: ArchiveRole,
        path: Option<PathBuf>,
        #[source]
        source: ZipError,
    },

    #[error("failed to copy '{entry}' from {role} archive: {source}")]
    Copy {
        role: ArchiveRole,
        entry: String,
        #[source]
        source: ZipError,
    },

    #[error("failed to finalize output archive{}: {source}", describe_path(.path))]
    Finalize {
        path: Option<PathBuf>,
        #[source]
        source: ZipError,
    },
}

impl MergeError {
    pub(crate) fn open(role: ArchiveRole, path: Option<&Path>, source: ZipError) -> Self {
        MergeError::Open {
            role,
            path: path.map(Path::to_path_buf),
            source,
        }
    }

    pub(crate) fn finalize(path: Option<&Path>, source: ZipError) -> Self {
        MergeError::Finalize {
            path: path.map(Path::to_path_buf),
            source,
        }
    }

    /// Role of the archive the failure is attributed to.
    pub fn role(&self) -> ArchiveRole {
        match self {
            MergeError::Open { role, .. } | MergeError::Copy { role, .. } => *role,
            MergeError::Finalize { .. } => ArchiveRole::Output,
        }
    }
}

fn describe_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" {:?}", p),
        None => String::new(),
    }
}

use std::fmt;

use crate::core::error::{ServerDlError, ServerDlResult};

/// Represents a fully parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version:classifier@packaging`
///   `groupId:artifactId:version@packaging`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension / packaging type. Defaults to `"jar"`.
    pub packaging: String,
}

impl MavenArtifact {
    /// Parse a Maven coordinate string.
    pub fn parse(coord: &str) -> ServerDlResult<Self> {
        let (coord_part, packaging_override) = match coord.rsplit_once('@') {
            Some((head, packaging)) => (head, Some(packaging)),
            None => (coord, None),
        };

        let parts: Vec<&str> = coord_part.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(ServerDlError::InvalidMavenCoordinate(coord.to_string()));
        }
        let packaging = packaging_override.unwrap_or("jar").to_string();

        match parts.as_slice() {
            [group, artifact, version] => Ok(Self {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                version: version.to_string(),
                classifier: None,
                packaging,
            }),
            [group, artifact, version, classifier] => Ok(Self {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                version: version.to_string(),
                classifier: Some(classifier.to_string()),
                packaging,
            }),
            _ => Err(ServerDlError::InvalidMavenCoordinate(coord.to_string())),
        }
    }

    /// Group path portion (`net/minecraftforge`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// `artifactId-version[-classifier].packaging`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// Full URL for this artifact under the given repository base.
    ///
    /// Template:
    /// `<repo>/<group_path>/<artifact_id>/<version>/<filename>`
    pub fn url(&self, repo_base: &str) -> String {
        let base = repo_base.trim_end_matches('/');
        format!(
            "{}/{}/{}/{}/{}",
            base,
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(c) => write!(
                f,
                "{}:{}:{}:{}@{}",
                self.group_id, self.artifact_id, self.version, c, self.packaging
            ),
            None => write!(
                f,
                "{}:{}:{}@{}",
                self.group_id, self.artifact_id, self.version, self.packaging
            ),
        }
    }
}

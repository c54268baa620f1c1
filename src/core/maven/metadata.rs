use quick_xml::de::from_str;
use serde::Deserialize;

use crate::core::error::ServerDlResult;

/// Minimal `maven-metadata.xml` model – only the published version list.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MavenMetadata {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub versioning: Versioning,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    #[serde(default)]
    pub latest: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub versions: VersionList,
}

#[derive(Debug, Deserialize, Default)]
pub struct VersionList {
    #[serde(default, rename = "version")]
    pub items: Vec<String>,
}

impl MavenMetadata {
    pub fn parse(xml: &str) -> ServerDlResult<Self> {
        Ok(from_str(xml)?)
    }

    /// `<repo>/<group_path>/<artifact_id>/maven-metadata.xml`
    pub fn url(repo_base: &str, group_id: &str, artifact_id: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            repo_base.trim_end_matches('/'),
            group_id.replace('.', "/"),
            artifact_id
        )
    }

    /// Published versions in repository order (oldest first).
    pub fn versions(&self) -> &[String] {
        &self.versioning.versions.items
    }
}

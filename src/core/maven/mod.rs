mod artifact;
mod metadata;

pub use artifact::MavenArtifact;
pub use metadata::MavenMetadata;

/// Maven repositories hosting server installers and patches.
pub const FORGE_MAVEN: &str = "https://maven.minecraftforge.net";
pub const NEOFORGE_MAVEN: &str = "https://maven.neoforged.net/releases";

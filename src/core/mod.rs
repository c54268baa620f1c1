// ─── mcserverdl Core ───
// Server resolution, download and patching.
//
// Architecture:
//   core/
//     archive/    — Overlay merge of two zip archives (raw entry copy)
//     config/     — Endpoints + user agent, loaded from JSON
//     http/       — Shared client and JSON/text fetch helpers
//     downloader/ — Streaming downloads with SHA-1 validation
//     maven/      — Coordinates and maven-metadata.xml
//     version/    — Mojang manifest + version JSON
//     providers/  — Vanilla, Paper, Forge, Fabric, NeoForge resolvers

pub mod archive;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod maven;
pub mod providers;
pub mod version;

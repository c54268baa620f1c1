use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::core::archive::merge_zips;
use crate::core::config::Config;
use crate::core::downloader::Downloader;
use crate::core::error::{ServerDlError, ServerDlResult};
use crate::core::http::build_http_client;
use crate::core::providers::vanilla::VanillaProvider;
use crate::core::providers::{Provider, ServerPackage, ServerType};

const SERVER_JAR: &str = "server.jar";
const INSTALLER_JAR: &str = "installer.jar";
const PATCH_ZIP: &str = "patch.zip";
const VANILLA_JAR: &str = "vanilla.jar";

#[derive(Debug, Parser)]
#[command(
    name = "mcserverdl",
    about = "Download Minecraft server jars for Vanilla, Paper, Forge, Fabric and NeoForge",
    version
)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true, env = "MCSERVERDL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download a server into a directory
    Download {
        /// Server type
        #[arg(short = 't', long = "type", value_enum)]
        server: ServerType,

        /// Game version (e.g. 1.21.6, 1.13-pre7, 25w14craftmine)
        #[arg(short, long)]
        game: String,

        /// Loader or build version (default: latest)
        #[arg(short, long)]
        loader: Option<String>,

        /// Download directory
        #[arg(short, long, default_value = "./")]
        path: PathBuf,
    },

    /// List game versions
    Versions {
        #[arg(short = 't', long = "type", value_enum)]
        server: ServerType,

        #[arg(long)]
        oldest_first: bool,
    },

    /// List loader versions or build numbers
    Loaders {
        #[arg(short = 't', long = "type", value_enum)]
        server: ServerType,

        /// Game version; Fabric loaders do not depend on it
        #[arg(short, long)]
        game: Option<String>,

        #[arg(long)]
        oldest_first: bool,
    },

    /// Merge an overlay archive on top of a base archive
    Merge {
        base: PathBuf,
        overlay: PathBuf,
        output: PathBuf,
    },
}

/// Everything needed to place a server in a directory.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub server: ServerType,
    pub game_version: String,
    pub loader_version: Option<String>,
    pub path: PathBuf,
}

/// What ended up in the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installed {
    /// Runnable `server.jar`.
    Server(PathBuf),
    /// `installer.jar` still to be run with `--installServer`.
    Installer(PathBuf),
}

pub async fn execute(cli: Cli) -> ServerDlResult<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Download {
            server,
            game,
            loader,
            path,
        } => {
            let request = InstallRequest {
                server,
                game_version: game,
                loader_version: loader,
                path,
            };
            install_server(&config, &request).await?;
        }
        Commands::Versions {
            server,
            oldest_first,
        } => {
            let provider = provider_for(&config, server)?;
            for version in provider.versions(!oldest_first).await? {
                println!("{}", version);
            }
        }
        Commands::Loaders {
            server,
            game,
            oldest_first,
        } => {
            let game = match (server, game) {
                (_, Some(game)) => game,
                (ServerType::Fabric, None) => String::new(),
                (_, None) => return Err(ServerDlError::UnsupportedGameVersion(String::new())),
            };
            let provider = provider_for(&config, server)?;
            for loader in provider.loaders(&game, !oldest_first).await? {
                println!("{}", loader);
            }
        }
        Commands::Merge {
            base,
            overlay,
            output,
        } => {
            let entries = merge_on_worker(base, overlay, output.clone()).await?;
            info!("Merged archive written to {:?} ({} entries)", output, entries);
        }
    }

    Ok(())
}

fn provider_for(config: &Config, server: ServerType) -> ServerDlResult<Provider> {
    let client = build_http_client(config)?;
    Ok(Provider::new(server, client, &config.endpoints))
}

/// Resolve and download a server into `request.path`.
pub async fn install_server(config: &Config, request: &InstallRequest) -> ServerDlResult<Installed> {
    ensure_directory_target(&request.path).await?;

    let client = build_http_client(config)?;
    let provider = Provider::new(request.server, client.clone(), &config.endpoints);
    let game = request.game_version.as_str();

    let loader = match &request.loader_version {
        Some(loader) => loader.clone(),
        None if request.server.has_loaders() => {
            info!("No loader version specified, searching for the latest...");
            let latest = provider
                .loaders(game, true)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| ServerDlError::NoLoaders {
                    server: request.server.to_string(),
                })?;
            info!("Latest {} loader version is {}", request.server, latest);
            latest
        }
        None => String::new(),
    };

    let package = provider.resolve(game, &loader).await?;

    tokio::fs::create_dir_all(&request.path)
        .await
        .map_err(|e| ServerDlError::io(&request.path, e))?;

    let downloader = Downloader::new(client.clone());
    match package {
        ServerPackage::ServerJar { url, sha1 } => {
            let dest = request.path.join(SERVER_JAR);
            info!("Downloading server from {}...", url);
            downloader.download_file(&url, &dest, sha1.as_deref()).await?;
            info!("Successfully downloaded server to {:?}", request.path);
            Ok(Installed::Server(dest))
        }
        ServerPackage::Installer { url } => {
            let dest = request.path.join(INSTALLER_JAR);
            info!("Downloading {} installer from {}...", request.server, url);
            downloader.download_file(&url, &dest, None).await?;
            info!("Installer downloaded. Please run the following command in the installation directory to complete the server setup:");
            info!("java -jar {} --installServer", INSTALLER_JAR);
            Ok(Installed::Installer(dest))
        }
        ServerPackage::Overlay { url } => {
            let vanilla = VanillaProvider::new(client, &config.endpoints);
            install_patched(&downloader, &vanilla, game, &url, &request.path).await
        }
    }
}

/// Old Forge: download the patch and the vanilla jar, merge the patch over it.
async fn install_patched(
    downloader: &Downloader,
    vanilla: &VanillaProvider,
    game_version: &str,
    patch_url: &str,
    dir: &Path,
) -> ServerDlResult<Installed> {
    let patch = dir.join(PATCH_ZIP);
    let base = dir.join(VANILLA_JAR);
    let server_jar = dir.join(SERVER_JAR);

    info!("Downloading patch file from {}...", patch_url);
    downloader.download_file(patch_url, &patch, None).await?;

    info!("Downloading vanilla server for {}...", game_version);
    let (vanilla_url, vanilla_sha1) = match vanilla.server_download(game_version).await? {
        ServerPackage::ServerJar { url, sha1 } => (url, sha1),
        other => (other.url().to_string(), None),
    };
    downloader
        .download_file(&vanilla_url, &base, vanilla_sha1.as_deref())
        .await?;

    info!("Patching vanilla server...");
    let merged = merge_on_worker(base.clone(), patch.clone(), server_jar.clone()).await;

    remove_quietly(&patch).await;
    remove_quietly(&base).await;

    match merged {
        Ok(entries) => {
            info!("Successfully created server at {:?} ({} entries)", dir, entries);
            Ok(Installed::Server(server_jar))
        }
        Err(e) => {
            remove_quietly(&server_jar).await;
            Err(e)
        }
    }
}

/// The merge does blocking file IO; keep it off the async workers.
async fn merge_on_worker(base: PathBuf, overlay: PathBuf, output: PathBuf) -> ServerDlResult<usize> {
    let entries = tokio::task::spawn_blocking(move || merge_zips(&base, &overlay, &output)).await??;
    Ok(entries)
}

async fn ensure_directory_target(path: &Path) -> ServerDlResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if !meta.is_dir() => Err(ServerDlError::TargetIsFile(path.to_path_buf())),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ServerDlError::io(path, e)),
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read, Write};

    use serde_json::json;
    use sha1::{Digest, Sha1};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::SimpleFileOptions;
    use zip::{ZipArchive, ZipWriter};

    use super::*;
    use crate::core::config::Endpoints;

    fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn read_entry(path: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
        let mut content = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    fn config_for(server: &MockServer) -> Config {
        Config {
            endpoints: Endpoints::rooted_at(&server.uri()),
            ..Config::default()
        }
    }

    async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    /// Mojang manifest with one version whose server jar is served by the mock.
    async fn mount_vanilla(server: &MockServer, game: &str, jar: Vec<u8>, with_sha1: bool) {
        let base = server.uri();
        mount(
            server,
            "/mc/game/version_manifest_v2.json",
            ResponseTemplate::new(200).set_body_json(json!({
                "versions": [
                    { "id": game, "type": "release", "url": format!("{base}/v/{game}.json") }
                ]
            })),
        )
        .await;

        let mut download = json!({ "url": format!("{base}/objects/{game}/server.jar") });
        if with_sha1 {
            download["sha1"] = json!(hex::encode(Sha1::digest(&jar)));
        }
        mount(
            server,
            &format!("/v/{game}.json"),
            ResponseTemplate::new(200).set_body_json(json!({
                "id": game,
                "downloads": { "server": download }
            })),
        )
        .await;
        mount(
            server,
            &format!("/objects/{game}/server.jar"),
            ResponseTemplate::new(200).set_body_bytes(jar),
        )
        .await;
    }

    #[tokio::test]
    async fn existing_file_target_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config {
            endpoints: Endpoints::rooted_at("http://127.0.0.1:9"),
            ..Config::default()
        };
        let request = InstallRequest {
            server: ServerType::Vanilla,
            game_version: "1.21.1".into(),
            loader_version: None,
            path: file.path().to_path_buf(),
        };

        let err = install_server(&config, &request).await.unwrap_err();

        assert!(matches!(err, ServerDlError::TargetIsFile(p) if p == file.path()));
    }

    #[tokio::test]
    async fn vanilla_download_is_verified_and_placed() {
        let server = MockServer::start().await;
        mount_vanilla(&server, "1.12.2", b"vanilla server".to_vec(), true).await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("servers").join("vanilla");

        let request = InstallRequest {
            server: ServerType::Vanilla,
            game_version: "1.12.2".into(),
            loader_version: None,
            path: target.clone(),
        };
        let installed = install_server(&config_for(&server), &request).await.unwrap();

        let jar = target.join(SERVER_JAR);
        assert_eq!(installed, Installed::Server(jar.clone()));
        assert_eq!(std::fs::read(jar).unwrap(), b"vanilla server");
    }

    #[tokio::test]
    async fn missing_loader_picks_latest() {
        let server = MockServer::start().await;
        for (kind, body) in [
            ("game", json!([{ "version": "1.21.5" }])),
            ("loader", json!([{ "version": "0.16.14" }, { "version": "0.16.13" }])),
            ("installer", json!([{ "version": "1.0.3" }])),
        ] {
            mount(
                &server,
                &format!("/fabric/v2/versions/{kind}"),
                ResponseTemplate::new(200).set_body_json(body),
            )
            .await;
        }
        mount(
            &server,
            "/fabric/v2/versions/loader/1.21.5/0.16.14/1.0.3/server/jar",
            ResponseTemplate::new(200).set_body_bytes(b"fabric launcher".to_vec()),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let request = InstallRequest {
            server: ServerType::Fabric,
            game_version: "1.21.5".into(),
            loader_version: None,
            path: dir.path().to_path_buf(),
        };
        install_server(&config_for(&server), &request).await.unwrap();

        assert_eq!(
            std::fs::read(dir.path().join(SERVER_JAR)).unwrap(),
            b"fabric launcher"
        );
    }

    #[tokio::test]
    async fn installer_is_downloaded_as_is() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/releases/net/neoforged/neoforge/maven-metadata.xml",
            ResponseTemplate::new(200).set_body_string(
                "<metadata><versioning><versions>\
                 <version>21.1.72</version>\
                 </versions></versioning></metadata>",
            ),
        )
        .await;
        mount(
            &server,
            "/releases/net/neoforged/neoforge/21.1.72/neoforge-21.1.72-installer.jar",
            ResponseTemplate::new(200).set_body_bytes(b"installer".to_vec()),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let request = InstallRequest {
            server: ServerType::NeoForge,
            game_version: "1.21.1".into(),
            loader_version: Some("21.1.72".into()),
            path: dir.path().to_path_buf(),
        };
        let installed = install_server(&config_for(&server), &request).await.unwrap();

        assert_eq!(installed, Installed::Installer(dir.path().join(INSTALLER_JAR)));
        assert!(!dir.path().join(SERVER_JAR).exists());
    }

    async fn mount_legacy_forge(server: &MockServer, patch: Vec<u8>) {
        mount(
            server,
            "/net/minecraftforge/forge/maven-metadata.json",
            ResponseTemplate::new(200).set_body_json(json!({ "1.5.1": ["1.5.1-7.7.2.682"] })),
        )
        .await;
        mount(
            server,
            "/net/minecraftforge/forge/1.5.1-7.7.2.682/forge-1.5.1-7.7.2.682-universal.zip",
            ResponseTemplate::new(200).set_body_bytes(patch),
        )
        .await;
    }

    #[tokio::test]
    async fn legacy_forge_is_patched_over_vanilla() {
        let server = MockServer::start().await;
        mount_vanilla(
            &server,
            "1.5.1",
            zip_bytes(&[("net/Main.class", "vanilla main"), ("a.class", "vanilla a")]),
            false,
        )
        .await;
        mount_legacy_forge(&server, zip_bytes(&[("a.class", "forge a"), ("forge.cfg", "cfg")])).await;
        let dir = tempfile::tempdir().unwrap();

        let request = InstallRequest {
            server: ServerType::Forge,
            game_version: "1.5.1".into(),
            loader_version: None,
            path: dir.path().to_path_buf(),
        };
        let installed = install_server(&config_for(&server), &request).await.unwrap();

        let jar = dir.path().join(SERVER_JAR);
        assert_eq!(installed, Installed::Server(jar.clone()));
        assert_eq!(read_entry(&jar, "a.class"), "forge a");
        assert_eq!(read_entry(&jar, "net/Main.class"), "vanilla main");
        assert_eq!(read_entry(&jar, "forge.cfg"), "cfg");
        assert!(!dir.path().join(PATCH_ZIP).exists());
        assert!(!dir.path().join(VANILLA_JAR).exists());
    }

    #[tokio::test]
    async fn failed_patch_leaves_no_server_jar() {
        let server = MockServer::start().await;
        mount_vanilla(&server, "1.5.1", zip_bytes(&[("a.class", "vanilla a")]), false).await;
        mount_legacy_forge(&server, b"not a zip archive".to_vec()).await;
        let dir = tempfile::tempdir().unwrap();

        let request = InstallRequest {
            server: ServerType::Forge,
            game_version: "1.5.1".into(),
            loader_version: Some("7.7.2.682".into()),
            path: dir.path().to_path_buf(),
        };
        let err = install_server(&config_for(&server), &request).await.unwrap_err();

        assert!(matches!(err, ServerDlError::Merge(_)));
        assert!(!dir.path().join(SERVER_JAR).exists());
        assert!(!dir.path().join(PATCH_ZIP).exists());
    }

    #[test]
    fn cli_parses_download() {
        let cli = Cli::try_parse_from([
            "mcserverdl", "download", "--type", "neoforge", "--game", "1.21.1", "--path", "srv",
        ])
        .unwrap();

        match cli.command {
            Commands::Download {
                server,
                game,
                loader,
                path,
            } => {
                assert_eq!(server, ServerType::NeoForge);
                assert_eq!(game, "1.21.1");
                assert_eq!(loader, None);
                assert_eq!(path, PathBuf::from("srv"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_rejects_unknown_server_type() {
        assert!(Cli::try_parse_from(["mcserverdl", "versions", "--type", "spigot"]).is_err());
    }
}

//! End-to-end pipeline tests: local generation against a real directory
//! tree, and remote generation against a minimal HTTP fixture server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use peonreg_core::config::GeneratorConfig;
use peonreg_core::franchise::FranchiseDb;
use peonreg_core::packdata::PackDataFile;
use peonreg_core::pipeline::{self, SourceMode};
use peonreg_core::registry::{RegistryEntry, RegistryIndex};

const PEON_MANIFEST: &str = r#"{
    "cesp_version": "1.0",
    "name": "peon",
    "display_name": "Peon",
    "language": "en",
    "tags": ["peon", "orc"],
    "categories": {
        "task.complete": {"sounds": [{"file": "sounds/work_complete.mp3", "label": "Work complete"}]},
        "task.error": {"sounds": [{"file": "sounds/no.mp3", "line": "Me busy, leave me alone"}]}
    }
}"#;

fn write_peon_pack(root: &Path) {
    let pack_dir = root.join("peon");
    let sounds_dir = pack_dir.join("sounds");
    std::fs::create_dir_all(&sounds_dir).unwrap();
    std::fs::write(pack_dir.join("openpeon.json"), PEON_MANIFEST).unwrap();
    std::fs::write(sounds_dir.join("work_complete.mp3"), vec![0u8; 1000]).unwrap();
    std::fs::write(sounds_dir.join("no.mp3"), vec![0u8; 2000]).unwrap();
}

#[test]
fn local_registry_end_to_end() {
    let source = tempfile::TempDir::new().unwrap();
    let output = tempfile::TempDir::new().unwrap();
    write_peon_pack(source.path());

    let config = GeneratorConfig {
        packs_dir: source.path().to_path_buf(),
        output_dir: output.path().to_path_buf(),
        ..GeneratorConfig::default()
    };

    let summary = pipeline::generate_registry(&config, &FranchiseDb::default()).unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 0);

    // Per-pack entry document
    let entry: RegistryEntry = serde_json::from_str(
        &std::fs::read_to_string(output.path().join("packs/peon/registry.json")).unwrap(),
    )
    .unwrap();

    assert_eq!(entry.name, "peon");
    assert_eq!(entry.sound_count, 2);
    assert_eq!(entry.categories, vec!["task.complete", "task.error"]);
    assert_eq!(
        entry.total_size_bytes,
        3000 + PEON_MANIFEST.len() as u64
    );
    assert_eq!(entry.manifest_sha256.len(), 64);
    // Franchise base tags first, then manifest extras not already present
    assert_eq!(
        entry.tags,
        vec!["gaming", "warcraft", "blizzard", "rts", "peon", "orc"]
    );
    assert_eq!(entry.added, entry.updated);

    // Aggregate index document
    let index: RegistryIndex = serde_json::from_str(
        &std::fs::read_to_string(output.path().join("index.json")).unwrap(),
    )
    .unwrap();

    assert_eq!(index.version, 1);
    assert_eq!(index.packs.len(), 1);
    assert_eq!(index.packs[0].name, "peon");
    assert_eq!(index.packs[0].sound_count, entry.sound_count);
    assert_eq!(index.packs[0].total_size_bytes, entry.total_size_bytes);
    assert_eq!(index.packs[0].source_repo, "PeonPing/og-packs");
}

/// Serve a fixed path->body map over HTTP/1.1; unknown paths get 404.
async fn spawn_fixture_server(routes: HashMap<String, String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let routes = Arc::clone(&routes);

            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                loop {
                    match stream.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => read += n,
                    }
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&buf[..read]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let response = match routes.get(&path) {
                    Some(body) => format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    ),
                    None =>
                        "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                            .to_string(),
                };

                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}

fn remote_manifest(name: &str) -> String {
    format!(
        r#"{{
            "cesp_version": "1.0",
            "name": "{name}",
            "display_name": "{name}",
            "categories": {{
                "task.complete": {{"sounds": [{{"file": "sounds/{name}.mp3"}}]}}
            }}
        }}"#
    )
}

fn index_entry_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "display_name": name,
        "version": "1.0.0",
        "trust_tier": "official",
        "categories": ["task.complete"],
        "language": "en",
        "sound_count": 1,
        "total_size_bytes": 1234,
        "source_repo": "PeonPing/og-packs",
        "source_ref": "v1.0.0",
        "source_path": name
    })
}

#[tokio::test]
async fn remote_packdata_tolerates_partial_failure() {
    // Three packs in the index; "missing" has no manifest on either ref.
    let index = serde_json::json!({
        "version": 1,
        "generated_at": "2026-08-23T00:00:00Z",
        "packs": [
            index_entry_json("peon"),
            index_entry_json("missing"),
            index_entry_json("glados"),
        ]
    });

    let mut routes = HashMap::new();
    routes.insert("/index.json".to_string(), index.to_string());
    routes.insert(
        "/PeonPing/og-packs/v1.0.0/peon/openpeon.json".to_string(),
        remote_manifest("peon"),
    );
    routes.insert(
        "/PeonPing/og-packs/v1.0.0/glados/openpeon.json".to_string(),
        remote_manifest("glados"),
    );

    let addr = spawn_fixture_server(routes).await;
    let output = tempfile::TempDir::new().unwrap();

    let config = GeneratorConfig {
        packs_dir: output.path().join("no-local-packs"),
        packdata_path: output.path().join("packs-data.json"),
        raw_base: format!("http://{addr}"),
        index_url: format!("http://{addr}/index.json"),
        ..GeneratorConfig::default()
    };

    let summary = pipeline::generate_packdata(&config, &FranchiseDb::default(), SourceMode::Auto)
        .await
        .unwrap();

    // One pack dropped, run still succeeds
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);

    let data: PackDataFile = serde_json::from_str(
        &std::fs::read_to_string(&config.packdata_path).unwrap(),
    )
    .unwrap();

    // Sorted by name for determinism
    let names: Vec<&str> = data.packs.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["glados", "peon"]);

    let glados = &data.packs[0];
    assert_eq!(glados.franchise.name, "Portal");
    assert_eq!(glados.source_repo.as_deref(), Some("PeonPing/og-packs"));
    assert_eq!(glados.source_path.as_deref(), Some("glados"));
    assert_eq!(
        glados.categories[0].sounds[0].audio_url,
        format!("http://{addr}/PeonPing/og-packs/v1.0.0/glados/sounds/glados.mp3")
    );
}

#[tokio::test]
async fn remote_fetch_falls_back_to_secondary_ref() {
    // The manifest only exists on the fallback ref ("main"), not the
    // pinned release ref named by the index entry.
    let index = serde_json::json!({
        "version": 1,
        "generated_at": "2026-08-23T00:00:00Z",
        "packs": [index_entry_json("rick")]
    });

    let mut routes = HashMap::new();
    routes.insert("/index.json".to_string(), index.to_string());
    routes.insert(
        "/PeonPing/og-packs/main/rick/openpeon.json".to_string(),
        remote_manifest("rick"),
    );

    let addr = spawn_fixture_server(routes).await;
    let output = tempfile::TempDir::new().unwrap();

    let config = GeneratorConfig {
        packs_dir: output.path().join("no-local-packs"),
        packdata_path: output.path().join("packs-data.json"),
        raw_base: format!("http://{addr}"),
        index_url: format!("http://{addr}/index.json"),
        ..GeneratorConfig::default()
    };

    let summary = pipeline::generate_packdata(&config, &FranchiseDb::default(), SourceMode::Remote)
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 0);
}

#[tokio::test]
async fn remote_run_fails_when_index_is_unreachable() {
    let addr = spawn_fixture_server(HashMap::new()).await;
    let output = tempfile::TempDir::new().unwrap();

    let config = GeneratorConfig {
        packs_dir: output.path().join("no-local-packs"),
        packdata_path: output.path().join("packs-data.json"),
        raw_base: format!("http://{addr}"),
        index_url: format!("http://{addr}/index.json"),
        ..GeneratorConfig::default()
    };

    let err = pipeline::generate_packdata(&config, &FranchiseDb::default(), SourceMode::Remote)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("registry index"));
}

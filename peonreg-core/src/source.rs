//! Manifest loading from local pack directories and remote repositories
//!
//! Both paths produce the same [`LoadedManifest`]: the parsed document, the
//! raw bytes (needed for hashing), and a handle to the local audio
//! directory when one exists. Failures are classified by [`LoadError`] so
//! the orchestrator can tell per-pack skips from real errors.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::{Manifest, MANIFEST_FILENAMES};
use crate::registry::RegistryIndex;

/// Default host serving raw repository content
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// A manifest together with its raw bytes and local asset handle
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub raw: Vec<u8>,
    /// Local `sounds/` directory, present only for local loads
    pub sounds_dir: Option<PathBuf>,
}

/// Per-pack load failures. `ManifestMissing` is a routine skip; everything
/// else is reported against the pack that produced it.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no manifest found in {dir} (tried openpeon.json, manifest.json)")]
    ManifestMissing { dir: PathBuf },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest JSON in {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest fetch failed: HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("manifest fetch failed for {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Load a pack manifest from a local pack directory.
///
/// Recognized filenames are tried in preference order; a directory with
/// neither is a per-pack skip, not an error in itself.
pub fn load_local(pack_dir: &Path) -> Result<LoadedManifest, LoadError> {
    for filename in MANIFEST_FILENAMES {
        let path = pack_dir.join(filename);
        if !path.exists() {
            continue;
        }

        let raw = std::fs::read(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest = Manifest::from_slice(&raw).map_err(|source| LoadError::Parse {
            origin: path.display().to_string(),
            source,
        })?;

        let sounds_dir = pack_dir.join("sounds");
        let sounds_dir = sounds_dir.is_dir().then_some(sounds_dir);

        return Ok(LoadedManifest {
            manifest,
            raw,
            sounds_dir,
        });
    }

    Err(LoadError::ManifestMissing {
        dir: pack_dir.to_path_buf(),
    })
}

/// Fetches manifests and the published index over HTTP
pub struct RemoteSource {
    client: reqwest::Client,
    raw_base: String,
}

impl RemoteSource {
    /// Build a remote source against a raw-content host base
    pub fn new(raw_base: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("peonreg/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            raw_base: raw_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Raw-content URL for a pack's manifest
    pub fn manifest_url(&self, repo: &str, git_ref: &str, path: Option<&str>) -> String {
        match path {
            Some(path) => format!("{}/{}/{}/{}/openpeon.json", self.raw_base, repo, git_ref, path),
            None => format!("{}/{}/{}/openpeon.json", self.raw_base, repo, git_ref),
        }
    }

    /// Base URL of the directory containing the pack's `sounds/` directory
    pub fn audio_base(&self, repo: &str, git_ref: &str, path: Option<&str>) -> String {
        match path {
            Some(path) => format!("{}/{}/{}/{}", self.raw_base, repo, git_ref, path),
            None => format!("{}/{}/{}", self.raw_base, repo, git_ref),
        }
    }

    /// Fetch a pack manifest, retrying once on the fallback ref when the
    /// primary ref returns not-found.
    pub async fn fetch_manifest(
        &self,
        repo: &str,
        git_ref: &str,
        path: Option<&str>,
        fallback_ref: &str,
    ) -> Result<LoadedManifest, LoadError> {
        let url = self.manifest_url(repo, git_ref, path);
        match self.fetch_manifest_at(&url).await {
            Err(LoadError::Http { status: 404, .. }) if git_ref != fallback_ref => {
                let fallback_url = self.manifest_url(repo, fallback_ref, path);
                tracing::debug!("manifest not found at {}, retrying {}", url, fallback_url);
                self.fetch_manifest_at(&fallback_url).await
            }
            other => other,
        }
    }

    async fn fetch_manifest_at(&self, url: &str) -> Result<LoadedManifest, LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| LoadError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(LoadError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let raw = response
            .bytes()
            .await
            .map_err(|source| LoadError::Fetch {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        let manifest = Manifest::from_slice(&raw).map_err(|source| LoadError::Parse {
            origin: url.to_string(),
            source,
        })?;

        Ok(LoadedManifest {
            manifest,
            raw,
            sounds_dir: None,
        })
    }

    /// Fetch the published aggregate index. Failure here is fatal to a
    /// remote run: there is nothing to enumerate without it.
    pub async fn fetch_index(&self, url: &str) -> Result<RegistryIndex> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch registry index from {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "failed to fetch registry index: HTTP {} from {}",
                response.status(),
                url
            );
        }

        response
            .json::<RegistryIndex>()
            .await
            .with_context(|| format!("failed to parse registry index from {url}"))
    }
}

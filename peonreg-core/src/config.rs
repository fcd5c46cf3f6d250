//! Generator configuration
//!
//! Named options with documented defaults, overridable from the
//! environment and again from CLI flags. No config file: the pipeline is
//! CI tooling and everything it needs fits in a handful of knobs.

use std::path::PathBuf;

use crate::registry::TrustTier;
use crate::source::DEFAULT_RAW_BASE;

/// Environment variable names recognized by [`GeneratorConfig::from_env`]
pub mod env_keys {
    pub const PACKS_SOURCE_DIR: &str = "PACKS_SOURCE_DIR";
    pub const REGISTRY_OUTPUT_DIR: &str = "REGISTRY_OUTPUT_DIR";
    pub const PACKS_DATA_PATH: &str = "PACKS_DATA_PATH";
    pub const PACKS_RAW_BASE: &str = "PACKS_RAW_BASE";
    pub const REGISTRY_INDEX_URL: &str = "REGISTRY_INDEX_URL";
}

/// All knobs for one pipeline run
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Local source root: one subdirectory per pack
    pub packs_dir: PathBuf,

    /// Registry output root (per-pack entries under `packs/`, plus `index.json`)
    pub output_dir: PathBuf,

    /// Destination of the aggregate pack-data JSON for the website
    pub packdata_path: PathBuf,

    /// Raw-content host base for remote fetches
    pub raw_base: String,

    /// URL of the published aggregate index (remote mode)
    pub index_url: String,

    /// Provenance repository stamped into generated entries
    pub source_repo: String,

    /// Provenance ref stamped into generated entries, also the primary
    /// fetch ref in remote mode
    pub source_ref: String,

    /// Secondary ref tried when a remote manifest fetch returns not-found
    pub fallback_ref: String,

    /// Trust tier assigned to every generated entry
    pub trust_tier: TrustTier,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            packs_dir: PathBuf::from("og-packs"),
            output_dir: PathBuf::from("registry"),
            packdata_path: PathBuf::from("site/src/data/packs-data.json"),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            index_url: "https://peonping.github.io/registry/index.json".to_string(),
            source_repo: "PeonPing/og-packs".to_string(),
            source_ref: "v1.0.0".to_string(),
            fallback_ref: "main".to_string(),
            trust_tier: TrustTier::Official,
        }
    }
}

impl GeneratorConfig {
    /// Defaults overlaid with any recognized environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = env_var(env_keys::PACKS_SOURCE_DIR) {
            config.packs_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_var(env_keys::REGISTRY_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = env_var(env_keys::PACKS_DATA_PATH) {
            config.packdata_path = PathBuf::from(path);
        }
        if let Some(base) = env_var(env_keys::PACKS_RAW_BASE) {
            config.raw_base = base;
        }
        if let Some(url) = env_var(env_keys::REGISTRY_INDEX_URL) {
            config.index_url = url;
        }

        config
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

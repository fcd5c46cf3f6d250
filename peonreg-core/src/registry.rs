//! Registry records: canonical per-pack entries and the aggregate index
//!
//! A [`RegistryEntry`] is the full catalog record persisted per pack; an
//! [`IndexEntry`] is the lighter record carried in the aggregate
//! `index.json`. Both are rebuilt wholesale on every pipeline run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::franchise::{merge_tags, FranchiseDb};
use crate::manifest::{Author, Manifest};
use crate::metrics::PackMetrics;

/// Schema version stamped into the aggregate index document
pub const INDEX_SCHEMA_VERSION: u32 = 1;

/// Coarse classification of how much a consumer should trust a pack's origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustTier {
    Official,
    Community,
}

impl Default for TrustTier {
    fn default() -> Self {
        TrustTier::Official
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustTier::Official => f.write_str("official"),
            TrustTier::Community => f.write_str("community"),
        }
    }
}

/// Provenance pointer for a pack (where the manifest lives, not fetched at
/// render time)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackSource {
    #[serde(rename = "type")]
    pub source_type: String,

    /// Repository coordinate, e.g. "PeonPing/og-packs"
    pub repo: String,

    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Subpath within the repository for monorepo layouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl PackSource {
    pub fn github(repo: impl Into<String>, git_ref: impl Into<String>, path: Option<String>) -> Self {
        Self {
            source_type: "github".to_string(),
            repo: repo.into(),
            git_ref: git_ref.into(),
            path,
        }
    }
}

/// Canonical catalog record for one pack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub description: String,
    pub author: Author,
    pub source: PackSource,
    pub manifest_sha256: String,
    pub trust_tier: TrustTier,
    pub categories: Vec<String>,
    pub language: String,
    pub license: String,
    pub total_size_bytes: u64,
    pub sound_count: usize,
    pub tags: Vec<String>,
    pub added: String,
    pub updated: String,
}

/// Lighter per-pack record carried in the aggregate index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub trust_tier: TrustTier,
    pub categories: Vec<String>,
    pub language: String,
    pub sound_count: usize,
    pub total_size_bytes: u64,
    pub source_repo: String,
    pub source_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// The aggregate index document (`index.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryIndex {
    pub version: u32,
    pub generated_at: String,
    pub packs: Vec<IndexEntry>,
}

impl RegistryIndex {
    /// Stamp a new index with the current generation time
    pub fn new(packs: Vec<IndexEntry>) -> Self {
        Self {
            version: INDEX_SCHEMA_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            packs,
        }
    }
}

/// Assemble the canonical registry record for a pack.
///
/// `pack_name` is the effective identity (manifest name, or the directory
/// name when the manifest omits one). Deterministic except for
/// `added`/`updated`, which both receive the same stamp date on every run
/// (no prior state is merged).
pub fn build_entry(
    manifest: &Manifest,
    pack_name: &str,
    metrics: &PackMetrics,
    db: &FranchiseDb,
    source: PackSource,
    trust_tier: TrustTier,
    today: &str,
) -> RegistryEntry {
    let franchise = db.resolve(pack_name);

    let description = manifest.description.clone().unwrap_or_else(|| {
        format!("{} sound pack from {}", manifest.display_name, franchise.name)
    });

    let tags = merge_tags(db.base_tags(&franchise.name), manifest.tags());

    RegistryEntry {
        name: pack_name.to_string(),
        display_name: manifest.display_name.clone(),
        version: manifest.version().to_string(),
        description,
        author: manifest.author(),
        source,
        manifest_sha256: metrics.manifest_sha256.clone(),
        trust_tier,
        categories: metrics.category_names.clone(),
        language: manifest.language().to_string(),
        license: manifest.license().to_string(),
        total_size_bytes: metrics.total_size_bytes,
        sound_count: metrics.sound_count,
        tags,
        added: today.to_string(),
        updated: today.to_string(),
    }
}

impl RegistryEntry {
    /// Flatten into the lighter aggregate-index record
    pub fn to_index_entry(&self) -> IndexEntry {
        IndexEntry {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            version: self.version.clone(),
            trust_tier: self.trust_tier,
            categories: self.categories.clone(),
            language: self.language.clone(),
            sound_count: self.sound_count,
            total_size_bytes: self.total_size_bytes,
            source_repo: self.source.repo.clone(),
            source_ref: self.source.git_ref.clone(),
            source_path: self.source.path.clone(),
        }
    }
}

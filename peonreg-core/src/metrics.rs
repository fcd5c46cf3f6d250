//! Derived pack metrics
//!
//! Computes the sound count, ordered category list, on-disk size, and
//! manifest content fingerprint for a loaded pack.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::manifest::Manifest;

/// Metrics derived from a loaded manifest and its local assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackMetrics {
    /// Total sounds across all categories
    pub sound_count: usize,

    /// Category keys in manifest order
    pub category_names: Vec<String>,

    /// Audio asset bytes (flat `sounds/` directory) plus manifest byte length.
    /// Manifest length only when no local asset directory is available.
    pub total_size_bytes: u64,

    /// Lowercase hex SHA-256 of the raw manifest bytes
    pub manifest_sha256: String,
}

impl PackMetrics {
    /// Compute metrics from a parsed manifest, its raw bytes, and an optional
    /// local audio directory handle.
    pub fn compute(manifest: &Manifest, raw: &[u8], sounds_dir: Option<&Path>) -> Result<Self> {
        let sound_count = manifest
            .categories
            .iter()
            .map(|(_, category)| category.sounds.len())
            .sum();

        let mut total_size_bytes = raw.len() as u64;
        if let Some(dir) = sounds_dir {
            total_size_bytes += flat_dir_size(dir)?;
        }

        Ok(Self {
            sound_count,
            category_names: manifest.categories.names(),
            total_size_bytes,
            manifest_sha256: manifest_sha256(raw),
        })
    }
}

/// Lowercase hex SHA-256 digest of raw manifest bytes
pub fn manifest_sha256(raw: &[u8]) -> String {
    hex::encode(Sha256::digest(raw))
}

/// Sum of sizes of regular files directly inside `dir`.
///
/// Non-recursive: subdirectories are not descended into.
fn flat_dir_size(dir: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read audio directory: {}", dir.display()))?
    {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            total += metadata.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn manifest_with_sounds() -> (Manifest, Vec<u8>) {
        let raw = br#"{
            "cesp_version": "1.0",
            "name": "peon",
            "display_name": "Peon",
            "categories": {
                "task.complete": {"sounds": [
                    {"file": "sounds/done.mp3"},
                    {"file": "sounds/ready.mp3"}
                ]},
                "task.error": {"sounds": [{"file": "sounds/no.mp3"}]},
                "session.end": {"sounds": []}
            }
        }"#;
        (Manifest::from_slice(raw).unwrap(), raw.to_vec())
    }

    #[test]
    fn sound_count_sums_across_categories() {
        let (manifest, raw) = manifest_with_sounds();
        let metrics = PackMetrics::compute(&manifest, &raw, None).unwrap();

        assert_eq!(metrics.sound_count, 3);
    }

    #[test]
    fn empty_category_is_kept_in_names_but_adds_nothing() {
        let (manifest, raw) = manifest_with_sounds();
        let metrics = PackMetrics::compute(&manifest, &raw, None).unwrap();

        assert_eq!(
            metrics.category_names,
            vec!["task.complete", "task.error", "session.end"]
        );
    }

    #[test]
    fn size_is_manifest_only_without_audio_dir() {
        let (manifest, raw) = manifest_with_sounds();
        let metrics = PackMetrics::compute(&manifest, &raw, None).unwrap();

        assert_eq!(metrics.total_size_bytes, raw.len() as u64);
    }

    #[test]
    fn size_adds_flat_audio_files_only() {
        let (manifest, raw) = manifest_with_sounds();

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.mp3"), vec![0u8; 1000]).unwrap();
        std::fs::write(dir.path().join("b.mp3"), vec![0u8; 2000]).unwrap();

        // Nested files must not be counted
        let nested = dir.path().join("extras");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("c.mp3"), vec![0u8; 4096]).unwrap();

        let metrics = PackMetrics::compute(&manifest, &raw, Some(dir.path())).unwrap();
        assert_eq!(metrics.total_size_bytes, 3000 + raw.len() as u64);
    }

    #[test]
    fn digest_is_stable_and_byte_sensitive() {
        let raw = b"{\"name\":\"peon\"}";
        let first = manifest_sha256(raw);
        let second = manifest_sha256(raw);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let mut changed = raw.to_vec();
        changed[0] = b' ';
        assert_ne!(first, manifest_sha256(&changed));
    }
}

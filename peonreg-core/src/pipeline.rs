//! Batch orchestration: drive the pipeline across all packs in a source
//! and write the aggregate outputs.
//!
//! Registry generation is local-only. Pack-data generation runs against
//! the local source directory when it exists, or against the published
//! registry index otherwise; remote fetches run in fixed-size batches with
//! an all-settled join so one bad pack never aborts a run.

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::franchise::FranchiseDb;
use crate::metrics::PackMetrics;
use crate::packdata::{self, PackData, PackDataFile};
use crate::registry::{build_entry, IndexEntry, PackSource, RegistryIndex};
use crate::source::{self, LoadError, LoadedManifest, RemoteSource};

/// Remote fetches proceed concurrently within one batch of this size; the
/// next batch starts only after every task in the current one settles.
pub const REMOTE_BATCH_SIZE: usize = 10;

/// How pack-data generation picks its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Local when the source directory exists on disk, remote otherwise
    Auto,
    Local,
    Remote,
}

/// Outcome counts for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Packs present in the written output
    pub processed: usize,
    /// Packs skipped or dropped along the way
    pub skipped: usize,
}

/// Generate per-pack registry entries and the aggregate index from the
/// local source tree.
///
/// A missing source root is fatal. A pack directory without a manifest is
/// skipped with a warning; a manifest that fails to parse or fails its
/// contract checks fails the run (local manifests are first-party and a
/// broken one is a bug, not noise).
pub fn generate_registry(config: &GeneratorConfig, db: &FranchiseDb) -> Result<RunSummary> {
    tracing::info!("reading packs from {}", config.packs_dir.display());
    tracing::info!("writing registry to {}", config.output_dir.display());

    if !config.packs_dir.is_dir() {
        anyhow::bail!("packs source not found: {}", config.packs_dir.display());
    }

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let mut index_entries: Vec<IndexEntry> = Vec::new();
    let mut skipped = 0;

    for pack_dir in list_pack_dirs(&config.packs_dir)? {
        let loaded = match source::load_local(&pack_dir) {
            Ok(loaded) => loaded,
            Err(LoadError::ManifestMissing { dir }) => {
                tracing::warn!("skipping {}: no manifest", dir.display());
                skipped += 1;
                continue;
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to load pack at {}", pack_dir.display()));
            }
        };

        loaded
            .manifest
            .validate()
            .with_context(|| format!("invalid manifest in {}", pack_dir.display()))?;

        let pack_name = pack_name_for(&loaded, &pack_dir);
        let metrics =
            PackMetrics::compute(&loaded.manifest, &loaded.raw, loaded.sounds_dir.as_deref())?;

        let source = PackSource::github(
            config.source_repo.clone(),
            config.source_ref.clone(),
            Some(pack_name.clone()),
        );

        let entry = build_entry(
            &loaded.manifest,
            &pack_name,
            &metrics,
            db,
            source,
            config.trust_tier,
            &today,
        );

        let pack_out_dir = config.output_dir.join("packs").join(&pack_name);
        std::fs::create_dir_all(&pack_out_dir).with_context(|| {
            format!("failed to create output directory: {}", pack_out_dir.display())
        })?;
        write_json(&pack_out_dir.join("registry.json"), &entry)?;

        index_entries.push(entry.to_index_entry());
        tracing::debug!("registered {} ({} sounds)", pack_name, metrics.sound_count);
    }

    let processed = index_entries.len();
    let index = RegistryIndex::new(index_entries);
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("failed to create output directory: {}", config.output_dir.display())
    })?;
    write_json(&config.output_dir.join("index.json"), &index)?;

    tracing::info!("registry generated: {} entries, {} skipped", processed, skipped);
    Ok(RunSummary { processed, skipped })
}

/// Generate the aggregate pack-data document for the website.
pub async fn generate_packdata(
    config: &GeneratorConfig,
    db: &FranchiseDb,
    mode: SourceMode,
) -> Result<RunSummary> {
    let use_local = match mode {
        SourceMode::Local => true,
        SourceMode::Remote => false,
        SourceMode::Auto => config.packs_dir.is_dir(),
    };

    let (packs, skipped) = if use_local {
        tracing::info!("reading packs from local: {}", config.packs_dir.display());
        packdata_from_local(config, db)?
    } else {
        tracing::info!("fetching pack list from registry: {}", config.index_url);
        packdata_from_remote(config, db).await?
    };

    let processed = packs.len();
    let output = PackDataFile::new(packs);

    if let Some(parent) = config.packdata_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory: {}", parent.display())
        })?;
    }
    write_json(&config.packdata_path, &output)?;

    let mode_label = if use_local { "local" } else { "remote" };
    tracing::info!(
        "pack data generated: {} packs from {} source, {} skipped",
        processed,
        mode_label,
        skipped
    );
    Ok(RunSummary { processed, skipped })
}

fn packdata_from_local(
    config: &GeneratorConfig,
    db: &FranchiseDb,
) -> Result<(Vec<PackData>, usize)> {
    if !config.packs_dir.is_dir() {
        anyhow::bail!("packs source not found: {}", config.packs_dir.display());
    }

    let raw_base = config.raw_base.trim_end_matches('/');
    let mut packs = Vec::new();
    let mut skipped = 0;

    for pack_dir in list_pack_dirs(&config.packs_dir)? {
        let loaded = match source::load_local(&pack_dir) {
            Ok(loaded) => loaded,
            Err(LoadError::ManifestMissing { dir }) => {
                tracing::warn!("skipping {}: no manifest", dir.display());
                skipped += 1;
                continue;
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to load pack at {}", pack_dir.display()));
            }
        };

        let pack_name = pack_name_for(&loaded, &pack_dir);
        let audio_base = format!(
            "{}/{}/{}/{}",
            raw_base, config.source_repo, config.source_ref, pack_name
        );

        packs.push(packdata::project(
            &loaded.manifest,
            &pack_name,
            &audio_base,
            config.trust_tier,
            db,
        ));
    }

    Ok((packs, skipped))
}

async fn packdata_from_remote(
    config: &GeneratorConfig,
    db: &FranchiseDb,
) -> Result<(Vec<PackData>, usize)> {
    let remote = RemoteSource::new(config.raw_base.clone())?;
    let index = remote.fetch_index(&config.index_url).await?;
    tracing::info!("found {} packs in registry", index.packs.len());

    let mut packs = Vec::new();
    let mut skipped = 0;

    for batch in index.packs.chunks(REMOTE_BATCH_SIZE) {
        let fetches = batch.iter().map(|entry| {
            let remote = &remote;
            async move {
                let result = fetch_remote_pack(remote, config, db, entry).await;
                (entry, result)
            }
        });

        // All-settled: every task in the batch finishes before the next
        // batch starts, and each outcome is handled independently.
        for (entry, result) in join_all(fetches).await {
            match result {
                Ok(pack) => packs.push(pack),
                Err(err) => {
                    tracing::warn!("dropping pack '{}': {}", entry.name, err);
                    skipped += 1;
                }
            }
        }
    }

    packs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((packs, skipped))
}

async fn fetch_remote_pack(
    remote: &RemoteSource,
    config: &GeneratorConfig,
    db: &FranchiseDb,
    entry: &IndexEntry,
) -> Result<PackData, LoadError> {
    let loaded = remote
        .fetch_manifest(
            &entry.source_repo,
            &entry.source_ref,
            entry.source_path.as_deref(),
            &config.fallback_ref,
        )
        .await?;

    let pack_name = if loaded.manifest.name.is_empty() {
        entry.name.clone()
    } else {
        loaded.manifest.name.clone()
    };

    let audio_base = remote.audio_base(
        &entry.source_repo,
        &entry.source_ref,
        entry.source_path.as_deref(),
    );

    let mut pack = packdata::project(&loaded.manifest, &pack_name, &audio_base, entry.trust_tier, db);
    pack.source_repo = Some(entry.source_repo.clone());
    pack.source_path = entry.source_path.clone();
    Ok(pack)
}

/// Pack identity: manifest name when present, directory name otherwise
fn pack_name_for(loaded: &LoadedManifest, pack_dir: &Path) -> String {
    if loaded.manifest.name.is_empty() {
        pack_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        loaded.manifest.name.clone()
    }
}

/// Subdirectories of the source root, sorted lexicographically so output
/// order is independent of filesystem enumeration order.
fn list_pack_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)
        .with_context(|| format!("failed to read packs source: {}", root.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Pretty-printed JSON with a trailing newline, matching the published
/// registry artifacts.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    body.push('\n');
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

//! UI-facing pack projection
//!
//! Flattens a manifest into the record the website's static data file
//! consumes: resolved audio URLs, preview sound selection, language label,
//! and franchise display data. JSON field names are camelCase to match the
//! site contract.

use serde::{Deserialize, Serialize};

use crate::franchise::{Franchise, FranchiseDb};
use crate::manifest::{Author, Manifest};
use crate::registry::TrustTier;

/// Maximum number of preview sounds collected per pack
pub const PREVIEW_LIMIT: usize = 6;

/// A sound with its display label and resolved absolute URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundEntry {
    pub file: String,
    pub label: String,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

/// A category with resolved sounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryData {
    pub name: String,
    pub sounds: Vec<SoundEntry>,
}

/// The website-facing projection of one pack
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackData {
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub author: Author,
    pub license: String,
    pub language: String,
    pub language_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub trust_tier: TrustTier,
    pub franchise: Franchise,
    pub categories: Vec<CategoryData>,
    pub category_names: Vec<String>,
    pub total_sound_count: usize,
    pub preview_sounds: Vec<SoundEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// The aggregate pack-data document consumed by the website
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackDataFile {
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    pub packs: Vec<PackData>,
}

impl PackDataFile {
    pub fn new(packs: Vec<PackData>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            packs,
        }
    }
}

/// Project a manifest into its website record.
///
/// `audio_base` is the URL prefix under which the pack's `sounds/`
/// directory is reachable; every sound resolves to
/// `<audio_base>/sounds/<basename(file)>`. That join convention is applied
/// uniformly for local and remote packs.
pub fn project(
    manifest: &Manifest,
    pack_name: &str,
    audio_base: &str,
    trust_tier: TrustTier,
    db: &FranchiseDb,
) -> PackData {
    let audio_base = audio_base.trim_end_matches('/');

    let mut categories = Vec::with_capacity(manifest.categories.len());
    let mut preview_sounds = Vec::new();
    let mut total_sound_count = 0;

    for (name, category) in manifest.categories.iter() {
        let sounds: Vec<SoundEntry> = category
            .sounds
            .iter()
            .map(|sound| SoundEntry {
                file: sound.file.clone(),
                label: sound.display_label().to_string(),
                audio_url: format!("{}/sounds/{}", audio_base, sound.basename()),
            })
            .collect();

        total_sound_count += sounds.len();

        if let Some(first) = sounds.first() {
            if preview_sounds.len() < PREVIEW_LIMIT {
                preview_sounds.push(first.clone());
            }
        }

        categories.push(CategoryData {
            name: name.to_string(),
            sounds,
        });
    }

    let language = manifest.language().to_string();
    let language_label = db.language_label(&language);

    PackData {
        name: pack_name.to_string(),
        display_name: manifest.display_name.clone(),
        version: manifest.version().to_string(),
        author: manifest.author(),
        license: manifest.license().to_string(),
        language,
        language_label,
        description: manifest.description.clone(),
        tags: manifest.tags.clone(),
        trust_tier,
        franchise: db.resolve(pack_name),
        category_names: categories.iter().map(|c| c.name.clone()).collect(),
        total_sound_count,
        preview_sounds,
        categories,
        source_repo: None,
        source_path: None,
    }
}

//! Sound-pack manifest parsing (openpeon.json)
//!
//! A manifest describes one pack: identity metadata plus a mapping from
//! event categories to candidate sounds. Category order in the source
//! document is meaningful (it drives preview selection and display), so
//! the category map preserves insertion order.

use anyhow::Result;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Accepted manifest schema version
pub const CESP_VERSION: &str = "1.0";

/// Recognized manifest filenames, checked in preference order
pub const MANIFEST_FILENAMES: &[&str] = &["openpeon.json", "manifest.json"];

/// Default SPDX license when a manifest omits one
pub const DEFAULT_LICENSE: &str = "CC-BY-NC-4.0";

/// Default language code when a manifest omits one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default version when a manifest omits one
pub const DEFAULT_VERSION: &str = "1.0.0";

/// The 9 known event categories: 6 core followed by 3 extended
pub const KNOWN_CATEGORIES: &[&str] = &[
    "session.start",
    "task.acknowledge",
    "task.complete",
    "task.error",
    "input.required",
    "resource.limit",
    "user.spam",
    "session.end",
    "task.progress",
];

/// One candidate sound within a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sound {
    /// Relative path to the audio file (e.g., "sounds/ready.mp3")
    pub file: String,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Spoken line, used as a label fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,

    /// Optional per-file digest (declared, not verified here)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl Sound {
    /// Label resolution priority: explicit label, then line, then file basename
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.line.as_deref())
            .unwrap_or_else(|| basename(&self.file))
    }

    /// Final path component of the sound file
    pub fn basename(&self) -> &str {
        basename(&self.file)
    }
}

/// Final component of a slash-separated relative path
pub fn basename(file: &str) -> &str {
    file.rsplit('/').next().unwrap_or(file)
}

/// A category's sound list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub sounds: Vec<Sound>,
}

/// Category map in manifest insertion order.
///
/// `serde_json` maps do not keep key order for typed values, so this is a
/// thin ordered-pairs newtype with hand-written map (de)serialization.
#[derive(Debug, Clone, Default)]
pub struct Categories(Vec<(String, Category)>);

impl Categories {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.0.iter().map(|(name, cat)| (name.as_str(), cat))
    }

    /// Category keys as they appear in the manifest (not sorted)
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(String, Category)>> for Categories {
    fn from(entries: Vec<(String, Category)>) -> Self {
        Categories(entries)
    }
}

impl Serialize for Categories {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, category) in &self.0 {
            map.serialize_entry(name, category)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to sound list")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, category)) = access.next_entry::<String, Category>()? {
                    entries.push((name, category));
                }
                Ok(Categories(entries))
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

/// Pack author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub github: String,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            github: String::new(),
        }
    }
}

/// A pack manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cesp_version: Option<String>,

    /// Machine id, unique across the registry (pattern `[a-z0-9_-]+`)
    #[serde(default)]
    pub name: String,

    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub categories: Categories,
}

impl Manifest {
    /// Parse a manifest from raw JSON bytes
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Version, defaulting to "1.0.0"
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Language code, defaulting to "en"
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// SPDX license, defaulting to the registry-wide default
    pub fn license(&self) -> &str {
        self.license.as_deref().unwrap_or(DEFAULT_LICENSE)
    }

    /// Author, defaulting to the Unknown sentinel
    pub fn author(&self) -> Author {
        self.author.clone().unwrap_or_default()
    }

    /// Declared tags, possibly empty
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// Validate the loader-level manifest contract.
    ///
    /// Full JSON-Schema validation is an external concern; this checks only
    /// what the pipeline itself relies on. Unknown category keys are
    /// tolerated (warned, not rejected).
    pub fn validate(&self) -> Result<()> {
        match self.cesp_version.as_deref() {
            Some(CESP_VERSION) => {}
            Some(other) => anyhow::bail!(
                "unsupported cesp_version '{}', expected '{}'",
                other,
                CESP_VERSION
            ),
            None => anyhow::bail!("manifest is missing cesp_version"),
        }

        if self.name.is_empty() {
            anyhow::bail!("pack name is required");
        }

        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            anyhow::bail!(
                "pack name '{}' must match [a-z0-9_-]+ (lowercase alphanumeric, underscore, hyphen)",
                self.name
            );
        }

        if let Some(version) = &self.version {
            semver::Version::parse(version).map_err(|e| {
                anyhow::anyhow!("pack version '{}' is not semantic versioning: {}", version, e)
            })?;
        }

        for (category, _) in self.categories.iter() {
            if !KNOWN_CATEGORIES.contains(&category) {
                tracing::warn!(
                    "pack '{}' declares unknown category '{}'",
                    self.name,
                    category
                );
            }
        }

        Ok(())
    }
}

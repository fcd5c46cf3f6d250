//! Franchise, tag, and language lookup data
//!
//! Resolves a pack's canonical name to the media franchise it is themed
//! around, the franchise's base tag set, and human-readable language
//! labels. The lookup tables are injected immutable data: `Default`
//! carries the built-in registry, but alternate catalogs can construct a
//! [`FranchiseDb`] from their own tables without code changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The media property a pack's audio is themed around
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Franchise {
    pub name: String,
    pub url: String,
}

impl Franchise {
    /// Sentinel for packs with no franchise mapping
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            url: String::new(),
        }
    }
}

const WC3: (&str, &str) = ("Warcraft III", "https://liquipedia.net/warcraft/Warcraft_III");
const WC2: (&str, &str) = ("Warcraft II", "https://liquipedia.net/warcraft/Warcraft_II");
const SC: (&str, &str) = ("StarCraft", "https://liquipedia.net/starcraft/StarCraft");
const RA2: (&str, &str) = (
    "Command & Conquer: Red Alert 2",
    "https://www.ea.com/games/command-and-conquer",
);
const RA: (&str, &str) = (
    "Command & Conquer: Red Alert",
    "https://www.ea.com/games/command-and-conquer",
);

/// Pack name -> franchise
const FRANCHISES: &[(&str, (&str, &str))] = &[
    ("peon", WC3),
    ("peon_es", WC3),
    ("peon_fr", WC3),
    ("peon_cz", WC3),
    ("peon_pl", WC3),
    ("peon_ru", WC3),
    ("peon_de", WC3),
    ("peasant", WC3),
    ("peasant_cz", WC3),
    ("peasant_es", WC3),
    ("peasant_fr", WC3),
    ("peasant_ru", WC3),
    ("acolyte_ru", WC3),
    ("acolyte_de", WC3),
    ("brewmaster_ru", WC3),
    ("murloc", WC3),
    ("wc2_peasant", WC2),
    ("wc2_sapper", WC2),
    ("wc2_sappers", WC2),
    ("ocarina_of_time", ("The Legend of Zelda", "https://zelda.nintendo.com")),
    ("sc_kerrigan", SC),
    ("sc_battlecruiser", SC),
    ("sc_terran", SC),
    ("sc_scv", SC),
    ("sc_firebat", SC),
    ("sc_medic", SC),
    ("sc_tank", SC),
    ("sc_vessel", SC),
    ("ra2_kirov", RA2),
    ("ra2_soviet_engineer", RA2),
    ("ra_soviet", RA),
    ("glados", ("Portal", "https://store.steampowered.com/app/400/Portal/")),
    (
        "tf2_engineer",
        ("Team Fortress 2", "https://store.steampowered.com/app/440/Team_Fortress_2/"),
    ),
    ("rick", ("Rick and Morty", "https://en.wikipedia.org/wiki/Rick_and_Morty")),
    ("sopranos", ("The Sopranos", "https://en.wikipedia.org/wiki/The_Sopranos")),
    ("dota2_axe", ("Dota 2", "https://www.dota2.com")),
    (
        "hd2_helldiver",
        ("Helldivers 2", "https://store.steampowered.com/app/553850/HELLDIVERS_2/"),
    ),
    ("molag_bal", ("The Elder Scrolls", "https://elderscrolls.bethesda.net")),
    ("sheogorath", ("The Elder Scrolls", "https://elderscrolls.bethesda.net")),
    ("duke_nukem", ("Duke Nukem", "https://en.wikipedia.org/wiki/Duke_Nukem")),
    ("aoe2", ("Age of Empires II", "https://www.ageofempires.com")),
    ("aom_greek", ("Age of Mythology", "https://www.ageofempires.com/games/aom/")),
];

/// Franchise name -> base topical tags
const FRANCHISE_TAGS: &[(&str, &[&str])] = &[
    ("Warcraft III", &["gaming", "warcraft", "blizzard", "rts"]),
    ("Warcraft II", &["gaming", "warcraft", "blizzard", "rts"]),
    ("StarCraft", &["gaming", "starcraft", "blizzard", "rts"]),
    (
        "Command & Conquer: Red Alert 2",
        &["gaming", "command-and-conquer", "ea", "rts"],
    ),
    (
        "Command & Conquer: Red Alert",
        &["gaming", "command-and-conquer", "ea", "rts"],
    ),
    ("Portal", &["gaming", "portal", "valve", "puzzle"]),
    ("Team Fortress 2", &["gaming", "tf2", "valve", "fps"]),
    ("Rick and Morty", &["tv", "animation", "comedy"]),
    ("The Sopranos", &["tv", "drama", "hbo"]),
    ("Dota 2", &["gaming", "dota2", "valve", "moba"]),
    ("Helldivers 2", &["gaming", "helldivers", "shooter"]),
    ("The Elder Scrolls", &["gaming", "elder-scrolls", "bethesda", "rpg"]),
    ("Duke Nukem", &["gaming", "duke-nukem", "fps", "retro"]),
    ("Age of Empires II", &["gaming", "age-of-empires", "rts"]),
    ("Age of Mythology", &["gaming", "age-of-mythology", "rts"]),
];

/// BCP-47-like code -> display label
const LANGUAGE_LABELS: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("cs", "Czech"),
    ("pl", "Polish"),
    ("ru", "Russian"),
    ("el", "Greek"),
];

/// Immutable lookup tables for franchise, tag, and language resolution
#[derive(Debug, Clone)]
pub struct FranchiseDb {
    franchises: HashMap<String, Franchise>,
    franchise_tags: HashMap<String, Vec<String>>,
    language_labels: HashMap<String, String>,
}

impl Default for FranchiseDb {
    fn default() -> Self {
        let franchises = FRANCHISES
            .iter()
            .map(|(pack, (name, url))| {
                (
                    pack.to_string(),
                    Franchise {
                        name: name.to_string(),
                        url: url.to_string(),
                    },
                )
            })
            .collect();

        let franchise_tags = FRANCHISE_TAGS
            .iter()
            .map(|(name, tags)| {
                (
                    name.to_string(),
                    tags.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();

        let language_labels = LANGUAGE_LABELS
            .iter()
            .map(|(code, label)| (code.to_string(), label.to_string()))
            .collect();

        Self::new(franchises, franchise_tags, language_labels)
    }
}

impl FranchiseDb {
    /// Build a database from caller-supplied tables
    pub fn new(
        franchises: HashMap<String, Franchise>,
        franchise_tags: HashMap<String, Vec<String>>,
        language_labels: HashMap<String, String>,
    ) -> Self {
        Self {
            franchises,
            franchise_tags,
            language_labels,
        }
    }

    /// Resolve a pack name to its franchise, degrading to the Unknown sentinel
    pub fn resolve(&self, pack_name: &str) -> Franchise {
        self.franchises
            .get(pack_name)
            .cloned()
            .unwrap_or_else(Franchise::unknown)
    }

    /// Base tags for a franchise name, empty when unmapped
    pub fn base_tags(&self, franchise_name: &str) -> &[String] {
        self.franchise_tags
            .get(franchise_name)
            .map(|tags| tags.as_slice())
            .unwrap_or(&[])
    }

    /// Human-readable language label, falling back to the raw code
    pub fn language_label(&self, code: &str) -> String {
        self.language_labels
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }
}

/// Merge manifest-declared tags into a franchise's base tags.
///
/// Base tags come first; manifest tags are appended only when not already
/// present (case-sensitive exact match). First-seen order, no sorting.
pub fn merge_tags(base: &[String], manifest_tags: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = base.to_vec();
    for tag in manifest_tags {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

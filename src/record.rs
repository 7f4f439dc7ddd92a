//! [crate::record] contains the typed building blocks for authored content:
//! the [ContentRecord] and its nested collections, plus the canonical level
//! container that absorbs both authored layouts at the serde boundary.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::DidactError;

/// Lowest complexity tier (lay reader).
pub const LEVEL_MIN: u8 = 1;
/// Highest complexity tier (professional reader).
pub const LEVEL_MAX: u8 = 5;

/// Record categories observed in authored content. `type` is informational,
/// so membership is checked by the validator rather than enforced by serde.
pub const KNOWN_CONTENT_TYPES: &[&str] = &[
    "structure",
    "system",
    "pathway",
    "process",
    "condition",
    "concept",
    "topic",
];

/// Reading locale served by the query surface. English is the primary
/// authoring locale; Spanish bodies are optional per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Es => write!(f, "es"),
        }
    }
}

impl FromStr for Locale {
    type Err = DidactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            other => Err(DidactError::NotFound(format!("unknown locale '{other}'"))),
        }
    }
}

/// Lifecycle state of a record. `review` is not part of the minimal
/// draft/published/archived trio but occurs throughout authored content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Review,
    Published,
    Archived,
}

/// Closed relationship set for cross-references. `sibling` and `see-also`
/// behave like `related` for consistency checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    Related,
    Parent,
    Child,
    Sibling,
    SeeAlso,
}

impl Display for Relationship {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Relationship::Related => write!(f, "related"),
            Relationship::Parent => write!(f, "parent"),
            Relationship::Child => write!(f, "child"),
            Relationship::Sibling => write!(f, "sibling"),
            Relationship::SeeAlso => write!(f, "see-also"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClinicalRelevance {
    Low,
    Medium,
    High,
    Critical,
}

/// A glossary entry scoped to one level. Terms must be unique within their
/// level under case-insensitive, Unicode-normalized comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTerm {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub definition: String,
}

/// One complexity tier of a record. The primary body is authored as either
/// `content` or `explanation` depending on the module's vintage; both land in
/// [LevelEntry::content].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEntry {
    #[serde(default)]
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_es: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, alias = "explanation")]
    pub content: String,
    #[serde(
        default,
        alias = "explanationEs",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_es: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_terms: Vec<KeyTerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analogies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patient_counseling_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clinical_notes: Vec<String>,
}

impl LevelEntry {
    /// The body for the given locale, if authored.
    pub fn body(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::En if !self.content.is_empty() => Some(&self.content),
            Locale::En => None,
            Locale::Es => self.content_es.as_deref().filter(|s| !s.is_empty()),
        }
    }

    /// The per-level display title for the given locale, if authored.
    pub fn display_title(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::En => self.title.as_deref(),
            Locale::Es => self.title_es.as_deref().or(self.title.as_deref()),
        }
    }
}

/// Layout irregularities recorded while normalizing an authored level
/// container. These are surfaced as validator findings, never as
/// deserialization failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutAnomaly {
    /// A sequence entry (or map key) outside 1..=5. The entry is dropped.
    OutOfRange { declared: u8, index: usize },
    /// Two sequence entries declared the same level. The first wins.
    DuplicateLevel { level: u8, index: usize },
    /// A map entry whose key disagrees with its `level` field. The key wins.
    KeyMismatch { key: u8, declared: u8 },
    /// A map key that does not parse as an integer. The entry is dropped.
    UnparseableKey { key: String },
}

/// Authored shape of the `levels` container. Both layouts occur in practice:
/// a sequence of entries carrying their own `level` field, and a map keyed by
/// the level number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelLayout {
    Sequence(Vec<LevelEntry>),
    Keyed(BTreeMap<String, LevelEntry>),
}

impl Default for LevelLayout {
    fn default() -> Self {
        LevelLayout::Sequence(Vec::new())
    }
}

/// Canonical level container: entries keyed by level number in ascending
/// order. Built from [LevelLayout] the moment a record is deserialized, so
/// nothing downstream ever sees the authored layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LevelLayout", into = "LevelLayout")]
pub struct Levels {
    entries: BTreeMap<u8, LevelEntry>,
    anomalies: Vec<LayoutAnomaly>,
}

impl From<LevelLayout> for Levels {
    fn from(layout: LevelLayout) -> Levels {
        let mut entries = BTreeMap::new();
        let mut anomalies = Vec::new();
        match layout {
            LevelLayout::Sequence(seq) => {
                for (index, entry) in seq.into_iter().enumerate() {
                    let declared = entry.level;
                    if !(LEVEL_MIN..=LEVEL_MAX).contains(&declared) {
                        anomalies.push(LayoutAnomaly::OutOfRange { declared, index });
                        continue;
                    }
                    if entries.contains_key(&declared) {
                        anomalies.push(LayoutAnomaly::DuplicateLevel {
                            level: declared,
                            index,
                        });
                        continue;
                    }
                    entries.insert(declared, entry);
                }
            }
            LevelLayout::Keyed(map) => {
                for (key, mut entry) in map {
                    let parsed = match key.trim().parse::<u8>() {
                        Ok(k) => k,
                        Err(_) => {
                            anomalies.push(LayoutAnomaly::UnparseableKey { key });
                            continue;
                        }
                    };
                    if !(LEVEL_MIN..=LEVEL_MAX).contains(&parsed) {
                        anomalies.push(LayoutAnomaly::OutOfRange {
                            declared: parsed,
                            index: 0,
                        });
                        continue;
                    }
                    // A declared level of 0 means the field was omitted; the
                    // map key is authoritative either way.
                    if entry.level != 0 && entry.level != parsed {
                        anomalies.push(LayoutAnomaly::KeyMismatch {
                            key: parsed,
                            declared: entry.level,
                        });
                    }
                    entry.level = parsed;
                    entries.insert(parsed, entry);
                }
            }
        }
        Levels { entries, anomalies }
    }
}

impl From<Levels> for LevelLayout {
    fn from(levels: Levels) -> LevelLayout {
        LevelLayout::Keyed(
            levels
                .entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

impl Levels {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, level: u8) -> Option<&LevelEntry> {
        self.entries.get(&level)
    }

    /// Level numbers present, ascending.
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &LevelEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Layout irregularities captured during normalization.
    pub fn anomalies(&self) -> &[LayoutAnomaly] {
        &self.anomalies
    }

    /// The nearest authored level at or below `level`, for downward fallback.
    pub fn nearest_at_or_below(&self, level: u8) -> Option<u8> {
        self.entries.range(..=level).next_back().map(|(k, _)| *k)
    }

    /// Missing levels between 1 and the highest authored level.
    pub fn gaps(&self) -> Vec<u8> {
        let Some(max) = self.entries.keys().next_back().copied() else {
            return Vec::new();
        };
        (LEVEL_MIN..=max)
            .filter(|l| !self.entries.contains_key(l))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_es: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReference {
    #[serde(default)]
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    pub relationship: Relationship,
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tags {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub systems: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_relevance: Option<ClinicalRelevance>,
}

fn default_version() -> u32 {
    1
}

/// One topic/concept's full authored payload across all levels and locales.
///
/// Scalar fields default rather than fail: a structurally incomplete module
/// should materialize and be reported by the validator, not die inside serde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_es: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_names: Vec<String>,
    #[serde(default)]
    pub levels: Levels,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_references: Vec<CrossReference>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<String>,
}

impl ContentRecord {
    /// The record display name for the given locale, falling back to the
    /// primary name when no Spanish name is authored.
    pub fn display_name(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.name,
            Locale::Es => self
                .name_es
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(&self.name),
        }
    }
}

impl Display for ContentRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] ({} levels, {})",
            self.id,
            self.kind,
            self.levels.len(),
            match self.status {
                Status::Draft => "draft",
                Status::Review => "review",
                Status::Published => "published",
                Status::Archived => "archived",
            }
        )
    }
}

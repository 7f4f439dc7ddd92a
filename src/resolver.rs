//! The runtime query surface.
//!
//! The fallback contract here is the one piece of real business logic in the
//! crate and callers depend on it exactly: level fallback is only ever
//! downward, locale fallback only ever to the primary locale, and both are
//! flagged on the response so a caller can tell a substitute from an exact
//! answer. Missing topics are a normal `None`, never an error.

use serde::{Deserialize, Serialize};

use crate::{
    record::{Citation, KeyTerm, Locale, Relationship},
    registry::Registry,
};

/// A cross-reference that survived resolution: its target exists in the
/// registry. Dangling references were reported at load time and are dropped
/// here without comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCrossReference {
    pub target_id: String,
    pub relationship: Relationship,
    pub label: Option<String>,
    /// Target display name in the requested locale, for rendering.
    pub target_name: String,
}

/// Advisory strings split by audience.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryPoints {
    pub patient_counseling: Vec<String>,
    pub clinical_notes: Vec<String>,
    pub analogies: Vec<String>,
    pub examples: Vec<String>,
}

impl AdvisoryPoints {
    pub fn is_empty(&self) -> bool {
        self.patient_counseling.is_empty()
            && self.clinical_notes.is_empty()
            && self.analogies.is_empty()
            && self.examples.is_empty()
    }
}

/// Best-available content for one topic at one level and locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedContent {
    pub id: String,
    /// Record display name in the requested locale.
    pub name: String,
    /// The level the caller asked for.
    pub level: u8,
    /// The level actually served. Never higher than requested.
    pub actual_level: u8,
    pub applied_fallback: bool,
    /// The locale the caller asked for.
    pub locale: Locale,
    /// The locale of the served body.
    pub actual_locale: Locale,
    pub locale_fallback: bool,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: String,
    pub key_terms: Vec<KeyTerm>,
    pub advisory_points: AdvisoryPoints,
    pub citations: Vec<Citation>,
    pub cross_references: Vec<ResolvedCrossReference>,
}

impl ResolvedContent {
    /// True when the caller received exactly what was asked for.
    pub fn is_exact(&self) -> bool {
        !self.applied_fallback && !self.locale_fallback
    }
}

pub(crate) fn lookup(
    registry: &Registry,
    topic_id: &str,
    level: u8,
    locale: Locale,
) -> Option<ResolvedContent> {
    let record = registry.record(topic_id)?;
    let actual_level = record.levels.nearest_at_or_below(level)?;
    let entry = record
        .levels
        .get(actual_level)
        .expect("nearest_at_or_below returned a present level");

    let (body, actual_locale) = match entry.body(locale) {
        Some(body) => (body.to_string(), locale),
        // Fall back to the primary body as authored, even when it is empty
        // (an empty primary body was already reported at load time).
        None => (entry.content.clone(), Locale::En),
    };
    let applied_fallback = actual_level != level;
    let locale_fallback = actual_locale != locale;

    if applied_fallback || locale_fallback {
        tracing::trace!(
            "[resolver::lookup] '{topic_id}' level {level}/{locale} served as {actual_level}/{actual_locale}"
        );
    }

    let cross_references = record
        .cross_references
        .iter()
        .filter(|xref| xref.target_id != record.id)
        .filter_map(|xref| {
            registry.record(&xref.target_id).map(|target| {
                ResolvedCrossReference {
                    target_id: xref.target_id.clone(),
                    relationship: xref.relationship,
                    label: xref.label.clone(),
                    target_name: target.display_name(locale).to_string(),
                }
            })
        })
        .collect();

    Some(ResolvedContent {
        id: record.id.clone(),
        name: record.display_name(locale).to_string(),
        level,
        actual_level,
        applied_fallback,
        locale,
        actual_locale,
        locale_fallback,
        title: entry
            .display_title(actual_locale)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        summary: entry.summary.clone().filter(|s| !s.is_empty()),
        body,
        key_terms: entry.key_terms.clone(),
        advisory_points: AdvisoryPoints {
            patient_counseling: entry.patient_counseling_points.clone(),
            clinical_notes: entry.clinical_notes.clone(),
            analogies: entry.analogies.clone(),
            examples: entry.examples.clone(),
        },
        citations: record.citations.clone(),
        cross_references,
    })
}

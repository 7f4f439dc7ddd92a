//! Finding types and the per-record schema validator.
//!
//! Validation never fails and never panics: every structural problem becomes
//! a [Finding] tagged with a machine-readable rule id, a severity, and the
//! path within the record where it was observed. Hard/soft classification is
//! a fixed table on [RuleId]; the strict/lenient switch only widens which
//! error-grade findings exclude a record from the registry.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use time::{macros::format_description, Date};
use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::record::{ContentRecord, LayoutAnomaly, KNOWN_CONTENT_TYPES};

static ID_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("static pattern"));

/// How aggressively error-grade findings exclude records from the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Report everything, exclude only records that cannot be served at all
    /// (duplicate id, empty id, no levels). The default: content sets are
    /// large and partially authored.
    #[default]
    Lenient,
    /// Any error-grade finding excludes the offending record.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Machine-readable rule identifiers. The string codes are stable and are
/// what CI tooling matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    DuplicateId,
    EmptyId,
    NoLevels,
    LevelGap,
    DuplicateLevel,
    LevelKeyMismatch,
    LevelOutOfRange,
    EmptyName,
    EmptySecondaryName,
    EmptyBody,
    MissingSecondaryLocale,
    EmptyKeyTerm,
    DuplicateKeyTerm,
    EmptyAdvisoryEntry,
    InvalidCitationUrl,
    InvalidMediaUrl,
    InvalidTimestamp,
    CitationDateInFuture,
    UnknownContentType,
    InvalidIdFormat,
    EmptyTag,
    SelfReference,
    DuplicateReference,
    RelationshipConflict,
    DanglingReference,
    ModuleParse,
}

impl RuleId {
    /// Stable string code, e.g. `LEVEL_GAP`.
    pub fn code(&self) -> &'static str {
        match self {
            RuleId::DuplicateId => "DUPLICATE_ID",
            RuleId::EmptyId => "EMPTY_ID",
            RuleId::NoLevels => "NO_LEVELS",
            RuleId::LevelGap => "LEVEL_GAP",
            RuleId::DuplicateLevel => "DUPLICATE_LEVEL",
            RuleId::LevelKeyMismatch => "LEVEL_KEY_MISMATCH",
            RuleId::LevelOutOfRange => "LEVEL_OUT_OF_RANGE",
            RuleId::EmptyName => "EMPTY_NAME",
            RuleId::EmptySecondaryName => "EMPTY_SECONDARY_NAME",
            RuleId::EmptyBody => "EMPTY_BODY",
            RuleId::MissingSecondaryLocale => "MISSING_SECONDARY_LOCALE",
            RuleId::EmptyKeyTerm => "EMPTY_KEY_TERM",
            RuleId::DuplicateKeyTerm => "DUPLICATE_KEY_TERM",
            RuleId::EmptyAdvisoryEntry => "EMPTY_ADVISORY_ENTRY",
            RuleId::InvalidCitationUrl => "INVALID_CITATION_URL",
            RuleId::InvalidMediaUrl => "INVALID_MEDIA_URL",
            RuleId::InvalidTimestamp => "INVALID_TIMESTAMP",
            RuleId::CitationDateInFuture => "CITATION_DATE_IN_FUTURE",
            RuleId::UnknownContentType => "UNKNOWN_CONTENT_TYPE",
            RuleId::InvalidIdFormat => "INVALID_ID_FORMAT",
            RuleId::EmptyTag => "EMPTY_TAG",
            RuleId::SelfReference => "SELF_REFERENCE",
            RuleId::DuplicateReference => "DUPLICATE_REFERENCE",
            RuleId::RelationshipConflict => "RELATIONSHIP_CONFLICT",
            RuleId::DanglingReference => "DANGLING_REFERENCE",
            RuleId::ModuleParse => "MODULE_PARSE",
        }
    }

    /// Fixed severity table. Only `DANGLING_REFERENCE` is mode-dependent.
    pub fn severity(&self, mode: ValidationMode) -> Severity {
        match self {
            RuleId::MissingSecondaryLocale
            | RuleId::UnknownContentType
            | RuleId::InvalidIdFormat
            | RuleId::EmptyTag
            | RuleId::InvalidMediaUrl
            | RuleId::SelfReference
            | RuleId::DuplicateReference
            | RuleId::RelationshipConflict => Severity::Warning,
            RuleId::DanglingReference => match mode {
                ValidationMode::Lenient => Severity::Warning,
                ValidationMode::Strict => Severity::Error,
            },
            _ => Severity::Error,
        }
    }

    /// Whether a finding under this rule excludes its record from the
    /// registry. In lenient mode only un-serveable defects exclude; in strict
    /// mode every error-grade finding does.
    pub fn excludes_record(&self, mode: ValidationMode) -> bool {
        match mode {
            ValidationMode::Lenient => {
                matches!(self, RuleId::DuplicateId | RuleId::EmptyId | RuleId::NoLevels)
            }
            ValidationMode::Strict => self.severity(mode) == Severity::Error,
        }
    }
}

impl Display for RuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One validation observation: rule, severity, offending record, path within
/// the record, and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: RuleId,
    pub severity: Severity,
    pub record_id: String,
    pub path: String,
    pub message: String,
}

impl Finding {
    pub fn new(
        rule: RuleId,
        mode: ValidationMode,
        record_id: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Finding {
            rule,
            severity: rule.severity(mode),
            record_id: record_id.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// A module that failed to deserialize, attributed to its source path.
    /// `MODULE_PARSE` is an error in every mode; the record never
    /// materialized, so there is nothing to index.
    pub fn parse_failure(module: impl Into<String>, message: impl Into<String>) -> Self {
        Finding {
            rule: RuleId::ModuleParse,
            severity: Severity::Error,
            record_id: module.into(),
            path: "module".into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} at {}::{}: {}",
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            },
            self.rule.code(),
            self.record_id,
            self.path,
            self.message
        )
    }
}

/// The two-tier report handed to build/CI tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Findings for one record, errors first.
    pub fn for_record<'a>(&'a self, record_id: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |f| f.record_id == record_id)
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ValidationReport({} errors, {} warnings)",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

/// Normalized form used for case-insensitive key-term comparison.
pub(crate) fn normalize_term(term: &str) -> String {
    term.trim().nfc().collect::<String>().to_lowercase()
}

/// Parse an authored calendar date (`2026-02-05`). Longer timestamps are
/// accepted by reading their date prefix.
pub(crate) fn parse_date(raw: &str) -> Option<Date> {
    let fmt = format_description!("[year]-[month]-[day]");
    let trimmed = raw.trim();
    Date::parse(trimmed, &fmt)
        .ok()
        .or_else(|| trimmed.get(..10).and_then(|d| Date::parse(d, &fmt).ok()))
}

/// Validate a single record against the structural rule table.
///
/// Purely structural and single-pass: no cross-record knowledge, no I/O.
/// Cross-record rules (`DUPLICATE_ID`, `DANGLING_REFERENCE`, relationship
/// consistency) are emitted by the registry build and the cross-reference
/// resolver instead.
pub fn validate_record(record: &ContentRecord, mode: ValidationMode) -> Vec<Finding> {
    let mut findings = Vec::new();
    let id = record.id.as_str();
    let push = |findings: &mut Vec<Finding>, rule: RuleId, path: &str, message: String| {
        findings.push(Finding::new(rule, mode, id, path, message));
    };

    if id.trim().is_empty() {
        push(
            &mut findings,
            RuleId::EmptyId,
            "id",
            "record has no id and cannot be indexed".to_string(),
        );
    } else if !ID_SLUG.is_match(id) {
        push(
            &mut findings,
            RuleId::InvalidIdFormat,
            "id",
            format!("id '{id}' is not a kebab-case slug"),
        );
    }

    if !record.kind.is_empty() && !KNOWN_CONTENT_TYPES.contains(&record.kind.as_str()) {
        push(
            &mut findings,
            RuleId::UnknownContentType,
            "type",
            format!("unrecognized content type '{}'", record.kind),
        );
    }

    if record.name.trim().is_empty() {
        push(
            &mut findings,
            RuleId::EmptyName,
            "name",
            "primary-locale name is required".to_string(),
        );
    }
    if let Some(name_es) = &record.name_es {
        if name_es.trim().is_empty() {
            push(
                &mut findings,
                RuleId::EmptySecondaryName,
                "nameEs",
                "secondary-locale name is present but empty".to_string(),
            );
        }
    }
    for (i, alt) in record.alternate_names.iter().enumerate() {
        if alt.trim().is_empty() {
            push(
                &mut findings,
                RuleId::EmptyTag,
                &format!("alternateNames[{i}]"),
                "empty alternate name".to_string(),
            );
        }
    }

    validate_levels(record, mode, &mut findings);
    validate_citations(record, mode, &mut findings);
    validate_media(record, mode, &mut findings);
    validate_tags(record, mode, &mut findings);

    for (path, raw) in [
        ("createdAt", &record.created_at),
        ("updatedAt", &record.updated_at),
    ] {
        if let Some(raw) = raw {
            if parse_date(raw).is_none() {
                push(
                    &mut findings,
                    RuleId::InvalidTimestamp,
                    path,
                    format!("'{raw}' is not a calendar date"),
                );
            }
        }
    }

    findings
}

fn validate_levels(record: &ContentRecord, mode: ValidationMode, findings: &mut Vec<Finding>) {
    let id = record.id.as_str();

    if record.levels.is_empty() {
        findings.push(Finding::new(
            RuleId::NoLevels,
            mode,
            id,
            "levels",
            "record has no level entries",
        ));
        return;
    }

    for anomaly in record.levels.anomalies() {
        let finding = match anomaly {
            LayoutAnomaly::OutOfRange { declared, index } => Finding::new(
                RuleId::LevelOutOfRange,
                mode,
                id,
                format!("levels[{index}].level"),
                format!("level {declared} is outside 1..=5; entry dropped"),
            ),
            LayoutAnomaly::DuplicateLevel { level, index } => Finding::new(
                RuleId::DuplicateLevel,
                mode,
                id,
                format!("levels[{index}].level"),
                format!("level {level} is declared more than once; first entry kept"),
            ),
            LayoutAnomaly::KeyMismatch { key, declared } => Finding::new(
                RuleId::LevelKeyMismatch,
                mode,
                id,
                format!("levels[{key}].level"),
                format!("entry keyed {key} declares level {declared}; the key wins"),
            ),
            LayoutAnomaly::UnparseableKey { key } => Finding::new(
                RuleId::LevelOutOfRange,
                mode,
                id,
                format!("levels[{key}]"),
                format!("level key '{key}' is not an integer; entry dropped"),
            ),
        };
        findings.push(finding);
    }

    for gap in record.levels.gaps() {
        findings.push(Finding::new(
            RuleId::LevelGap,
            mode,
            id,
            format!("levels[{gap}]"),
            format!("level {gap} is missing below a higher authored level"),
        ));
    }

    for (n, entry) in record.levels.iter() {
        if entry.content.trim().is_empty() {
            findings.push(Finding::new(
                RuleId::EmptyBody,
                mode,
                id,
                format!("levels[{n}].content"),
                "primary-locale body is empty",
            ));
        }
        if entry
            .content_es
            .as_deref()
            .map_or(true, |c| c.trim().is_empty())
        {
            findings.push(Finding::new(
                RuleId::MissingSecondaryLocale,
                mode,
                id,
                format!("levels[{n}].contentEs"),
                "no Spanish body at this level; queries will fall back to English",
            ));
        }

        let mut seen_terms: Vec<String> = Vec::with_capacity(entry.key_terms.len());
        for (i, key_term) in entry.key_terms.iter().enumerate() {
            if key_term.term.trim().is_empty() || key_term.definition.trim().is_empty() {
                findings.push(Finding::new(
                    RuleId::EmptyKeyTerm,
                    mode,
                    id,
                    format!("levels[{n}].keyTerms[{i}]"),
                    "key term and definition must both be non-empty",
                ));
                continue;
            }
            let normalized = normalize_term(&key_term.term);
            if seen_terms.contains(&normalized) {
                findings.push(Finding::new(
                    RuleId::DuplicateKeyTerm,
                    mode,
                    id,
                    format!("levels[{n}].keyTerms[{i}].term"),
                    format!("term '{}' repeats within level {n}", key_term.term),
                ));
            } else {
                seen_terms.push(normalized);
            }
        }

        for (list_name, list) in [
            ("patientCounselingPoints", &entry.patient_counseling_points),
            ("clinicalNotes", &entry.clinical_notes),
            ("analogies", &entry.analogies),
            ("examples", &entry.examples),
        ] {
            for (i, item) in list.iter().enumerate() {
                if item.trim().is_empty() {
                    findings.push(Finding::new(
                        RuleId::EmptyAdvisoryEntry,
                        mode,
                        id,
                        format!("levels[{n}].{list_name}[{i}]"),
                        "advisory entries must be non-empty",
                    ));
                }
            }
        }
    }
}

fn validate_citations(record: &ContentRecord, mode: ValidationMode, findings: &mut Vec<Finding>) {
    let id = record.id.as_str();
    let record_updated = record.updated_at.as_deref().and_then(parse_date);

    for (i, citation) in record.citations.iter().enumerate() {
        if let Some(raw_url) = citation.url.as_deref() {
            if Url::parse(raw_url).is_err() {
                findings.push(Finding::new(
                    RuleId::InvalidCitationUrl,
                    mode,
                    id,
                    format!("citations[{i}].url"),
                    format!("'{raw_url}' is not an absolute URL"),
                ));
            }
        }
        if let Some(raw_date) = citation.accessed_date.as_deref() {
            match parse_date(raw_date) {
                None => findings.push(Finding::new(
                    RuleId::InvalidTimestamp,
                    mode,
                    id,
                    format!("citations[{i}].accessedDate"),
                    format!("'{raw_date}' is not a calendar date"),
                )),
                Some(accessed) => {
                    if let Some(updated) = record_updated {
                        if accessed > updated {
                            findings.push(Finding::new(
                                RuleId::CitationDateInFuture,
                                mode,
                                id,
                                format!("citations[{i}].accessedDate"),
                                format!("accessed {accessed} is after record update {updated}"),
                            ));
                        }
                    }
                }
            }
        }
    }
}

fn validate_media(record: &ContentRecord, mode: ValidationMode, findings: &mut Vec<Finding>) {
    for (i, item) in record.media.iter().enumerate() {
        if let Some(raw_url) = item.url.as_deref() {
            if Url::parse(raw_url).is_err() {
                findings.push(Finding::new(
                    RuleId::InvalidMediaUrl,
                    mode,
                    &record.id,
                    format!("media[{i}].url"),
                    format!("'{raw_url}' is not an absolute URL"),
                ));
            }
        }
    }
}

fn validate_tags(record: &ContentRecord, mode: ValidationMode, findings: &mut Vec<Finding>) {
    for (group, values) in [
        ("systems", &record.tags.systems),
        ("topics", &record.tags.topics),
        ("keywords", &record.tags.keywords),
    ] {
        for (i, value) in values.iter().enumerate() {
            if value.trim().is_empty() {
                findings.push(Finding::new(
                    RuleId::EmptyTag,
                    mode,
                    &record.id,
                    format!("tags.{group}[{i}]"),
                    "empty tag entry",
                ));
            }
        }
    }
}

//! Graph-wide cross-reference resolution.
//!
//! Runs after the registry has indexed all validly-id'd records. Dangling
//! references never prevent the referencing record from being served; they
//! are surfaced here for content maintainers and silently omitted by the
//! query surface.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{
    record::Relationship,
    registry::Registry,
    validate::{Finding, RuleId, ValidationMode},
};

/// A declared reference whose target id does not exist in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    pub source_id: String,
    pub target_id: String,
    pub reason: String,
}

/// A record referencing itself. Almost certainly an authoring error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfReference {
    pub source_id: String,
    pub index: usize,
}

/// The same (target, relationship) pair declared more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReference {
    pub source_id: String,
    pub target_id: String,
    pub relationship: Relationship,
    pub index: usize,
}

/// Mutual parent/parent or child/child declarations between the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipConflict {
    pub a: String,
    pub b: String,
    pub relationship: Relationship,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRefReport {
    pub dangling: Vec<DanglingReference>,
    pub self_references: Vec<SelfReference>,
    pub duplicates: Vec<DuplicateReference>,
    pub conflicts: Vec<RelationshipConflict>,
}

impl CrossRefReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
            && self.self_references.is_empty()
            && self.duplicates.is_empty()
            && self.conflicts.is_empty()
    }

    /// Flatten into findings for the build report.
    pub fn findings(&self, mode: ValidationMode) -> Vec<Finding> {
        let mut findings = Vec::new();
        for d in &self.dangling {
            findings.push(Finding::new(
                RuleId::DanglingReference,
                mode,
                &d.source_id,
                "crossReferences",
                format!("target '{}' {}", d.target_id, d.reason),
            ));
        }
        for s in &self.self_references {
            findings.push(Finding::new(
                RuleId::SelfReference,
                mode,
                &s.source_id,
                format!("crossReferences[{}]", s.index),
                "record references itself",
            ));
        }
        for dup in &self.duplicates {
            findings.push(Finding::new(
                RuleId::DuplicateReference,
                mode,
                &dup.source_id,
                format!("crossReferences[{}]", dup.index),
                format!(
                    "'{}' ({}) is declared more than once",
                    dup.target_id, dup.relationship
                ),
            ));
        }
        for c in &self.conflicts {
            findings.push(Finding::new(
                RuleId::RelationshipConflict,
                mode,
                &c.a,
                "crossReferences",
                format!(
                    "'{}' and '{}' each declare the other as {}",
                    c.a, c.b, c.relationship
                ),
            ));
        }
        findings
    }
}

/// Walk every indexed record's cross-references and report dangling targets,
/// self-references, duplicate declarations, and parent/child symmetry
/// conflicts. The symmetry check is a heuristic: one-directional `related`
/// links are expected and never flagged.
pub fn resolve(registry: &Registry) -> CrossRefReport {
    let mut report = CrossRefReport::default();
    let mut conflict_pairs: BTreeSet<(String, String, Relationship)> = BTreeSet::new();

    for record in registry.records() {
        let mut seen: BTreeSet<(&str, Relationship)> = BTreeSet::new();
        for (index, xref) in record.cross_references.iter().enumerate() {
            let target = xref.target_id.as_str();
            if target.trim().is_empty() {
                report.dangling.push(DanglingReference {
                    source_id: record.id.clone(),
                    target_id: String::new(),
                    reason: "is empty".to_string(),
                });
                continue;
            }
            if target == record.id {
                report.self_references.push(SelfReference {
                    source_id: record.id.clone(),
                    index,
                });
                continue;
            }
            if !seen.insert((target, xref.relationship)) {
                report.duplicates.push(DuplicateReference {
                    source_id: record.id.clone(),
                    target_id: xref.target_id.clone(),
                    relationship: xref.relationship,
                    index,
                });
                continue;
            }
            let Some(other) = registry.record(target) else {
                report.dangling.push(DanglingReference {
                    source_id: record.id.clone(),
                    target_id: xref.target_id.clone(),
                    reason: "does not exist in the registry".to_string(),
                });
                continue;
            };
            // Hierarchy symmetry: A->parent->B alongside B->parent->A (or
            // child/child) cannot both hold.
            if matches!(xref.relationship, Relationship::Parent | Relationship::Child)
                && other
                    .cross_references
                    .iter()
                    .any(|back| back.target_id == record.id && back.relationship == xref.relationship)
            {
                let (a, b) = if record.id < other.id {
                    (record.id.clone(), other.id.clone())
                } else {
                    (other.id.clone(), record.id.clone())
                };
                if conflict_pairs.insert((a.clone(), b.clone(), xref.relationship)) {
                    report.conflicts.push(RelationshipConflict {
                        a,
                        b,
                        relationship: xref.relationship,
                    });
                }
            }
        }
    }

    tracing::debug!(
        "[xref::resolve] {} dangling, {} self, {} duplicate, {} conflicting",
        report.dangling.len(),
        report.self_references.len(),
        report.duplicates.len(),
        report.conflicts.len()
    );
    report
}

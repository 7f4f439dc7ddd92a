//! Registry: the immutable in-memory index over all loaded content records.
//!
//! Built once from a content-source collaborator, validated as a batch, then
//! shared freely across readers. The registry owns two structures: the
//! id→record index and the cross-reference graph over indexed records.
//! Rebuilds produce a new instance swapped in via [RegistryHandle]; a served
//! record is never mutated in place.

use parking_lot::RwLock;
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use crate::{
    config::RegistryOptions,
    error::DidactError,
    record::{ContentRecord, Locale, Relationship},
    resolver::{self, ResolvedContent},
    source::ContentSource,
    validate::{validate_record, Finding, RuleId, ValidationMode, ValidationReport},
    xref,
};

/// Directed cross-reference graph over indexed record ids. Node weights are
/// record ids, edge weights the declared relationship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefGraph(pub DiGraph<String, Relationship>);

impl RefGraph {
    pub fn as_graph(&self) -> &DiGraph<String, Relationship> {
        &self.0
    }

    pub fn edge_count(&self) -> usize {
        self.0.edge_count()
    }
}

#[derive(Debug)]
pub struct Registry {
    by_id: BTreeMap<String, Arc<ContentRecord>>,
    graph: RefGraph,
    id_to_index: BTreeMap<String, NodeIndex>,
    mode: ValidationMode,
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Registry({} records, {} references)",
            self.by_id.len(),
            self.graph.edge_count()
        )
    }
}

impl Registry {
    /// Build a registry from fully-materialized records.
    ///
    /// Never partially indexes a record that fails a hard invariant: such
    /// records are excluded from the index and graph and listed in the
    /// report's errors. Records failing only soft invariants are indexed and
    /// listed in the warnings. Duplicate ids are an error, never a silent
    /// overwrite: in lenient mode the first occurrence wins, in strict mode
    /// no occurrence survives. In strict mode a dangling cross-reference
    /// rejects the whole load.
    pub fn build(
        records: Vec<ContentRecord>,
        options: RegistryOptions,
    ) -> (Registry, ValidationReport) {
        let mode = options.mode;
        let mut report = ValidationReport::default();
        let mut by_id: BTreeMap<String, Arc<ContentRecord>> = BTreeMap::new();
        let mut seen_ids: BTreeSet<String> = BTreeSet::new();
        let mut duplicated: BTreeSet<String> = BTreeSet::new();

        tracing::debug!(
            "[Registry::build] Validating {} records ({:?} mode)",
            records.len(),
            mode
        );

        for record in records {
            let findings = validate_record(&record, mode);
            let excluded = findings.iter().any(|f| f.rule.excludes_record(mode));
            report.extend(findings);

            if record.id.trim().is_empty() {
                continue;
            }
            if !seen_ids.insert(record.id.clone()) {
                report.push(Finding::new(
                    RuleId::DuplicateId,
                    mode,
                    &record.id,
                    "id",
                    format!("id '{}' is already registered", record.id),
                ));
                duplicated.insert(record.id.clone());
                continue;
            }
            if excluded {
                tracing::debug!(
                    "[Registry::build] Excluding '{}' on hard findings",
                    record.id
                );
                continue;
            }
            by_id.insert(record.id.clone(), Arc::new(record));
        }

        // Strict mode keeps zero entries for a colliding id; lenient keeps
        // the first occurrence.
        if mode == ValidationMode::Strict {
            for id in &duplicated {
                by_id.remove(id);
            }
        }

        let (graph, id_to_index) = Self::build_graph(&by_id);
        let mut registry = Registry {
            by_id,
            graph,
            id_to_index,
            mode,
        };

        let xref_report = xref::resolve(&registry);
        let has_dangling = !xref_report.dangling.is_empty();
        report.extend(xref_report.findings(mode));

        if mode == ValidationMode::Strict && has_dangling {
            tracing::warn!(
                "[Registry::build] Rejecting load: dangling cross-references in strict mode"
            );
            registry.by_id.clear();
            registry.id_to_index.clear();
            registry.graph = RefGraph::default();
        }

        tracing::info!(
            "[Registry::build] {} ({} errors, {} warnings)",
            registry,
            report.errors.len(),
            report.warnings.len()
        );
        (registry, report)
    }

    /// Load from a content-source collaborator, then build. Module parse
    /// failures surface as `MODULE_PARSE` findings, not as an `Err`; only
    /// genuine source failures (unreadable root, I/O) abort.
    pub fn build_from(
        source: &dyn ContentSource,
        options: RegistryOptions,
    ) -> Result<(Registry, ValidationReport), DidactError> {
        let batch = source.load()?;
        let (registry, mut report) = Registry::build(batch.records, options);
        report.extend(batch.findings);
        Ok((registry, report))
    }

    fn build_graph(
        by_id: &BTreeMap<String, Arc<ContentRecord>>,
    ) -> (RefGraph, BTreeMap<String, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut id_to_index = BTreeMap::new();
        for id in by_id.keys() {
            let index = graph.add_node(id.clone());
            id_to_index.insert(id.clone(), index);
        }
        for (id, record) in by_id {
            let source_index = id_to_index[id];
            let mut seen: BTreeSet<(&str, Relationship)> = BTreeSet::new();
            for xref in &record.cross_references {
                if xref.target_id == *id
                    || !seen.insert((xref.target_id.as_str(), xref.relationship))
                {
                    continue;
                }
                if let Some(target_index) = id_to_index.get(&xref.target_id) {
                    graph.add_edge(source_index, *target_index, xref.relationship);
                }
            }
        }
        (RefGraph(graph), id_to_index)
    }

    /// The validation mode this registry was built under.
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn record(&self, id: &str) -> Option<&Arc<ContentRecord>> {
        self.by_id.get(id)
    }

    /// Indexed records in id order.
    pub fn records(&self) -> impl Iterator<Item = &Arc<ContentRecord>> {
        self.by_id.values()
    }

    /// Indexed ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn graph(&self) -> &RefGraph {
        &self.graph
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// Outgoing resolvable references from a record, in graph order.
    pub fn outgoing(&self, id: &str) -> Vec<(&str, Relationship)> {
        let Some(index) = self.node_index(id) else {
            return Vec::new();
        };
        self.graph
            .as_graph()
            .edges(index)
            .map(|edge| {
                (
                    self.graph.as_graph()[edge.target()].as_str(),
                    *edge.weight(),
                )
            })
            .collect()
    }

    /// The query surface: best-available content for a topic at a requested
    /// level and locale, with fallbacks flagged on the response. `None`
    /// means no such topic (or no level at or below the request) — a normal
    /// outcome callers must handle, never a panic.
    pub fn get(&self, topic_id: &str, level: u8, locale: Locale) -> Option<ResolvedContent> {
        resolver::lookup(self, topic_id, level, locale)
    }
}

/// Shared handle over an immutable registry snapshot.
///
/// Readers take cheap `Arc` clones via [RegistryHandle::current] and keep the
/// snapshot they started with; a rebuild produces a new registry and
/// [RegistryHandle::swap]s it in atomically, so in-flight reads never observe
/// a half-updated index.
pub struct RegistryHandle(Arc<RwLock<Arc<Registry>>>);

impl Clone for RegistryHandle {
    fn clone(&self) -> Self {
        RegistryHandle(self.0.clone())
    }
}

impl RegistryHandle {
    pub fn new(registry: Registry) -> Self {
        RegistryHandle(Arc::new(RwLock::new(Arc::new(registry))))
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<Registry> {
        self.0.read().clone()
    }

    /// Replace the live snapshot, returning the previous one.
    pub fn swap(&self, next: Registry) -> Arc<Registry> {
        let next = Arc::new(next);
        let mut writer = self.0.write();
        std::mem::replace(&mut *writer, next)
    }
}

//! # didact-core
//!
//! A Rust library for indexing, validating, and serving leveled bilingual
//! educational content.
//!
//! The name "didact" comes from "didactic" - intended to teach.
//!
//! ## Overview
//!
//! didact-core ingests independently authored content modules - each a topic
//! or concept carrying up to five reading-complexity levels, English and
//! Spanish bodies, key terms, citations, and cross-references to other topics
//! - and builds an immutable, queryable **Registry**. Structural invariants
//! are enforced as a batch at load time so that query time is read-only and
//! fail-fast.
//!
//! ### Key Features
//!
//! - **Two-tier validation**: every structural problem becomes a [`Finding`]
//!   with a stable rule code, severity, and in-record path; hard findings
//!   exclude a record from service, soft findings only report
//! - **Dual-layout normalization**: authored `levels` containers arrive as
//!   either a sequence or a numbered map and are normalized to one canonical
//!   shape at the serde boundary
//! - **Cross-reference resolution**: dangling targets, self-references, and
//!   parent/child symmetry conflicts are reported graph-wide at load time
//! - **Flagged fallback**: level fallback is only ever downward, locale
//!   fallback only ever to the primary locale, and both are flagged on the
//!   response - callers can always tell a substitute from an exact answer
//! - **Snapshot semantics**: a built [`registry::Registry`] is immutable and
//!   freely shared across readers; content updates build a new instance and
//!   atomically swap it in via [`registry::RegistryHandle`]
//!
//! ## Quick Start
//!
//! ```rust
//! use didact_core::{
//!     config::RegistryOptions,
//!     record::Locale,
//!     registry::Registry,
//!     source::{ContentSource, MemorySource},
//! };
//!
//! fn main() -> Result<(), didact_core::DidactError> {
//!     // Content modules usually come from a directory scan
//!     // (`TomlDirSource`/`JsonDirSource`); any already-materialized list
//!     // works the same way.
//!     let source = MemorySource(Vec::new());
//!     let batch = source.load()?;
//!
//!     let (registry, report) = Registry::build(batch.records, RegistryOptions::default());
//!
//!     // The report is for content maintainers and CI, never end users.
//!     for finding in report.errors.iter().chain(report.warnings.iter()) {
//!         eprintln!("{finding}");
//!     }
//!
//!     // Query-time absence and fallback are normal outcomes, not errors.
//!     if let Some(resolved) = registry.get("topic-air-quality-respiratory", 3, Locale::Es) {
//!         println!("serving level {} ({})", resolved.actual_level, resolved.actual_locale);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Load-time batch validation
//!
//! [`registry::Registry::build`] validates every record against a fixed rule
//! table ([`validate::RuleId`]), walks the cross-reference graph, and returns
//! the registry together with a [`validate::ValidationReport`]. Nothing about
//! authoring quality is thrown: incomplete content is reported and, where
//! possible, still served.
//!
//! ### The fallback contract
//!
//! [`registry::Registry::get`] never substitutes silently:
//!
//! - a missing level falls back to the nearest *lower* authored level
//!   (`applied_fallback` + `actual_level` on the response);
//! - a missing Spanish body falls back to the English one
//!   (`locale_fallback` + `actual_locale`);
//! - an unknown topic id returns `None`.
//!
//! ### Strict and lenient builds
//!
//! Content sets are large and partially authored, so the default
//! [`validate::ValidationMode::Lenient`] indexes everything that can be
//! served at all and reports the rest. `Strict` is for CI gates: any
//! error-grade finding excludes its record, and a dangling cross-reference
//! rejects the whole load.
//!
//! ## Module Guide
//!
//! Start with [`source`] to load modules and [`registry`] to build and query.
//! See [`record`] for the data model, [`validate`] for the rule table, and
//! [`xref`] for graph-wide reference checks.

pub mod config;
pub mod error;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod validate;
pub mod xref;

pub use error::*;
pub use validate::Finding;

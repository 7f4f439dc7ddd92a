//! End-to-end build tests: scan a content tree, build the registry, and
//! verify the validation report and exclusion policy.

mod common;

use tempfile::tempdir;
use test_log::test;

use didact_core::{
    config::RegistryOptions,
    registry::Registry,
    source::{ContentSource, TomlDirSource},
    validate::{RuleId, Severity, ValidationMode},
};

#[test]
fn test_build_from_content_tree() {
    let temp = tempdir().unwrap();
    let root = common::create_content_tree(&temp);

    let (registry, report) =
        Registry::build_from(&TomlDirSource::new(&root), RegistryOptions::lenient()).unwrap();

    // All three modules are serveable in lenient mode.
    assert_eq!(registry.len(), 3);
    assert!(registry.contains("condition-dialysis"));
    assert!(registry.contains("condition-chronic-kidney-disease"));
    assert!(registry.contains("topic-air-quality-respiratory"));

    // CKD has a gap at level 3.
    assert!(report
        .errors
        .iter()
        .any(|f| f.rule == RuleId::LevelGap
            && f.record_id == "condition-chronic-kidney-disease"
            && f.path == "levels[3]"));

    // The asthma reference dangles; exactly one finding for it.
    let dangling: Vec<_> = report
        .warnings
        .iter()
        .filter(|f| f.rule == RuleId::DanglingReference)
        .collect();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].record_id, "topic-air-quality-respiratory");
    assert_eq!(dangling[0].severity, Severity::Warning);

    // English-only levels surface as soft bilingual-parity warnings.
    assert!(report
        .warnings
        .iter()
        .any(|f| f.rule == RuleId::MissingSecondaryLocale
            && f.record_id == "condition-dialysis"
            && f.path == "levels[3].contentEs"));
}

#[test]
fn test_graph_contains_only_resolvable_references() {
    let temp = tempdir().unwrap();
    let root = common::create_content_tree(&temp);

    let (registry, _) =
        Registry::build_from(&TomlDirSource::new(&root), RegistryOptions::lenient()).unwrap();

    // air-quality declared two references; only the dialysis one resolves.
    let outgoing = registry.outgoing("topic-air-quality-respiratory");
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].0, "condition-dialysis");
}

#[test]
fn test_duplicate_id_across_files() {
    let temp = tempdir().unwrap();
    let root = common::create_content_tree(&temp);
    // A second module claiming an already-registered id.
    common::write_module(
        &root.join("nephrology"),
        "dialysis-copy.toml",
        common::DIALYSIS_MODULE,
    );

    let (registry, report) =
        Registry::build_from(&TomlDirSource::new(&root), RegistryOptions::lenient()).unwrap();

    let dups: Vec<_> = report
        .errors
        .iter()
        .filter(|f| f.rule == RuleId::DuplicateId)
        .collect();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].record_id, "condition-dialysis");
    // Lenient: exactly one entry survives.
    assert_eq!(registry.len(), 3);

    let (strict_registry, strict_report) =
        Registry::build_from(&TomlDirSource::new(&root), RegistryOptions::strict()).unwrap();
    assert!(strict_report
        .errors
        .iter()
        .any(|f| f.rule == RuleId::DuplicateId));
    // Strict: no entry for the colliding id survives.
    assert!(!strict_registry.contains("condition-dialysis"));
}

#[test]
fn test_strict_mode_rejects_load_with_dangling_references() {
    let temp = tempdir().unwrap();
    let root = common::create_content_tree(&temp);

    let (registry, report) =
        Registry::build_from(&TomlDirSource::new(&root), RegistryOptions::strict()).unwrap();

    // The fixture tree contains a dangling reference, so the strict build
    // keeps nothing.
    assert!(registry.is_empty());
    assert!(report
        .errors
        .iter()
        .any(|f| f.rule == RuleId::DanglingReference));
    assert_eq!(registry.mode(), ValidationMode::Strict);
}

#[test]
fn test_malformed_module_reported_not_fatal() {
    let temp = tempdir().unwrap();
    let root = common::create_content_tree(&temp);
    common::write_module(&root, "broken.toml", "id = \"oops\"\nlevels = [[");

    let (registry, report) =
        Registry::build_from(&TomlDirSource::new(&root), RegistryOptions::lenient()).unwrap();

    assert_eq!(registry.len(), 3);
    let parse_failures: Vec<_> = report
        .errors
        .iter()
        .filter(|f| f.rule == RuleId::ModuleParse)
        .collect();
    assert_eq!(parse_failures.len(), 1);
    assert!(parse_failures[0].record_id.ends_with("broken.toml"));
}

#[test]
fn test_rebuild_is_deterministic() {
    let temp = tempdir().unwrap();
    let root = common::create_content_tree(&temp);
    let source = TomlDirSource::new(&root);

    let (r1, report1) = Registry::build_from(&source, RegistryOptions::lenient()).unwrap();
    let (r2, report2) = Registry::build_from(&source, RegistryOptions::lenient()).unwrap();

    assert_eq!(report1, report2);
    assert_eq!(r1.ids().collect::<Vec<_>>(), r2.ids().collect::<Vec<_>>());
}

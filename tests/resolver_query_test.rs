//! Query-surface tests over a realistic content tree: the fallback contract,
//! absence handling, cross-reference filtering, and snapshot swapping.

mod common;

use tempfile::tempdir;
use test_log::test;

use didact_core::{
    config::RegistryOptions,
    record::Locale,
    registry::{Registry, RegistryHandle},
    source::TomlDirSource,
};

fn build_fixture_registry() -> Registry {
    let temp = tempdir().unwrap();
    let root = common::create_content_tree(&temp);
    let (registry, _) =
        Registry::build_from(&TomlDirSource::new(&root), RegistryOptions::lenient()).unwrap();
    registry
}

#[test]
fn test_exact_bilingual_hit() {
    let registry = build_fixture_registry();
    let resolved = registry
        .get("condition-dialysis", 1, Locale::Es)
        .expect("dialysis is indexed");

    assert_eq!(resolved.actual_level, 1);
    assert!(!resolved.applied_fallback);
    assert!(!resolved.locale_fallback);
    assert_eq!(resolved.name, "Diálisis");
    assert!(resolved.body.starts_with("La diálisis es un tratamiento"));
    assert_eq!(resolved.key_terms.len(), 2);
    assert_eq!(resolved.advisory_points.patient_counseling.len(), 2);
}

#[test]
fn test_unknown_topic_returns_none() {
    let registry = build_fixture_registry();
    assert!(registry.get("topic-does-not-exist", 1, Locale::En).is_none());
}

#[test]
fn test_level_fallback_over_gap() {
    let registry = build_fixture_registry();

    // CKD has levels {1, 2, 4}: level 3 falls back to 2.
    let resolved = registry
        .get("condition-chronic-kidney-disease", 3, Locale::En)
        .unwrap();
    assert_eq!(resolved.actual_level, 2);
    assert!(resolved.applied_fallback);
    assert_eq!(resolved.level, 3);

    // The gap below does not invalidate serving level 4 exactly.
    let resolved = registry
        .get("condition-chronic-kidney-disease", 4, Locale::En)
        .unwrap();
    assert_eq!(resolved.actual_level, 4);
    assert!(!resolved.applied_fallback);
}

#[test]
fn test_locale_fallback_never_trades_level_for_language() {
    let registry = build_fixture_registry();

    // CKD level 4 exists in English only; levels 1-2 are bilingual. A
    // Spanish request for level 4 must serve English level 4, never a lower
    // Spanish level.
    let resolved = registry
        .get("condition-chronic-kidney-disease", 4, Locale::Es)
        .unwrap();
    assert_eq!(resolved.actual_level, 4);
    assert!(!resolved.applied_fallback);
    assert!(resolved.locale_fallback);
    assert_eq!(resolved.actual_locale, Locale::En);
    assert!(resolved.body.starts_with("Management targets"));
    // Display name still localizes independently of the body fallback.
    assert_eq!(resolved.name, "Enfermedad Renal Crónica");
}

#[test]
fn test_combined_fallback_above_gap() {
    let registry = build_fixture_registry();

    // Requesting level 5 in Spanish on CKD: level falls to 4, locale to
    // English, both flagged.
    let resolved = registry
        .get("condition-chronic-kidney-disease", 5, Locale::Es)
        .unwrap();
    assert_eq!(resolved.actual_level, 4);
    assert!(resolved.applied_fallback);
    assert!(resolved.locale_fallback);
}

#[test]
fn test_dangling_reference_never_served() {
    let registry = build_fixture_registry();

    let resolved = registry
        .get("topic-air-quality-respiratory", 1, Locale::En)
        .unwrap();
    // Two references declared, only the resolvable one served.
    assert_eq!(resolved.cross_references.len(), 1);
    assert_eq!(resolved.cross_references[0].target_id, "condition-dialysis");
    assert_eq!(resolved.cross_references[0].target_name, "Dialysis");
}

#[test]
fn test_cross_reference_names_localize() {
    let registry = build_fixture_registry();

    let resolved = registry
        .get("topic-air-quality-respiratory", 1, Locale::Es)
        .unwrap();
    assert_eq!(resolved.cross_references[0].target_name, "Diálisis");
}

#[test]
fn test_citations_travel_with_response() {
    let registry = build_fixture_registry();
    let resolved = registry.get("condition-dialysis", 2, Locale::En).unwrap();
    assert_eq!(resolved.citations.len(), 1);
    assert!(resolved.citations[0]
        .url
        .as_deref()
        .unwrap()
        .starts_with("https://"));
}

#[test]
fn test_per_level_titles() {
    let registry = build_fixture_registry();
    let resolved = registry
        .get("topic-air-quality-respiratory", 1, Locale::Es)
        .unwrap();
    assert_eq!(resolved.title.as_deref(), Some("Respirar Bien"));

    let resolved = registry
        .get("topic-air-quality-respiratory", 1, Locale::En)
        .unwrap();
    assert_eq!(resolved.title.as_deref(), Some("Breathing Easy"));
}

#[test]
fn test_handle_swap_is_atomic_for_readers() {
    let temp = tempdir().unwrap();
    let root = common::create_content_tree(&temp);
    let source = TomlDirSource::new(&root);

    let (first, _) = Registry::build_from(&source, RegistryOptions::lenient()).unwrap();
    let handle = RegistryHandle::new(first);

    // A reader takes a snapshot before the content update lands.
    let snapshot = handle.current();
    assert!(snapshot.contains("condition-dialysis"));

    // Author a new module and rebuild into the same handle.
    common::write_module(
        &root,
        "asthma.toml",
        r#"
id = "condition-asthma"
type = "condition"
name = "Asthma"
nameEs = "Asma"

[levels.1]
content = "Asthma makes the airways in your lungs sensitive and swollen."
contentEs = "El asma hace que las vías respiratorias de los pulmones sean sensibles."
"#,
    );
    let (second, _) = Registry::build_from(&source, RegistryOptions::lenient()).unwrap();
    handle.swap(second);

    // The old snapshot is unchanged; new readers see the new topic and the
    // formerly dangling reference now resolves.
    assert!(!snapshot.contains("condition-asthma"));
    let current = handle.current();
    assert!(current.contains("condition-asthma"));
    let resolved = current
        .get("topic-air-quality-respiratory", 1, Locale::En)
        .unwrap();
    assert_eq!(resolved.cross_references.len(), 2);
}

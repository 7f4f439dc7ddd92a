//! Basic usage example for didact
//!
//! This example demonstrates:
//! - Authoring content modules in both `levels` layouts
//! - Building a Registry with a validation report
//! - Querying with level and locale fallback
//!
//! Run with: cargo run --example basic_usage

use didact_core::{
    config::RegistryOptions,
    record::Locale,
    registry::Registry,
    source::TomlDirSource,
    DidactError,
};
use std::path::Path;
use tempfile::TempDir;

fn main() -> Result<(), DidactError> {
    // Set up logging to see what's happening
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== didact Basic Usage Example ===\n");

    // Create a temporary directory for our example content modules
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let content_path = temp_dir.path().to_path_buf();

    println!("1. Authoring example modules in {content_path:?}...");
    create_example_modules(&content_path)?;

    // 2. Build the registry from the content tree
    println!("2. Building registry...");
    let source = TomlDirSource::new(&content_path);
    let (registry, report) = Registry::build_from(&source, RegistryOptions::lenient())?;
    println!("   ✓ Indexed {registry}\n");

    // 3. Query with an exact hit
    println!("3. Exact query (level 1, Spanish):");
    if let Some(resolved) = registry.get("condition-asthma", 1, Locale::Es) {
        println!("   {} — {}", resolved.name, resolved.body);
    }
    println!();

    // 4. Demonstrate the fallback contract
    println!("4. Fallback behavior:");
    if let Some(resolved) = registry.get("condition-asthma", 5, Locale::Es) {
        println!(
            "   Asked for level 5/es, served level {}/{} (level fallback: {}, locale fallback: {})",
            resolved.actual_level,
            resolved.actual_locale,
            resolved.applied_fallback,
            resolved.locale_fallback
        );
    }
    if registry.get("topic-unknown", 1, Locale::En).is_none() {
        println!("   Unknown topics come back as None, never a panic");
    }
    println!();

    // 5. Explore the cross-reference graph
    println!("5. Cross-references:");
    for id in registry.ids() {
        for (target, relationship) in registry.outgoing(id) {
            println!("   {id} ↦ {target} ({relationship})");
        }
    }
    println!();

    // 6. Show the validation report
    println!("6. Validation report:");
    if report.is_clean() {
        println!("   ✓ No issues found!");
    } else {
        for finding in report.errors.iter().chain(report.warnings.iter()) {
            println!("   {finding}");
        }
    }
    println!();

    println!("=== Example Complete ===");
    Ok(())
}

/// Create example content modules in the temporary directory
fn create_example_modules(base_path: &Path) -> std::io::Result<()> {
    use std::fs;

    // Numbered-map layout, fully bilingual at level 1 only
    fs::write(
        base_path.join("asthma.toml"),
        r#"
id = "condition-asthma"
type = "condition"
name = "Asthma"
nameEs = "Asma"
status = "published"
updatedAt = "2026-02-05"

[levels.1]
explanation = "Asthma makes the airways in your lungs sensitive and swollen, so breathing gets hard."
explanationEs = "El asma hace que las vías respiratorias se inflamen, dificultando la respiración."

[[levels.1.keyTerms]]
term = "airway"
definition = "The tubes that carry air into your lungs."

[levels.2]
explanation = "Triggers such as smoke, pollen, and cold air cause airway narrowing and mucus production."

[[crossReferences]]
targetId = "topic-air-quality"
relationship = "related"
"#,
    )?;

    // Sequence layout
    fs::write(
        base_path.join("air-quality.toml"),
        r#"
id = "topic-air-quality"
type = "topic"
name = "Air Quality"
nameEs = "Calidad del Aire"
status = "published"
updatedAt = "2026-02-05"

[[levels]]
level = 1
content = "The Air Quality Index is like a weather report for air pollution."
contentEs = "El Índice de Calidad del Aire es como un informe del tiempo para la contaminación."

[[crossReferences]]
targetId = "condition-asthma"
relationship = "related"
label = "poor air quality can trigger attacks"
"#,
    )?;

    Ok(())
}

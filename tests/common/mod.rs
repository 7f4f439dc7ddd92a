//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times — subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A bilingual condition module using the numbered-map `levels` layout, with
/// key terms, counseling points, citations, and a cross-reference.
#[allow(dead_code)]
pub const DIALYSIS_MODULE: &str = r#"
id = "condition-dialysis"
type = "condition"
name = "Dialysis"
nameEs = "Diálisis"
alternateNames = ["Hemodialysis", "Renal Replacement Therapy"]
status = "published"
version = 1
createdAt = "2026-01-10"
updatedAt = "2026-02-05"

[levels.1]
summary = "Dialysis cleans the blood when the kidneys no longer can."
explanation = "Dialysis is a treatment that does the kidneys' job: it cleans the blood and removes excess fluid."
explanationEs = "La diálisis es un tratamiento que hace el trabajo de los riñones: limpia la sangre y elimina el exceso de líquido."
patientCounselingPoints = [
    "Attend all your dialysis appointments.",
    "Follow the diet and fluid recommendations from your dialysis team.",
]

[[levels.1.keyTerms]]
term = "dialysis"
definition = "Treatment that cleans the blood and removes excess fluid."

[[levels.1.keyTerms]]
term = "fistula"
definition = "Surgically created connection between an artery and vein for hemodialysis."

[levels.2]
explanation = "Dialysis works by diffusion and ultrafiltration across a semipermeable membrane."
explanationEs = "La diálisis funciona por difusión y ultrafiltración a través de una membrana semipermeable."

[levels.3]
explanation = "Hemodialysis requires vascular access supporting 300-500 mL/min blood flow; an arteriovenous fistula is preferred."
clinicalNotes = [
    "Never draw blood or measure blood pressure on the access arm.",
]

[[citations]]
id = "ref-1"
type = "guideline"
title = "KDOQI Clinical Practice Guideline for Hemodialysis Adequacy: 2015 Update"
source = "American Journal of Kidney Diseases"
url = "https://www.ajkd.org/article/S0272-6386(15)01019-7/fulltext"
accessedDate = "2026-02-01"

[[crossReferences]]
targetId = "condition-chronic-kidney-disease"
relationship = "related"
label = "CKD as indication for dialysis"
"#;

/// A bilingual topic module using the sequence `levels` layout, including a
/// dangling cross-reference.
#[allow(dead_code)]
pub const AIR_QUALITY_MODULE: &str = r#"
id = "topic-air-quality-respiratory"
type = "topic"
name = "Air Quality and Respiratory Health"
nameEs = "Calidad del Aire y Salud Respiratoria"
status = "published"
updatedAt = "2026-02-05"

[[levels]]
level = 1
title = "Breathing Easy"
titleEs = "Respirar Bien"
content = "The air we breathe can be clean and healthy, or it can contain invisible particles and gases that make us sick."
contentEs = "El aire que respiramos puede ser limpio y saludable, o puede contener partículas y gases invisibles que nos enferman."

[[levels]]
level = 2
content = "The Air Quality Index uses a scale from 0 to 500 to communicate daily air pollution levels."

[[crossReferences]]
targetId = "condition-dialysis"
relationship = "related"

[[crossReferences]]
targetId = "condition-asthma"
relationship = "related"
label = "asthma triggers"
"#;

/// Chronic kidney disease module with a level gap (no level 3) and a level
/// authored in English only.
#[allow(dead_code)]
pub const CKD_MODULE: &str = r#"
id = "condition-chronic-kidney-disease"
type = "condition"
name = "Chronic Kidney Disease"
nameEs = "Enfermedad Renal Crónica"
status = "published"
updatedAt = "2026-02-05"

[levels.1]
content = "Chronic kidney disease means the kidneys slowly lose their ability to filter blood."
contentEs = "La enfermedad renal crónica significa que los riñones pierden lentamente su capacidad de filtrar la sangre."

[levels.2]
content = "CKD is staged 1-5 by estimated glomerular filtration rate."
contentEs = "La ERC se clasifica en etapas 1-5 según la tasa de filtración glomerular estimada."

[levels.4]
content = "Management targets blood pressure control with ACE inhibitors or ARBs, and SGLT2 inhibitors slow progression."

[[crossReferences]]
targetId = "condition-dialysis"
relationship = "child"
label = "dialysis as stage 5 treatment"
"#;

/// Write the three standard fixture modules into `<temp_dir>/content/`.
///
/// Returns the content root. The set exercises both level layouts, one level
/// gap, one English-only level, and one dangling cross-reference
/// (`condition-asthma` is never authored).
#[allow(dead_code)]
pub fn create_content_tree(temp_dir: &TempDir) -> PathBuf {
    let content_root = temp_dir.path().join("content");
    std::fs::create_dir(&content_root).unwrap();
    std::fs::create_dir(content_root.join("nephrology")).unwrap();
    std::fs::create_dir(content_root.join("environmental-health")).unwrap();

    write_module(
        &content_root.join("nephrology"),
        "dialysis.toml",
        DIALYSIS_MODULE,
    );
    write_module(&content_root.join("nephrology"), "ckd.toml", CKD_MODULE);
    write_module(
        &content_root.join("environmental-health"),
        "air-quality.toml",
        AIR_QUALITY_MODULE,
    );
    content_root
}

#[allow(dead_code)]
pub fn write_module(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; later calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Two KEGG-style pathways sharing TP53 and MDM2, plus one sharing nothing.
///
/// - `hsa04115` (p53 signaling): ATM -> TP53 -> MDM2, TP53 -> CDKN1A, MDM2 -> TP53
/// - `hsa04110` (cell cycle): CDKN1A -> CDK2, CCNE1 -> CDK2, CDK2 -> TP53, TP53 -> GADD45A,
///   GADD45A -> CDK1, and a CDK2/CCNE1 complex feeding glucose (for group handling)
/// - `hsa00010` (glycolysis): glucose -> G6P
#[allow(dead_code)]
pub const PATHWAYS: &str = r#"
[[entities]]
name = "hsa:472"
display_name = "ATM"
kind = "gene"

[[entities]]
name = "hsa:7157"
display_name = "TP53"
kind = "gene"

[[entities]]
name = "hsa:4193"
display_name = "MDM2"
kind = "gene"

[[entities]]
name = "hsa:1026"
display_name = "CDKN1A"
kind = "gene"

[[entities]]
name = "hsa:1017"
display_name = "CDK2"
kind = "gene"

[[entities]]
name = "hsa:898"
display_name = "CCNE1"
kind = "gene"

[[entities]]
name = "hsa:1647"
display_name = "GADD45A"
kind = "gene"

[[entities]]
name = "hsa:983"
display_name = "CDK1"
kind = "gene"

[[entities]]
name = "cpd:C00031"
display_name = "D-Glucose"
kind = "compound"

[[entities]]
name = "cpd:C00668"
display_name = "G6P"
kind = "compound"

[[pathways]]
name = "hsa04115"
title = "p53 signaling pathway"
database = "kegg"
image = "hsa04115.png"

[[pathways.vertices]]
label = "ATM"
entities = ["hsa:472"]
x = 20.0

[[pathways.vertices]]
label = "TP53"
entities = ["hsa:7157"]
x = 120.0

[[pathways.vertices]]
label = "MDM2"
entities = ["hsa:4193"]
x = 220.0

[[pathways.vertices]]
label = "CDKN1A"
entities = ["hsa:1026"]
x = 120.0
y = 80.0

[[pathways.edges]]
source = "ATM"
target = "TP53"

[[pathways.edges]]
source = "TP53"
target = "MDM2"

[[pathways.edges]]
source = "MDM2"
target = "TP53"

[[pathways.edges]]
source = "TP53"
target = "CDKN1A"

[[pathways]]
name = "hsa04110"
title = "Cell cycle"
database = "kegg"
image = "hsa04110.png"

[[pathways.vertices]]
label = "CDKN1A"
entities = ["hsa:1026"]

[[pathways.vertices]]
label = "CDK2"
entities = ["hsa:1017"]

[[pathways.vertices]]
label = "CCNE1"
entities = ["hsa:898"]

[[pathways.vertices]]
label = "TP53"
entities = ["hsa:7157"]

[[pathways.vertices]]
label = "GADD45A"
entities = ["hsa:1647"]

[[pathways.vertices]]
label = "CDK1"
entities = ["hsa:983"]

[[pathways.vertices]]
id = "cyclin-complex"
label = "CDK2/CCNE1"
grouped = ["CDK2", "CCNE1"]

[[pathways.vertices]]
id = "glc"
label = "D-Glucose"
shape = "circle"
entities = ["cpd:C00031"]

[[pathways.edges]]
source = "CDKN1A"
target = "CDK2"

[[pathways.edges]]
source = "CCNE1"
target = "CDK2"

[[pathways.edges]]
source = "CDK2"
target = "TP53"

[[pathways.edges]]
source = "TP53"
target = "GADD45A"

[[pathways.edges]]
source = "GADD45A"
target = "CDK1"

[[pathways.edges]]
source = "cyclin-complex"
target = "glc"
kind = "reaction"

[[pathways]]
name = "hsa00010"
title = "Glycolysis / Gluconeogenesis"
database = "kegg"

[[pathways.vertices]]
id = "glc"
label = "D-Glucose"
shape = "circle"
entities = ["cpd:C00031"]

[[pathways.vertices]]
id = "g6p"
label = "G6P"
shape = "circle"
entities = ["cpd:C00668"]

[[pathways.edges]]
source = "glc"
target = "g6p"
kind = "reaction"
"#;

/// Write [PATHWAYS] into `temp_dir` and return the file path.
#[allow(dead_code)]
pub fn write_pathways(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("pathways.toml");
    std::fs::write(&path, PATHWAYS).unwrap();
    path
}

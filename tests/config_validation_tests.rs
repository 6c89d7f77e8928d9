//! Config Validation Tests
//!
//! Typo detection, range warnings and hard validation failures for
//! `blendiq.toml`, exercised through the public config API and real files.

use blendiq::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use blendiq::config::{BlendiqConfig, ConfigError, GradientMethod};
use blendiq::types::{Limit, ParameterCategory};

use std::io::Write;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_solver_key_warns_with_suggestion() {
    let toml_str = r#"
[solver]
learning_rat = 0.02
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("learning_rat"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("solver.learning_rate")
    );
}

#[test]
fn typo_in_server_section_warns() {
    let toml_str = r#"
[server]
adr = "127.0.0.1:9000"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("server.addr"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[server]
addr = "0.0.0.0:9090"
optimize_timeout_secs = 10
max_body_bytes = 1048576
max_materials = 20

[solver]
max_iterations = 2000
learning_rate = 0.02
gradient_step = 1e-7
gradient = "central"
convergence_threshold = 1e-10
stagnation_window = 15
success_multiplier = 10.0
out_of_margin_penalty = 12.0
relax_schedule = [0.4, 0.6, 1.0]
projection_passes = 50

[reference]
zero_seeking = ["Lead", "Arsenic"]

[reference.limits]
"pH" = { lower = 6.0, upper = 8.0 }
Boron = { upper = 3.0 }

[reference.categories]
Boron = "other"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");
}

#[test]
fn unknown_limit_side_is_reported() {
    let toml_str = r#"
[reference.limits]
Lead = { uper = 300.0 }
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("upper"));
}

#[test]
fn unknown_top_level_section_warns() {
    let warnings = validate_unknown_keys("[solvr]\nmax_iterations = 10\n");
    assert!(warnings.iter().any(|w| w.field == "solvr"));
    assert!(warnings
        .iter()
        .any(|w| w.suggestion.as_deref() == Some("solver")));
}

#[test]
fn far_off_keys_get_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("completely_unrelated_key", &known).is_none());
}

// ============================================================================
// Parsing and Hard Validation
// ============================================================================

#[test]
fn partial_config_keeps_defaults() {
    let config = BlendiqConfig::from_toml_str(
        r#"
[solver]
gradient = "central"
"#,
    )
    .unwrap();
    assert_eq!(config.solver.gradient, GradientMethod::Central);
    assert_eq!(config.solver.max_iterations, 1000);
    assert_eq!(config.server.addr, "0.0.0.0:8080");
    assert_eq!(config.reference.standard_limit("Lead"), Limit::at_most(450.0));
}

#[test]
fn reference_tables_are_overridden_wholesale() {
    let config = BlendiqConfig::from_toml_str(
        r#"
[reference.limits]
Boron = { upper = 3.0 }

[reference.categories]
Boron = "heavy_metals"
"#,
    )
    .unwrap();
    assert_eq!(config.reference.limits.len(), 1);
    assert_eq!(config.reference.standard_limit("Boron"), Limit::at_most(3.0));
    assert!(config.reference.standard_limit("Lead").is_unbounded());
    assert_eq!(
        config.reference.category_of("Boron"),
        ParameterCategory::HeavyMetals
    );
    // Untouched table keeps the built-in values
    assert!(config.reference.is_zero_seeking("Lead"));
}

#[test]
fn non_increasing_relax_schedule_is_rejected() {
    let err = BlendiqConfig::from_toml_str(
        r#"
[solver]
relax_schedule = [0.5, 0.4]
"#,
    )
    .unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("strictly increasing")), "{errors:?}");
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn multiple_errors_are_collected() {
    let err = BlendiqConfig::from_toml_str(
        r#"
[solver]
learning_rate = 0.0
max_iterations = 0
relax_schedule = []

[server]
optimize_timeout_secs = 0

[reference.limits]
"pH" = { lower = 9.0, upper = 5.0 }
"#,
    )
    .unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.len(), 5, "{errors:?}");
}

#[test]
fn suspicious_values_only_warn() {
    let config = BlendiqConfig::from_toml_str(
        r#"
[solver]
learning_rate = 2.0
relax_schedule = [0.1, 0.5]
"#,
    )
    .unwrap();
    let warnings = validate_ranges(&config);
    assert_eq!(warnings.len(), 2, "{warnings:?}");
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_reads_and_validates() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nmax_materials = 12").unwrap();

    let config = BlendiqConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.server.max_materials, 12);
}

#[test]
fn parse_errors_name_the_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server\naddr = ").unwrap();

    let err = BlendiqConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(ref p, _) if p == file.path()));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BlendiqConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

#[test]
fn defaults_round_trip_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blendiq.toml");
    std::fs::write(&path, BlendiqConfig::default().to_toml().unwrap()).unwrap();

    let loaded = BlendiqConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, BlendiqConfig::default());
}

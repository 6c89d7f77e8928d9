//! Config validation: unknown-key detection with Levenshtein suggestions
//! and suspicious-value range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.
//!
//! `reference.limits` and `reference.categories` are open tables keyed by
//! parameter name, so only their entry shapes are checked.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Open tables whose children are parameter names.
const OPEN_TABLES: [&str; 2] = ["limits", "categories"];

/// Returns the complete set of valid dotted key paths for BlendiqConfig,
/// excluding the children of the open reference tables.
///
/// Maintained manually to match the struct hierarchy in blendiq_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [server]
        "server",
        "server.addr",
        "server.optimize_timeout_secs",
        "server.max_body_bytes",
        "server.max_materials",
        // [solver]
        "solver",
        "solver.max_iterations",
        "solver.learning_rate",
        "solver.gradient_step",
        "solver.gradient",
        "solver.convergence_threshold",
        "solver.stagnation_window",
        "solver.success_multiplier",
        "solver.out_of_margin_penalty",
        "solver.relax_schedule",
        "solver.projection_passes",
        // [reference]
        "reference",
        "reference.limits",
        "reference.zero_seeking",
        "reference.categories",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() && !is_open_table(&path) {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

fn is_open_table(path: &str) -> bool {
    OPEN_TABLES
        .iter()
        .any(|t| path.strip_prefix("reference.") == Some(*t))
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist > 3 {
            continue;
        }
        // Ties broken alphabetically so suggestions are deterministic
        let better = match best {
            None => true,
            Some((best_key, best_dist)) => dist < best_dist || (dist == best_dist && k < best_key),
        };
        if better {
            best = Some((k, dist));
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(&key, &known);
            warnings.push(ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            });
        }
    }

    if let Some(limits) = value
        .get("reference")
        .and_then(|r| r.get("limits"))
        .and_then(toml::Value::as_table)
    {
        warnings.extend(validate_limit_entries(limits));
    }

    warnings
}

/// Each `reference.limits.<param>` entry may only carry `lower` / `upper`.
fn validate_limit_entries(limits: &toml::map::Map<String, toml::Value>) -> Vec<ValidationWarning> {
    let sides: HashSet<&str> = ["lower", "upper"].into_iter().collect();
    let mut warnings = Vec::new();

    for (param, entry) in limits {
        let Some(table) = entry.as_table() else {
            warnings.push(ValidationWarning {
                field: format!("reference.limits.\"{param}\""),
                message: format!("reference.limits.\"{param}\" should be a table with lower/upper"),
                suggestion: None,
            });
            continue;
        };
        for side in table.keys() {
            if !sides.contains(side.as_str()) {
                warnings.push(ValidationWarning {
                    field: format!("reference.limits.\"{param}\".{side}"),
                    message: format!("Unknown limit key '{side}' for \"{param}\""),
                    suggestion: suggest_correction(side, &sides),
                });
            }
        }
    }

    warnings
}

// ============================================================================
// Suspicious Value Checks
// ============================================================================

/// Warnings for legal-but-suspicious settings on a parsed config.
pub fn validate_ranges(config: &super::BlendiqConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let s = &config.solver;

    if s.learning_rate > 1.0 {
        warnings.push(ValidationWarning {
            field: "solver.learning_rate".to_string(),
            message: format!(
                "learning_rate = {} is large; projected steps will oscillate",
                s.learning_rate
            ),
            suggestion: None,
        });
    }

    if let Some(first) = s.relax_schedule.first() {
        if *first < 0.15 {
            warnings.push(ValidationWarning {
                field: "solver.relax_schedule".to_string(),
                message: format!(
                    "relax_schedule starts at {first}, below the usual 15% minimum tolerance"
                ),
                suggestion: None,
            });
        }
    }

    if s.max_iterations > 100_000 {
        warnings.push(ValidationWarning {
            field: "solver.max_iterations".to_string(),
            message: format!(
                "max_iterations = {} may exceed the request timeout",
                s.max_iterations
            ),
            suggestion: None,
        });
    }

    for (name, limit) in &config.reference.limits {
        if limit.is_unbounded() {
            warnings.push(ValidationWarning {
                field: format!("reference.limits.\"{name}\""),
                message: format!("reference limit for \"{name}\" has neither lower nor upper"),
                suggestion: None,
            });
        }
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlendiqConfig;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("solver", "solver"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("learning_rat", "learning_rate"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [solver]
            learning_rate = 0.01
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"solver".to_string()));
        assert!(keys.contains(&"solver.learning_rate".to_string()));
    }

    #[test]
    fn test_walk_stops_at_open_tables() {
        let toml: toml::Value = r#"
            [reference.limits]
            Boron = { upper = 3.0 }
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"reference.limits".to_string()));
        assert!(!keys.iter().any(|k| k.contains("Boron")));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys(
            r#"
[solver]
learning_rat = 0.02
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("learning_rat"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("solver.learning_rate")
        );
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let warnings = validate_unknown_keys(
            r#"
zero_seeking_unused = false

[server]
addr = "127.0.0.1:8080"

[solver]
relax_schedule = [0.4, 0.6, 1.0]

[reference]
zero_seeking = ["Lead"]

[reference.limits]
"Stone Content (>2mm)" = { upper = 8.0 }
pH = { lower = 5.5, upper = 8.5 }

[reference.categories]
pH = "physical"
"#,
        );
        assert_eq!(warnings.len(), 1, "only the stray root key: {warnings:?}");
        assert_eq!(warnings[0].field, "zero_seeking_unused");
    }

    #[test]
    fn test_limit_entry_typo() {
        let warnings = validate_unknown_keys(
            r#"
[reference.limits]
Lead = { uper = 450.0 }
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].suggestion.as_deref(), Some("upper"));
    }

    #[test]
    fn test_limit_entry_not_a_table() {
        let warnings = validate_unknown_keys(
            r#"
[reference.limits]
Lead = 450.0
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("should be a table"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_ranges_defaults_clean() {
        assert!(validate_ranges(&BlendiqConfig::default()).is_empty());
    }

    #[test]
    fn test_ranges_flag_large_learning_rate() {
        let mut config = BlendiqConfig::default();
        config.solver.learning_rate = 5.0;
        let warnings = validate_ranges(&config);
        assert!(warnings.iter().any(|w| w.field == "solver.learning_rate"));
    }

    #[test]
    fn test_ranges_flag_tight_schedule_start() {
        let mut config = BlendiqConfig::default();
        config.solver.relax_schedule = vec![0.1, 0.5];
        let warnings = validate_ranges(&config);
        assert!(warnings.iter().any(|w| w.field == "solver.relax_schedule"));
    }
}

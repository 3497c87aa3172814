//! `validate` command implementation.

use std::collections::HashSet;

use anyhow::{Context, Result};
use contracts::RosterBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RosterSummary>,
}

#[derive(Serialize)]
struct RosterSummary {
    junction: String,
    closure_policy: String,
    people: usize,
    updates: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating roster");

    let result = validate_roster(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Roster validation failed")
    }
}

fn validate_roster(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(roster) => {
            let warnings = collect_warnings(&roster);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(RosterSummary {
                    junction: roster.junction.name.clone(),
                    closure_policy: format!("{:?}", roster.junction.closure_policy),
                    people: roster.people.len(),
                    updates: roster.updates.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Non-fatal issues
fn collect_warnings(roster: &RosterBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if roster.updates.is_empty() {
        warnings.push("No updates scripted - the junction will publish nothing".to_string());
    }

    let known: HashSet<u32> = roster.people.iter().map(|p| p.id).collect();
    let unknown = roster
        .updates
        .iter()
        .filter(|u| !known.contains(&u.id()))
        .count();
    if unknown > 0 {
        warnings.push(format!(
            "{unknown} update(s) target unknown ids and will be skipped"
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Roster is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Junction: {}", summary.junction);
            println!("  Closure policy: {}", summary.closure_policy);
            println!("  People: {}", summary.people);
            println!("  Updates: {}", summary.updates);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Roster is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(content: &str) -> (tempfile::NamedTempFile, ValidateArgs) {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        (file, args)
    }

    #[test]
    fn test_valid_roster_with_unknown_warning() {
        let (_file, args) = args_for(
            r#"
allow_unknown = true

[[people]]
id = 1
name = "Jeff"
age = 56

[[updates]]
kind = "birthday"
id = 2
"#,
        );
        let result = validate_roster(&args);
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings[0].contains("1 update(s) target unknown ids"));
        assert_eq!(result.summary.unwrap().people, 1);
    }

    #[test]
    fn test_invalid_roster() {
        let (_file, args) = args_for("people = []\n");
        let result = validate_roster(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("at least one person"));
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/roster.toml".into(),
            json: false,
        };
        assert!(!validate_roster(&args).valid);
        assert!(run_validate(&args).is_err());
    }
}

//! # Config Loader
//!
//! Loads roster files that drive a junction from the command line.
//!
//! Responsibilities:
//! - Parse TOML/JSON roster files
//! - Check that seeds and scripted updates are consistent
//! - Produce a `RosterBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let roster = ConfigLoader::load_from_path(Path::new("roster.toml")).unwrap();
//! println!("people: {}", roster.people.len());
//! ```

mod parser;
mod validator;

pub use contracts::RosterBlueprint;
pub use parser::ConfigFormat;

use contracts::ConfigError;
use std::path::Path;

/// Roster loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a roster from a file path
    ///
    /// The format is taken from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RosterBlueprint, ConfigError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a roster from a string
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RosterBlueprint, ConfigError> {
        let roster = parser::parse(content, format)?;
        validator::validate(&roster)?;
        Ok(roster)
    }

    /// Serialize a roster to TOML
    pub fn to_toml(roster: &RosterBlueprint) -> Result<String, ConfigError> {
        toml::to_string_pretty(roster)
            .map_err(|e| ConfigError::parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a roster to JSON
    pub fn to_json(roster: &RosterBlueprint) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(roster)
            .map_err(|e| ConfigError::parse(format!("JSON serialize error: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::parse("cannot determine file format from extension"))?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::parse(format!("unsupported config format: .{ext}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ClosurePolicy;
    use std::io::Write;

    const ROSTER_TOML: &str = r#"
[junction]
name = "people"
closure_policy = "detach"

[[people]]
id = 123
name = "Ann"
age = 23

[[people]]
id = 456
name = "Bob"
age = 21

[[updates]]
kind = "rename"
id = 123
name = "Anne"

[[updates]]
kind = "birthday"
id = 456
"#;

    #[test]
    fn test_load_from_str_toml() {
        let roster = ConfigLoader::load_from_str(ROSTER_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(roster.junction.name, "people");
        assert_eq!(roster.junction.closure_policy, ClosurePolicy::Detach);
        assert_eq!(roster.people.len(), 2);
        assert_eq!(roster.updates.len(), 2);
    }

    #[test]
    fn test_round_trip_json() {
        let roster = ConfigLoader::load_from_str(ROSTER_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&roster).unwrap();
        let again = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(roster, again);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(ROSTER_TOML.as_bytes()).unwrap();

        let roster = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(roster.people[1].name, "Bob");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[people]]
id = 1
name = "Ann"
age = 23

[[updates]]
kind = "birthday"
id = 2
"#;
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(err.to_string().contains("unknown person id 2"));
    }
}

//! Roster validation
//!
//! Rules:
//! - at least one person
//! - person ids unique
//! - names non-empty
//! - junction name non-empty
//! - updates target known ids unless `allow_unknown`

use std::collections::HashSet;

use contracts::{ConfigError, RosterBlueprint, ScriptedUpdate};

/// Returns the first rule violation found.
pub fn validate(roster: &RosterBlueprint) -> Result<(), ConfigError> {
    validate_junction(roster)?;
    validate_people(roster)?;
    validate_updates(roster)?;
    Ok(())
}

fn validate_junction(roster: &RosterBlueprint) -> Result<(), ConfigError> {
    if roster.junction.name.trim().is_empty() {
        return Err(ConfigError::validation(
            "junction.name",
            "junction name must not be empty",
        ));
    }
    Ok(())
}

fn validate_people(roster: &RosterBlueprint) -> Result<(), ConfigError> {
    if roster.people.is_empty() {
        return Err(ConfigError::validation(
            "people",
            "at least one person is required",
        ));
    }

    let mut seen = HashSet::new();
    for person in &roster.people {
        if !seen.insert(person.id) {
            return Err(ConfigError::validation(
                format!("people[id={}]", person.id),
                "duplicate id",
            ));
        }
        if person.name.is_empty() {
            return Err(ConfigError::validation(
                format!("people[id={}].name", person.id),
                "name must not be empty",
            ));
        }
    }
    Ok(())
}

fn validate_updates(roster: &RosterBlueprint) -> Result<(), ConfigError> {
    let known: HashSet<u32> = roster.people.iter().map(|p| p.id).collect();

    for (i, update) in roster.updates.iter().enumerate() {
        if let ScriptedUpdate::Rename { name, .. } = update {
            if name.is_empty() {
                return Err(ConfigError::validation(
                    format!("updates[{i}].name"),
                    "name must not be empty",
                ));
            }
        }
        if !roster.allow_unknown && !known.contains(&update.id()) {
            return Err(ConfigError::validation(
                format!("updates[{i}].id"),
                format!("unknown person id {}", update.id()),
            ));
        }
    }
    Ok(())
}

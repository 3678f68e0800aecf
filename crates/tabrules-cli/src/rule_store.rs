// tabrules-cli/src/rule_store.rs
// ============================================================================
// Module: JSON Rule Store
// Description: A `RuleStore` reading a JSON array of `Rule` from a file.
// Purpose: Give the CLI a collaborator-owned rule source without requiring
//          a database; rules are edited as a plain JSON document.
// Dependencies: tabrules-core, serde_json
// ============================================================================

//! ## Overview
//! The engine never persists rules itself (see
//! [`tabrules_core::interfaces::RuleStore`]); this is the collaborator the
//! CLI supplies. The whole file is read and parsed on
//! [`JsonRuleStore::load`]; there is no incremental write-back, matching the
//! CLI's role as a demo and scripting surface rather than a rule editor.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tabrules_core::error::StorageError;
use tabrules_core::interfaces::RuleStore;
use tabrules_core::model::Rule;
use tabrules_core::model::RuleId;

/// Maximum accepted rules-file size, in bytes.
const MAX_RULES_FILE_BYTES: u64 = 4 * 1024 * 1024;

/// A [`RuleStore`] backed by a JSON file holding an array of [`Rule`].
pub struct JsonRuleStore {
    /// Rules parsed from the file, in document order.
    rules: Vec<Rule>,
}

impl JsonRuleStore {
    /// Reads and parses `path` as a JSON array of rules.
    ///
    /// # Errors
    /// Returns [`StorageError::ReadFailed`] if the file is missing, too
    /// large, not valid UTF-8, or fails to parse as a `Rule` array.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let key = path.to_string_lossy().to_string();
        let metadata = fs::metadata(path).map_err(|error| StorageError::ReadFailed {
            key: key.clone(),
            message: error.to_string(),
        })?;
        if metadata.len() > MAX_RULES_FILE_BYTES {
            return Err(StorageError::ReadFailed {
                key: key.clone(),
                message: format!("rules file exceeds {MAX_RULES_FILE_BYTES} bytes"),
            });
        }

        let text = fs::read_to_string(path).map_err(|error| StorageError::ReadFailed {
            key: key.clone(),
            message: error.to_string(),
        })?;
        let rules: Vec<Rule> = serde_json::from_str(&text).map_err(|error| StorageError::ReadFailed {
            key,
            message: error.to_string(),
        })?;
        Ok(Self { rules })
    }

    /// Builds a store directly from an in-memory rule list, bypassing the
    /// filesystem (used by tests and the `preview`/`run` commands when
    /// rules are supplied programmatically).
    #[must_use]
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl RuleStore for JsonRuleStore {
    fn list_rules(&self) -> Result<Vec<Rule>, StorageError> {
        Ok(self.rules.clone())
    }

    fn get_rule(&self, id: &RuleId) -> Result<Option<Rule>, StorageError> {
        Ok(self.rules.iter().find(|rule| &rule.id == id).cloned())
    }
}

/// Validates `path` is usable as a rules-file argument before attempting to
/// open it: rejects empty paths and existing directories.
///
/// # Errors
/// Returns a human-readable message describing the problem.
pub fn validate_rules_path(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("rules path must not be empty".to_string());
    }
    if path.is_dir() {
        return Err(format!("rules path {} is a directory", path.display()));
    }
    Ok(())
}

/// Returns the default rules-file path (`./rules.json` in the current
/// directory) used when no `--rules` flag is given.
#[must_use]
pub fn default_rules_path() -> PathBuf {
    PathBuf::from("rules.json")
}

#[cfg(test)]
mod tests {
    use super::JsonRuleStore;
    use super::validate_rules_path;
    use std::io::Write;
    use tabrules_core::interfaces::RuleStore;
    use tabrules_core::model::RuleId;

    #[test]
    fn loads_a_well_formed_rules_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[{{"id":"r1","name":"Close stale","enabled":true,"when":{{"all":[]}},"then":[],"trigger":{{"kind":"on_action"}}}}]"#
        )
        .expect("write");

        let store = JsonRuleStore::load(file.path()).expect("load");
        let rules = store.list_rules().expect("list");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, RuleId::from("r1"));
        assert!(store.get_rule(&RuleId::from("missing")).expect("get").is_none());
    }

    #[test]
    fn rejects_a_missing_file() {
        let result = JsonRuleStore::load(std::path::Path::new("/no/such/rules.json"));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_a_directory_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(validate_rules_path(dir.path()).is_err());
    }
}

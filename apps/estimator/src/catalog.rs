//! Catalog: the static employees / tools / schedule data read once at startup.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

/// A tool from the catalog. Only `name` is interpreted; every other field is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tool {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// The whole startup file. Employees and schedule entries are opaque records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub employees: Vec<Value>,
    pub tools: Vec<Tool>,
    pub schedule: Vec<Value>,
}

impl Catalog {
    /// Reads and parses the catalog file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file '{}'", path.display()))?;
        let catalog = Self::from_json_str(&text)
            .with_context(|| format!("Invalid catalog file '{}'", path.display()))?;

        info!(
            "Catalog loaded from {}: {} employees, {} tools, {} schedule entries",
            path.display(),
            catalog.employees.len(),
            catalog.tools.len(),
            catalog.schedule.len()
        );
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Catalog JSON does not match the expected shape")
    }

    /// Tool names in file order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    pub fn find_tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURE: &str = include_str!("../data/test_data.json");

    #[test]
    fn test_fixture_catalog_parses() {
        let catalog = Catalog::from_json_str(FIXTURE).unwrap();
        assert_eq!(catalog.employee_count(), 6);
        assert_eq!(catalog.tools.len(), 10);
        assert_eq!(catalog.tool_names()[0], "Riding Mower");
        assert_eq!(catalog.schedule.len(), 3);
    }

    #[test]
    fn test_tool_extra_fields_are_preserved() {
        let catalog = Catalog::from_json_str(FIXTURE).unwrap();
        let mower = catalog.find_tool("Push Mower").unwrap();
        assert_eq!(mower.extra.get("quantity"), Some(&Value::from(3)));
        assert!(!mower.extra.contains_key("name"));
    }

    #[test]
    fn test_missing_tool_name_is_rejected() {
        let json = r#"{"employees": [], "tools": [{"quantity": 1}], "schedule": []}"#;
        assert!(Catalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_missing_top_level_key_is_rejected() {
        let json = r#"{"employees": [], "tools": []}"#;
        assert!(Catalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.tool_names().len(), 10);
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");

        let err = Catalog::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("nope.json"));
    }
}

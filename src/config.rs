use crate::engine::Engine;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for schema derivation and DDL generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchConfig {
    /// Engine the generated SQL targets
    pub engine: Engine,
    /// Treat a field named `id` or `<model>Id` as the primary key when none is marked
    pub infer_primary_keys: bool,
    /// Appended to the model name to form the adapter name
    pub adapter_suffix: String,
    /// Emit `CREATE TABLE IF NOT EXISTS` instead of `CREATE TABLE`
    pub if_not_exists: bool,
    /// Emit `FOREIGN KEY` constraints for foreign reference columns
    pub enforce_foreign_keys: bool,
}

impl Default for ArchConfig {
    fn default() -> Self {
        Self {
            engine: Engine::SQLite,
            infer_primary_keys: true,
            adapter_suffix: "JdbcAdapter".to_string(),
            if_not_exists: true,
            enforce_foreign_keys: true,
        }
    }
}

impl ArchConfig {
    pub fn for_engine(engine: Engine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

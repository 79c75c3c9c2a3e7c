use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use log::debug;

use crate::domain::errors::ConfigError;
use crate::domain::traits::BlockStore;

/// Named values in a TOML file, re-read on every lookup so edits apply on
/// the next iteration without a restart.
///
/// ```toml
/// price = "30000"
/// ```
pub struct FileBlockStore {
    path: PathBuf,
}

impl FileBlockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BlockStore for FileBlockStore {
    fn load(&self, name: &str) -> Result<String, ConfigError> {
        let store_error = |reason: String| ConfigError::Store {
            path: self.path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(&self.path).map_err(|e| store_error(e.to_string()))?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| store_error(e.to_string()))?;

        let value = match table.get(name) {
            Some(toml::Value::String(s)) => s.clone(),
            Some(toml::Value::Integer(i)) => i.to_string(),
            Some(toml::Value::Float(f)) => f.to_string(),
            Some(other) => other.to_string(),
            None => return Err(ConfigError::MissingBlock(name.to_string())),
        };

        debug!("Loaded block {} from {}", name, self.path.display());
        Ok(value)
    }
}

/// In-process named values that can be replaced while the flow runs
#[derive(Default)]
pub struct MemoryBlockStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(name: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(name, value);
        store
    }

    pub fn set(&self, name: &str, value: impl Into<String>) {
        if let Ok(mut values) = self.values.write() {
            values.insert(name.to_string(), value.into());
        }
    }
}

impl BlockStore for MemoryBlockStore {
    fn load(&self, name: &str) -> Result<String, ConfigError> {
        let values = self.values.read().map_err(|_| ConfigError::Store {
            path: "memory".to_string(),
            reason: "lock poisoned".to_string(),
        })?;
        values
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::MissingBlock(name.to_string()))
    }
}

/// Load a named value and interpret it as a price threshold
pub fn load_threshold(store: &dyn BlockStore, name: &str) -> Result<f64, ConfigError> {
    let raw = store.load(name)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConfigError::InvalidThreshold {
            name: name.to_string(),
            value: raw,
        }),
    }
}

//! A small bag of named parameters that persists as JSON.
//!
//! Tuples are stored as `{"__tuple__": true, "items": [...]}` so a reader can
//! tell them apart from plain lists after a round trip.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when `save_to_json` is given a directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// One stored parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Tuple(TupleParam),
    Plain(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TupleParam {
    #[serde(rename = "__tuple__")]
    marker: bool,
    items: Vec<Value>,
}

impl TupleParam {
    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

impl Param {
    fn to_value(&self) -> Value {
        match self {
            Param::Tuple(t) => Value::Array(t.items.clone()),
            Param::Plain(v) => v.clone(),
        }
    }
}

/// Named parameters, kept in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configs {
    params: BTreeMap<String, Param>,
}

impl Configs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Configs::add_param`].
    pub fn with_param<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Result<Self> {
        self.add_param(key, value)?;
        Ok(self)
    }

    /// Store (or replace) a parameter.
    pub fn add_param<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.params.insert(key.into(), Param::Plain(value));
        Ok(())
    }

    /// Store a parameter that must come back as a tuple.
    pub fn add_tuple<T: Serialize>(&mut self, key: impl Into<String>, items: &[T]) -> Result<()> {
        let items = items
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        self.params.insert(
            key.into(),
            Param::Tuple(TupleParam {
                marker: true,
                items,
            }),
        );
        Ok(())
    }

    /// Deserialize a parameter; tuples deserialize from their items.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.params.get(key) {
            Some(param) => Ok(Some(serde_json::from_value(param.to_value())?)),
            None => Ok(None),
        }
    }

    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    pub fn is_tuple(&self, key: &str) -> bool {
        matches!(self.params.get(key), Some(Param::Tuple(_)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Write the parameters as 4-space indented JSON.
    ///
    /// A path ending in `.json` is written as-is (parents created); anything
    /// else is treated as a directory that receives `config.json`.
    pub fn save_to_json(&self, filepath: impl AsRef<Path>) -> Result<PathBuf> {
        let filepath = filepath.as_ref();
        let target = if filepath.extension().is_some_and(|ext| ext == "json") {
            if let Some(parent) = filepath.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            filepath.to_path_buf()
        } else {
            fs::create_dir_all(filepath)?;
            filepath.join(DEFAULT_CONFIG_FILE)
        };

        fs::write(&target, self.to_json_string()?)?;
        info!("Config file save at : {}", target.display());
        Ok(target)
    }

    /// Merge the parameters stored in `file_path` into `self`.
    pub fn load_from_json(&mut self, file_path: impl AsRef<Path>) -> Result<()> {
        let content = fs::read_to_string(file_path)?;
        let params: BTreeMap<String, Param> = serde_json::from_str(&content)?;
        self.params.extend(params);
        Ok(())
    }

    pub fn from_json_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let mut configs = Self::new();
        configs.load_from_json(file_path)?;
        Ok(configs)
    }

    fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Display for Configs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json_string().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_marker_is_serialized() {
        let mut configs = Configs::new();
        configs.add_tuple("img_size", &[64, 64]).unwrap();
        let json = configs.to_string();
        assert!(json.contains("\"__tuple__\": true"));
        assert!(json.contains("\"items\""));
    }

    #[test]
    fn plain_objects_are_not_tuples() {
        let params: BTreeMap<String, Param> =
            serde_json::from_str(r#"{"opt": {"name": "adam"}, "size": {"__tuple__": true, "items": [1, 2]}}"#)
                .unwrap();
        assert!(matches!(params["opt"], Param::Plain(_)));
        assert!(matches!(params["size"], Param::Tuple(_)));
    }

    #[test]
    fn get_reads_typed_values() {
        let configs = Configs::new()
            .with_param("epochs", 20)
            .unwrap()
            .with_param("name", "unet")
            .unwrap();
        assert_eq!(configs.get::<u32>("epochs").unwrap(), Some(20));
        assert_eq!(configs.get::<String>("name").unwrap().as_deref(), Some("unet"));
        assert_eq!(configs.get::<u32>("missing").unwrap(), None);
    }
}

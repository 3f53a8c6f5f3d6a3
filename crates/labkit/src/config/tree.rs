//! The immutable configuration tree

use std::collections::BTreeMap;
use std::ops::Index;

use thiserror::Error;

/// Error type for configuration construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration root must be a table, got {0}")]
    NotATable(String),

    #[error("unsupported configuration value at `{0}`")]
    UnsupportedValue(String),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

static NULL: ConfigValue = ConfigValue::Null;

/// One configuration value: a leaf or a nested table.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    Table(ConfigTree),
}

impl ConfigValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as `f64`; integers coerce.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&ConfigTree> {
        match self {
            Self::Table(tree) => Some(tree),
            _ => None,
        }
    }
}

/// Indexing a non-table value (or a missing key) yields `Null`, so chained
/// access never panics.
impl Index<&str> for ConfigValue {
    type Output = ConfigValue;

    fn index(&self, key: &str) -> &Self::Output {
        match self {
            Self::Table(tree) => &tree[key],
            _ => &NULL,
        }
    }
}

/// A recursively read-only view over a nested mapping.
///
/// Built once from JSON or TOML; no mutable accessors exist.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigTree {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigTree {
    /// Build a tree from a JSON value. The root must be an object; nested
    /// objects become nested tables.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let object = value
            .as_object()
            .ok_or_else(|| ConfigError::NotATable(json_type_name(value).to_string()))?;

        let mut entries = BTreeMap::new();
        for (key, entry) in object {
            entries.insert(key.clone(), convert_json(key, entry)?);
        }
        Ok(Self { entries })
    }

    /// Parse a TOML document into a tree.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let value: toml::Value = toml::from_str(input)?;
        match value {
            toml::Value::Table(table) => Self::from_toml_table(table),
            other => Err(ConfigError::NotATable(toml_type_name(&other).to_string())),
        }
    }

    fn from_toml_table(table: toml::value::Table) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        for (key, entry) in table {
            let converted = convert_toml(entry);
            entries.insert(key, converted);
        }
        Ok(Self { entries })
    }

    /// Look up a direct child.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Look up a dotted path, e.g. `"optimizer.lr"`.
    pub fn lookup(&self, path: &str) -> Option<&ConfigValue> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.get(first)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over direct children in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Indexing a missing key yields `Null` rather than panicking.
impl Index<&str> for ConfigTree {
    type Output = ConfigValue;

    fn index(&self, key: &str) -> &Self::Output {
        self.entries.get(key).unwrap_or(&NULL)
    }
}

fn convert_json(key: &str, value: &serde_json::Value) -> Result<ConfigValue, ConfigError> {
    Ok(match value {
        serde_json::Value::Null => ConfigValue::Null,
        serde_json::Value::Bool(b) => ConfigValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ConfigValue::Int(i)
            } else {
                let f = n
                    .as_f64()
                    .ok_or_else(|| ConfigError::UnsupportedValue(key.to_string()))?;
                ConfigValue::Float(f)
            }
        }
        serde_json::Value::String(s) => ConfigValue::Str(s.clone()),
        serde_json::Value::Array(items) => ConfigValue::List(
            items
                .iter()
                .map(|item| convert_json(key, item))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(_) => ConfigValue::Table(ConfigTree::from_json(value)?),
    })
}

fn convert_toml(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Integer(i) => ConfigValue::Int(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::String(s) => ConfigValue::Str(s),
        toml::Value::Datetime(dt) => ConfigValue::Str(dt.to_string()),
        toml::Value::Array(items) => {
            ConfigValue::List(items.into_iter().map(convert_toml).collect())
        }
        toml::Value::Table(table) => {
            let entries = table
                .into_iter()
                .map(|(k, v)| (k, convert_toml(v)))
                .collect();
            ConfigValue::Table(ConfigTree { entries })
        }
    }
}

fn toml_type_name(value: &toml::Value) -> &'static str {
    match value {
        toml::Value::Boolean(_) => "boolean",
        toml::Value::Integer(_) => "integer",
        toml::Value::Float(_) => "float",
        toml::Value::String(_) => "string",
        toml::Value::Datetime(_) => "datetime",
        toml::Value::Array(_) => "array",
        toml::Value::Table(_) => "table",
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

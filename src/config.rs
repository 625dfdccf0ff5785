use std::convert::TryFrom;

use crate::{Error, Result};

/// Configuration for [Index].
///
/// Can be composed programmatically or parsed from TOML text, like:
///
/// ```toml
/// name = "users"
/// node_capacity = 1000000
/// ```
///
/// [Index]: crate::rbt::Index
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// name of the index.
    pub name: String,
    /// Maximum number of entries the index can hold, insert beyond this
    /// limit fails with [Error::NoMemory].
    ///
    /// Default: None, unbounded.
    pub node_capacity: Option<usize>,
}

impl Config {
    pub fn new(name: &str) -> Config {
        Config {
            name: name.to_string(),
            node_capacity: None,
        }
    }

    /// Bound the index to `capacity` entries.
    pub fn set_node_capacity(&mut self, capacity: usize) -> &mut Self {
        self.node_capacity = Some(capacity);
        self
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Config> {
        let value = err_at!(InvalidInput, text.parse::<toml::Value>())?;
        Config::try_from(value)
    }

    /// Render configuration as TOML text.
    pub fn to_toml(&self) -> Result<String> {
        use toml::Value::{Integer, String as TomlStr, Table};

        let mut dict = toml::map::Map::new();
        dict.insert("name".to_string(), TomlStr(self.name.clone()));
        if let Some(capacity) = self.node_capacity {
            let capacity = err_at!(FailConvert, i64::try_from(capacity))?;
            dict.insert("node_capacity".to_string(), Integer(capacity));
        }

        Ok(Table(dict).to_string())
    }
}

impl TryFrom<toml::Value> for Config {
    type Error = Error;

    fn try_from(value: toml::Value) -> Result<Config> {
        use toml::Value::{Integer, String as TomlStr};

        let dict = match value {
            toml::Value::Table(dict) => dict,
            _ => return err_at!(InvalidInput, msg: "config not a table"),
        };

        let mut config = Config::new("");
        let mut name = None;
        for (key, value) in dict.into_iter() {
            match (key.as_str(), value) {
                ("name", TomlStr(s)) => name = Some(s),
                ("node_capacity", Integer(n)) => {
                    let n = err_at!(FailConvert, usize::try_from(n), "node_capacity")?;
                    config.set_node_capacity(n);
                }
                (key, value) => {
                    err_at!(InvalidInput, msg: "config field {}={}", key, value)?;
                }
            }
        }

        match name {
            Some(name) => config.name = name,
            None => err_at!(InvalidInput, msg: "config missing name")?,
        }

        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

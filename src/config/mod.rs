//! Configuration sources for property injection.

use crate::error::{PapersheetError, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::Arc;

/// A source of named configuration values.
///
/// The registry consults this during property injection. Implementations must
/// be cheap to query; lookups happen once per binding per constructed instance.
pub trait PropertySource: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

impl PropertySource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<S: PropertySource + ?Sized> PropertySource for Arc<S> {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

/// Configuration service
///
/// Holds string properties loaded from `.properties` documents and the process
/// environment. Lookups fall back to the environment-style spelling of a key,
/// so `custom.property` also matches a `CUSTOM_PROPERTY` entry.
#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.properties` document.
    ///
    /// Accepts `key=value` and `key: value` lines. Blank lines and lines
    /// starting with `#` or `!` are ignored.
    pub fn from_properties(text: &str) -> Result<Self> {
        let service = Self::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let split = line
                .find(['=', ':'])
                .ok_or_else(|| PapersheetError::InvalidConfig {
                    line: index + 1,
                    message: format!("expected 'key=value', found '{}'", line),
                })?;
            let key = line[..split].trim();
            if key.is_empty() {
                return Err(PapersheetError::InvalidConfig {
                    line: index + 1,
                    message: "empty property key".to_string(),
                });
            }
            let value = line[split + 1..].trim_start();
            service.set(key, value);
        }
        Ok(service)
    }

    /// Read and parse a `.properties` file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let service = Self::from_properties(&text)?;
        tracing::debug!(
            "Loaded {} properties from {}",
            service.len(),
            path.display()
        );
        Ok(service)
    }

    /// Overlay the process environment on top of the current properties.
    pub fn with_env(self) -> Self {
        for (key, value) in env::vars() {
            self.set(&key, &value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.config.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
    }
}

impl PropertySource for ConfigService {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).or_else(|| self.get(&env_key(key)))
    }
}

/// `custom.property` -> `CUSTOM_PROPERTY`
fn env_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties() {
        let config = ConfigService::from_properties(
            "# comment\n\
             ! also a comment\n\
             \n\
             custom.property = Hello\n\
             server.port: 8080\n\
             empty.value=\n",
        )
        .unwrap();

        assert_eq!(config.lookup("custom.property").as_deref(), Some("Hello"));
        assert_eq!(config.lookup("server.port").as_deref(), Some("8080"));
        assert_eq!(config.lookup("empty.value").as_deref(), Some(""));
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn test_value_keeps_separators() {
        let config = ConfigService::from_properties("datasource.url=jdbc:h2:mem:testdb").unwrap();
        assert_eq!(
            config.lookup("datasource.url").as_deref(),
            Some("jdbc:h2:mem:testdb")
        );
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = ConfigService::from_properties("a=1\nnot a property\n").unwrap_err();
        match err {
            PapersheetError::InvalidConfig { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(ConfigService::from_properties("=value").is_err());
    }

    #[test]
    fn test_relaxed_env_lookup() {
        let config = ConfigService::new();
        config.set("CUSTOM_PROPERTY", "from-env");
        config.set("cache.simulated-delay-ms", "10");

        assert_eq!(config.lookup("custom.property").as_deref(), Some("from-env"));
        assert_eq!(
            config.lookup("cache.simulated-delay-ms").as_deref(),
            Some("10")
        );
        assert_eq!(config.lookup("missing.key"), None);
    }

    #[test]
    fn test_exact_key_wins_over_env_spelling() {
        let config = ConfigService::new();
        config.set("custom.property", "exact");
        config.set("CUSTOM_PROPERTY", "env");
        assert_eq!(config.lookup("custom.property").as_deref(), Some("exact"));
    }

    #[test]
    fn test_hash_map_source() {
        let mut map = HashMap::new();
        map.insert("k".to_string(), "v".to_string());
        assert_eq!(map.lookup("k").as_deref(), Some("v"));
        assert_eq!(map.lookup("other"), None);
    }
}

//! Opaque key/value engine settings.

use std::collections::HashMap;

/// Setting key controlling whether the output path is cleaned before a run.
pub const CLEAN_OUTPUT_PATH: &str = "CleanOutputPath";

/// Opaque key/value configuration consumed by the engine and by modules.
///
/// The engine itself reads only [`CLEAN_OUTPUT_PATH`]; everything else is
/// passed through to modules untouched.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, serde_json::Value>,
}

impl Settings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, returning the settings for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Sets a value.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    /// Looks up a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Looks up a boolean value.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(|v| v.as_bool())
    }

    /// Looks up a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    /// Returns whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the settings are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_accessors() {
        let settings = Settings::new()
            .with(CLEAN_OUTPUT_PATH, serde_json::json!(true))
            .with("theme", serde_json::json!("midnight"));

        assert_eq!(settings.get_bool(CLEAN_OUTPUT_PATH), Some(true));
        assert_eq!(settings.get_str("theme"), Some("midnight"));
        assert!(settings.get_bool("theme").is_none());
        assert!(settings.get("missing").is_none());
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut settings = Settings::new();
        settings.insert("key", serde_json::json!(1));
        settings.insert("key", serde_json::json!(2));

        assert_eq!(settings.get("key"), Some(&serde_json::json!(2)));
        assert_eq!(settings.len(), 1);
    }
}

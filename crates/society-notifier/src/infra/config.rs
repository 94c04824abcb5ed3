use std::{collections::HashMap, fmt::Display, str::FromStr};

const PREFIX: &str = "SOCIETY_";

#[non_exhaustive]
pub struct Config {
    kv: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let kv = std::env::vars()
            .filter(|(k, _)| k.starts_with(PREFIX))
            .collect();

        Self { kv }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_map(kv: HashMap<String, String>) -> Self {
        Self { kv }
    }

    pub fn optional(&self, key: &str) -> Option<&str> {
        self.kv.get(key).map(|v| v.as_str())
    }

    pub fn require(&self, key: &str) -> anyhow::Result<&str> {
        self.optional(key)
            .ok_or_else(|| anyhow::anyhow!("required config key '{key}'"))
    }

    /// Parses `key` when set, falling back to `default` when it is absent.
    pub fn parsed_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid value '{raw}' for config key '{key}': {e}")),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(pairs: &[(&str, &str)]) -> Config {
        let kv: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_map(kv)
    }

    #[test]
    fn test_optional_returns_value_when_present() {
        let config = test_config(&[("SOCIETY_PROJECT_ID", "society-app")]);
        assert_eq!(config.optional("SOCIETY_PROJECT_ID"), Some("society-app"));
    }

    #[test]
    fn test_optional_returns_none_when_missing() {
        let config = test_config(&[]);
        assert_eq!(config.optional("SOCIETY_PROJECT_ID"), None);
    }

    #[test]
    fn test_require_returns_error_when_missing() {
        let config = test_config(&[]);
        let err_msg = config
            .require("SOCIETY_CHANGE_FEED_URL")
            .unwrap_err()
            .to_string();
        assert!(err_msg.contains("SOCIETY_CHANGE_FEED_URL"));
    }

    #[test]
    fn test_parsed_or_uses_default_when_missing() {
        let config = test_config(&[]);
        assert_eq!(config.parsed_or("SOCIETY_DEDUP_CAPACITY", 1024usize).unwrap(), 1024);
    }

    #[test]
    fn test_parsed_or_parses_present_value() {
        let config = test_config(&[("SOCIETY_DEDUP_CAPACITY", " 64 ")]);
        assert_eq!(config.parsed_or("SOCIETY_DEDUP_CAPACITY", 1024usize).unwrap(), 64);
    }

    #[test]
    fn test_parsed_or_rejects_garbage() {
        let config = test_config(&[("SOCIETY_CONSUMER_CONCURRENCY", "lots")]);
        let err = config
            .parsed_or("SOCIETY_CONSUMER_CONCURRENCY", 30usize)
            .unwrap_err()
            .to_string();
        assert!(err.contains("SOCIETY_CONSUMER_CONCURRENCY"));
        assert!(err.contains("lots"));
    }

    #[test]
    fn test_empty_value() {
        let config = test_config(&[("SOCIETY_LOG_DIR", "")]);
        assert_eq!(config.optional("SOCIETY_LOG_DIR"), Some(""));
        assert_eq!(config.require("SOCIETY_LOG_DIR").unwrap(), "");
    }
}

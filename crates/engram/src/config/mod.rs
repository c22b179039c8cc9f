use serde::Deserialize;

use crate::error::{EngramError, Result};

/// Main configuration structure for the memory core
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MemoryConfig {
    /// Short-term transcript window configuration
    #[serde(default)]
    pub short_term: ShortTermConfig,
    /// Context assembly configuration
    #[serde(default)]
    pub context: ContextConfig,
}

impl MemoryConfig {
    /// Parse a configuration from a TOML document, applying defaults for
    /// anything left unspecified.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| EngramError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Short-term transcript window configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ShortTermConfig {
    /// Key namespace prefix; session keys are `<prefix>:<session_id>`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Maximum records retained per session window (oldest evicted first)
    #[serde(default = "default_max_window_size")]
    pub max_window_size: usize,
    /// Window lifetime in seconds, refreshed on every write
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for ShortTermConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            max_window_size: default_max_window_size(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_key_prefix() -> String {
    "engram:memory".to_string()
}

fn default_max_window_size() -> usize {
    50
}

fn default_ttl_secs() -> u64 {
    86_400
}

/// Context assembly configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    /// Recent transcript records pulled into a context bundle
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Semantic matches pulled into a context bundle
    #[serde(default = "default_relevant_limit")]
    pub relevant_limit: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            relevant_limit: default_relevant_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    10
}

fn default_relevant_limit() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MemoryConfig::default();
        assert_eq!(config.short_term.key_prefix, "engram:memory");
        assert_eq!(config.short_term.max_window_size, 50);
        assert_eq!(config.short_term.ttl_secs, 86_400);
        assert_eq!(config.context.history_limit, 10);
        assert_eq!(config.context.relevant_limit, 3);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[short_term]
key_prefix = "agent:transcript"
max_window_size = 100
ttl_secs = 3600

[context]
history_limit = 20
relevant_limit = 5
"#;

        let config = MemoryConfig::from_toml_str(toml_str).expect("Failed to parse TOML");

        assert_eq!(config.short_term.key_prefix, "agent:transcript");
        assert_eq!(config.short_term.max_window_size, 100);
        assert_eq!(config.short_term.ttl_secs, 3600);
        assert_eq!(config.context.history_limit, 20);
        assert_eq!(config.context.relevant_limit, 5);
    }

    #[test]
    fn test_toml_partial_deserialization() {
        // Only one field specified; everything else falls back to defaults
        let toml_str = r#"
[short_term]
max_window_size = 25
"#;

        let config = MemoryConfig::from_toml_str(toml_str).expect("Failed to parse partial TOML");

        assert_eq!(config.short_term.max_window_size, 25);
        assert_eq!(config.short_term.key_prefix, "engram:memory");
        assert_eq!(config.short_term.ttl_secs, 86_400);
        assert_eq!(config.context.history_limit, 10);
        assert_eq!(config.context.relevant_limit, 3);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let result = MemoryConfig::from_toml_str("short_term = 7");
        assert!(matches!(result, Err(EngramError::Config(_))));
    }
}

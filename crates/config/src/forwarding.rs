//! Forwarding configuration
//!
//! Where the destination map comes from. The map itself is parsed and
//! validated by `relay-routing`; this section only carries the raw string.
//!
//! # Resolution order
//!
//! 1. The environment variable named by `map_env` (default `FORWARD_MAP`)
//! 2. The inline `map` value
//!
//! An empty or whitespace-only value counts as absent.

use serde::Deserialize;

/// Default environment variable holding the destination map
pub const DEFAULT_MAP_ENV: &str = "FORWARD_MAP";

/// Forwarding configuration
///
/// # Example
///
/// ```toml
/// [forwarding]
/// map = "-1001:-2001,-2002|-1003:-2003"
/// map_env = "FORWARD_MAP"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Inline destination map (`dest:src[,src...]|...`)
    pub map: Option<String>,

    /// Environment variable that overrides `map` when set
    /// Default: FORWARD_MAP
    pub map_env: String,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            map: None,
            map_env: DEFAULT_MAP_ENV.to_string(),
        }
    }
}

impl ForwardingConfig {
    /// Resolve the map from the process environment, then the inline value
    pub fn resolve_map(&self) -> Option<String> {
        self.resolve_map_with(|name| std::env::var(name).ok())
    }

    /// Resolve the map using a custom variable lookup
    pub fn resolve_map_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let non_empty = |s: String| (!s.trim().is_empty()).then_some(s);

        lookup(&self.map_env)
            .and_then(non_empty)
            .or_else(|| self.map.clone().and_then(non_empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name| (name == DEFAULT_MAP_ENV).then(|| value.to_string())
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = ForwardingConfig::default();
        assert!(config.map.is_none());
        assert_eq!(config.map_env, "FORWARD_MAP");
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
map = "5:1,2"
map_env = "RELAY_MAP"
"#;
        let config: ForwardingConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.map.as_deref(), Some("5:1,2"));
        assert_eq!(config.map_env, "RELAY_MAP");
    }

    #[test]
    fn test_resolve_inline_only() {
        let config = ForwardingConfig {
            map: Some("5:1".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_map_with(no_env).as_deref(), Some("5:1"));
    }

    #[test]
    fn test_resolve_env_overrides_inline() {
        let config = ForwardingConfig {
            map: Some("5:1".into()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_map_with(env_with("9:3")).as_deref(),
            Some("9:3")
        );
    }

    #[test]
    fn test_resolve_empty_env_falls_back() {
        let config = ForwardingConfig {
            map: Some("5:1".into()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_map_with(env_with("  ")).as_deref(),
            Some("5:1")
        );
    }

    #[test]
    fn test_resolve_nothing() {
        let config = ForwardingConfig::default();
        assert!(config.resolve_map_with(no_env).is_none());

        let blank = ForwardingConfig {
            map: Some(String::new()),
            ..Default::default()
        };
        assert!(blank.resolve_map_with(no_env).is_none());
    }

    #[test]
    fn test_resolve_uses_configured_variable() {
        let config = ForwardingConfig {
            map: None,
            map_env: "RELAY_MAP".into(),
        };
        // FORWARD_MAP is ignored once another variable is configured
        assert!(config.resolve_map_with(env_with("9:3")).is_none());
        assert_eq!(
            config
                .resolve_map_with(|name| (name == "RELAY_MAP").then(|| "7:8".to_string()))
                .as_deref(),
            Some("7:8")
        );
    }
}

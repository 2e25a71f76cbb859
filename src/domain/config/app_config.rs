//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::memo::MemoArtifact;
use crate::domain::recording::Duration;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path of the memo artifact (record sink and playback source)
    pub memo_path: Option<String>,
    /// Safety limit on a single recording take
    pub max_duration: Option<String>,
    /// Whether to show desktop notifications
    pub notify: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            memo_path: None, // resolved to the cache-dir location at use
            max_duration: Some("5m".to_string()),
            notify: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            memo_path: other.memo_path.or(self.memo_path),
            max_duration: other.max_duration.or(self.max_duration),
            notify: other.notify.or(self.notify),
        }
    }

    /// Get the memo artifact, falling back to the cache-dir default
    pub fn memo_artifact_or_default(&self) -> MemoArtifact {
        self.memo_path
            .as_deref()
            .map(MemoArtifact::new)
            .unwrap_or_default()
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn empty_config_has_no_values() {
        let config = AppConfig::empty();
        assert!(config.memo_path.is_none());
        assert!(config.max_duration.is_none());
        assert!(config.notify.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            memo_path: Some("/tmp/a.wav".to_string()),
            max_duration: Some("1m".to_string()),
            notify: Some(false),
        };
        let other = AppConfig {
            memo_path: Some("/tmp/b.wav".to_string()),
            max_duration: None,
            notify: Some(true),
        };

        let merged = base.merge(other);
        assert_eq!(merged.memo_path.as_deref(), Some("/tmp/b.wav"));
        assert_eq!(merged.max_duration.as_deref(), Some("1m"));
        assert_eq!(merged.notify, Some(true));
    }

    #[test]
    fn merge_keeps_base_when_other_empty() {
        let base = AppConfig::defaults();
        let merged = base.clone().merge(AppConfig::empty());
        assert_eq!(merged.max_duration, base.max_duration);
        assert_eq!(merged.notify, base.notify);
    }

    #[test]
    fn memo_artifact_uses_configured_path() {
        let config = AppConfig {
            memo_path: Some("/tmp/take.wav".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.memo_artifact_or_default().path(),
            Path::new("/tmp/take.wav")
        );
    }

    #[test]
    fn memo_artifact_falls_back_to_default_location() {
        let config = AppConfig::empty();
        let artifact = config.memo_artifact_or_default();
        assert!(artifact.path().ends_with("memo.wav"));
    }

    #[test]
    fn max_duration_parses_configured_value() {
        let config = AppConfig {
            max_duration: Some("2m30s".to_string()),
            ..Default::default()
        };
        assert_eq!(config.max_duration_or_default().as_secs(), 150);
    }

    #[test]
    fn invalid_max_duration_falls_back_to_default() {
        let config = AppConfig {
            max_duration: Some("nonsense".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.max_duration_or_default(),
            Duration::default_max_duration()
        );
    }

    #[test]
    fn toml_round_trip() {
        let config = AppConfig {
            memo_path: Some("/tmp/take.wav".to_string()),
            max_duration: Some("1m".to_string()),
            notify: Some(true),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.memo_path, config.memo_path);
        assert_eq!(parsed.max_duration, config.max_duration);
        assert_eq!(parsed.notify, config.notify);
    }
}

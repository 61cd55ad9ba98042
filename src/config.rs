//! Component-level configuration for notification anchors.
//!
//! ```toml
//! title = "New feature"
//! auto_show_notification_after_init = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Display label of the notification.
    pub title: String,
    /// Open the notification as soon as the anchor finishes initializing.
    pub auto_show_notification_after_init: bool,
}

impl NotificationConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builder-style toggle for auto-show.
    pub fn auto_show(mut self, enabled: bool) -> Self {
        self.auto_show_notification_after_init = enabled;
        self
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NotificationConfig::default();
        assert!(config.title.is_empty());
        assert!(!config.auto_show_notification_after_init);
    }

    #[test]
    fn test_from_toml() {
        let config = NotificationConfig::from_toml(
            "title = \"Saved\"\nauto_show_notification_after_init = true\n",
        )
        .unwrap();
        assert_eq!(config, NotificationConfig::new("Saved").auto_show(true));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = NotificationConfig::from_toml("title = \"Hi\"").unwrap();
        assert_eq!(config.title, "Hi");
        assert!(!config.auto_show_notification_after_init);
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = NotificationConfig::from_toml("auto_show_notification_after_init = \"yes\"");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }
}

use anyhow::Result;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::labels::Catalog;

const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn is_valid_date_format(fmt: &str) -> bool {
    !fmt.trim().is_empty() && StrftimeItems::new(fmt).all(|item| !matches!(item, Item::Error))
}

/// Optional colour overrides, as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiring: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Desktop notification on print/reprint
    #[serde(default)]
    pub notifications: bool,

    /// Category preselected in the form on startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_category: Option<String>,

    /// strftime format for dates on labels and in history
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notifications: false,
            last_category: None,
            date_format: default_date_format(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Date format to display with; falls back to the default when the
    /// configured one has bad specifiers
    pub fn display_date_format(&self) -> &str {
        if is_valid_date_format(&self.date_format) {
            &self.date_format
        } else {
            DEFAULT_DATE_FORMAT
        }
    }

    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("kitchen-labels");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(&self.cleaned(&Catalog::builtin()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Copy with values that would confuse the next startup removed
    fn cleaned(&self, catalog: &Catalog) -> Self {
        let mut clean = self.clone();

        // Categories come from a fixed table; forget anything it doesn't know
        if clean
            .last_category
            .as_deref()
            .map(|c| catalog.lookup(c).is_none())
            .unwrap_or(false)
        {
            clean.last_category = None;
        }

        if !is_valid_date_format(&clean.date_format) {
            clean.date_format = default_date_format();
        }

        clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            notifications: true,
            last_category: Some("Рыба".to_string()),
            date_format: "%Y-%m-%d".to_string(),
            theme: ThemeConfig {
                accent: Some("#FFC107".to_string()),
                ..Default::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.last_category, deserialized.last_category);
        assert_eq!(config.date_format, deserialized.date_format);
        assert_eq!(config.theme, deserialized.theme);
        assert!(deserialized.notifications);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("notifications = true\n").unwrap();
        assert!(config.notifications);
        assert_eq!(config.date_format, "%d.%m.%Y");
        assert!(config.last_category.is_none());
        assert_eq!(config.theme, ThemeConfig::default());
    }

    #[test]
    fn test_cleaned_drops_unknown_category() {
        let catalog = Catalog::builtin();
        let config = AppConfig {
            last_category: Some("Хлеб".to_string()),
            date_format: "  ".to_string(),
            ..Default::default()
        };

        let clean = config.cleaned(&catalog);
        assert!(clean.last_category.is_none());
        assert_eq!(clean.date_format, "%d.%m.%Y");

        let config = AppConfig {
            last_category: Some("Мясо".to_string()),
            ..Default::default()
        };
        assert_eq!(config.cleaned(&catalog).last_category.as_deref(), Some("Мясо"));
    }

    #[test]
    fn test_display_date_format_rejects_bad_specifiers() {
        let config = AppConfig {
            date_format: "%Y-%m-%d".to_string(),
            ..Default::default()
        };
        assert_eq!(config.display_date_format(), "%Y-%m-%d");

        let config = AppConfig {
            date_format: "%Q %d".to_string(),
            ..Default::default()
        };
        assert_eq!(config.display_date_format(), "%d.%m.%Y");
    }
}

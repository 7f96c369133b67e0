//! 配置文件（JSON）
//!
//! ```json
//! { "theme": "dracula", "viewer": { "language": "kotlin", "typing_speed_ms": 5 } }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use viewer_core::{ViewerConfig, ViewerError};

/// 终端里 gutter 两侧各留一格
pub const TERMINAL_GUTTER_PADDING: f32 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取文件 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("未知主题: {0}")]
    UnknownTheme(String),

    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    pub theme: String,
    pub viewer: ViewerConfig,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            viewer: ViewerConfig {
                line_number_padding: TERMINAL_GUTTER_PADDING,
                ..ViewerConfig::default()
            },
        }
    }
}

impl TuiConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let explicit_padding = value
            .get("viewer")
            .and_then(|viewer| viewer.get("line_number_padding"))
            .is_some();
        let mut config: TuiConfig = serde_json::from_value(value)?;
        // 没写 line_number_padding 时沿用终端的 padding，而不是像素单位的默认值
        if !explicit_padding {
            config.viewer.line_number_padding = TERMINAL_GUTTER_PADDING;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = TuiConfig::from_json(r#"{ "viewer": { "language": "kotlin" } }"#).unwrap();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.viewer.language, "kotlin");
        assert_eq!(config.viewer.line_number_padding, TERMINAL_GUTTER_PADDING);
        assert!(config.viewer.highlighting);
    }

    #[test]
    fn test_explicit_padding_wins() {
        let config =
            TuiConfig::from_json(r#"{ "viewer": { "line_number_padding": 3.0 } }"#).unwrap();
        assert_eq!(config.viewer.line_number_padding, 3.0);
    }

    #[test]
    fn test_padding_key_inside_a_value_is_not_explicit() {
        let config = TuiConfig::from_json(
            r#"{ "theme": "line_number_padding", "viewer": { "language": "line_number_padding" } }"#,
        )
        .unwrap();
        assert_eq!(config.viewer.line_number_padding, TERMINAL_GUTTER_PADDING);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(TuiConfig::from_json("{ theme: ").is_err());
    }
}

//! Render options.

use std::path::Path;

use serde::Deserialize;

use crate::error::OptionsError;
use crate::interact::Theme;

/// Presentation options consulted by the UI layer.
///
/// All fields have defaults, so an empty TOML document is valid; unknown
/// keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Color scheme selection for code blocks.
    pub theme: Theme,
    /// Show line numbers in code blocks.
    pub line_numbers: bool,
    /// Initial line-wrap state for code blocks.
    pub wrap_code: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            line_numbers: true,
            wrap_code: false,
        }
    }
}

impl RenderOptions {
    /// Parse options from a TOML string.
    pub fn from_toml_str(input: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(input)?)
    }

    /// Load options from a TOML file.
    pub fn from_path(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_use_defaults() {
        let options = RenderOptions::from_toml_str("").unwrap();
        assert_eq!(options, RenderOptions::default());
        assert!(options.line_numbers);
    }

    #[test]
    fn test_options_from_toml() {
        let options = RenderOptions::from_toml_str(
            r#"
theme = "dark"
wrap_code = true
"#,
        )
        .unwrap();
        assert_eq!(options.theme, Theme::Dark);
        assert!(options.wrap_code);
        assert!(options.line_numbers);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(RenderOptions::from_toml_str("themes = \"dark\"").is_err());
    }
}

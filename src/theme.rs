//! HTML theme options
//!
//! Each supported theme carries a schema of the options it understands. User
//! options are checked against that schema before they are handed to the builder.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfError, Result};

/// Theme option type for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeOptionType {
    Bool,
    String,
    Integer,
    Float,
    /// A flat mapping of string keys to string values (CSS variables).
    Object,
}

impl ThemeOptionType {
    fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            ThemeOptionType::Bool => value.is_boolean(),
            ThemeOptionType::String => value.is_string(),
            ThemeOptionType::Integer => value.is_i64(),
            ThemeOptionType::Float => value.is_f64() || value.is_i64(),
            ThemeOptionType::Object => value
                .as_object()
                .map(|map| map.values().all(|v| v.is_string()))
                .unwrap_or(false),
        }
    }
}

/// Theme option specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeOptionSpec {
    #[serde(rename = "type")]
    pub option_type: ThemeOptionType,
    pub default: serde_json::Value,
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

impl ThemeOptionSpec {
    fn new(option_type: ThemeOptionType, default: serde_json::Value) -> Self {
        Self {
            option_type,
            default,
            values: None,
        }
    }

    fn one_of(mut self, values: &[&str]) -> Self {
        self.values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

/// An HTML theme known to the configuration
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub options_schema: HashMap<String, ThemeOptionSpec>,
}

impl Theme {
    /// Option schema of the Furo theme.
    pub fn furo() -> Self {
        use serde_json::json;
        use ThemeOptionType as T;

        let options = [
            ("source_repository", ThemeOptionSpec::new(T::String, json!(""))),
            ("source_branch", ThemeOptionSpec::new(T::String, json!(""))),
            ("source_directory", ThemeOptionSpec::new(T::String, json!(""))),
            ("source_edit_link", ThemeOptionSpec::new(T::String, json!(""))),
            ("source_view_link", ThemeOptionSpec::new(T::String, json!(""))),
            ("light_css_variables", ThemeOptionSpec::new(T::Object, json!({}))),
            ("dark_css_variables", ThemeOptionSpec::new(T::Object, json!({}))),
            ("light_logo", ThemeOptionSpec::new(T::String, json!(""))),
            ("dark_logo", ThemeOptionSpec::new(T::String, json!(""))),
            ("sidebar_hide_name", ThemeOptionSpec::new(T::Bool, json!(false))),
            ("navigation_with_keys", ThemeOptionSpec::new(T::Bool, json!(false))),
            ("announcement", ThemeOptionSpec::new(T::String, json!(""))),
            (
                "top_of_page_button",
                ThemeOptionSpec::new(T::String, json!("edit")).one_of(&["edit", "view"]),
            ),
        ];

        Self {
            name: "furo".to_string(),
            options_schema: options
                .into_iter()
                .map(|(key, spec)| (key.to_string(), spec))
                .collect(),
        }
    }

    /// Look up a builtin theme by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "furo" => Some(Self::furo()),
            _ => None,
        }
    }

    /// Get effective options by merging user options with defaults
    pub fn effective_options(&self, user_options: &serde_json::Value) -> serde_json::Value {
        let mut result = serde_json::Map::new();

        let mut keys: Vec<&String> = self.options_schema.keys().collect();
        keys.sort();
        for key in keys {
            result.insert(key.clone(), self.options_schema[key].default.clone());
        }

        if let serde_json::Value::Object(user_map) = user_options {
            for (key, value) in user_map {
                result.insert(key.clone(), value.clone());
            }
        }

        serde_json::Value::Object(result)
    }

    /// Validate user options against the schema. Unknown options pass.
    pub fn validate_options(&self, user_options: &serde_json::Value) -> Result<()> {
        let user_map = user_options.as_object().ok_or_else(|| ConfError::ThemeOption {
            key: "html_theme_options".to_string(),
            message: "expected a mapping".to_string(),
        })?;

        for (key, value) in user_map {
            let Some(spec) = self.options_schema.get(key) else {
                log::debug!("Theme '{}' does not declare option '{}'", self.name, key);
                continue;
            };

            if !spec.option_type.accepts(value) {
                return Err(ConfError::ThemeOption {
                    key: key.clone(),
                    message: format!("expected {:?}, got {}", spec.option_type, value),
                });
            }

            if let (Some(allowed), Some(s)) = (&spec.values, value.as_str()) {
                if !allowed.iter().any(|a| a == s) {
                    return Err(ConfError::ThemeOption {
                        key: key.clone(),
                        message: format!("invalid value '{}', allowed: {:?}", s, allowed),
                    });
                }
            }
        }

        Ok(())
    }
}

/// `html_theme_options` for Furo as used by the XBR docs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuroOptions {
    pub source_repository: String,
    pub source_branch: String,
    pub source_directory: String,
    pub light_css_variables: IndexMap<String, String>,
    pub dark_css_variables: IndexMap<String, String>,
}

const FONT_STACK: &str =
    "'Noto Sans', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";
const FONT_STACK_MONOSPACE: &str =
    "'Noto Sans Mono', SFMono-Regular, Menlo, Consolas, monospace";

impl FuroOptions {
    pub fn xbr_defaults() -> Self {
        let fonts: IndexMap<String, String> = [
            ("font-stack", FONT_STACK),
            ("font-stack--monospace", FONT_STACK_MONOSPACE),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            source_repository: "https://github.com/wamp-proto/wamp-xbr/".to_string(),
            source_branch: "master".to_string(),
            source_directory: "docs/".to_string(),
            light_css_variables: fonts.clone(),
            dark_css_variables: fonts,
        }
    }

    /// Options as the JSON value checked by [`Theme::validate_options`].
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_xbr_options_are_valid_for_furo() {
        let theme = Theme::furo();
        let options = FuroOptions::xbr_defaults().to_value().unwrap();
        assert!(theme.validate_options(&options).is_ok());
    }

    #[test]
    fn test_light_and_dark_fonts_match() {
        let options = FuroOptions::xbr_defaults();
        assert_eq!(options.light_css_variables, options.dark_css_variables);
        assert!(options.light_css_variables["font-stack"].starts_with("'Noto Sans'"));
        assert!(options.light_css_variables["font-stack--monospace"].starts_with("'Noto Sans Mono'"));
    }

    #[test]
    fn test_theme_options() {
        let theme = Theme::furo();

        let defaults = theme.effective_options(&json!({}));
        assert_eq!(defaults["sidebar_hide_name"], false);

        let with_override = theme.effective_options(&json!({"sidebar_hide_name": true}));
        assert_eq!(with_override["sidebar_hide_name"], true);
    }

    #[test]
    fn test_theme_option_validation() {
        let theme = Theme::furo();

        assert!(theme
            .validate_options(&json!({"navigation_with_keys": true}))
            .is_ok());

        // Invalid type (string instead of bool)
        assert!(theme
            .validate_options(&json!({"navigation_with_keys": "yes"}))
            .is_err());

        // CSS variables must map to strings
        assert!(theme
            .validate_options(&json!({"light_css_variables": {"font-stack": 12}}))
            .is_err());

        // Restricted values
        assert!(theme
            .validate_options(&json!({"top_of_page_button": "share"}))
            .is_err());

        // Unknown options are allowed
        assert!(theme.validate_options(&json!({"custom": 1})).is_ok());

        assert!(theme.validate_options(&json!(["not", "a", "map"])).is_err());
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(Theme::builtin("furo").is_some());
        assert!(Theme::builtin("alabaster").is_none());
    }
}

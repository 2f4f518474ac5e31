use crate::utils::error::{RenderError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// On-disk configuration. Every field is optional; unset fields fall back
/// to the defaults in [`Settings`](super::settings::Settings).
///
/// ```toml
/// [render]
/// widget_selector = ".star-rating"
/// rating_selector = "strong.rating"
/// fill_selector = "span"
/// scale = 5.0
///
/// [source]
/// inputs = ["site/", "https://${SHOP_HOST}/product/42"]
/// timeout_seconds = 30
///
/// [load]
/// output_dir = "./rendered"
/// report_formats = ["json", "csv"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub render: RenderSection,
    pub source: SourceSection,
    pub load: LoadSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub widget_selector: Option<String>,
    pub rating_selector: Option<String>,
    pub fill_selector: Option<String>,
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSection {
    pub inputs: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>,
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadSection {
    pub output_dir: Option<String>,
    pub in_place: Option<bool>,
    pub report_formats: Option<Vec<String>>,
    pub archive: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| RenderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
            })
            .into_owned()
    }
}

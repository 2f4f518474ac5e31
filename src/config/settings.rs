use super::toml_config::TomlConfig;
use crate::core::renderer::{
    RenderOptions, DEFAULT_FILL_SELECTOR, DEFAULT_RATING_SELECTOR, DEFAULT_SCALE,
    DEFAULT_WIDGET_SELECTOR,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RenderError, Result};
use crate::utils::validation::{self, Validate};

pub const STDIN_INPUT: &str = "-";
pub const REPORT_FORMATS: &[&str] = &["json", "csv"];

/// Effective configuration after merging the config file and CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub inputs: Vec<String>,
    pub output_dir: String,
    pub in_place: bool,
    pub dry_run: bool,
    pub report_formats: Vec<String>,
    pub archive: Option<String>,
    pub timeout_seconds: u64,
    pub extensions: Vec<String>,
    pub widget_selector: String,
    pub rating_selector: String,
    pub fill_selector: String,
    pub scale: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inputs: vec![STDIN_INPUT.to_string()],
            output_dir: "./rendered".to_string(),
            in_place: false,
            dry_run: false,
            report_formats: Vec::new(),
            archive: None,
            timeout_seconds: 30,
            extensions: vec!["html".to_string(), "htm".to_string()],
            widget_selector: DEFAULT_WIDGET_SELECTOR.to_string(),
            rating_selector: DEFAULT_RATING_SELECTOR.to_string(),
            fill_selector: DEFAULT_FILL_SELECTOR.to_string(),
            scale: DEFAULT_SCALE,
        }
    }
}

impl Settings {
    pub fn from_toml(config: TomlConfig) -> Self {
        let defaults = Self::default();
        let TomlConfig {
            render,
            source,
            load,
        } = config;

        Self {
            inputs: source.inputs.unwrap_or(defaults.inputs),
            output_dir: load.output_dir.unwrap_or(defaults.output_dir),
            in_place: load.in_place.unwrap_or(defaults.in_place),
            dry_run: defaults.dry_run,
            report_formats: load.report_formats.unwrap_or(defaults.report_formats),
            archive: load.archive.or(defaults.archive),
            timeout_seconds: source.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            extensions: source.extensions.unwrap_or(defaults.extensions),
            widget_selector: render.widget_selector.unwrap_or(defaults.widget_selector),
            rating_selector: render.rating_selector.unwrap_or(defaults.rating_selector),
            fill_selector: render.fill_selector.unwrap_or(defaults.fill_selector),
            scale: render.scale.unwrap_or(defaults.scale),
        }
    }

    pub fn is_url(input: &str) -> bool {
        input.starts_with("http://") || input.starts_with("https://")
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(RenderError::MissingConfigError {
                field: "source.inputs".to_string(),
            });
        }

        let stdin_count = self.inputs.iter().filter(|i| *i == STDIN_INPUT).count();
        if stdin_count > 1 {
            return Err(RenderError::invalid_value(
                "source.inputs",
                STDIN_INPUT,
                "stdin can only be read once",
            ));
        }

        for input in &self.inputs {
            if Settings::is_url(input) {
                validation::validate_url("source.inputs", input)?;
            } else {
                validation::validate_path("source.inputs", input)?;
            }
        }

        validation::validate_path("load.output_dir", &self.output_dir)?;
        validation::validate_formats("load.report_formats", &self.report_formats, REPORT_FORMATS)?;
        validation::validate_positive_number("source.timeout_seconds", self.timeout_seconds, 1)?;

        if self.extensions.is_empty() {
            return Err(RenderError::MissingConfigError {
                field: "source.extensions".to_string(),
            });
        }

        if let Some(archive) = &self.archive {
            validation::validate_non_empty_string("load.archive", archive)?;
            if self.in_place {
                return Err(RenderError::invalid_value(
                    "load.archive",
                    archive,
                    "cannot bundle an archive while rewriting files in place",
                ));
            }
        }

        validation::validate_selector("render.widget_selector", &self.widget_selector)?;
        validation::validate_selector("render.rating_selector", &self.rating_selector)?;
        validation::validate_selector("render.fill_selector", &self.fill_selector)?;
        validation::validate_scale("render.scale", self.scale)?;

        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn in_place(&self) -> bool {
        self.in_place
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }

    fn report_formats(&self) -> &[String] {
        &self.report_formats
    }

    fn archive(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn render_options(&self) -> Result<RenderOptions> {
        RenderOptions::new(
            &self.widget_selector,
            &self.rating_selector,
            &self.fill_selector,
            self.scale,
        )
    }
}

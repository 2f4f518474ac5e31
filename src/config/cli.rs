use super::settings::Settings;
use super::toml_config::TomlConfig;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "star-render")]
#[command(version)]
#[command(about = "Fill star-rating widgets in HTML pages from their rating text")]
pub struct CliConfig {
    /// HTML files, directories, http(s) URLs, or '-' for stdin
    pub inputs: Vec<String>,

    /// TOML configuration file; flags given here override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for rendered pages and reports
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Rewrite input files instead of writing to the output directory
    #[arg(long, overrides_with = "no_in_place")]
    pub in_place: bool,

    /// Write to the output directory even if the config file sets in_place
    #[arg(long, overrides_with = "in_place")]
    pub no_in_place: bool,

    /// Render and report without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Report formats to write (json, csv)
    #[arg(long = "report", value_delimiter = ',')]
    pub report_formats: Vec<String>,

    /// Bundle rendered pages and reports into this zip file
    #[arg(long)]
    pub archive: Option<String>,

    #[arg(long)]
    pub widget_selector: Option<String>,

    #[arg(long)]
    pub rating_selector: Option<String>,

    #[arg(long)]
    pub fill_selector: Option<String>,

    /// Rating that fills the widget completely
    #[arg(long)]
    pub scale: Option<f64>,

    /// HTTP timeout for URL inputs
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Loads the config file, if any, and applies flags on top of it.
    pub fn into_settings(self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Settings::from_toml(TomlConfig::from_file(path)?)
            }
            None => Settings::default(),
        };

        if !self.inputs.is_empty() {
            settings.inputs = self.inputs;
        }
        if let Some(dir) = self.output_dir {
            settings.output_dir = dir;
        }
        if !self.report_formats.is_empty() {
            settings.report_formats = self.report_formats;
        }
        if self.archive.is_some() {
            settings.archive = self.archive;
        }
        if let Some(sel) = self.widget_selector {
            settings.widget_selector = sel;
        }
        if let Some(sel) = self.rating_selector {
            settings.rating_selector = sel;
        }
        if let Some(sel) = self.fill_selector {
            settings.fill_selector = sel;
        }
        if let Some(scale) = self.scale {
            settings.scale = scale;
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if self.in_place {
            settings.in_place = true;
        } else if self.no_in_place {
            settings.in_place = false;
        }
        // Dry run is a flag only; the config file has no such key.
        settings.dry_run = self.dry_run;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[render]\nscale = 10\nfill_selector = \"i\"\n[load]\nreport_formats = [\"json\"]\n"
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "star-render",
            "--config",
            file.path().to_str().unwrap(),
            "--scale",
            "5",
            "--report",
            "csv,json",
            "page.html",
        ]);
        let settings = cli.into_settings().unwrap();

        assert_eq!(settings.scale, 5.0);
        assert_eq!(settings.fill_selector, "i");
        assert_eq!(settings.report_formats, vec!["csv", "json"]);
        assert_eq!(settings.inputs, vec!["page.html"]);
    }

    #[test]
    fn test_no_in_place_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[load]\nin_place = true\n").unwrap();
        let path = file.path().to_str().unwrap();

        let from_file = CliConfig::parse_from(["star-render", "--config", path, "a.html"]);
        assert!(from_file.into_settings().unwrap().in_place);

        let disabled =
            CliConfig::parse_from(["star-render", "--config", path, "--no-in-place", "a.html"]);
        assert!(!disabled.into_settings().unwrap().in_place);

        let last_wins = CliConfig::parse_from([
            "star-render",
            "--config",
            path,
            "--no-in-place",
            "--in-place",
            "a.html",
        ]);
        assert!(last_wins.into_settings().unwrap().in_place);
    }

    #[test]
    fn test_no_arguments_reads_stdin() {
        let settings = CliConfig::parse_from(["star-render"]).into_settings().unwrap();
        assert_eq!(settings, Settings::default());
    }
}

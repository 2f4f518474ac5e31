use crate::domain::model::{RenderResult, WidgetOutcome};
use crate::utils::error::{RenderError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const JSON_REPORT_NAME: &str = "render-report.json";
pub const CSV_REPORT_NAME: &str = "render-report.csv";

#[derive(Debug, Serialize)]
pub struct RenderReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub scale: f64,
    pub widgets_applied: usize,
    pub widgets_skipped: usize,
    pub documents: Vec<DocumentReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct DocumentReport<'a> {
    pub name: &'a str,
    pub applied: usize,
    pub skipped: usize,
    pub widgets: &'a [WidgetOutcome],
}

/// One CSV row per widget.
#[derive(Debug, Serialize)]
struct WidgetRow<'a> {
    document: &'a str,
    widget: usize,
    status: &'static str,
    rating: Option<f64>,
    width: Option<&'a str>,
    reason: Option<&'static str>,
    text: Option<&'a str>,
}

impl<'a> RenderReport<'a> {
    pub fn new(result: &'a RenderResult, scale: f64) -> Self {
        Self {
            generated_at: Utc::now(),
            scale,
            widgets_applied: result.widgets_applied(),
            widgets_skipped: result.widgets_skipped(),
            documents: result
                .documents
                .iter()
                .map(|doc| DocumentReport {
                    name: &doc.name,
                    applied: doc.summary.applied(),
                    skipped: doc.summary.skipped(),
                    widgets: &doc.summary.widgets,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        for doc in &self.documents {
            for (index, outcome) in doc.widgets.iter().enumerate() {
                let row = match outcome {
                    WidgetOutcome::Applied { rating, width } => WidgetRow {
                        document: doc.name,
                        widget: index,
                        status: "applied",
                        rating: Some(*rating),
                        width: Some(width.as_str()),
                        reason: None,
                        text: None,
                    },
                    WidgetOutcome::Skipped { reason, text } => WidgetRow {
                        document: doc.name,
                        widget: index,
                        status: "skipped",
                        rating: None,
                        width: None,
                        reason: Some(reason.as_str()),
                        text: text.as_deref(),
                    },
                };
                writer.serialize(row)?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| RenderError::IoError(e.into_error()))
    }

    /// Serialized report files as `(file name, contents)` for each format.
    pub fn render_formats(&self, formats: &[String]) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut files = Vec::new();
        for format in formats {
            match format.as_str() {
                "json" => files.push((JSON_REPORT_NAME, self.to_json()?)),
                "csv" => files.push((CSV_REPORT_NAME, self.to_csv()?)),
                other => {
                    return Err(RenderError::invalid_value(
                        "load.report_formats",
                        other,
                        "Unsupported format",
                    ))
                }
            }
        }
        Ok(files)
    }
}

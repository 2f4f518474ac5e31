use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a document came from; decides where its rendered copy goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentOrigin {
    /// `relative` is the path below the input root, used to name the output.
    File { path: PathBuf, relative: PathBuf },
    Url { url: String },
    Stdin,
}

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub origin: DocumentOrigin,
    /// Raw markup; not necessarily UTF-8.
    pub html: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingRatingElement,
    MissingFillElement,
    NotANumber,
    NegativeWidth,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingRatingElement => "missing_rating_element",
            SkipReason::MissingFillElement => "missing_fill_element",
            SkipReason::NotANumber => "not_a_number",
            SkipReason::NegativeWidth => "negative_width",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WidgetOutcome {
    Applied {
        rating: f64,
        width: String,
    },
    Skipped {
        reason: SkipReason,
        /// Rating text as found, when the rating element exists.
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl WidgetOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WidgetOutcome::Applied { .. })
    }
}

/// Outcomes of one render pass, one per widget in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderSummary {
    pub widgets: Vec<WidgetOutcome>,
}

impl RenderSummary {
    pub fn applied(&self) -> usize {
        self.widgets.iter().filter(|w| w.is_applied()).count()
    }

    pub fn skipped(&self) -> usize {
        self.widgets.len() - self.applied()
    }
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub name: String,
    pub origin: DocumentOrigin,
    pub html: Vec<u8>,
    pub summary: RenderSummary,
}

#[derive(Debug, Clone, Default)]
pub struct RenderResult {
    pub documents: Vec<RenderedDocument>,
}

impl RenderResult {
    pub fn widgets_applied(&self) -> usize {
        self.documents.iter().map(|d| d.summary.applied()).sum()
    }

    pub fn widgets_skipped(&self) -> usize {
        self.documents.iter().map(|d| d.summary.skipped()).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    pub documents: usize,
    pub widgets_applied: usize,
    pub widgets_skipped: usize,
    /// Paths written, `-` for stdout.
    pub outputs: Vec<String>,
}

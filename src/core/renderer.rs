use crate::core::number::{format_fixed_2, parse_leading_float};
use crate::domain::model::{RenderSummary, SkipReason, WidgetOutcome};
use crate::html::{Document, Selector};
use crate::utils::error::Result;

pub const DEFAULT_WIDGET_SELECTOR: &str = ".star-rating";
pub const DEFAULT_RATING_SELECTOR: &str = "strong.rating";
pub const DEFAULT_FILL_SELECTOR: &str = "span";
pub const DEFAULT_SCALE: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub widget_selector: Selector,
    pub rating_selector: Selector,
    pub fill_selector: Selector,
    /// Rating that corresponds to a 100% fill.
    pub scale: f64,
}

impl RenderOptions {
    pub fn new(widget: &str, rating: &str, fill: &str, scale: f64) -> Result<Self> {
        crate::utils::validation::validate_scale("render.scale", scale)?;
        Ok(Self {
            widget_selector: Selector::parse(widget)?,
            rating_selector: Selector::parse(rating)?,
            fill_selector: Selector::parse(fill)?,
            scale,
        })
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        let parse = |s: &str| Selector::parse(s).expect("default selectors are valid");
        Self {
            widget_selector: parse(DEFAULT_WIDGET_SELECTOR),
            rating_selector: parse(DEFAULT_RATING_SELECTOR),
            fill_selector: parse(DEFAULT_FILL_SELECTOR),
            scale: DEFAULT_SCALE,
        }
    }
}

/// `(rating / scale) * 100`, unclamped.
pub fn fill_percentage(rating: f64, scale: f64) -> f64 {
    (rating / scale) * 100.0
}

/// Why a parsed rating produced no usable width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthError {
    /// No numeric prefix, or the rating or its percentage is not finite.
    NotANumber,
    /// Below zero after rounding; CSS rejects negative widths.
    Negative,
}

impl From<WidthError> for SkipReason {
    fn from(err: WidthError) -> Self {
        match err {
            WidthError::NotANumber => SkipReason::NotANumber,
            WidthError::Negative => SkipReason::NegativeWidth,
        }
    }
}

/// Fill width for a rating text, e.g. `"4"` gives `"80.00%"` on a scale of 5.
///
/// Ratings above the scale are not clamped. A width that rounds to a negative
/// value is refused so an existing fill stays in place; `"-0.00%"` is still
/// accepted.
pub fn fill_width(rating_text: &str, scale: f64) -> std::result::Result<(f64, String), WidthError> {
    let rating = parse_leading_float(rating_text)
        .filter(|r| r.is_finite())
        .ok_or(WidthError::NotANumber)?;
    let percentage = fill_percentage(rating, scale);
    if !percentage.is_finite() {
        return Err(WidthError::NotANumber);
    }
    let fixed = format_fixed_2(percentage);
    if percentage < 0.0 && fixed != "-0.00" {
        return Err(WidthError::Negative);
    }
    Ok((rating, format!("{}%", fixed)))
}

/// Sets each rating widget's fill width from its rating text.
///
/// Widgets are handled independently in document order. A widget without a
/// rating or fill element, whose rating is not a finite number, or whose
/// width would be negative is left untouched and reported as skipped.
#[derive(Debug, Clone, Default)]
pub struct RatingRenderer {
    options: RenderOptions,
}

impl RatingRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn initialize(&self, document: &mut Document) -> RenderSummary {
        let widgets = document.select_all(&self.options.widget_selector);
        let mut summary = RenderSummary {
            widgets: Vec::with_capacity(widgets.len()),
        };

        for widget in widgets {
            let rating_elem = document.select_first_within(widget, &self.options.rating_selector);
            let fill_elem = document.select_first_within(widget, &self.options.fill_selector);
            let text = rating_elem.map(|id| document.text_content(id));

            let outcome = match (rating_elem, fill_elem) {
                (None, _) => WidgetOutcome::Skipped {
                    reason: SkipReason::MissingRatingElement,
                    text,
                },
                (Some(_), None) => WidgetOutcome::Skipped {
                    reason: SkipReason::MissingFillElement,
                    text,
                },
                (Some(_), Some(fill)) => {
                    let rating_text = text.unwrap_or_default();
                    match fill_width(&rating_text, self.options.scale) {
                        Ok((rating, width)) => {
                            document.set_style_property(fill, "width", &width);
                            WidgetOutcome::Applied { rating, width }
                        }
                        Err(err) => WidgetOutcome::Skipped {
                            reason: err.into(),
                            text: Some(rating_text),
                        },
                    }
                }
            };
            summary.widgets.push(outcome);
        }

        summary
    }
}

/// Parses `html`, runs one render pass and returns the rewritten markup.
pub fn render_html(html: &str, options: &RenderOptions) -> (String, RenderSummary) {
    let mut document = Document::parse(html);
    let summary = RatingRenderer::new(options.clone()).initialize(&mut document);
    (document.to_html(), summary)
}

use crate::html::Selector;
use crate::utils::error::{RenderError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RenderError::invalid_value(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RenderError::invalid_value(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(RenderError::invalid_value(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RenderError::invalid_value(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(RenderError::invalid_value(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_selector(field_name: &str, selector: &str) -> Result<()> {
    Selector::parse(selector).map(|_| ()).map_err(|e| match e {
        RenderError::SelectorError { reason, .. } => {
            RenderError::invalid_value(field_name, selector, reason)
        }
        other => other,
    })
}

/// Scale is the rating that maps to a full fill; it divides every rating.
pub fn validate_scale(field_name: &str, scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RenderError::invalid_value(
            field_name,
            scale,
            "Scale must be a finite number greater than zero",
        ));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(RenderError::invalid_value(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_formats(field_name: &str, formats: &[String], allowed: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed.iter().copied().collect();

    for format in formats {
        if !allowed_set.contains(format.as_str()) {
            return Err(RenderError::invalid_value(
                field_name,
                format,
                format!("Unsupported format. Valid formats: {}", allowed.join(", ")),
            ));
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RenderError::invalid_value(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("inputs", "https://example.com/product.html").is_ok());
        assert!(validate_url("inputs", "http://example.com").is_ok());
        assert!(validate_url("inputs", "").is_err());
        assert!(validate_url("inputs", "invalid-url").is_err());
        assert!(validate_url("inputs", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_selector() {
        assert!(validate_selector("render.fill_selector", "span").is_ok());
        assert!(validate_selector("render.rating_selector", "strong.rating").is_ok());
        assert!(validate_selector("render.widget_selector", "div > span").is_err());
        assert!(validate_selector("render.widget_selector", "").is_err());
    }

    #[test]
    fn test_validate_scale() {
        assert!(validate_scale("render.scale", 5.0).is_ok());
        assert!(validate_scale("render.scale", 0.0).is_err());
        assert!(validate_scale("render.scale", -1.0).is_err());
        assert!(validate_scale("render.scale", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_formats() {
        let formats = vec!["json".to_string(), "csv".to_string()];
        assert!(validate_formats("load.report_formats", &formats, &["json", "csv"]).is_ok());

        let invalid = vec!["xml".to_string()];
        assert!(validate_formats("load.report_formats", &invalid, &["json", "csv"]).is_err());
    }
}

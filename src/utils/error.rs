use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP request to {url} returned status {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV report error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid selector '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },

    #[error("Cannot read source {source_name}: {message}")]
    SourceError {
        source_name: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Network,
    Config,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RenderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RenderError::IoError(_) | RenderError::SourceError { .. } => ErrorCategory::Io,
            RenderError::HttpError(_) | RenderError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            RenderError::ConfigValidationError { .. }
            | RenderError::InvalidConfigValueError { .. }
            | RenderError::MissingConfigError { .. }
            | RenderError::SelectorError { .. } => ErrorCategory::Config,
            RenderError::CsvError(_)
            | RenderError::SerializationError(_)
            | RenderError::ZipError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Config | ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RenderError::IoError(_) => {
                "Check that the input files exist and the output directory is writable".to_string()
            }
            RenderError::SourceError { .. } => {
                "Pass an existing file, a directory, an http(s) URL or '-' for stdin".to_string()
            }
            RenderError::HttpError(_) => {
                "Check network connectivity or raise --timeout-seconds".to_string()
            }
            RenderError::HttpStatusError { status, .. } if *status >= 500 => {
                "The server failed; retry later".to_string()
            }
            RenderError::HttpStatusError { .. } => "Check that the URL is correct".to_string(),
            RenderError::ConfigValidationError { field, .. }
            | RenderError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the config file or on the command line", field)
            }
            RenderError::MissingConfigError { field } => format!("Provide a value for '{}'", field),
            RenderError::SelectorError { .. } => {
                "Use a simple selector such as 'span', '.star-rating' or 'strong.rating'".to_string()
            }
            RenderError::CsvError(_) | RenderError::SerializationError(_) => {
                "Try a different report format".to_string()
            }
            RenderError::ZipError(_) => "Check the archive name and free disk space".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write a document: {}", self),
            ErrorCategory::Network => format!("Could not fetch a page: {}", self),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
        }
    }

    pub fn invalid_value(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        RenderError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = RenderError::HttpStatusError {
            url: "http://localhost/x".to_string(),
            status: 404,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = RenderError::MissingConfigError {
            field: "load.output_dir".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("load.output_dir"));
    }

    #[test]
    fn test_user_friendly_message_includes_detail() {
        let err = RenderError::invalid_value("render.scale", 0, "must be greater than zero");
        let msg = err.user_friendly_message();
        assert!(msg.starts_with("Configuration problem"));
        assert!(msg.contains("render.scale"));
    }
}

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for lanternfly operations.
#[derive(Debug, Error)]
pub enum LanternflyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest for split '{split}' not found at {path}")]
    ManifestNotFound { split: String, path: PathBuf },

    #[error("Failed to read annotation {path}: {source}")]
    AnnotationRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse annotation {path}: {message}")]
    AnnotationParse { path: PathBuf, message: String },

    #[error("Label '{label}' in {image} is not in the class vocabulary")]
    LabelOutOfVocabulary { label: String, image: String },

    #[error("Invalid split name '{0}'")]
    InvalidSplitName(String),

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    #[error("Failed to parse example JSON from {path} (line {line}): {source}")]
    JsonlParse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write example JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },
}

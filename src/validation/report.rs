//! Validation report types for structured error reporting.

use std::fmt;

use serde::Serialize;

/// Every issue found while validating generated examples.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// Number of examples that were checked.
    pub examples_checked: usize,

    /// All issues found during validation, in discovery order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if validation passed in strict mode (no errors or warnings).
    pub fn is_ok_strict(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues carrying `code`.
    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.code == code)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(
                f,
                "Validation passed: {} example(s), no issues found",
                self.examples_checked
            );
        }

        writeln!(
            f,
            "Validation of {} example(s) completed with {} error(s) and {} warning(s):",
            self.examples_checked,
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Suspicious data that the dataset can still be built from.
    Warning,
    /// Data the dataset cannot be built from.
    Error,
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    // Vocabulary
    /// A label is not one of the dataset's classes.
    LabelOutOfVocabulary,

    // Boxes
    /// A normalized box has NaN or infinite coordinates.
    BBoxNotFinite,
    /// A box has min > max on some axis.
    InvalidBBoxOrdering,
    /// A normalized box has a coordinate outside [0, 1].
    BBoxOutOfRange,

    // Files and manifests
    /// The image file for an example does not exist.
    ImageMissing,
    /// An identifier appears more than once in one manifest.
    DuplicateIdentifier,
    /// An identifier appears in more than one split.
    IdentifierInMultipleSplits,
    /// A split's manifest lists no identifiers.
    EmptySplit,
}

/// Where a validation issue was found.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueContext {
    Split { split: String },
    Example { split: String, id: String },
    Object { split: String, id: String, index: usize },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Split { split } => write!(f, "split {}", split),
            IssueContext::Example { split, id } => write!(f, "{}/{}", split, id),
            IssueContext::Object { split, id, index } => {
                write!(f, "{}/{} object {}", split, id, index)
            }
        }
    }
}

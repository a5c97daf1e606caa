//! Validation of generated examples.
//!
//! Generation itself trusts the annotation corpus: it does not check box
//! geometry, label vocabulary or whether images exist. This module runs
//! those checks over generated examples and reports what it finds:
//! - Labels outside the class vocabulary (errors)
//! - Non-finite boxes (errors)
//! - Unordered boxes and boxes outside the image (warnings)
//! - Missing image files (warnings)
//! - Identifiers repeated within or across splits (warnings)
//! - Splits with no examples (warnings)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::builder::DatasetBuilder;
use crate::error::LanternflyError;
use crate::features::ClassLabel;
use crate::ir::{Example, SplitName};

/// Options for validation behavior.
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
    /// If true, check that each example's image file exists.
    pub check_images: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            check_images: true,
        }
    }
}

/// Generates every configured split and validates each example.
///
/// Generation errors (missing manifests, unreadable or malformed
/// annotations) are returned as errors, not reported as issues.
pub fn validate_dataset(
    builder: &DatasetBuilder,
    opts: &ValidateOptions,
) -> Result<ValidationReport, LanternflyError> {
    let classes = builder.info().features.class_label().clone();
    let mut validator = ExampleValidator::new(classes, opts.clone());

    for examples in builder.split_generators()? {
        let split = examples.split().clone();
        let mut count = 0;
        for item in examples {
            let (id, example) = item?;
            validator.check(&split, &id, &example);
            count += 1;
        }
        validator.check_split_size(&split, count);
    }

    Ok(validator.finish())
}

/// Accumulates issues over a stream of examples.
#[derive(Debug)]
pub struct ExampleValidator {
    classes: ClassLabel,
    opts: ValidateOptions,
    report: ValidationReport,
    // id -> first split it was seen in
    first_split: HashMap<String, SplitName>,
    // every (split, id) pair seen so far
    split_ids: HashSet<(SplitName, String)>,
    // (split, id) pairs already reported as duplicates
    reported_duplicates: HashSet<(SplitName, String)>,
}

impl ExampleValidator {
    pub fn new(classes: ClassLabel, opts: ValidateOptions) -> Self {
        Self {
            classes,
            opts,
            report: ValidationReport::new(),
            first_split: HashMap::new(),
            split_ids: HashSet::new(),
            reported_duplicates: HashSet::new(),
        }
    }

    /// Checks one example of `split`.
    pub fn check(&mut self, split: &SplitName, id: &str, example: &Example) {
        self.report.examples_checked += 1;

        self.check_identifier(split, id);
        self.check_objects(split, id, example);

        if self.opts.check_images && !example.image.is_file() {
            self.report.add(ValidationIssue::warning(
                IssueCode::ImageMissing,
                format!("Image file {} does not exist", example.image.display()),
                example_context(split, id),
            ));
        }
    }

    /// Checks the number of examples a split produced.
    pub fn check_split_size(&mut self, split: &SplitName, count: usize) {
        if count == 0 {
            self.report.add(ValidationIssue::warning(
                IssueCode::EmptySplit,
                "Manifest lists no identifiers",
                IssueContext::Split {
                    split: split.to_string(),
                },
            ));
        }
    }

    pub fn finish(self) -> ValidationReport {
        self.report
    }

    fn check_identifier(&mut self, split: &SplitName, id: &str) {
        let key = (split.clone(), id.to_string());

        if self.split_ids.contains(&key) {
            if self.reported_duplicates.insert(key) {
                self.report.add(ValidationIssue::warning(
                    IssueCode::DuplicateIdentifier,
                    format!("Identifier '{}' is listed more than once", id),
                    example_context(split, id),
                ));
            }
            return;
        }
        self.split_ids.insert(key);

        match self.first_split.get(id) {
            Some(first_split) => {
                self.report.add(ValidationIssue::warning(
                    IssueCode::IdentifierInMultipleSplits,
                    format!("Identifier '{}' is also in split '{}'", id, first_split),
                    example_context(split, id),
                ));
            }
            None => {
                self.first_split.insert(id.to_string(), split.clone());
            }
        }
    }

    fn check_objects(&mut self, split: &SplitName, id: &str, example: &Example) {
        for (index, object) in example.objects.iter().enumerate() {
            let context = || IssueContext::Object {
                split: split.to_string(),
                id: id.to_string(),
                index,
            };

            if !self.classes.contains(&object.label) {
                self.report.add(ValidationIssue::error(
                    IssueCode::LabelOutOfVocabulary,
                    format!(
                        "Label '{}' is not one of: {}",
                        object.label,
                        self.classes.names().join(", ")
                    ),
                    context(),
                ));
            }

            let bbox = &object.bbox;
            if !bbox.is_finite() {
                self.report.add(ValidationIssue::error(
                    IssueCode::BBoxNotFinite,
                    format!("Box {:?} has non-finite coordinates", bbox.to_yxyx()),
                    context(),
                ));
                continue;
            }

            if !bbox.is_ordered() {
                self.report.add(ValidationIssue::warning(
                    IssueCode::InvalidBBoxOrdering,
                    format!(
                        "Box [ymin, xmin, ymax, xmax] = {:?} has min > max",
                        bbox.to_yxyx()
                    ),
                    context(),
                ));
            }

            if !bbox.is_within_unit() {
                self.report.add(ValidationIssue::warning(
                    IssueCode::BBoxOutOfRange,
                    format!(
                        "Box [ymin, xmin, ymax, xmax] = {:?} extends outside the image",
                        bbox.to_yxyx()
                    ),
                    context(),
                ));
            }
        }
    }
}

fn example_context(split: &SplitName, id: &str) -> IssueContext {
    IssueContext::Example {
        split: split.to_string(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BoundingBox, LabeledObject};

    fn split(name: &str) -> SplitName {
        SplitName::new(name).expect("valid split")
    }

    fn validator() -> ExampleValidator {
        ExampleValidator::new(
            ClassLabel::lanternfly(),
            ValidateOptions {
                strict: false,
                check_images: false,
            },
        )
    }

    fn example(objects: Vec<LabeledObject>) -> Example {
        Example::new("images/a1.png", "a1.png", objects)
    }

    #[test]
    fn clean_example_has_no_issues() {
        let mut v = validator();
        v.check(
            &split("train"),
            "a1",
            &example(vec![LabeledObject::new(
                "adult",
                BoundingBox::from_yxyx(0.1, 0.1, 0.3, 0.2),
            )]),
        );
        let report = v.finish();
        assert!(report.is_ok_strict());
        assert_eq!(report.examples_checked, 1);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let mut v = validator();
        v.check(
            &split("train"),
            "a1",
            &example(vec![LabeledObject::new(
                "wasp",
                BoundingBox::from_yxyx(0.1, 0.1, 0.3, 0.2),
            )]),
        );
        let report = v.finish();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.with_code(IssueCode::LabelOutOfVocabulary).count(), 1);
    }

    #[test]
    fn geometry_problems_are_warnings() {
        let mut v = validator();
        v.check(
            &split("train"),
            "a1",
            &example(vec![
                LabeledObject::new("adult", BoundingBox::from_yxyx(0.5, 0.1, 0.2, 0.3)),
                LabeledObject::new("adult", BoundingBox::from_yxyx(0.1, 0.1, 1.5, 0.3)),
            ]),
        );
        let report = v.finish();
        assert!(report.is_ok());
        assert_eq!(report.with_code(IssueCode::InvalidBBoxOrdering).count(), 1);
        assert_eq!(report.with_code(IssueCode::BBoxOutOfRange).count(), 1);
    }

    #[test]
    fn nan_box_is_an_error_without_geometry_warnings() {
        let mut v = validator();
        v.check(
            &split("train"),
            "a1",
            &example(vec![LabeledObject::new(
                "adult",
                BoundingBox::from_yxyx(f64::NAN, 0.1, 0.2, 0.3),
            )]),
        );
        let report = v.finish();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn repeated_identifiers_are_reported() {
        let mut v = validator();
        let empty = example(vec![]);
        v.check(&split("train"), "a1", &empty);
        v.check(&split("train"), "a1", &empty);
        v.check(&split("train"), "a1", &empty);
        v.check(&split("test"), "a1", &empty);

        let report = v.finish();
        assert_eq!(report.with_code(IssueCode::DuplicateIdentifier).count(), 1);
        assert_eq!(
            report
                .with_code(IssueCode::IdentifierInMultipleSplits)
                .count(),
            1
        );
    }

    #[test]
    fn repeat_within_a_later_split_is_a_duplicate() {
        let mut v = validator();
        let empty = example(vec![]);
        v.check(&split("train"), "a1", &empty);
        v.check(&split("train"), "a2", &empty);
        v.check(&split("test"), "a1", &empty);
        v.check(&split("test"), "a1", &empty);

        let report = v.finish();
        let duplicates: Vec<_> = report.with_code(IssueCode::DuplicateIdentifier).collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].context.to_string(), "test/a1");
        assert_eq!(
            report
                .with_code(IssueCode::IdentifierInMultipleSplits)
                .count(),
            1
        );
    }

    #[test]
    fn empty_split_is_a_warning() {
        let mut v = validator();
        v.check_split_size(&split("train"), 3);
        v.check_split_size(&split("test"), 0);

        let report = v.finish();
        let issues: Vec<_> = report.with_code(IssueCode::EmptySplit).collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].context.to_string(), "split test");
    }

    #[test]
    fn missing_image_is_a_warning() {
        let mut v = ExampleValidator::new(ClassLabel::lanternfly(), ValidateOptions::default());
        v.check(
            &split("train"),
            "a1",
            &Example::new("/definitely/not/here/a1.png", "a1.png", vec![]),
        );
        let report = v.finish();
        assert_eq!(report.with_code(IssueCode::ImageMissing).count(), 1);
        assert!(report.is_ok());
        assert!(!report.is_ok_strict());
    }
}

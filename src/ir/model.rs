//! Per-image example records.
//!
//! An [`Example`] is what the builder yields for every identifier in a split
//! manifest: the image location, its file name, the labeled boxes parsed
//! from the annotation file, and the sorted set of labels present.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::bbox::BoundingBox;
use crate::error::LanternflyError;

/// One `<object>` from an annotation file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledObject {
    /// Lower-cased object name.
    pub label: String,

    /// Box normalized to the image size.
    pub bbox: BoundingBox,
}

impl LabeledObject {
    /// Creates a labeled object. The label is lower-cased.
    pub fn new(label: impl AsRef<str>, bbox: BoundingBox) -> Self {
        Self {
            label: label.as_ref().to_lowercase(),
            bbox,
        }
    }
}

/// A fully assembled record for one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Path of the PNG image this example describes.
    pub image: PathBuf,

    /// Image file name, `<id>.png`.
    #[serde(rename = "image/filename")]
    pub image_identifier: String,

    /// Labeled boxes in annotation document order.
    pub objects: Vec<LabeledObject>,

    /// Distinct labels from `objects`, sorted lexicographically.
    pub labels: Vec<String>,
}

impl Example {
    /// Builds an example, deriving `labels` from `objects`.
    pub fn new(
        image: impl Into<PathBuf>,
        image_identifier: impl Into<String>,
        objects: Vec<LabeledObject>,
    ) -> Self {
        let labels = unique_labels(&objects);
        Self {
            image: image.into(),
            image_identifier: image_identifier.into(),
            objects,
            labels,
        }
    }
}

/// Returns the sorted, duplicate-free labels of `objects`.
pub fn unique_labels(objects: &[LabeledObject]) -> Vec<String> {
    objects
        .iter()
        .map(|object| object.label.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect()
}

/// The name of a dataset split, e.g. `train` or `test`.
///
/// Split names become file names under `image_sets/`, so they must be
/// non-empty and free of path separators.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SplitName(String);

impl SplitName {
    pub const TRAIN: &'static str = "train";
    pub const TEST: &'static str = "test";

    /// Validates and wraps a split name.
    pub fn new(name: impl Into<String>) -> Result<Self, LanternflyError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed != name
            || trimmed == "."
            || trimmed == ".."
            || trimmed.contains(['/', '\\'])
        {
            return Err(LanternflyError::InvalidSplitName(name));
        }
        Ok(Self(name))
    }

    /// The `train` and `test` splits, in that order.
    pub fn defaults() -> Vec<SplitName> {
        vec![Self(Self::TRAIN.to_string()), Self(Self::TEST.to_string())]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SplitName {
    type Error = LanternflyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SplitName::new(value)
    }
}

impl From<SplitName> for String {
    fn from(split: SplitName) -> Self {
        split.0
    }
}

impl std::str::FromStr for SplitName {
    type Err = LanternflyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SplitName::new(s)
    }
}

impl fmt::Debug for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SplitName({})", self.0)
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

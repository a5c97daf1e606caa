//! Dataset descriptor: metadata, feature schema and class vocabulary.
//!
//! Every example conforms to this schema:
//!
//! | feature          | type                                   |
//! |------------------|----------------------------------------|
//! | `image`          | PNG image reference                    |
//! | `image/filename` | text                                   |
//! | `objects`        | sequence of `{label: class, bbox}`     |
//! | `labels`         | sequence of class                      |
//!
//! The class vocabulary is closed. Encoding an example against it is the
//! step that rejects labels the annotators weren't supposed to use.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::error::LanternflyError;
use crate::ir::{BoundingBox, Example, SplitName};

pub const DATASET_NAME: &str = "lanternfly";
pub const DATASET_VERSION: &str = "1.0.0";

/// Class names, in index order.
pub const LABEL_NAMES: [&str; 4] = [
    "egg masses",
    "instar nymph (1-3)",
    "instar nymph (4)",
    "adult",
];

/// A closed, ordered set of class names. A name's index is its class id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassLabel {
    names: Vec<String>,
}

impl ClassLabel {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The lanternfly life-stage vocabulary.
    pub fn lanternfly() -> Self {
        Self::new(LABEL_NAMES)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_classes(&self) -> usize {
        self.names.len()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index_of(label).is_some()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.names.iter().position(|name| name == label)
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Maps a label to its class id.
    ///
    /// `image` only names the example in the error message.
    pub fn encode(&self, label: &str, image: &str) -> Result<usize, LanternflyError> {
        self.index_of(label)
            .ok_or_else(|| LanternflyError::LabelOutOfVocabulary {
                label: label.to_string(),
                image: image.to_string(),
            })
    }
}

/// One node of the feature schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feature {
    Image { encoding_format: &'static str },
    Text,
    #[serde(rename = "bbox")]
    BBox,
    ClassLabel { names: Vec<String> },
    Sequence { feature: Box<Feature> },
    Dict { fields: BTreeMap<&'static str, Feature> },
}

/// The example schema, parameterized by its class vocabulary.
#[derive(Clone, Debug, PartialEq)]
pub struct FeaturesDict {
    class_label: ClassLabel,
}

impl FeaturesDict {
    pub fn new(class_label: ClassLabel) -> Self {
        Self { class_label }
    }

    pub fn lanternfly() -> Self {
        Self::new(ClassLabel::lanternfly())
    }

    pub fn class_label(&self) -> &ClassLabel {
        &self.class_label
    }

    /// The schema as a tree of [`Feature`]s, keyed by record field name.
    pub fn schema(&self) -> BTreeMap<&'static str, Feature> {
        let class = Feature::ClassLabel {
            names: self.class_label.names().to_vec(),
        };
        let object = Feature::Dict {
            fields: BTreeMap::from([("label", class.clone()), ("bbox", Feature::BBox)]),
        };

        BTreeMap::from([
            (
                "image",
                Feature::Image {
                    encoding_format: crate::builder::layout::IMAGE_EXTENSION,
                },
            ),
            ("image/filename", Feature::Text),
            (
                "objects",
                Feature::Sequence {
                    feature: Box::new(object),
                },
            ),
            (
                "labels",
                Feature::Sequence {
                    feature: Box::new(class),
                },
            ),
        ])
    }

    /// Encodes an example's labels as class ids.
    ///
    /// Fails on the first label outside the vocabulary, checking `objects`
    /// in order before `labels`.
    pub fn encode_example(&self, example: &Example) -> Result<EncodedExample, LanternflyError> {
        let image = example.image_identifier.as_str();

        let objects = example
            .objects
            .iter()
            .map(|object| {
                Ok(EncodedObject {
                    label: self.class_label.encode(&object.label, image)?,
                    bbox: object.bbox,
                })
            })
            .collect::<Result<Vec<_>, LanternflyError>>()?;

        let labels = example
            .labels
            .iter()
            .map(|label| self.class_label.encode(label, image))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EncodedExample {
            image: example.image.clone(),
            image_filename: example.image_identifier.clone(),
            objects,
            labels,
        })
    }
}

impl Serialize for FeaturesDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.schema().serialize(serializer)
    }
}

/// An object with its label replaced by a class id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncodedObject {
    pub label: usize,
    pub bbox: BoundingBox,
}

/// An example with every label replaced by a class id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncodedExample {
    pub image: PathBuf,
    #[serde(rename = "image/filename")]
    pub image_filename: String,
    pub objects: Vec<EncodedObject>,
    pub labels: Vec<usize>,
}

/// Example count of one generated split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitInfo {
    pub name: String,
    pub num_examples: usize,
}

/// Dataset metadata written alongside generated splits.
#[derive(Clone, Debug, Serialize)]
pub struct DatasetInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub release_notes: BTreeMap<String, String>,
    pub features: FeaturesDict,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<SplitInfo>,
}

impl DatasetInfo {
    pub fn lanternfly() -> Self {
        Self {
            name: DATASET_NAME.to_string(),
            version: DATASET_VERSION.to_string(),
            description: "Spotted lanternfly life stages with bounding boxes.".to_string(),
            release_notes: BTreeMap::from([(
                DATASET_VERSION.to_string(),
                "Initial release.".to_string(),
            )]),
            features: FeaturesDict::lanternfly(),
            splits: Vec::new(),
        }
    }

    /// Records the example count of a finished split.
    pub fn record_split(&mut self, split: &SplitName, num_examples: usize) {
        self.splits.push(SplitInfo {
            name: split.to_string(),
            num_examples,
        });
    }
}

/// Writes dataset metadata as pretty-printed JSON.
pub fn write_dataset_info(path: &Path, info: &DatasetInfo) -> Result<(), LanternflyError> {
    let file = File::create(path).map_err(LanternflyError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, info).map_err(|source| LanternflyError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

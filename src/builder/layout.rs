//! On-disk layout of a labeling directory.
//!
//! ```text
//! <data_dir>/
//!   image_sets/<split>.txt
//!   images/<id>.png
//!   annotations/<id>.xml
//! ```

use std::path::{Path, PathBuf};

use crate::ir::SplitName;

pub const IMAGE_SETS_DIR: &str = "image_sets";
pub const IMAGES_DIR: &str = "images";
pub const ANNOTATIONS_DIR: &str = "annotations";

pub const MANIFEST_EXTENSION: &str = "txt";
pub const IMAGE_EXTENSION: &str = "png";
pub const ANNOTATION_EXTENSION: &str = "xml";

/// Resolves manifest, image and annotation paths under a base directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/image_sets/<split>.txt`
    pub fn manifest_path(&self, split: &SplitName) -> PathBuf {
        self.root
            .join(IMAGE_SETS_DIR)
            .join(format!("{}.{MANIFEST_EXTENSION}", split.as_str()))
    }

    /// `<root>/images/<id>.png`
    pub fn image_path(&self, id: &str) -> PathBuf {
        self.root.join(IMAGES_DIR).join(image_file_name(id))
    }

    /// `<root>/annotations/<id>.xml`
    pub fn annotation_path(&self, id: &str) -> PathBuf {
        self.root
            .join(ANNOTATIONS_DIR)
            .join(format!("{id}.{ANNOTATION_EXTENSION}"))
    }
}

/// The image file name recorded on an example, `<id>.png`.
///
/// The extension is appended rather than substituted, so identifiers that
/// contain dots keep them.
pub fn image_file_name(id: &str) -> String {
    format!("{id}.{IMAGE_EXTENSION}")
}

//! Example generation from a labeling directory.
//!
//! For every split, the manifest at `image_sets/<split>.txt` lists image
//! identifiers. Each identifier is turned into an [`Example`] by reading
//! `annotations/<id>.xml` and pointing at `images/<id>.png`.
//!
//! Generation is lazy and single-pass: [`SplitExamples`] holds the open
//! manifest and reads one annotation per call to `next`. A caller that stops
//! pulling stops all further file reads. The first error ends the split.

pub mod config;
pub mod layout;
pub mod manifest;

pub use config::BuilderConfig;
pub use layout::DataLayout;
pub use manifest::{open_manifest, read_manifest, ManifestIds};

use std::iter::FusedIterator;
use std::path::Path;

use crate::error::LanternflyError;
use crate::features::DatasetInfo;
use crate::ir::io_voc_xml::read_annotation;
use crate::ir::{Example, SplitName};

/// Assemble the example for one image identifier.
///
/// Reads `<data_dir>/annotations/<id>.xml`; the image itself is not opened.
pub fn assemble_example(data_dir: &Path, id: &str) -> Result<Example, LanternflyError> {
    assemble_with_layout(&DataLayout::new(data_dir), id)
}

fn assemble_with_layout(layout: &DataLayout, id: &str) -> Result<Example, LanternflyError> {
    let annotation_path = layout.annotation_path(id);
    let objects = read_annotation(&annotation_path)?.collect::<Result<Vec<_>, _>>()?;

    log::debug!("assembled '{id}' with {} object(s)", objects.len());

    Ok(Example::new(
        layout.image_path(id),
        layout::image_file_name(id),
        objects,
    ))
}

/// Start generating the examples of one split.
///
/// The manifest is opened immediately, so a missing manifest is reported
/// here rather than on the first call to `next`.
pub fn generate_split(data_dir: &Path, split: &SplitName) -> Result<SplitExamples, LanternflyError> {
    SplitExamples::open(DataLayout::new(data_dir), split.clone())
}

/// Lazily generated `(identifier, example)` pairs of one split, in manifest order.
#[derive(Debug)]
pub struct SplitExamples {
    layout: DataLayout,
    split: SplitName,
    ids: ManifestIds,
    generated: usize,
    finished: bool,
}

impl SplitExamples {
    fn open(layout: DataLayout, split: SplitName) -> Result<Self, LanternflyError> {
        let ids = open_manifest(&layout.manifest_path(&split), &split)?;
        Ok(Self {
            layout,
            split,
            ids,
            generated: 0,
            finished: false,
        })
    }

    pub fn split(&self) -> &SplitName {
        &self.split
    }

    /// Number of examples yielded so far.
    pub fn generated(&self) -> usize {
        self.generated
    }

    fn finish(&mut self) {
        self.finished = true;
        if self.generated == 0 {
            log::warn!(
                "split '{}' produced no examples ({} lists no identifiers)",
                self.split,
                self.ids.path().display()
            );
        } else {
            log::info!(
                "split '{}': generated {} example(s)",
                self.split,
                self.generated
            );
        }
    }
}

impl Iterator for SplitExamples {
    type Item = Result<(String, Example), LanternflyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let id = match self.ids.next() {
            None => {
                self.finish();
                return None;
            }
            Some(Err(err)) => {
                self.finished = true;
                return Some(Err(err));
            }
            Some(Ok(id)) => id,
        };

        match assemble_with_layout(&self.layout, &id) {
            Ok(example) => {
                self.generated += 1;
                Some(Ok((id, example)))
            }
            Err(err) => {
                self.finished = true;
                log::error!("split '{}' stopped at '{id}': {err}", self.split);
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for SplitExamples {}

/// Builds every configured split of a labeling directory.
#[derive(Clone, Debug)]
pub struct DatasetBuilder {
    config: BuilderConfig,
}

impl DatasetBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.config.data_dir)
    }

    /// Dataset metadata and feature schema.
    pub fn info(&self) -> DatasetInfo {
        DatasetInfo::lanternfly()
    }

    /// Open one generator per configured split, in configuration order.
    ///
    /// Every manifest is opened before anything is returned, so a missing
    /// manifest fails the whole build with no split started.
    pub fn split_generators(&self) -> Result<Vec<SplitExamples>, LanternflyError> {
        self.config.validate()?;
        self.config
            .splits
            .iter()
            .map(|split| SplitExamples::open(self.layout(), split.clone()))
            .collect()
    }

    /// Open the generator for a single split.
    pub fn generate(&self, split: &SplitName) -> Result<SplitExamples, LanternflyError> {
        SplitExamples::open(self.layout(), split.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_annotation(root: &Path, id: &str, label: &str) {
        let xml = format!(
            "<annotation><size><width>100</width><height>100</height></size>\
             <object><name>{label}</name><bndbox><xmin>10</xmin><ymin>20</ymin><xmax>30</xmax><ymax>40</ymax></bndbox></object>\
             </annotation>"
        );
        fs::create_dir_all(root.join("annotations")).expect("create annotations dir");
        fs::write(root.join(format!("annotations/{id}.xml")), xml).expect("write annotation");
    }

    fn write_manifest(root: &Path, split: &str, body: &str) {
        fs::create_dir_all(root.join("image_sets")).expect("create image_sets dir");
        fs::write(root.join(format!("image_sets/{split}.txt")), body).expect("write manifest");
    }

    #[test]
    fn assemble_example_builds_paths_and_labels() {
        let temp = tempfile::tempdir().expect("create temp dir");
        write_annotation(temp.path(), "a1", "Adult");

        let example = assemble_example(temp.path(), "a1").expect("assemble");
        assert_eq!(example.image, temp.path().join("images").join("a1.png"));
        assert_eq!(example.image_identifier, "a1.png");
        assert_eq!(example.objects.len(), 1);
        assert_eq!(example.labels, vec!["adult"]);
    }

    #[test]
    fn missing_annotation_is_a_read_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = assemble_example(temp.path(), "nope").unwrap_err();
        assert!(matches!(err, LanternflyError::AnnotationRead { .. }));
    }

    #[test]
    fn generator_stops_after_first_failure() {
        let temp = tempfile::tempdir().expect("create temp dir");
        write_annotation(temp.path(), "a1", "adult");
        write_annotation(temp.path(), "a3", "adult");
        write_manifest(temp.path(), "train", "a1\na2\na3\n");

        let train = SplitName::new("train").expect("valid split");
        let mut examples = generate_split(temp.path(), &train).expect("open split");

        assert_eq!(examples.next().expect("a1").expect("a1 ok").0, "a1");
        assert!(examples.next().expect("a2").is_err());
        assert!(examples.next().is_none());
        assert_eq!(examples.generated(), 1);
    }

    #[test]
    fn split_generators_fail_if_any_manifest_is_missing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        write_manifest(temp.path(), "train", "");

        let builder = DatasetBuilder::new(BuilderConfig::new(temp.path()));
        let err = builder.split_generators().unwrap_err();
        assert!(
            matches!(err, LanternflyError::ManifestNotFound { ref split, .. } if split == "test")
        );
    }
}

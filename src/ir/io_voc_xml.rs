//! Pascal VOC style annotation reader.
//!
//! Each annotation file describes one image: a `<size>` element with the
//! image `width` and `height`, followed by zero or more `<object>` elements,
//! each with a `name` and a pixel-space `bndbox`. Reading a file yields the
//! objects lazily, with labels lower-cased and boxes normalized to the image
//! size.

use std::fs;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use super::bbox::{BBoxXYXY, Pixel};
use super::model::LabeledObject;
use crate::error::LanternflyError;

const MEMORY_PATH: &str = "<memory>";

/// Read an annotation file and return its objects as a lazy sequence.
///
/// The document and its `<size>` are checked up front; per-object fields are
/// checked as the sequence is consumed. The first bad object ends the
/// sequence with an error.
pub fn read_annotation(path: &Path) -> Result<AnnotationObjects, LanternflyError> {
    let xml = fs::read_to_string(path).map_err(|source| LanternflyError::AnnotationRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_annotation_str(&xml, path)
}

/// Parse an annotation from a string and collect all of its objects.
///
/// This helper is primarily useful for testing/fuzzing parse behavior in-memory.
pub fn from_annotation_str(xml: &str) -> Result<Vec<LabeledObject>, LanternflyError> {
    parse_annotation_str(xml, Path::new(MEMORY_PATH))?.collect()
}

/// Parse an annotation from bytes and collect all of its objects.
///
/// The input must be valid UTF-8.
pub fn from_annotation_slice(bytes: &[u8]) -> Result<Vec<LabeledObject>, LanternflyError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| LanternflyError::AnnotationParse {
        path: PathBuf::from(MEMORY_PATH),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    from_annotation_str(xml)
}

/// Parse bytes and drain the lazy object sequence one item at a time.
///
/// Returns how many objects were yielded before the sequence ended.
#[cfg(feature = "fuzzing")]
pub fn fuzz_drain_annotation(bytes: &[u8]) -> usize {
    let Ok(xml) = std::str::from_utf8(bytes) else {
        return 0;
    };
    let Ok(objects) = parse_annotation_str(xml, Path::new(MEMORY_PATH)) else {
        return 0;
    };
    let mut yielded = 0;
    for object in objects {
        if object.is_err() {
            break;
        }
        yielded += 1;
    }
    yielded
}

/// Objects of one annotation file, in document order.
///
/// Single pass: once exhausted, or once an error has been yielded, it only
/// returns `None`.
#[derive(Debug)]
pub struct AnnotationObjects {
    path: PathBuf,
    width: f64,
    height: f64,
    pending: std::vec::IntoIter<RawObject>,
    failed: bool,
}

impl AnnotationObjects {
    /// Image width from `<size>`.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Image height from `<size>`.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Path of the annotation file (`<memory>` for in-memory input).
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn finish(&self, raw: RawObject) -> Result<LabeledObject, LanternflyError> {
        let context = format!("<object> #{}", raw.index + 1);
        let name = raw.name.ok_or_else(|| self.error(format!("missing <name> in {context}")))?;
        let bndbox = raw
            .bndbox
            .ok_or_else(|| self.error(format!("missing <bndbox> in {context}")))?;

        let xmin = self.coordinate(bndbox.xmin, "xmin", &context)?;
        let ymin = self.coordinate(bndbox.ymin, "ymin", &context)?;
        let xmax = self.coordinate(bndbox.xmax, "xmax", &context)?;
        let ymax = self.coordinate(bndbox.ymax, "ymax", &context)?;

        let bbox = BBoxXYXY::<Pixel>::from_xyxy(xmin, ymin, xmax, ymax)
            .to_normalized(self.width, self.height);
        Ok(LabeledObject::new(name, bbox))
    }

    fn coordinate(
        &self,
        raw: Option<String>,
        tag: &str,
        context: &str,
    ) -> Result<f64, LanternflyError> {
        let raw = raw.ok_or_else(|| self.error(format!("missing <{tag}> in <bndbox> of {context}")))?;
        parse_f64(&raw).ok_or_else(|| {
            self.error(format!(
                "invalid <{tag}> value '{raw}' in <bndbox> of {context}; expected floating-point number"
            ))
        })
    }

    fn error(&self, message: String) -> LanternflyError {
        LanternflyError::AnnotationParse {
            path: self.path.clone(),
            message,
        }
    }
}

impl Iterator for AnnotationObjects {
    type Item = Result<LabeledObject, LanternflyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let raw = self.pending.next()?;
        let result = self.finish(raw);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.pending.len()))
        }
    }
}

impl FusedIterator for AnnotationObjects {}

#[derive(Debug)]
struct RawObject {
    index: usize,
    name: Option<String>,
    bndbox: Option<RawBndBox>,
}

#[derive(Debug)]
struct RawBndBox {
    xmin: Option<String>,
    ymin: Option<String>,
    xmax: Option<String>,
    ymax: Option<String>,
}

fn parse_annotation_str(xml: &str, path: &Path) -> Result<AnnotationObjects, LanternflyError> {
    let document =
        roxmltree::Document::parse(xml).map_err(|source| LanternflyError::AnnotationParse {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;

    let root = document.root_element();
    let root_context = format!("<{}>", root.tag_name().name());

    let size = child_element(root, "size").ok_or_else(|| LanternflyError::AnnotationParse {
        path: path.to_path_buf(),
        message: format!("missing <size> in {root_context}"),
    })?;
    let width = parse_required_f64(size, "width", path)?;
    let height = parse_required_f64(size, "height", path)?;

    let pending: Vec<RawObject> = root
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
        .enumerate()
        .map(|(index, object)| RawObject {
            index,
            name: optional_child_text(object, "name"),
            bndbox: child_element(object, "bndbox").map(|bndbox| RawBndBox {
                xmin: optional_child_text(bndbox, "xmin"),
                ymin: optional_child_text(bndbox, "ymin"),
                xmax: optional_child_text(bndbox, "xmax"),
                ymax: optional_child_text(bndbox, "ymax"),
            }),
        })
        .collect();

    Ok(AnnotationObjects {
        path: path.to_path_buf(),
        width,
        height,
        pending: pending.into_iter(),
        failed: false,
    })
}

fn parse_required_f64(node: Node<'_, '_>, tag: &str, path: &Path) -> Result<f64, LanternflyError> {
    let raw = optional_child_text(node, tag).ok_or_else(|| LanternflyError::AnnotationParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in <size>"),
    })?;
    parse_f64(&raw).ok_or_else(|| LanternflyError::AnnotationParse {
        path: path.to_path_buf(),
        message: format!("invalid <{tag}> value '{raw}' in <size>; expected floating-point number"),
    })
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok()
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

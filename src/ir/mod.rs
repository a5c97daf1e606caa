//! Record types for the lanternfly dataset.
//!
//! Annotation files are read into [`LabeledObject`]s whose boxes are
//! normalized to the image size, and every image becomes one [`Example`].
//! Pixel and normalized boxes are distinct types ([`BBoxXYXY<Pixel>`] and
//! [`BoundingBox`]) so a box can't be normalized twice or not at all.
//!
//! # Example
//!
//! ```
//! use lanternfly::ir::{BBoxXYXY, Example, LabeledObject, Pixel};
//!
//! let bbox = BBoxXYXY::<Pixel>::from_xyxy(20.0, 10.0, 40.0, 30.0).to_normalized(200.0, 100.0);
//! let example = Example::new(
//!     "labeling/images/a1.png",
//!     "a1.png",
//!     vec![LabeledObject::new("Adult", bbox)],
//! );
//!
//! assert_eq!(example.labels, vec!["adult"]);
//! ```

mod bbox;
pub mod io_jsonl;
pub mod io_voc_xml;
mod model;

pub use bbox::{BBoxXYXY, BoundingBox, Normalized, Pixel};
pub use model::{unique_labels, Example, LabeledObject, SplitName};

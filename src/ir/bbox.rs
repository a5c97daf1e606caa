//! Bounding boxes in pixel and normalized space.
//!
//! Annotation files store boxes in pixels; examples carry them normalized to
//! the image size. The coordinate space is a type parameter so the two can't
//! be mixed up.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker type for absolute pixel coordinates, as written in annotation files.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for coordinates expressed as fractions of the image size.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

/// An axis-aligned box stored as (xmin, ymin, xmax, ymax).
///
/// The constructor does not enforce `min <= max` or any range; annotation
/// data is carried through as-is and [`crate::validation`] reports boxes that
/// look wrong.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    _space: PhantomData<TSpace>,
}

/// The normalized box stored on every labeled object.
pub type BoundingBox = BBoxXYXY<Normalized>;

impl<TSpace> BBoxXYXY<TSpace> {
    /// Creates a box from explicit corner coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            _space: PhantomData,
        }
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Width of the box. Negative when `xmax < xmin`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the box. Negative when `ymax < ymin`.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns true if all four coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite()
            && self.ymin.is_finite()
            && self.xmax.is_finite()
            && self.ymax.is_finite()
    }

    /// Returns true if `xmin <= xmax` and `ymin <= ymax`.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }
}

impl BBoxXYXY<Pixel> {
    /// Divides x coordinates by `image_width` and y coordinates by `image_height`.
    ///
    /// No clamping is applied, so a box outside the image produces values
    /// outside `[0, 1]`.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BoundingBox {
        BBoxXYXY::from_xyxy(
            self.xmin / image_width,
            self.ymin / image_height,
            self.xmax / image_width,
            self.ymax / image_height,
        )
    }
}

impl BBoxXYXY<Normalized> {
    /// Creates a normalized box from (ymin, xmin, ymax, xmax), the field order
    /// used by example records.
    #[inline]
    pub fn from_yxyx(ymin: f64, xmin: f64, ymax: f64, xmax: f64) -> Self {
        Self::from_xyxy(xmin, ymin, xmax, ymax)
    }

    /// Returns the coordinates as `[ymin, xmin, ymax, xmax]`.
    #[inline]
    pub fn to_yxyx(&self) -> [f64; 4] {
        [self.ymin, self.xmin, self.ymax, self.xmax]
    }

    /// Returns true if every coordinate lies in `[0, 1]`.
    pub fn is_within_unit(&self) -> bool {
        self.to_yxyx()
            .iter()
            .all(|value| (0.0..=1.0).contains(value))
    }
}

impl<TSpace> fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.xmin)
            .field("ymin", &self.ymin)
            .field("xmax", &self.xmax)
            .field("ymax", &self.ymax)
            .finish()
    }
}

impl<TSpace> Default for BBoxXYXY<TSpace> {
    fn default() -> Self {
        Self::from_xyxy(0.0, 0.0, 0.0, 0.0)
    }
}

// Records carry boxes as a bare [ymin, xmin, ymax, xmax] array.
impl Serialize for BBoxXYXY<Normalized> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        for value in self.to_yxyx() {
            tuple.serialize_element(&value)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for BBoxXYXY<Normalized> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct YxyxVisitor;

        impl<'de> Visitor<'de> for YxyxVisitor {
            type Value = BoundingBox;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array [ymin, xmin, ymax, xmax]")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = [0.0f64; 4];
                for (idx, slot) in values.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(idx, &self))?;
                }
                if seq.next_element::<f64>()?.is_some() {
                    return Err(de::Error::invalid_length(5, &self));
                }
                Ok(BBoxXYXY::from_yxyx(values[0], values[1], values[2], values[3]))
            }
        }

        deserializer.deserialize_tuple(4, YxyxVisitor)
    }
}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

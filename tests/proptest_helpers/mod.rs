#![allow(dead_code)]

use lanternfly::features::LABEL_NAMES;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const EPS: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// An object with integer pixel coordinates inside a `width` x `height` image.
#[derive(Clone, Debug)]
pub struct ArbObject {
    pub name: String,
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
}

/// A vocabulary label with random letter case.
pub fn arb_label() -> impl Strategy<Value = String> {
    (0..LABEL_NAMES.len(), any::<u64>()).prop_map(|(idx, case_bits)| {
        LABEL_NAMES[idx]
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if case_bits >> (i % 64) & 1 == 1 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    })
}

/// An ordered box inside the image.
pub fn arb_object(width: u32, height: u32) -> impl Strategy<Value = ArbObject> {
    (arb_label(), 0..=width, 0..=width, 0..=height, 0..=height).prop_map(
        |(name, x1, x2, y1, y2)| ArbObject {
            name,
            xmin: x1.min(x2),
            ymin: y1.min(y2),
            xmax: x1.max(x2),
            ymax: y1.max(y2),
        },
    )
}

/// Image size plus up to `max_objects` objects inside it.
pub fn arb_annotation(max_objects: usize) -> impl Strategy<Value = (u32, u32, Vec<ArbObject>)> {
    (1u32..=4096, 1u32..=4096).prop_flat_map(move |(width, height)| {
        (
            Just(width),
            Just(height),
            proptest::collection::vec(arb_object(width, height), 0..=max_objects),
        )
    })
}

pub fn to_xml(width: u32, height: u32, objects: &[ArbObject]) -> String {
    let mut xml = format!(
        "<annotation><size><width>{width}</width><height>{height}</height></size>"
    );
    for object in objects {
        xml.push_str(&format!(
            "<object><name>{}</name><bndbox><xmin>{}</xmin><ymin>{}</ymin><xmax>{}</xmax><ymax>{}</ymax></bndbox></object>",
            object.name, object.xmin, object.ymin, object.xmax, object.ymax
        ));
    }
    xml.push_str("</annotation>");
    xml
}

/// Manifest identifiers: short, unique, file-name safe.
pub fn arb_ids(max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-z][a-z0-9_]{0,7}", 0..=max)
        .prop_map(|ids| ids.into_iter().collect())
        .prop_shuffle()
}

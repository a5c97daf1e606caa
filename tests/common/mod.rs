#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// PNG signature followed by nothing; enough for existence checks.
pub const PNG_STUB: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// A pixel-space object: (name, xmin, ymin, xmax, ymax).
pub type PixelObject<'a> = (&'a str, f64, f64, f64, f64);

pub fn annotation_xml(width: f64, height: f64, objects: &[PixelObject<'_>]) -> String {
    let mut xml = String::new();
    writeln!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>").expect("write to string");
    writeln!(xml, "<annotation>").expect("write to string");
    writeln!(xml, "  <folder>images</folder>").expect("write to string");
    writeln!(xml, "  <size>").expect("write to string");
    writeln!(xml, "    <width>{width}</width>").expect("write to string");
    writeln!(xml, "    <height>{height}</height>").expect("write to string");
    writeln!(xml, "    <depth>3</depth>").expect("write to string");
    writeln!(xml, "  </size>").expect("write to string");
    for (name, xmin, ymin, xmax, ymax) in objects {
        writeln!(xml, "  <object>").expect("write to string");
        writeln!(xml, "    <name>{name}</name>").expect("write to string");
        writeln!(xml, "    <pose>Unspecified</pose>").expect("write to string");
        writeln!(xml, "    <bndbox>").expect("write to string");
        writeln!(xml, "      <xmin>{xmin}</xmin>").expect("write to string");
        writeln!(xml, "      <ymin>{ymin}</ymin>").expect("write to string");
        writeln!(xml, "      <xmax>{xmax}</xmax>").expect("write to string");
        writeln!(xml, "      <ymax>{ymax}</ymax>").expect("write to string");
        writeln!(xml, "    </bndbox>").expect("write to string");
        writeln!(xml, "  </object>").expect("write to string");
    }
    writeln!(xml, "</annotation>").expect("write to string");
    xml
}

pub fn write_annotation(
    root: &Path,
    id: &str,
    width: f64,
    height: f64,
    objects: &[PixelObject<'_>],
) {
    let path = root.join("annotations").join(format!("{id}.xml"));
    fs::create_dir_all(path.parent().expect("annotation parent")).expect("create annotations dir");
    fs::write(path, annotation_xml(width, height, objects)).expect("write annotation");
}

pub fn write_image(root: &Path, id: &str) {
    let path = root.join("images").join(format!("{id}.png"));
    fs::create_dir_all(path.parent().expect("image parent")).expect("create images dir");
    fs::write(path, PNG_STUB).expect("write image");
}

pub fn write_manifest(root: &Path, split: &str, body: &str) {
    let dir = root.join("image_sets");
    fs::create_dir_all(&dir).expect("create image_sets dir");
    fs::write(dir.join(format!("{split}.txt")), body).expect("write manifest");
}

/// A small labeling directory:
/// - train: a1 (one adult), a2 (two egg masses and a nymph)
/// - test: a3 (no objects)
pub fn create_sample_labeling_dir(root: &Path) {
    write_annotation(root, "a1", 200.0, 100.0, &[("adult", 20.0, 10.0, 40.0, 30.0)]);
    write_annotation(
        root,
        "a2",
        640.0,
        480.0,
        &[
            ("Egg Masses", 0.0, 0.0, 64.0, 48.0),
            ("instar nymph (1-3)", 320.0, 240.0, 640.0, 480.0),
            ("egg masses", 10.0, 10.0, 20.0, 20.0),
        ],
    );
    write_annotation(root, "a3", 50.0, 50.0, &[]);

    for id in ["a1", "a2", "a3"] {
        write_image(root, id);
    }

    write_manifest(root, "train", "a1\na2\n");
    write_manifest(root, "test", "a3\n");
}

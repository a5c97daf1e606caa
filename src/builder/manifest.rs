//! Split manifests: one image identifier per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::error::LanternflyError;
use crate::ir::SplitName;

/// Open a split's manifest for line-by-line reading.
///
/// A missing file is reported as [`LanternflyError::ManifestNotFound`].
pub fn open_manifest(path: &Path, split: &SplitName) -> Result<ManifestIds, LanternflyError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LanternflyError::ManifestNotFound {
            split: split.to_string(),
            path: path.to_path_buf(),
        },
        _ => LanternflyError::Io(source),
    })?;

    log::debug!("opened manifest for split '{split}' at {}", path.display());

    Ok(ManifestIds {
        path: path.to_path_buf(),
        lines: BufReader::new(file).lines(),
        done: false,
    })
}

/// Read every identifier of a manifest.
pub fn read_manifest(path: &Path, split: &SplitName) -> Result<Vec<String>, LanternflyError> {
    open_manifest(path, split)?.collect()
}

/// Identifiers of a manifest, in file order.
///
/// Lines are whitespace-trimmed and blank lines are skipped. The file stays
/// open until the iterator is exhausted or dropped.
#[derive(Debug)]
pub struct ManifestIds {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    done: bool,
}

impl ManifestIds {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for ManifestIds {
    type Item = Result<String, LanternflyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.lines.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(source)) => {
                    self.done = true;
                    return Some(Err(LanternflyError::Io(source)));
                }
                Some(Ok(line)) => {
                    let id = line.trim();
                    if !id.is_empty() {
                        return Some(Ok(id.to_string()));
                    }
                }
            }
        }
    }
}

impl FusedIterator for ManifestIds {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn train() -> SplitName {
        SplitName::new("train").expect("valid split")
    }

    #[test]
    fn reads_trimmed_non_empty_lines_in_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("train.txt");
        fs::write(&path, "a2\n\n  a1  \r\n\t\na3").expect("write manifest");

        let ids = read_manifest(&path, &train()).expect("read manifest");
        assert_eq!(ids, vec!["a2", "a1", "a3"]);
    }

    #[test]
    fn empty_manifest_has_no_ids() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("train.txt");
        fs::write(&path, "\n\n").expect("write manifest");

        assert!(read_manifest(&path, &train())
            .expect("read manifest")
            .is_empty());
    }

    #[test]
    fn missing_manifest_is_reported() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("train.txt");

        let err = open_manifest(&path, &train()).unwrap_err();
        match err {
            LanternflyError::ManifestNotFound { split, path: reported } => {
                assert_eq!(split, "train");
                assert_eq!(reported, path);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

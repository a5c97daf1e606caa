//! Builder configuration.
//!
//! A configuration names the labeling directory and the splits to generate.
//! It is built from CLI arguments or loaded from a YAML file:
//!
//! ```yaml
//! data_dir: /srv/lanternfly/labeling
//! splits: [train, test]
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LanternflyError;
use crate::ir::SplitName;

/// Where the labeling directory lives and which splits to build from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Base directory containing `image_sets/`, `images/` and `annotations/`.
    pub data_dir: PathBuf,

    /// Splits to generate, in order. Defaults to `train` and `test`.
    #[serde(default = "SplitName::defaults")]
    pub splits: Vec<SplitName>,
}

impl BuilderConfig {
    /// A configuration for `data_dir` with the default splits.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            splits: SplitName::defaults(),
        }
    }

    /// Replaces the split list.
    pub fn with_splits(mut self, splits: Vec<SplitName>) -> Self {
        self.splits = splits;
        self
    }

    /// Loads a configuration from a YAML file.
    ///
    /// A relative `data_dir` is resolved against the directory holding the
    /// file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, LanternflyError> {
        let yaml = fs::read_to_string(path).map_err(LanternflyError::Io)?;
        let mut config: BuilderConfig =
            serde_yaml::from_str(&yaml).map_err(|source| LanternflyError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from a YAML string. Paths are taken as-is.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LanternflyError> {
        let config: BuilderConfig =
            serde_yaml::from_str(yaml).map_err(|source| LanternflyError::ConfigParse {
                path: PathBuf::from("<memory>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that at least one split is configured and none repeats.
    pub fn validate(&self) -> Result<(), LanternflyError> {
        if self.splits.is_empty() {
            return Err(LanternflyError::ConfigInvalid(
                "at least one split must be configured".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for split in &self.splits {
            if !seen.insert(split) {
                return Err(LanternflyError::ConfigInvalid(format!(
                    "split '{split}' is listed more than once"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_train_and_test() {
        let config = BuilderConfig::new("labeling");
        let names: Vec<_> = config.splits.iter().map(SplitName::as_str).collect();
        assert_eq!(names, vec!["train", "test"]);
    }

    #[test]
    fn yaml_splits_default_when_omitted() {
        let config = BuilderConfig::from_yaml_str("data_dir: /data").expect("parse yaml");
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.splits, SplitName::defaults());
    }

    #[test]
    fn yaml_accepts_arbitrary_splits() {
        let config = BuilderConfig::from_yaml_str("data_dir: /data\nsplits: [train, validation, test]")
            .expect("parse yaml");
        let names: Vec<_> = config.splits.iter().map(SplitName::as_str).collect();
        assert_eq!(names, vec!["train", "validation", "test"]);
    }

    #[test]
    fn yaml_rejects_bad_split_names() {
        let err = BuilderConfig::from_yaml_str("data_dir: /data\nsplits: [\"../etc\"]").unwrap_err();
        assert!(matches!(err, LanternflyError::ConfigParse { .. }));
    }

    #[test]
    fn empty_and_duplicate_splits_are_rejected() {
        let empty = BuilderConfig::from_yaml_str("data_dir: /data\nsplits: []").unwrap_err();
        assert!(matches!(empty, LanternflyError::ConfigInvalid(_)));

        let dup = BuilderConfig::from_yaml_str("data_dir: /data\nsplits: [train, train]").unwrap_err();
        assert!(dup.to_string().contains("more than once"));
    }

    #[test]
    fn relative_data_dir_resolves_against_config_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("lanternfly.yaml");
        fs::write(&path, "data_dir: labeling\nsplits: [train]\n").expect("write config");

        let config = BuilderConfig::from_yaml_file(&path).expect("load config");
        assert_eq!(config.data_dir, temp.path().join("labeling"));
        assert_eq!(config.splits.len(), 1);
    }
}

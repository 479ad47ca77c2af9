use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::dataset::DatasetSplit;
use crate::error::{DatasetError, DatasetResult};

/// Name of the dataset configuration file expected at the dataset root
pub const DATA_CONFIG_FILE: &str = "data.yaml";

/// Dataset configuration read from `data.yaml`
///
/// Split entries are directories relative to the dataset root, listed in the
/// order they are processed.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    /// Root hint from the file; the root passed by the caller takes precedence
    pub path: Option<PathBuf>,
    pub train: Vec<PathBuf>,
    pub val: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
    pub nc: Option<usize>,
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawDataConfig {
    path: Option<PathBuf>,
    train: Option<PathList>,
    val: Option<PathList>,
    test: Option<PathList>,
    nc: Option<usize>,
    names: Option<ClassNames>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PathList {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl From<PathList> for Vec<PathBuf> {
    fn from(list: PathList) -> Self {
        match list {
            PathList::One(path) => vec![path],
            PathList::Many(paths) => paths,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

/// Largest class index accepted in a `names:` mapping
pub const MAX_CLASS_INDEX: usize = 65_535;

impl ClassNames {
    fn into_names(self) -> Result<Vec<String>, String> {
        match self {
            ClassNames::Sequence(names) => Ok(names),
            ClassNames::Mapping(mapping) => {
                let len = match mapping.keys().next_back() {
                    Some(&max) if max > MAX_CLASS_INDEX => {
                        return Err(format!(
                            "class index {} in 'names' exceeds the maximum of {}",
                            max, MAX_CLASS_INDEX
                        ));
                    }
                    Some(&max) => max + 1,
                    None => 0,
                };
                let mut names = vec![String::new(); len];
                for (index, name) in mapping {
                    names[index] = name;
                }
                for (index, name) in names.iter_mut().enumerate() {
                    if name.trim().is_empty() {
                        *name = format!("class_{}", index);
                    }
                }
                Ok(names)
            }
        }
    }
}

/// The first class name becomes part of output file names
fn check_file_name_component(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(format!("class name '{}' cannot be used in a file name", name));
    }
    if name.contains(['/', '\\']) {
        return Err(format!(
            "class name '{}' must not contain path separators",
            name
        ));
    }
    Ok(())
}

impl DataConfig {
    /// Load `data.yaml` from the dataset root
    pub fn load(root: &Path) -> DatasetResult<Self> {
        Self::from_file(&root.join(DATA_CONFIG_FILE))
    }

    pub fn from_file(path: &Path) -> DatasetResult<Self> {
        info!("Loading dataset configuration from: {:?}", path);

        let contents = fs::read_to_string(path).map_err(|e| DatasetError::Configuration {
            path: path.to_path_buf(),
            message: format!("cannot read configuration file: {}", e),
        })?;

        Self::from_yaml_str(&contents, path)
    }

    /// Parse configuration text; `path` is only used for error context
    pub fn from_yaml_str(yaml: &str, path: &Path) -> DatasetResult<Self> {
        let config_error = |message: String| DatasetError::Configuration {
            path: path.to_path_buf(),
            message,
        };

        let raw: RawDataConfig =
            serde_yaml::from_str(yaml).map_err(|e| config_error(e.to_string()))?;

        let train = raw
            .train
            .ok_or_else(|| config_error("missing required key 'train'".to_string()))?;
        let test = raw
            .test
            .ok_or_else(|| config_error("missing required key 'test'".to_string()))?;
        let names: Vec<String> = raw
            .names
            .ok_or_else(|| config_error("missing required key 'names'".to_string()))?
            .into_names()
            .map_err(config_error)?;

        match names.first() {
            Some(first) => check_file_name_component(first).map_err(config_error)?,
            None => return Err(config_error("'names' must list at least one class".to_string())),
        }

        if let Some(nc) = raw.nc {
            if nc != names.len() {
                warn!(
                    "Configuration declares nc={} but lists {} class names",
                    nc,
                    names.len()
                );
            }
        }

        Ok(Self {
            path: raw.path,
            train: train.into(),
            val: raw.val.map(Vec::<PathBuf>::from).unwrap_or_default(),
            test: test.into(),
            nc: raw.nc,
            names,
        })
    }

    /// Class name used to label output files
    pub fn class_name(&self) -> &str {
        // Non-empty is checked when the configuration is parsed.
        self.names.first().map(String::as_str).unwrap_or("unknown")
    }

    /// Configured directories for a source partition
    pub fn sources(&self, split: DatasetSplit) -> &[PathBuf] {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Val => &self.val,
            DatasetSplit::Test => &self.test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
path: ../datasets/microrobot
train: images/train
val: images/val
test:
  - images/test
nc: 1
names: ['microrobot']
";

    #[test]
    fn test_parse_full_config() {
        let config = DataConfig::from_yaml_str(SAMPLE, Path::new("data.yaml")).unwrap();
        assert_eq!(config.path, Some(PathBuf::from("../datasets/microrobot")));
        assert_eq!(config.train, vec![PathBuf::from("images/train")]);
        assert_eq!(config.val, vec![PathBuf::from("images/val")]);
        assert_eq!(config.test, vec![PathBuf::from("images/test")]);
        assert_eq!(config.nc, Some(1));
        assert_eq!(config.class_name(), "microrobot");
        assert_eq!(config.sources(DatasetSplit::Val), &[PathBuf::from("images/val")]);
    }

    #[test]
    fn test_val_is_optional() {
        let yaml = "train: [images/a, images/b]\ntest: images/test\nnames: [robot]\n";
        let config = DataConfig::from_yaml_str(yaml, Path::new("data.yaml")).unwrap();
        assert!(config.val.is_empty());
        assert_eq!(config.train.len(), 2);
        assert_eq!(config.nc, None);
    }

    #[test]
    fn test_names_mapping_fills_gaps() {
        let yaml = "train: images/train\ntest: images/test\nnames:\n  0: robot\n  2: bubble\n";
        let config = DataConfig::from_yaml_str(yaml, Path::new("data.yaml")).unwrap();
        assert_eq!(config.names, vec!["robot", "class_1", "bubble"]);
    }

    #[test]
    fn test_missing_required_key() {
        let yaml = "train: images/train\nnames: [robot]\n";
        let err = DataConfig::from_yaml_str(yaml, Path::new("data.yaml")).unwrap_err();
        match err {
            DatasetError::Configuration { message, .. } => assert!(message.contains("'test'")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_names_rejected() {
        let yaml = "train: images/train\ntest: images/test\nnames: []\n";
        let err = DataConfig::from_yaml_str(yaml, Path::new("data.yaml")).unwrap_err();
        assert!(matches!(err, DatasetError::Configuration { .. }));
    }

    #[test]
    fn test_huge_class_index_rejected() {
        let yaml = "train: images/train\ntest: images/test\nnames:\n  18446744073709551615: robot\n";
        match DataConfig::from_yaml_str(yaml, Path::new("data.yaml")) {
            Err(DatasetError::Configuration { message, .. }) => {
                assert!(message.contains("exceeds the maximum"))
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let yaml = "train: images/train\ntest: images/test\nnames:\n  70000: robot\n";
        assert!(matches!(
            DataConfig::from_yaml_str(yaml, Path::new("data.yaml")),
            Err(DatasetError::Configuration { .. })
        ));
    }

    #[test]
    fn test_class_name_with_path_rejected() {
        for names in ["['../escape']", "['a/b']", "['a\\\\b']", "['..']", "['  ']"] {
            let yaml = format!("train: images/train\ntest: images/test\nnames: {names}\n");
            assert!(
                matches!(
                    DataConfig::from_yaml_str(&yaml, Path::new("data.yaml")),
                    Err(DatasetError::Configuration { .. })
                ),
                "names {names} should be rejected"
            );
        }

        // Only the first name ends up in file names.
        let yaml = "train: images/train\ntest: images/test\nnames: [robot, 'bubble/cluster']\n";
        assert!(DataConfig::from_yaml_str(yaml, Path::new("data.yaml")).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = DataConfig::load(temp.path()).unwrap_err();
        match err {
            DatasetError::Configuration { path, .. } => {
                assert_eq!(path, temp.path().join(DATA_CONFIG_FILE))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

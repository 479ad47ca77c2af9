use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::layout::SourceDir;
use super::split::DatasetSplit;
use crate::config::DataConfig;
use crate::error::{DatasetError, DatasetResult};

/// Image extensions picked up when listing a source directory
pub const IMAGE_EXTENSIONS: [&str; 1] = ["png"];

/// An image file and the label path it is paired with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRef {
    pub image_path: PathBuf,
    pub label_path: PathBuf,
}

/// A dataset root together with its parsed `data.yaml`
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    config: DataConfig,
}

impl Dataset {
    pub fn open(root: impl Into<PathBuf>) -> DatasetResult<Self> {
        let root = root.into();
        let config = DataConfig::load(&root)?;
        Ok(Self { root, config })
    }

    pub fn with_config(root: impl Into<PathBuf>, config: DataConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Source directories of a partition, in configured order
    pub fn source_dirs(&self, split: DatasetSplit) -> Vec<SourceDir> {
        self.config
            .sources(split)
            .iter()
            .map(|entry| SourceDir::resolve(&self.root, entry))
            .collect()
    }

    /// Enumerate samples of the given partitions.
    ///
    /// Partitions and their directories keep configured order; files inside
    /// each directory are sorted by file name.
    pub fn samples(&self, splits: &[DatasetSplit]) -> DatasetResult<Vec<SampleRef>> {
        let mut samples = Vec::new();

        for &split in splits {
            for source in self.source_dirs(split) {
                let images = list_images(&source.images_dir)?;
                debug!(
                    "Split '{}': {} images in {:?}",
                    split,
                    images.len(),
                    source.images_dir
                );
                samples.extend(images.into_iter().map(|image_path| SampleRef {
                    label_path: source.label_path_for(&image_path),
                    image_path,
                }));
            }
        }

        Ok(samples)
    }
}

/// List image files of one directory sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_images(dir: &Path) -> DatasetResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Image directory does not exist: {:?}", dir);
            return Ok(Vec::new());
        }
        Err(e) => return Err(DatasetError::io(dir, e)),
    };

    info!("Reading images from: {:?}", dir);
    let mut image_files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DatasetError::io(dir, e))?.path();
        if path.is_file() && has_image_extension(&path) {
            image_files.push(path);
        }
    }

    image_files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(image_files)
}

fn has_image_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

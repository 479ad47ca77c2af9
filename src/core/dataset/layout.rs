use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

const IMAGES_DIR: &str = "images";
const LABELS_DIR: &str = "labels";
const LABEL_EXTENSION: &str = "txt";

/// One configured source directory resolved against the dataset root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDir {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

impl SourceDir {
    /// Resolve a `data.yaml` split entry.
    ///
    /// An entry containing an `images` component maps to the same path with
    /// that component replaced by `labels`; any other entry is treated as a
    /// split folder name under `images/` and `labels/`.
    pub fn resolve(root: &Path, entry: &Path) -> Self {
        let has_images_component = entry
            .components()
            .any(|c| c == Component::Normal(OsStr::new(IMAGES_DIR)));

        if has_images_component {
            Self {
                images_dir: root.join(entry),
                labels_dir: root.join(images_to_labels(entry)),
            }
        } else {
            Self {
                images_dir: root.join(IMAGES_DIR).join(entry),
                labels_dir: root.join(LABELS_DIR).join(entry),
            }
        }
    }

    /// Label file paired with an image: same base name, `.txt` extension
    pub fn label_path_for(&self, image_path: &Path) -> PathBuf {
        let stem = image_path.file_stem().unwrap_or_else(|| image_path.as_os_str());
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(LABEL_EXTENSION);
        self.labels_dir.join(name)
    }
}

/// Swap the last `images` component of a path for `labels`
fn images_to_labels(entry: &Path) -> PathBuf {
    let components: Vec<Component> = entry.components().collect();
    let last_images = components
        .iter()
        .rposition(|c| *c == Component::Normal(OsStr::new(IMAGES_DIR)));

    components
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if Some(i) == last_images {
                OsStr::new(LABELS_DIR)
            } else {
                c.as_os_str()
            }
        })
        .collect()
}

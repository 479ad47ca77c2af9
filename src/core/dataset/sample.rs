use tracing::debug;

use super::dataset::SampleRef;
use super::label::{read_label_file, LabelRecord};
use crate::core::grayscale::{load_grayscale, GrayImage};
use crate::error::{DatasetError, DatasetResult};

/// A decoded image with its parsed label
#[derive(Debug, Clone)]
pub struct Sample {
    pub image: GrayImage,
    pub label: LabelRecord,
}

/// Load one sample, checking the label pairing before decoding the image
pub fn load_sample(sample: &SampleRef, split: &str) -> DatasetResult<Sample> {
    if !sample.label_path.is_file() {
        return Err(DatasetError::MissingLabel {
            split: split.to_string(),
            image_path: sample.image_path.clone(),
            label_path: sample.label_path.clone(),
        });
    }

    let image = load_grayscale(&sample.image_path, split)?;
    let label = read_label_file(&sample.label_path)?;
    debug!(
        "Loaded {:?} ({}x{})",
        sample.image_path,
        image.width(),
        image.height()
    );

    Ok(Sample { image, label })
}

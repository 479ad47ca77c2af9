//! Dataset encoder: one `.amat` matrix file per logical split.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

use crate::core::dataset::{load_sample, Dataset, MatrixSplit};
use crate::core::matrix::{write_row, LABEL_COLUMNS, MATRIX_EXTENSION};
use crate::error::{DatasetError, DatasetResult};

/// Default prefix of output file names
pub const DEFAULT_PREFIX: &str = "ultrasound";

/// Options for an encoder run
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Cap on rows per split, applied in enumeration order
    pub max_images: Option<usize>,
    pub prefix: String,
    /// Where matrix files are written; defaults to the dataset root
    pub output_dir: Option<PathBuf>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_images: None,
            prefix: DEFAULT_PREFIX.to_string(),
            output_dir: None,
        }
    }
}

/// Result of encoding one split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    pub split: MatrixSplit,
    pub rows: usize,
    pub columns: usize,
    /// `None` when the split had no images and nothing was written
    pub output: Option<PathBuf>,
}

/// Result of a whole encoder run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodeReport {
    pub splits: Vec<SplitSummary>,
}

impl EncodeReport {
    pub fn get(&self, split: MatrixSplit) -> Option<&SplitSummary> {
        self.splits.iter().find(|s| s.split == split)
    }
}

/// `<prefix>_<class_name>_<split>[_<cap>].amat`
pub fn output_file_name(
    prefix: &str,
    class_name: &str,
    split: MatrixSplit,
    max_images: Option<usize>,
) -> String {
    match max_images {
        Some(cap) => format!(
            "{}_{}_{}_{}.{}",
            prefix, class_name, split, cap, MATRIX_EXTENSION
        ),
        None => format!("{}_{}_{}.{}", prefix, class_name, split, MATRIX_EXTENSION),
    }
}

/// Encode the train and test splits of the dataset under `root`.
///
/// Stops at the first fatal error; files already written for earlier splits
/// are kept and the aborted split's file is left partial.
pub fn encode_dataset(root: &Path, options: &EncodeOptions) -> DatasetResult<EncodeReport> {
    let dataset = Dataset::open(root)?;
    info!(
        "Encoding dataset at {:?} (class '{}')",
        dataset.root(),
        dataset.config().class_name()
    );

    let mut report = EncodeReport::default();
    for split in MatrixSplit::ALL {
        report.splits.push(encode_split(&dataset, split, options)?);
    }
    Ok(report)
}

#[instrument(skip(dataset, options))]
pub fn encode_split(
    dataset: &Dataset,
    split: MatrixSplit,
    options: &EncodeOptions,
) -> DatasetResult<SplitSummary> {
    let mut samples = dataset.samples(split.sources())?;
    if let Some(max) = options.max_images {
        samples.truncate(max);
    }

    if samples.is_empty() {
        warn!("No images found for split '{}', nothing written", split);
        return Ok(SplitSummary {
            split,
            rows: 0,
            columns: 0,
            output: None,
        });
    }

    let output_dir = options.output_dir.as_deref().unwrap_or(dataset.root());
    fs::create_dir_all(output_dir).map_err(|e| DatasetError::io(output_dir, e))?;
    let output_path = output_dir.join(output_file_name(
        &options.prefix,
        dataset.config().class_name(),
        split,
        options.max_images,
    ));

    let file = File::create(&output_path).map_err(|e| DatasetError::io(&output_path, e))?;
    let mut writer = BufWriter::new(file);
    let mut dimensions: Option<(u32, u32)> = None;

    for sample_ref in &samples {
        let sample = load_sample(sample_ref, split.as_str()).inspect_err(|e| {
            error!("Aborting split '{}': {}", split, e);
        })?;

        let found = sample.image.dimensions();
        match dimensions {
            None => dimensions = Some(found),
            Some(expected) if expected != found => {
                let e = DatasetError::DimensionMismatch {
                    split: split.to_string(),
                    path: sample_ref.image_path.clone(),
                    expected,
                    found,
                };
                error!("Aborting split '{}': {}", split, e);
                return Err(e);
            }
            Some(_) => {}
        }

        write_row(&mut writer, sample.image.pixels(), &sample.label.bbox_fields())
            .map_err(|e| DatasetError::io(&output_path, e))?;
        debug!("Encoded {:?}", sample_ref.image_path);
    }
    writer
        .flush()
        .map_err(|e| DatasetError::io(&output_path, e))?;

    let (width, height) = dimensions.unwrap_or((0, 0));
    let columns = width as usize * height as usize + LABEL_COLUMNS;
    info!(
        "Split '{}': wrote {} rows x {} columns to {:?}",
        split,
        samples.len(),
        columns,
        output_path
    );

    Ok(SplitSummary {
        split,
        rows: samples.len(),
        columns,
        output: Some(output_path),
    })
}

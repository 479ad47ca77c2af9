use std::path::PathBuf;
use thiserror::Error;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors raised while reading the dataset layout or writing matrix files.
///
/// Every variant carries the offending path so the operator can locate the
/// file; per-sample variants also carry the split being processed.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("configuration error in {path:?}: {message}")]
    Configuration { path: PathBuf, message: String },

    #[error("split '{split}': no label file {label_path:?} for image {image_path:?}")]
    MissingLabel {
        split: String,
        image_path: PathBuf,
        label_path: PathBuf,
    },

    #[error("malformed label file {path:?}: {message}")]
    MalformedLabel { path: PathBuf, message: String },

    #[error("split '{split}': failed to decode image {path:?}: {source}")]
    ImageRead {
        split: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "split '{split}': image {path:?} is {found:?} pixels, expected {expected:?} like the rest of the split"
    )]
    DimensionMismatch {
        split: String,
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("malformed matrix file {path:?} at line {line}: {message}")]
    MalformedMatrix {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("sample index {index} out of range for split '{split}' with {len} samples")]
    IndexOutOfRange {
        split: String,
        index: usize,
        len: usize,
    },

    #[error("batch size must be positive")]
    InvalidBatchSize,

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the bounding box conversions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoxError {
    #[error("expected 4 bounding box fields, found {0}")]
    FieldCount(usize),

    #[error("image size must be positive, got {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },
}

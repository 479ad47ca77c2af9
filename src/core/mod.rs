pub mod bbox;
pub mod dataset;
pub mod detection;
pub mod encoder;
pub mod grayscale;
pub mod matrix;

pub use bbox::{normalized_to_corners, CyCxHW, TLBR};
pub use dataset::{Dataset, DatasetSplit, LabelRecord, MatrixSplit, SampleRef};
pub use detection::{collate, BoxMask, DetectionDataset, DetectionSample, DetectionTarget};
pub use encoder::{encode_dataset, encode_split, EncodeOptions, EncodeReport, SplitSummary};
pub use grayscale::GrayImage;
pub use matrix::{read_matrix, Matrix, MatrixRow};

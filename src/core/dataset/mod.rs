mod dataset;
mod label;
mod layout;
mod sample;
mod split;

pub use dataset::{list_images, Dataset, SampleRef, IMAGE_EXTENSIONS};
pub use label::{parse_label_str, read_label_file, LabelRecord, LABEL_FIELD_COUNT};
pub use layout::SourceDir;
pub use sample::{load_sample, Sample};
pub use split::{DatasetSplit, MatrixSplit};

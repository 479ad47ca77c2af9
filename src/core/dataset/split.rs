use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source partition of the dataset as listed in `data.yaml`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSplit {
    Train,
    Val,
    Test,
}

impl DatasetSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Val => "val",
            DatasetSplit::Test => "test",
        }
    }
}

impl fmt::Display for DatasetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetSplit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(DatasetSplit::Train),
            "val" => Ok(DatasetSplit::Val),
            "test" => Ok(DatasetSplit::Test),
            other => Err(format!(
                "unknown split '{}', expected one of: train, val, test",
                other
            )),
        }
    }
}

/// Logical partition written as one matrix file.
///
/// `Train` merges the train and val source partitions, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixSplit {
    Train,
    Test,
}

impl MatrixSplit {
    pub const ALL: [MatrixSplit; 2] = [MatrixSplit::Train, MatrixSplit::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixSplit::Train => "train",
            MatrixSplit::Test => "test",
        }
    }

    pub fn sources(&self) -> &'static [DatasetSplit] {
        match self {
            MatrixSplit::Train => &[DatasetSplit::Train, DatasetSplit::Val],
            MatrixSplit::Test => &[DatasetSplit::Test],
        }
    }
}

impl fmt::Display for MatrixSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split() {
        assert_eq!("train".parse::<DatasetSplit>(), Ok(DatasetSplit::Train));
        assert_eq!("VAL".parse::<DatasetSplit>(), Ok(DatasetSplit::Val));
        assert!("holdout".parse::<DatasetSplit>().is_err());
    }

    #[test]
    fn test_train_matrix_merges_val() {
        assert_eq!(
            MatrixSplit::Train.sources(),
            &[DatasetSplit::Train, DatasetSplit::Val]
        );
        assert_eq!(MatrixSplit::Test.sources(), &[DatasetSplit::Test]);
    }
}

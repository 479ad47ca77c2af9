use std::fs;
use std::path::Path;

use crate::core::bbox::CyCxHW;
use crate::error::{DatasetError, DatasetResult};

/// Number of whitespace-separated fields on a label line
pub const LABEL_FIELD_COUNT: usize = 5;

/// A single-object label: class placeholder plus normalized box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRecord {
    /// Field 0 of the line; carried but not used by the encoder
    pub class_field: f64,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRecord {
    /// Normalized box fields in file order `[x_center, y_center, width, height]`
    pub fn bbox_fields(&self) -> [f64; 4] {
        [self.x_center, self.y_center, self.width, self.height]
    }

    pub fn to_cycxhw(&self) -> CyCxHW {
        CyCxHW::new(self.y_center, self.x_center, self.height, self.width)
    }
}

/// Read and parse a label file.
///
/// The caller is responsible for checking that the file exists; a missing
/// file surfaces here as an I/O error.
pub fn read_label_file(path: &Path) -> DatasetResult<LabelRecord> {
    let content = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    parse_label_str(&content, path)
}

/// Parse label file contents: exactly one non-empty line of exactly 5 numbers
pub fn parse_label_str(content: &str, path: &Path) -> DatasetResult<LabelRecord> {
    let malformed = |message: String| DatasetError::MalformedLabel {
        path: path.to_path_buf(),
        message,
    };

    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = lines
        .next()
        .ok_or_else(|| malformed("label file is empty".to_string()))?;
    if lines.next().is_some() {
        return Err(malformed("expected exactly one label line".to_string()));
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != LABEL_FIELD_COUNT {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            LABEL_FIELD_COUNT,
            tokens.len()
        )));
    }

    let mut values = [0.0f64; LABEL_FIELD_COUNT];
    for (value, (token, name)) in values.iter_mut().zip(
        tokens
            .iter()
            .zip(["class", "x_center", "y_center", "width", "height"]),
    ) {
        *value = token.parse::<f64>().map_err(|_| {
            malformed(format!(
                "invalid {} '{}'; expected floating-point number",
                name, token
            ))
        })?;
    }

    let [class_field, x_center, y_center, width, height] = values;
    Ok(LabelRecord {
        class_field,
        x_center,
        y_center,
        width,
        height,
    })
}

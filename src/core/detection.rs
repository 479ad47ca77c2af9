//! Detection dataset: images paired with per-image detection targets.
//!
//! Targets follow the layout Mask R-CNN style detectors train on: absolute
//! corner boxes, class labels with `0` reserved for background, box areas,
//! crowd flags and one binary mask per box.

use std::path::PathBuf;
use tracing::info;

use crate::core::bbox::TLBR;
use crate::core::dataset::{load_sample, Dataset, DatasetSplit, SampleRef};
use crate::core::grayscale::GrayImage;
use crate::error::{DatasetError, DatasetResult};

/// Label id of the single foreground class
pub const FOREGROUND_LABEL: i64 = 1;

/// Binary mask with the dimensions of its image, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BoxMask {
    /// Mark every pixel whose center lies inside the box.
    ///
    /// The box itself is not clamped; only the raster is limited to the image.
    pub fn from_box(tlbr: &TLBR, width: u32, height: u32) -> Self {
        let (x0, x1) = pixel_span(tlbr.xmin(), tlbr.xmax(), width);
        let (y0, y1) = pixel_span(tlbr.ymin(), tlbr.ymax(), height);

        let mut data = vec![0u8; width as usize * height as usize];
        for y in y0..y1 {
            let row = y * width as usize;
            data[row + x0..row + x1].fill(1);
        }

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// Index range `[start, end)` of pixels with centers in `[lo, hi)`
fn pixel_span(lo: f64, hi: f64, len: u32) -> (usize, usize) {
    let len = len as f64;
    let start = (lo - 0.5).ceil().clamp(0.0, len);
    let end = (hi - 0.5).ceil().clamp(0.0, len);
    if start.is_nan() || end.is_nan() || end <= start {
        return (0, 0);
    }
    (start as usize, end as usize)
}

/// Training target for one image
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionTarget {
    pub boxes: Vec<TLBR>,
    pub labels: Vec<i64>,
    pub image_id: usize,
    pub area: Vec<f64>,
    pub iscrowd: Vec<u8>,
    pub masks: Vec<BoxMask>,
}

#[derive(Debug, Clone)]
pub struct DetectionSample {
    pub image: GrayImage,
    pub target: DetectionTarget,
}

/// Samples of one source partition, loaded on demand
#[derive(Debug, Clone)]
pub struct DetectionDataset {
    split: DatasetSplit,
    samples: Vec<SampleRef>,
}

impl DetectionDataset {
    pub fn open(root: impl Into<PathBuf>, split: DatasetSplit) -> DatasetResult<Self> {
        let dataset = Dataset::open(root)?;
        Self::from_dataset(&dataset, split)
    }

    pub fn from_dataset(dataset: &Dataset, split: DatasetSplit) -> DatasetResult<Self> {
        let samples = dataset.samples(&[split])?;
        info!("Detection dataset '{}': {} samples", split, samples.len());
        Ok(Self { split, samples })
    }

    pub fn split(&self) -> DatasetSplit {
        self.split
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_refs(&self) -> &[SampleRef] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> DatasetResult<DetectionSample> {
        let sample_ref = self
            .samples
            .get(index)
            .ok_or_else(|| DatasetError::IndexOutOfRange {
                split: self.split.to_string(),
                index,
                len: self.samples.len(),
            })?;

        let sample = load_sample(sample_ref, self.split.as_str())?;
        let (width, height) = sample.image.dimensions();
        let tlbr = sample
            .label
            .to_cycxhw()
            .to_pixels(width, height)
            .map_err(|e| DatasetError::MalformedLabel {
                path: sample_ref.label_path.clone(),
                message: e.to_string(),
            })?
            .to_tlbr();

        let target = DetectionTarget {
            boxes: vec![tlbr],
            labels: vec![FOREGROUND_LABEL],
            image_id: index,
            area: vec![tlbr.area()],
            iscrowd: vec![0],
            masks: vec![BoxMask::from_box(&tlbr, width, height)],
        };

        Ok(DetectionSample {
            image: sample.image,
            target,
        })
    }

    /// Iterate consecutive batches; the last batch may be short
    pub fn batches(&self, batch_size: usize) -> DatasetResult<Batches<'_>> {
        if batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize);
        }
        Ok(Batches {
            dataset: self,
            batch_size,
            next: 0,
        })
    }
}

/// Split a batch of samples into parallel image and target lists
pub fn collate(samples: Vec<DetectionSample>) -> (Vec<GrayImage>, Vec<DetectionTarget>) {
    samples.into_iter().map(|s| (s.image, s.target)).unzip()
}

pub struct Batches<'a> {
    dataset: &'a DetectionDataset,
    batch_size: usize,
    next: usize,
}

impl Iterator for Batches<'_> {
    type Item = DatasetResult<(Vec<GrayImage>, Vec<DetectionTarget>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.dataset.len() {
            return None;
        }

        let end = (self.next + self.batch_size).min(self.dataset.len());
        let batch = (self.next..end)
            .map(|index| self.dataset.get(index))
            .collect::<DatasetResult<Vec<_>>>();
        self.next = end;
        Some(batch.map(collate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::{GrayImage as LumaImage, Luma};
    use std::fs;
    use std::path::Path;

    fn write_sample(root: &Path, name: &str, label: &str) {
        fs::create_dir_all(root.join("images/val")).expect("create images dir");
        fs::create_dir_all(root.join("labels/val")).expect("create labels dir");
        LumaImage::from_pixel(20, 10, Luma([128u8]))
            .save(root.join(format!("images/val/{name}.png")))
            .expect("write png");
        fs::write(root.join(format!("labels/val/{name}.txt")), label).expect("write label");
    }

    fn dataset(count: usize) -> (tempfile::TempDir, DetectionDataset) {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(
            temp.path().join("data.yaml"),
            "train: images/train\nval: images/val\ntest: images/test\nnames: [microrobot]\n",
        )
        .expect("write data.yaml");
        for i in 0..count {
            write_sample(temp.path(), &format!("frame_{i}"), "0 0.5 0.5 0.2 0.4\n");
        }
        let dataset = DetectionDataset::open(temp.path(), DatasetSplit::Val).unwrap();
        (temp, dataset)
    }

    #[test]
    fn test_target_from_label() {
        let (_temp, dataset) = dataset(1);
        assert_eq!(dataset.len(), 1);

        let sample = dataset.get(0).unwrap();
        assert_eq!(sample.image.dimensions(), (20, 10));

        let target = &sample.target;
        assert_eq!(target.labels, vec![FOREGROUND_LABEL]);
        assert_eq!(target.image_id, 0);
        assert_eq!(target.iscrowd, vec![0]);

        let [xmin, ymin, xmax, ymax] = target.boxes[0].to_xyxy();
        assert_abs_diff_eq!(xmin, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ymin, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(xmax, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ymax, 7.0, epsilon = 1e-9);
        assert_abs_diff_eq!(target.area[0], 16.0, epsilon = 1e-9);

        let mask = &target.masks[0];
        assert_eq!((mask.width(), mask.height()), (20, 10));
        assert_eq!(mask.count(), 16);
        assert_eq!(mask.get(8, 3), Some(1));
        assert_eq!(mask.get(12, 3), Some(0));
    }

    #[test]
    fn test_mask_limited_to_image() {
        let tlbr = TLBR::new(-5.0, -5.0, 2.0, 3.0);
        assert_abs_diff_eq!(tlbr.xmin(), -5.0);
        let mask = BoxMask::from_box(&tlbr, 4, 4);
        assert_eq!(mask.count(), 3 * 2);
        assert_eq!(mask.get(0, 0), Some(1));
        assert_eq!(mask.get(3, 0), Some(0));
    }

    #[test]
    fn test_index_out_of_range() {
        let (_temp, dataset) = dataset(1);
        assert!(matches!(
            dataset.get(1),
            Err(DatasetError::IndexOutOfRange { index: 1, len: 1, .. })
        ));
    }

    #[test]
    fn test_batches_collate() {
        let (_temp, dataset) = dataset(5);
        let sizes: Vec<usize> = dataset
            .batches(2)
            .unwrap()
            .map(|batch| {
                let (images, targets) = batch.unwrap();
                assert_eq!(images.len(), targets.len());
                images.len()
            })
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let (_, targets) = dataset.batches(5).unwrap().next().unwrap().unwrap();
        let ids: Vec<usize> = targets.iter().map(|t| t.image_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);

        assert!(matches!(
            dataset.batches(0),
            Err(DatasetError::InvalidBatchSize)
        ));
    }
}

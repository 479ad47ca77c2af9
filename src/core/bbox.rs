//! Bounding box formats and the normalized-to-pixel conversion.
//!
//! Labels store boxes as normalized `(x_center, y_center, width, height)`;
//! detectors expect absolute corners. No clamping to image bounds is applied,
//! so malformed labels can yield corners outside the image.

use crate::error::BoxError;

/// Bounding box in CyCxHW format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyCxHW {
    cy: f64,
    cx: f64,
    h: f64,
    w: f64,
}

impl CyCxHW {
    pub fn new(cy: f64, cx: f64, h: f64, w: f64) -> Self {
        Self { cy, cx, h, w }
    }

    /// Build a box from label field order `[x_center, y_center, width, height]`.
    pub fn from_xywh(fields: &[f64]) -> Result<Self, BoxError> {
        match *fields {
            [cx, cy, w, h] => Ok(Self { cy, cx, h, w }),
            _ => Err(BoxError::FieldCount(fields.len())),
        }
    }

    pub fn cy(&self) -> f64 {
        self.cy
    }

    pub fn cx(&self) -> f64 {
        self.cx
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    /// Scale a normalized box into pixel space of an image.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> Result<Self, BoxError> {
        if image_width == 0 || image_height == 0 {
            return Err(BoxError::InvalidImageSize {
                width: image_width,
                height: image_height,
            });
        }

        let sx = image_width as f64;
        let sy = image_height as f64;
        Ok(Self {
            cy: self.cy * sy,
            cx: self.cx * sx,
            h: self.h * sy,
            w: self.w * sx,
        })
    }

    pub fn to_tlbr(&self) -> TLBR {
        TLBR {
            t: self.cy - self.h / 2.0,
            l: self.cx - self.w / 2.0,
            b: self.cy + self.h / 2.0,
            r: self.cx + self.w / 2.0,
        }
    }
}

/// Bounding box in TLBR format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TLBR {
    t: f64,
    l: f64,
    b: f64,
    r: f64,
}

impl TLBR {
    pub fn new(t: f64, l: f64, b: f64, r: f64) -> Self {
        Self { t, l, b, r }
    }

    pub fn xmin(&self) -> f64 {
        self.l
    }

    pub fn ymin(&self) -> f64 {
        self.t
    }

    pub fn xmax(&self) -> f64 {
        self.r
    }

    pub fn ymax(&self) -> f64 {
        self.b
    }

    pub fn width(&self) -> f64 {
        self.r - self.l
    }

    pub fn height(&self) -> f64 {
        self.b - self.t
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Corners in `(xmin, ymin, xmax, ymax)` order.
    pub fn to_xyxy(&self) -> [f64; 4] {
        [self.l, self.t, self.r, self.b]
    }
}

/// Convert normalized `[x_center, y_center, width, height]` label fields into
/// absolute `[xmin, ymin, xmax, ymax]` pixel corners.
pub fn normalized_to_corners(
    fields: &[f64],
    image_width: u32,
    image_height: u32,
) -> Result<[f64; 4], BoxError> {
    let tlbr = CyCxHW::from_xywh(fields)?
        .to_pixels(image_width, image_height)?
        .to_tlbr();
    Ok(tlbr.to_xyxy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_centered_box_on_full_hd_frame() {
        let corners = normalized_to_corners(&[0.5, 0.5, 0.2, 0.1], 1920, 1080).unwrap();
        assert_abs_diff_eq!(corners[0], 768.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corners[1], 486.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corners[2], 1152.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corners[3], 594.0, epsilon = 1e-9);
    }

    #[test]
    fn test_off_center_box() {
        let corners = normalized_to_corners(&[0.55, 0.5, 0.2, 0.1], 1920, 1080).unwrap();
        assert_abs_diff_eq!(corners[0], 864.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corners[2], 1248.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_clamping_at_image_edge() {
        // Center on the left edge with a wide box spills past zero.
        let corners = normalized_to_corners(&[0.0, 1.0, 0.5, 0.5], 100, 200).unwrap();
        assert_abs_diff_eq!(corners[0], -25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corners[1], 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corners[2], 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corners[3], 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            normalized_to_corners(&[0.5, 0.5, 0.2], 10, 10),
            Err(BoxError::FieldCount(3))
        );
        assert_eq!(
            normalized_to_corners(&[0.0, 0.5, 0.5, 0.2, 0.1], 10, 10),
            Err(BoxError::FieldCount(5))
        );
    }

    #[test]
    fn test_zero_image_size() {
        assert_eq!(
            normalized_to_corners(&[0.5, 0.5, 0.2, 0.1], 0, 10),
            Err(BoxError::InvalidImageSize {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn test_tlbr_area() {
        let tlbr = CyCxHW::new(5.0, 5.0, 4.0, 2.0).to_tlbr();
        assert_eq!(tlbr.width(), 2.0);
        assert_eq!(tlbr.height(), 4.0);
        assert_eq!(tlbr.area(), 8.0);
        assert_eq!(tlbr.to_xyxy(), [4.0, 3.0, 6.0, 7.0]);
    }
}

use ndarray::ArrayD;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::crop::Crop;

/// Normalized eye centers inside a face crop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeLandmarks {
    pub left: (f32, f32),
    pub right: (f32, f32),
}

impl EyeLandmarks {
    /// Reads the first four values of a landmark tensor as
    /// `(left_x, left_y, right_x, right_y)`. Further points are ignored.
    pub fn from_output(output: &ArrayD<f32>) -> Result<Self, String> {
        let mut values = output.iter().copied();
        match (values.next(), values.next(), values.next(), values.next()) {
            (Some(lx), Some(ly), Some(rx), Some(ry)) => Ok(Self {
                left: (lx, ly),
                right: (rx, ry),
            }),
            _ => Err(format!(
                "landmark tensor of shape {:?} holds fewer than two points",
                output.shape()
            )),
        }
    }

    /// Eye boxes in the pixel space of a `width × height` face crop.
    pub fn eye_boxes(&self, width: u32, height: u32, half_size: i32) -> (BoundingBox, BoundingBox) {
        (
            eye_box(self.left, width, height, half_size),
            eye_box(self.right, width, height, half_size),
        )
    }
}

/// Square box around a normalized point. Never clamped to the crop.
fn eye_box(point: (f32, f32), width: u32, height: u32, half_size: i32) -> BoundingBox {
    let px = point.0 * width as f32;
    let py = point.1 * height as f32;
    let half = half_size as f32;
    BoundingBox::new(
        (px - half) as i32,
        (py - half) as i32,
        (px + half) as i32,
        (py + half) as i32,
    )
}

/// Both eye regions cut from one face crop. Boxes are in face-crop space.
#[derive(Clone, Debug, PartialEq)]
pub struct EyeCrops {
    pub left: Crop,
    pub right: Crop,
}

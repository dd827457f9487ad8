//! Draws stage results onto a copy of a frame.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::estimation::domain::gaze_vector::GazeVector;
use crate::estimation::domain::head_pose::HeadPose;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::visualization::domain::frame_observer::{FrameAnnotations, OverlayLayers};

const FACE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const EYE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const GAZE_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const AXIS_COLORS: [Rgb<u8>; 3] = [Rgb([255, 0, 0]), Rgb([0, 255, 0]), Rgb([0, 0, 255])];

/// Axis length as a fraction of the face box width.
const AXIS_SCALE: f32 = 0.4;
/// Gaze arrow length per unit of gaze, in pixels.
const GAZE_SCALE: f32 = 160.0;
/// Arrow head length as a fraction of the shaft.
const TIP_RATIO: f32 = 0.2;

pub struct OverlayRenderer {
    layers: OverlayLayers,
}

impl OverlayRenderer {
    pub fn new(layers: OverlayLayers) -> Self {
        Self { layers }
    }

    pub fn render(
        &self,
        frame: &Frame,
        annotations: &FrameAnnotations,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let mut canvas = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("frame data does not match its dimensions")?;
        let shown = annotations.filtered(self.layers);

        if let Some(face) = shown.face_box {
            draw_box(&mut canvas, &face, FACE_COLOR);
        }
        if let Some((left, right)) = shown.eye_boxes {
            draw_box(&mut canvas, &left, EYE_COLOR);
            draw_box(&mut canvas, &right, EYE_COLOR);
        }
        if let (Some(pose), Some(face)) = (shown.head_pose, annotations.face_box) {
            if pose.to_array().iter().all(|a| a.is_finite()) {
                draw_pose_axes(&mut canvas, &face, &pose);
            } else {
                log::debug!("Frame {}: non-finite head pose not drawn", frame.index());
            }
        }
        if let (Some(gaze), Some((left, right))) = (shown.gaze, annotations.eye_boxes) {
            if gaze.x.is_finite() && gaze.y.is_finite() {
                draw_gaze(&mut canvas, &left, &right, &gaze);
            } else {
                log::debug!("Frame {}: non-finite gaze not drawn", frame.index());
            }
        }

        Ok(Frame::new(
            canvas.into_raw(),
            frame.width(),
            frame.height(),
            3,
            frame.index(),
        ))
    }
}

/// Outline of a half-open box, clipped to the canvas.
fn draw_box(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    if bbox.is_empty() {
        return;
    }
    let rect = Rect::at(bbox.x_min, bbox.y_min).of_size(bbox.width(), bbox.height());
    draw_hollow_rect_mut(canvas, rect, color);
}

/// Shaft from `origin` along `(dx, dy)` plus a two-stroke head.
///
/// The shaft never exceeds the canvas diagonal so rasterization stays bounded.
fn draw_arrow(canvas: &mut RgbImage, origin: (f32, f32), dx: f32, dy: f32, color: Rgb<u8>) {
    let length = dx.hypot(dy);
    if length < 1.0 {
        return;
    }
    let max_length = (canvas.width() as f32).hypot(canvas.height() as f32);
    let scale = if length > max_length { max_length / length } else { 1.0 };
    let (dx, dy) = (dx * scale, dy * scale);
    let tip = (origin.0 + dx, origin.1 + dy);
    draw_line_segment_mut(canvas, origin, tip, color);

    let head = length.min(max_length) * TIP_RATIO;
    let angle = dy.atan2(dx);
    for side in [-1.0f32, 1.0] {
        let barb = angle + std::f32::consts::PI + side * std::f32::consts::FRAC_PI_6;
        let end = (tip.0 + head * barb.cos(), tip.1 + head * barb.sin());
        draw_line_segment_mut(canvas, tip, end, color);
    }
}

/// Image-plane projection of the head's x, y and z axes.
///
/// Rotation is `Rz(roll) * Ry(yaw) * Rx(pitch)`; image y points down.
pub fn pose_axes(pose: &HeadPose) -> [(f32, f32); 3] {
    let (sy, cy) = pose.yaw.to_radians().sin_cos();
    let (sp, cp) = pose.pitch.to_radians().sin_cos();
    let (sr, cr) = pose.roll.to_radians().sin_cos();

    let r = [
        [cr * cy, cr * sy * sp - sr * cp, cr * sy * cp + sr * sp],
        [sr * cy, sr * sy * sp + cr * cp, sr * sy * cp - cr * sp],
    ];
    [
        (r[0][0], r[1][0]),
        (r[0][1], -r[1][1]),
        (r[0][2], -r[1][2]),
    ]
}

fn center_of(bbox: &BoundingBox) -> (f32, f32) {
    let (x, y) = bbox.center();
    (x as f32, y as f32)
}

fn draw_pose_axes(canvas: &mut RgbImage, face: &BoundingBox, pose: &HeadPose) {
    let origin = center_of(face);
    let length = face.width() as f32 * AXIS_SCALE;
    for ((ax, ay), color) in pose_axes(pose).into_iter().zip(AXIS_COLORS) {
        draw_arrow(canvas, origin, ax * length, ay * length, color);
    }
}

fn draw_gaze(canvas: &mut RgbImage, left: &BoundingBox, right: &BoundingBox, gaze: &GazeVector) {
    for eye in [left, right] {
        draw_arrow(
            canvas,
            center_of(eye),
            gaze.x * GAZE_SCALE,
            -gaze.y * GAZE_SCALE,
            GAZE_COLOR,
        );
    }
}

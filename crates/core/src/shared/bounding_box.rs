/// Axis-aligned box in the pixel space of the image it was derived from.
///
/// Coordinates are half-open on the max side: a box `(0, 0, w, h)` covers a
/// whole `w × h` image. `x_min <= x_max` and `y_min <= y_max` always hold; a
/// box with zero width or height is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    /// Builds a box from two corners, ordering each axis.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
        }
    }

    /// Scales normalized `[0, 1]` corners by the parent image dimensions.
    ///
    /// Fractional pixels are truncated toward zero.
    pub fn from_normalized(x1: f32, y1: f32, x2: f32, y2: f32, width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        Self::new(
            (x1 * w) as i32,
            (y1 * h) as i32,
            (x2 * w) as i32,
            (y2 * h) as i32,
        )
    }

    pub fn width(&self) -> u32 {
        (self.x_max - self.x_min) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y_max - self.y_min) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.x_min == self.x_max || self.y_min == self.y_max
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.x_min + (self.x_max - self.x_min) / 2,
            self.y_min + (self.y_max - self.y_min) / 2,
        )
    }

    /// Intersection with a `width × height` image anchored at the origin.
    pub fn clamped_to(&self, width: u32, height: u32) -> Self {
        let w = width.min(i32::MAX as u32) as i32;
        let h = height.min(i32::MAX as u32) as i32;
        let x_min = self.x_min.clamp(0, w);
        let y_min = self.y_min.clamp(0, h);
        Self {
            x_min,
            y_min,
            x_max: self.x_max.clamp(x_min, w),
            y_max: self.y_max.clamp(y_min, h),
        }
    }

    /// Whether the box lies entirely inside a `width × height` image.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.clamped_to(width, height) == *self
    }

    /// Shifts the box by an offset, e.g. from crop space into frame space.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x_min: self.x_min + dx,
            y_min: self.y_min + dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }
}

use super::bounding_box::BoundingBox;
use super::frame::Frame;

/// Image region cut from a parent image, together with the box it came from.
///
/// `bbox` is expressed in the parent's pixel space and may extend past the
/// parent's edges; `image` holds only the pixels that were actually visible.
#[derive(Clone, Debug, PartialEq)]
pub struct Crop {
    image: Frame,
    bbox: BoundingBox,
}

impl Crop {
    /// Cuts `bbox` out of `parent`.
    pub fn from_parent(parent: &Frame, bbox: BoundingBox) -> Self {
        Self {
            image: parent.crop(&bbox),
            bbox,
        }
    }

    pub fn image(&self) -> &Frame {
        &self.image
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

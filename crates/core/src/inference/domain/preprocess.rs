//! Image pre-processing shared by every image-input model.
//!
//! Resize to the network's input size, reorder channels, convert HWC to CHW
//! and add a leading batch dimension of 1. Pixel values stay in `0..=255`.

use std::str::FromStr;

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array4;

use crate::shared::frame::Frame;

/// Channel order a network expects for its image inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    Rgb,
    #[default]
    Bgr,
}

impl FromStr for ChannelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "bgr" => Ok(ChannelOrder::Bgr),
            _ => Err(format!("unknown channel order '{s}' (expected rgb or bgr)")),
        }
    }
}

/// Converts an RGB frame into a `[1, 3, height, width]` tensor.
pub fn image_to_tensor(
    image: &Frame,
    size: (u32, u32),
    order: ChannelOrder,
) -> Result<Array4<f32>, String> {
    let (width, height) = size;
    if image.is_empty() {
        return Err("cannot pre-process an empty image".into());
    }
    if width == 0 || height == 0 {
        return Err(format!("invalid target size {width}x{height}"));
    }
    if image.channels() != 3 {
        return Err(format!("expected 3 channels, got {}", image.channels()));
    }

    let source = RgbImage::from_raw(image.width(), image.height(), image.data().to_vec())
        .ok_or("frame data does not match its dimensions")?;
    let resized = if source.dimensions() == (width, height) {
        source
    } else {
        image::imageops::resize(&source, width, height, FilterType::Triangle)
    };

    let channel_map: [usize; 3] = match order {
        ChannelOrder::Rgb => [0, 1, 2],
        ChannelOrder::Bgr => [2, 1, 0],
    };

    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for (c, &src) in channel_map.iter().enumerate() {
            tensor[[0, c, y as usize, x as usize]] = pixel.0[src] as f32;
        }
    }
    Ok(tensor)
}

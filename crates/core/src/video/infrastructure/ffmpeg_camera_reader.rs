//! Live capture from a webcam through ffmpeg's input devices.

use std::path::Path;

use ffmpeg_next::format::context::Context;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;

use super::ffmpeg_reader::FfmpegReader;

/// Input naming the default camera. `cam:<device>` names a specific one.
pub const CAMERA_INPUT: &str = "cam";

#[cfg(target_os = "linux")]
const DEVICE_FORMAT: &str = "video4linux2";
#[cfg(target_os = "linux")]
const DEFAULT_DEVICE: Option<&str> = Some("/dev/video0");

#[cfg(target_os = "macos")]
const DEVICE_FORMAT: &str = "avfoundation";
#[cfg(target_os = "macos")]
const DEFAULT_DEVICE: Option<&str> = Some("0");

#[cfg(target_os = "windows")]
const DEVICE_FORMAT: &str = "dshow";
#[cfg(target_os = "windows")]
const DEFAULT_DEVICE: Option<&str> = None;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const DEVICE_FORMAT: &str = "video4linux2";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const DEFAULT_DEVICE: Option<&str> = None;

/// Whether `input` asks for a live camera rather than a file.
pub fn is_camera_input(input: &Path) -> bool {
    input
        .to_str()
        .map(|s| s == CAMERA_INPUT || s.starts_with("cam:"))
        .unwrap_or(false)
}

/// Device string handed to the platform capture format.
pub fn camera_device(input: &Path) -> Result<String, String> {
    let text = input
        .to_str()
        .ok_or_else(|| format!("camera input is not valid UTF-8: {}", input.display()))?;
    match text.strip_prefix("cam:") {
        Some("") => Err("empty camera device after 'cam:'".to_string()),
        Some(device) => Ok(device.to_string()),
        None if text == CAMERA_INPUT => DEFAULT_DEVICE.map(str::to_string).ok_or_else(|| {
            format!("no default camera on this platform; pass cam:<device> for {DEVICE_FORMAT}")
        }),
        None => Err(format!("not a camera input: {text}")),
    }
}

/// Unbounded frame source over a capture device.
///
/// Decoding is shared with [`FfmpegReader`]; the stream ends only when the
/// device stops delivering packets.
#[derive(Default)]
pub struct FfmpegCameraReader {
    reader: FfmpegReader,
}

impl FfmpegCameraReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for FfmpegCameraReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let device = camera_device(path)?;
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name().split(',').any(|name| name == DEVICE_FORMAT))
            .ok_or_else(|| format!("ffmpeg was built without the {DEVICE_FORMAT} input device"))?;
        let context = ffmpeg_next::format::open_with(
            &device,
            &format,
            ffmpeg_next::Dictionary::new(),
        )?;
        let Context::Input(input) = context else {
            return Err(format!("{device} did not open as a capture input").into());
        };

        let mut metadata = self.reader.attach(input, Path::new(&device))?;
        metadata.total_frames = 0;
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        self.reader.frames()
    }

    fn close(&mut self) {
        self.reader.close();
    }
}

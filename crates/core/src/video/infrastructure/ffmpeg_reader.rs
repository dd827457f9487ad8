use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;

/// Decodes video files via ffmpeg-next, converting every frame to RGB24.
#[derive(Default)]
pub struct FfmpegReader {
    stream: Option<OpenStream>,
}

struct OpenStream {
    input: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: the reader is driven from one thread at a time and never hands out
// the raw ffmpeg contexts it owns.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes over an already opened container or device and prepares its
    /// best video stream for RGB24 decoding.
    pub(crate) fn attach(
        &mut self,
        input: Input,
        source: &Path,
    ) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("no video stream found")?;
        let stream_index = stream.index();
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };
        let total_frames = usize::try_from(stream.frames()).unwrap_or(0);

        let (width, height) = (decoder.width(), decoder.height());
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )?;

        log::info!(
            "Opened {} ({width}x{height}, {fps:.2} fps, {total_frames} frames)",
            source.display()
        );
        self.stream = Some(OpenStream {
            input,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        });

        Ok(VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            source_path: Some(source.to_path_buf()),
        })
    }
}

impl FrameSource for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        let input = ffmpeg_next::format::input(path)?;
        self.attach(input, path)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.stream.as_mut() {
            Some(stream) => Box::new(DecodedFrames {
                stream,
                next_index: 0,
                draining: false,
                finished: false,
            }),
            None => Box::new(std::iter::once(Err("FfmpegReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

/// Decodes one frame per `next` call; nothing is buffered beyond the codec.
struct DecodedFrames<'a> {
    stream: &'a mut OpenStream,
    next_index: usize,
    draining: bool,
    finished: bool,
}

impl DecodedFrames<'_> {
    fn receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = Video::empty();
        self.stream.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb = Video::empty();
        if let Err(e) = self.stream.scaler.run(&decoded, &mut rgb) {
            return Some(Err(Box::new(e)));
        }
        let pixels = packed_rgb(&rgb, self.stream.width, self.stream.height);
        let frame = Frame::new(pixels, self.stream.width, self.stream.height, 3, self.next_index);
        self.next_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for DecodedFrames<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(frame) = self.receive() {
            return Some(frame);
        }
        if self.draining {
            self.finished = true;
            return None;
        }

        loop {
            let packet = self.stream.input.packets().next();
            let Some((stream, packet)) = packet else {
                let _ = self.stream.decoder.send_eof();
                self.draining = true;
                let frame = self.receive();
                self.finished = frame.is_none();
                return frame;
            };
            if stream.index() != self.stream.stream_index {
                continue;
            }
            if let Err(e) = self.stream.decoder.send_packet(&packet) {
                log::debug!("Dropping undecodable packet: {e}");
                continue;
            }
            if let Some(frame) = self.receive() {
                return Some(frame);
            }
        }
    }
}

/// Copies an RGB24 plane into a tightly packed buffer, dropping row padding.
fn packed_rgb(frame: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_len = width as usize * 3;
    (0..height as usize)
        .flat_map(|row| &data[row * stride..row * stride + row_len])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_next::{codec, encoder, format, Packet, Rational};

    /// Encodes `count` solid gray frames as MPEG-4.
    fn write_test_video(path: &Path, count: usize, width: u32, height: u32) {
        ffmpeg_next::init().unwrap();
        let mut octx = format::output(path).unwrap();
        let global_header = octx.format().flags().contains(format::Flags::GLOBAL_HEADER);
        let mpeg4 = encoder::find(codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(mpeg4)).unwrap();

        let mut ctx = codec::context::Context::new_with_codec(mpeg4)
            .encoder()
            .video()
            .unwrap();
        ctx.set_width(width);
        ctx.set_height(height);
        ctx.set_format(format::Pixel::YUV420P);
        ctx.set_time_base(Rational(1, 25));
        ctx.set_frame_rate(Some(Rational(25, 1)));
        if global_header {
            ctx.set_flags(codec::Flags::GLOBAL_HEADER);
        }
        let mut enc = ctx.open_with(ffmpeg_next::Dictionary::new()).unwrap();
        ost.set_parameters(&enc);
        octx.write_header().unwrap();
        let time_base = octx.stream(0).unwrap().time_base();

        let mut to_yuv = scaling::Context::get(
            format::Pixel::RGB24,
            width,
            height,
            format::Pixel::YUV420P,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .unwrap();

        for i in 0..count {
            let mut rgb = Video::new(format::Pixel::RGB24, width, height);
            let value = (i * 40 % 256) as u8;
            rgb.data_mut(0).fill(value);
            let mut yuv = Video::empty();
            to_yuv.run(&rgb, &mut yuv).unwrap();
            yuv.set_pts(Some(i as i64));
            enc.send_frame(&yuv).unwrap();
            let mut packet = Packet::empty();
            while enc.receive_packet(&mut packet).is_ok() {
                packet.set_stream(0);
                packet.rescale_ts(Rational(1, 25), time_base);
                packet.write_interleaved(&mut octx).unwrap();
            }
        }
        enc.send_eof().unwrap();
        let mut packet = Packet::empty();
        while enc.receive_packet(&mut packet).is_ok() {
            packet.set_stream(0);
            packet.rescale_ts(Rational(1, 25), time_base);
            packet.write_interleaved(&mut octx).unwrap();
        }
        octx.write_trailer().unwrap();
    }

    #[test]
    fn test_open_reports_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webcam.mp4");
        write_test_video(&path, 4, 160, 120);

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!((meta.width, meta.height), (160, 120));
        assert!(meta.fps > 0.0);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_frames_are_sequential_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webcam.mp4");
        write_test_video(&path, 5, 160, 120);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 5);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
            assert_eq!(frame.channels(), 3);
            assert_eq!(frame.data().len(), 160 * 120 * 3);
        }
    }

    #[test]
    fn test_open_missing_file_fails() {
        let mut reader = FfmpegReader::new();
        assert!(reader.open(Path::new("/nonexistent/webcam.mp4")).is_err());
    }

    #[test]
    fn test_frames_before_open_is_error() {
        let mut reader = FfmpegReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_close_ends_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webcam.mp4");
        write_test_video(&path, 1, 64, 48);
        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }
}

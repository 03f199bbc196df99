// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Decoded frames pulled from the appsink.
//!
//! A [`SampleFrame`] owns the pulled sample. Its bytes are only reachable
//! through [`SampleFrame::with_frame`], which maps the buffer for the
//! duration of one closure call and unmaps it when the closure returns.

use blit::FrameRef;
use gstreamer as gst;
use gstreamer_video as gst_video;
use tracing::trace;

use crate::{Error, FrameInfo, Result};

/// One pulled sample with validated video caps.
#[derive(Debug)]
pub struct SampleFrame {
    sample: gst::Sample,
    info: FrameInfo,
    video_info: gst_video::VideoInfo,
}

impl SampleFrame {
    /// Checks the sample's caps and buffer before anything is mapped.
    ///
    /// # Returns
    /// * `Ok(SampleFrame)` if the caps describe uploadable raw video
    /// * `Err(Error::MissingCaps)`, `Err(Error::MissingDimensions)`,
    ///   `Err(Error::UnsupportedFormat)` for unusable caps
    /// * `Err(Error::MissingBuffer)` if the sample carries no buffer
    pub fn from_sample(sample: gst::Sample) -> Result<Self> {
        let caps = sample.caps().ok_or(Error::MissingCaps)?;
        let info = FrameInfo::from_caps(caps)?;
        let video_info =
            gst_video::VideoInfo::from_caps(caps).map_err(|_| Error::MissingDimensions)?;
        if sample.buffer().is_none() {
            return Err(Error::MissingBuffer);
        }

        Ok(Self {
            sample,
            info,
            video_info,
        })
    }

    /// Size and format read from the sample's caps.
    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    /// Presentation timestamp of the buffer, if it has one.
    pub fn pts(&self) -> Option<gst::ClockTime> {
        self.sample.buffer().and_then(|buffer| buffer.pts())
    }

    /// Maps the buffer readable and hands its first plane to `f`.
    ///
    /// The stride comes from the buffer's video meta when present, so
    /// padded rows are honoured.
    ///
    /// # Arguments
    /// * `f` - Receives the mapped frame; the buffer is unmapped when it returns
    ///
    /// # Returns
    /// * `Ok(R)` with whatever `f` returned
    /// * `Err(Error::Map)` if the buffer is too small for the caps or cannot be mapped
    pub fn with_frame<R>(&self, f: impl FnOnce(FrameRef<'_>) -> R) -> Result<R> {
        let buffer = self.sample.buffer().ok_or(Error::MissingBuffer)?;
        let frame = gst_video::VideoFrameRef::from_buffer_ref_readable(buffer, &self.video_info)
            .map_err(Error::Map)?;

        let stride = frame
            .plane_stride()
            .first()
            .copied()
            .filter(|stride| *stride > 0)
            .ok_or(Error::MissingDimensions)? as u32;
        let data = frame.plane_data(0).map_err(Error::Map)?;
        trace!(
            width = self.info.width,
            height = self.info.height,
            stride,
            len = data.len(),
            "Mapped frame"
        );

        Ok(f(FrameRef::new(
            self.info.width,
            self.info.height,
            self.info.format,
            stride,
            data,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blit::PixelFormat;

    fn init() {
        gst::init().unwrap();
    }

    fn yuy2_caps(width: i32, height: i32) -> gst::Caps {
        gst::Caps::builder("video/x-raw")
            .field("format", "YUY2")
            .field("width", width)
            .field("height", height)
            .field("framerate", gst::Fraction::new(30, 1))
            .build()
    }

    fn filled_buffer(len: usize) -> gst::Buffer {
        let bytes: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        gst::Buffer::from_mut_slice(bytes)
    }

    #[test]
    fn frame_exposes_buffer_bytes_verbatim() {
        init();
        // 6 px wide YUY2: 12 bytes per row, already a multiple of 4
        let buffer = filled_buffer(12 * 4);
        let sample = gst::Sample::builder()
            .buffer(&buffer)
            .caps(&yuy2_caps(6, 4))
            .build();

        let frame = SampleFrame::from_sample(sample).unwrap();
        assert_eq!(frame.info().format, PixelFormat::Yuy2);

        let copied = frame
            .with_frame(|frame| {
                assert_eq!(frame.stride, 12);
                assert!(frame.validate().is_ok());
                frame.data[..frame.min_len()].to_vec()
            })
            .unwrap();
        let expected: Vec<u8> = (0..48).map(|i| (i % 251) as u8).collect();
        assert_eq!(copied, expected);
    }

    #[test]
    fn odd_width_rows_are_padded_to_four_bytes() {
        init();
        // 3 px wide YUY2: 6 bytes of pixels, 8 byte stride
        let buffer = filled_buffer(8 * 2);
        let sample = gst::Sample::builder()
            .buffer(&buffer)
            .caps(&yuy2_caps(3, 2))
            .build();

        let frame = SampleFrame::from_sample(sample).unwrap();
        let stride = frame.with_frame(|frame| frame.stride).unwrap();
        assert_eq!(stride, 8);
    }

    #[test]
    fn sample_without_caps_is_rejected() {
        init();
        let buffer = filled_buffer(16);
        let sample = gst::Sample::builder().buffer(&buffer).build();
        assert!(matches!(
            SampleFrame::from_sample(sample),
            Err(Error::MissingCaps)
        ));
    }

    #[test]
    fn sample_without_buffer_is_rejected() {
        init();
        let sample = gst::Sample::builder().caps(&yuy2_caps(4, 4)).build();
        assert!(matches!(
            SampleFrame::from_sample(sample),
            Err(Error::MissingBuffer)
        ));
    }

    #[test]
    fn short_buffer_cannot_be_mapped() {
        init();
        let buffer = filled_buffer(10);
        let sample = gst::Sample::builder()
            .buffer(&buffer)
            .caps(&yuy2_caps(320, 240))
            .build();
        let frame = SampleFrame::from_sample(sample).unwrap();
        assert!(matches!(frame.with_frame(|_| ()), Err(Error::Map(_))));
    }
}

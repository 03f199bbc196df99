// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Caps negotiation and inspection.
//!
//! The appsink only accepts raw video in a format the display can upload,
//! so whatever the pipeline negotiates can be copied into a texture as-is.
//! Each pulled sample's caps are read back to size that texture.

use blit::PixelFormat;
use gstreamer as gst;
use gstreamer_video as gst_video;

use crate::{Error, Result, Settings};

/// Maps a GStreamer video format to the display format with the same layout.
pub fn pixel_format(format: gst_video::VideoFormat) -> Option<PixelFormat> {
    match format {
        gst_video::VideoFormat::Yuy2 => Some(PixelFormat::Yuy2),
        gst_video::VideoFormat::Rgba => Some(PixelFormat::Rgba),
        gst_video::VideoFormat::Bgra => Some(PixelFormat::Bgra),
        gst_video::VideoFormat::Rgbx => Some(PixelFormat::Rgbx),
        gst_video::VideoFormat::Bgrx => Some(PixelFormat::Bgrx),
        _ => None,
    }
}

/// Maps a display format to its GStreamer video format.
pub fn video_format(format: PixelFormat) -> gst_video::VideoFormat {
    match format {
        PixelFormat::Yuy2 => gst_video::VideoFormat::Yuy2,
        PixelFormat::Rgba => gst_video::VideoFormat::Rgba,
        PixelFormat::Bgra => gst_video::VideoFormat::Bgra,
        PixelFormat::Rgbx => gst_video::VideoFormat::Rgbx,
        PixelFormat::Bgrx => gst_video::VideoFormat::Bgrx,
    }
}

/// Caps set on the appsink.
///
/// Restricted to the configured format, or to every uploadable format, plus
/// whatever size and frame rate the settings pin down.
pub fn appsink_caps(settings: &Settings) -> gst::Caps {
    let mut builder = match settings.format {
        Some(format) => gst_video::VideoCapsBuilder::new().format(video_format(format)),
        None => gst_video::VideoCapsBuilder::new()
            .format_list(PixelFormat::ALL.into_iter().map(video_format)),
    };
    if let Some(width) = settings.width {
        builder = builder.width(width as i32);
    }
    if let Some(height) = settings.height {
        builder = builder.height(height as i32);
    }
    if let Some((numerator, denominator)) = settings.framerate {
        builder = builder.framerate(gst::Fraction::new(numerator, denominator));
    }
    builder.build()
}

/// Width, height and pixel format of a negotiated video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameInfo {
    /// Reads the frame description from the first structure of `caps`.
    ///
    /// # Returns
    /// * `Ok(FrameInfo)` for `video/x-raw` caps in an uploadable format
    /// * `Err(Error::MissingCaps)` if the caps are empty
    /// * `Err(Error::UnsupportedMedia)` for anything other than raw video
    /// * `Err(Error::MissingDimensions)` without a positive width and height
    /// * `Err(Error::UnsupportedFormat)` for formats the display cannot upload
    pub fn from_caps(caps: &gst::CapsRef) -> Result<FrameInfo> {
        let structure = caps.structure(0).ok_or(Error::MissingCaps)?;
        if !structure.has_name("video/x-raw") {
            return Err(Error::UnsupportedMedia(structure.name().to_string()));
        }

        let width = structure
            .get::<i32>("width")
            .map_err(|_| Error::MissingDimensions)?;
        let height = structure
            .get::<i32>("height")
            .map_err(|_| Error::MissingDimensions)?;
        if width <= 0 || height <= 0 {
            return Err(Error::MissingDimensions);
        }

        let format_name = structure
            .get::<&str>("format")
            .map_err(|_| Error::UnsupportedFormat("<none>".to_owned()))?;
        let format = pixel_format(gst_video::VideoFormat::from_string(format_name))
            .ok_or_else(|| Error::UnsupportedFormat(format_name.to_owned()))?;

        Ok(FrameInfo {
            width: width as u32,
            height: height as u32,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        gst::init().unwrap();
    }

    fn raw_caps(format: &str, width: i32, height: i32) -> gst::Caps {
        gst::Caps::builder("video/x-raw")
            .field("format", format)
            .field("width", width)
            .field("height", height)
            .build()
    }

    #[test]
    fn reads_size_and_format() {
        init();
        let info = FrameInfo::from_caps(&raw_caps("YUY2", 320, 240)).unwrap();
        assert_eq!(
            info,
            FrameInfo {
                width: 320,
                height: 240,
                format: PixelFormat::Yuy2
            }
        );
    }

    #[test]
    fn empty_caps_have_no_format() {
        init();
        let caps = gst::Caps::new_empty();
        assert!(matches!(
            FrameInfo::from_caps(&caps),
            Err(Error::MissingCaps)
        ));
    }

    #[test]
    fn missing_height_is_reported() {
        init();
        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGBA")
            .field("width", 320i32)
            .build();
        assert!(matches!(
            FrameInfo::from_caps(&caps),
            Err(Error::MissingDimensions)
        ));
    }

    #[test]
    fn non_positive_size_is_reported() {
        init();
        assert!(matches!(
            FrameInfo::from_caps(&raw_caps("RGBA", 0, 240)),
            Err(Error::MissingDimensions)
        ));
    }

    #[test]
    fn planar_formats_are_unsupported() {
        init();
        match FrameInfo::from_caps(&raw_caps("I420", 320, 240)) {
            Err(Error::UnsupportedFormat(name)) => assert_eq!(name, "I420"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn audio_is_not_video() {
        init();
        let caps = gst::Caps::builder("audio/x-raw")
            .field("format", "F32LE")
            .build();
        assert!(matches!(
            FrameInfo::from_caps(&caps),
            Err(Error::UnsupportedMedia(_))
        ));
    }

    #[test]
    fn formats_round_trip_through_gstreamer_names() {
        for format in PixelFormat::ALL {
            assert_eq!(pixel_format(video_format(format)), Some(format));
        }
        assert_eq!(pixel_format(gst_video::VideoFormat::Nv12), None);
    }

    #[test]
    fn appsink_caps_pin_configured_fields() {
        init();
        let caps = appsink_caps(&Settings::raw_yuy2());
        let structure = caps.structure(0).unwrap();
        assert_eq!(structure.get::<&str>("format").unwrap(), "YUY2");
        assert_eq!(structure.get::<i32>("width").unwrap(), 320);
        assert_eq!(structure.get::<i32>("height").unwrap(), 240);
    }

    #[test]
    fn appsink_caps_pin_framerate() {
        init();
        let mut settings = Settings::test_pattern("smpte");
        settings.framerate = Some((25, 1));
        let caps = appsink_caps(&settings);
        let structure = caps.structure(0).unwrap();
        assert_eq!(
            structure.get::<gst::Fraction>("framerate").unwrap(),
            gst::Fraction::new(25, 1)
        );
    }

    #[test]
    fn appsink_caps_accept_every_uploadable_format() {
        init();
        let caps = appsink_caps(&Settings::default());
        for format in PixelFormat::ALL {
            let fixed = raw_caps(video_format(format).to_str(), 64, 48);
            assert!(fixed.can_intersect(&caps), "{format:?}");
        }
        assert!(!raw_caps("I420", 64, 48).can_intersect(&caps));
    }
}

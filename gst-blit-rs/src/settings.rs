// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Pipeline settings.
//!
//! ## Key Types
//! - `SourceKind`: where frames come from (synthetic pattern or media URI)
//! - `Delivery`: how frames reach the render loop (pull or appsink callback)
//! - `Settings`: everything needed to build a [`crate::FramePipeline`]

use std::path::Path;
use std::time::Duration;

use blit::PixelFormat;

use crate::{Error, Result};

/// Default `videotestsrc` pattern (SMPTE color bars)
pub const DEFAULT_PATTERN: &str = "smpte";

/// Default time the render loop waits for a frame before drawing again
pub const DEFAULT_PULL_TIMEOUT: Duration = Duration::from_millis(100);

/// Default number of decoded buffers the appsink queues
pub const DEFAULT_MAX_BUFFERS: u32 = 2;

/// Source of decoded frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// `videotestsrc` with the given pattern nick or number
    TestPattern { pattern: String },

    /// `uridecodebin` reading the given URI
    Uri(String),
}

impl Default for SourceKind {
    fn default() -> Self {
        SourceKind::TestPattern {
            pattern: DEFAULT_PATTERN.to_owned(),
        }
    }
}

impl SourceKind {
    /// Source reading a media file, given as a path or as a URI.
    ///
    /// Relative paths are resolved against the current directory. The file
    /// is not opened here: a missing file is reported by the pipeline.
    ///
    /// # Arguments
    /// * `location` - Filesystem path, or a string already containing `://`
    ///
    /// # Returns
    /// * `Ok(SourceKind::Uri)` with a `file://` URI or the URI as given
    /// * `Err(Error::Io)` if the current directory cannot be read
    /// * `Err(Error::Uri)` if the path cannot be expressed as a URI
    pub fn file(location: impl AsRef<Path>) -> Result<Self> {
        let location = location.as_ref();
        if let Some(uri) = location.to_str().filter(|s| s.contains("://")) {
            return Ok(SourceKind::Uri(uri.to_owned()));
        }

        let absolute = std::path::absolute(location)?;
        let uri = glib::filename_to_uri(&absolute, None)
            .map_err(|_| Error::Uri(location.display().to_string()))?;
        Ok(SourceKind::Uri(uri.to_string()))
    }
}

/// How frames travel from the appsink to the render loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// The render loop pulls from the appsink with a timeout.
    #[default]
    Pull,

    /// The appsink's `new-sample` callback forwards samples over a channel.
    /// The callback runs on the streaming thread and never touches the display.
    Callback,
}

/// Settings for one frame pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where frames come from
    pub source: SourceKind,

    /// Pixel format to negotiate; any uploadable format when `None`
    pub format: Option<PixelFormat>,

    /// Frame width to negotiate; left to the source when `None`
    pub width: Option<u32>,

    /// Frame height to negotiate; left to the source when `None`
    pub height: Option<u32>,

    /// Frame rate to negotiate, as numerator/denominator
    pub framerate: Option<(i32, i32)>,

    /// Stop after this many frames (test patterns only)
    pub num_buffers: Option<u32>,

    /// Render frames against the pipeline clock instead of as fast as decoded
    pub sync: bool,

    /// Number of frames the appsink queues
    pub max_buffers: u32,

    /// Drop the oldest queued frame instead of blocking the pipeline
    pub drop: bool,

    /// Frame delivery mode
    pub delivery: Delivery,

    /// Longest time a pull waits for a frame
    pub pull_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source: SourceKind::default(),
            format: None,
            width: None,
            height: None,
            framerate: None,
            num_buffers: None,
            sync: true,
            max_buffers: DEFAULT_MAX_BUFFERS,
            drop: true,
            delivery: Delivery::default(),
            pull_timeout: DEFAULT_PULL_TIMEOUT,
        }
    }
}

impl Settings {
    /// Test pattern settings.
    ///
    /// # Arguments
    /// * `pattern` - `videotestsrc` pattern nick (`smpte`, `ball`, ...) or number
    pub fn test_pattern(pattern: impl Into<String>) -> Self {
        Settings {
            source: SourceKind::TestPattern {
                pattern: pattern.into(),
            },
            ..Default::default()
        }
    }

    /// Fixed 320x240 YUY2 frames, pinned on the appsink caps.
    pub fn raw_yuy2() -> Self {
        Settings {
            format: Some(PixelFormat::Yuy2),
            width: Some(blit::DEFAULT_WIDTH),
            height: Some(blit::DEFAULT_HEIGHT),
            ..Default::default()
        }
    }

    /// Settings decoding a media file or URI. See [`SourceKind::file`].
    pub fn file(location: impl AsRef<Path>) -> Result<Self> {
        Ok(Settings {
            source: SourceKind::file(location)?,
            ..Default::default()
        })
    }

    /// Pins the negotiated frame size.
    ///
    /// With a file source the frames are scaled to it by `videoscale`.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Pins the negotiated pixel format.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Ends a test pattern after `num_buffers` frames.
    pub fn with_num_buffers(mut self, num_buffers: u32) -> Self {
        self.num_buffers = Some(num_buffers);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_smpte_bars_and_pull_delivery() {
        let settings = Settings::default();
        assert_eq!(
            settings.source,
            SourceKind::TestPattern {
                pattern: "smpte".into()
            }
        );
        assert_eq!(settings.delivery, Delivery::Pull);
        assert_eq!(settings.pull_timeout, DEFAULT_PULL_TIMEOUT);
        assert!(settings.sync);
    }

    #[test]
    fn raw_yuy2_pins_size_and_format() {
        let settings = Settings::raw_yuy2();
        assert_eq!(settings.format, Some(PixelFormat::Yuy2));
        assert_eq!(settings.width, Some(320));
        assert_eq!(settings.height, Some(240));
    }

    #[test]
    fn uri_passes_through() {
        let source = SourceKind::file("https://example.com/clip.webm").unwrap();
        assert_eq!(source, SourceKind::Uri("https://example.com/clip.webm".into()));
    }

    #[test]
    fn relative_path_becomes_absolute_file_uri() {
        let SourceKind::Uri(uri) = SourceKind::file("media/clip.mp4").unwrap() else {
            panic!("expected a URI source");
        };
        assert!(uri.starts_with("file:///"), "{uri}");
        assert!(uri.ends_with("/media/clip.mp4"), "{uri}");
    }

    #[test]
    fn builders_override_defaults() {
        let settings = Settings::test_pattern("ball")
            .with_size(64, 48)
            .with_format(PixelFormat::Bgrx)
            .with_delivery(Delivery::Callback)
            .with_num_buffers(5);
        assert_eq!(settings.width, Some(64));
        assert_eq!(settings.height, Some(48));
        assert_eq!(settings.format, Some(PixelFormat::Bgrx));
        assert_eq!(settings.delivery, Delivery::Callback);
        assert_eq!(settings.num_buffers, Some(5));
    }
}

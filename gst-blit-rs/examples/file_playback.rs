// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Decodes a media file with `uridecodebin` and plays its video stream.
//!
//! The decoder's video pad only exists once the container has been read,
//! so it is linked to `videoconvert` from the `pad-added` signal. Audio pads
//! are ignored.
//!
//! ```bash
//! cargo run --example file_playback -- ~/Videos/clip.webm
//! cargo run --example file_playback -- https://example.com/clip.webm
//! ```

mod common;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gstblit::Settings;

/// uridecodebin → videoconvert → videoscale → appsink → window
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Opts {
    /// Path or URI of the media to play
    #[arg(env = "GST_BLIT_MEDIA")]
    location: PathBuf,

    /// Scale frames to this width
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Scale frames to this height
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Pixel format to convert to
    #[arg(long, value_enum)]
    format: Option<common::FormatArg>,

    #[command(flatten)]
    display: common::DisplayArgs,
}

fn main() -> ExitCode {
    common::setup_logging();
    let opts = Opts::parse();

    let title = opts
        .location
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| opts.location.display().to_string());

    let result = Settings::file(&opts.location).and_then(|mut settings| {
        settings.width = opts.width;
        settings.height = opts.height;
        settings.format = opts.format.map(Into::into);
        gstblit::run(settings, opts.display.config(&title))
    });
    common::report(result)
}

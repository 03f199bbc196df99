// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Plays a `videotestsrc` pattern, with frames forwarded by the appsink's
//! `new-sample` callback.
//!
//! ```bash
//! cargo run --example test_pattern -- --pattern ball --width 640 --height 480 --framerate 60
//! ```

mod common;

use std::process::ExitCode;

use clap::Parser;
use gstblit::{DEFAULT_PATTERN, Delivery, Settings};

/// Test pattern source → appsink → window
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Opts {
    /// videotestsrc pattern, by nick or number
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Frame width
    #[arg(long)]
    width: Option<u32>,

    /// Frame height
    #[arg(long)]
    height: Option<u32>,

    /// Pixel format to negotiate
    #[arg(long, value_enum)]
    format: Option<common::FormatArg>,

    /// Frame rate, as N/D or a whole number
    #[arg(long, value_parser = common::parse_framerate)]
    framerate: Option<(i32, i32)>,

    /// Stop after this many frames
    #[arg(long)]
    num_buffers: Option<u32>,

    /// Pull frames from the render loop instead of using the callback
    #[arg(long)]
    pull: bool,

    #[command(flatten)]
    display: common::DisplayArgs,
}

fn main() -> ExitCode {
    common::setup_logging();
    let opts = Opts::parse();

    let mut settings = Settings::test_pattern(&opts.pattern).with_delivery(if opts.pull {
        Delivery::Pull
    } else {
        Delivery::Callback
    });
    settings.width = opts.width;
    settings.height = opts.height;
    settings.format = opts.format.map(Into::into);
    settings.framerate = opts.framerate;
    settings.num_buffers = opts.num_buffers;

    common::report(gstblit::run(settings, opts.display.config("Test pattern")))
}

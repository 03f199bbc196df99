// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Pulls fixed 320x240 YUY2 frames synchronously from the render loop.
//!
//! Each redraw clears the window, pulls one buffer, copies it into the
//! texture and presents it. The frame size and format are pinned on the
//! appsink caps, so the texture is known before the first frame arrives.
//!
//! ```bash
//! cargo run --example raw_pull
//! ```

mod common;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use gstblit::{Delivery, Settings};

/// Raw YUY2 pull loop
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Opts {
    /// Longest time, in milliseconds, one pull waits for a frame
    #[arg(long, default_value_t = 100)]
    timeout_ms: u64,

    /// Decode as fast as possible instead of following the pipeline clock
    #[arg(long)]
    no_sync: bool,

    #[command(flatten)]
    display: common::DisplayArgs,
}

fn main() -> ExitCode {
    common::setup_logging();
    let opts = Opts::parse();

    let mut settings = Settings::raw_yuy2().with_delivery(Delivery::Pull);
    settings.pull_timeout = Duration::from_millis(opts.timeout_ms);
    settings.sync = !opts.no_sync;

    common::report(gstblit::run(settings, opts.display.config("Raw pull")))
}

// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Command line and logging setup shared across the demo programs.

// Each demo uses a different subset of these helpers.
#![allow(dead_code)]

use std::process::ExitCode;

use blit::{DisplayConfig, PixelFormat};
use clap::{Args, ValueEnum};
use tracing::error;

/// Initializes the tracing subscriber.
///
/// Logs to stdout at INFO unless `RUST_LOG` says otherwise.
pub fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}

/// Logs the error that ended playback and maps it to the process exit code.
pub fn report(result: Result<(), gstblit::Error>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Window options.
#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Window width
    #[arg(long, env = "GST_BLIT_WIDTH", default_value_t = blit::DEFAULT_WIDTH)]
    pub window_width: u32,

    /// Window height
    #[arg(long, env = "GST_BLIT_HEIGHT", default_value_t = blit::DEFAULT_HEIGHT)]
    pub window_height: u32,

    /// Present as fast as possible instead of waiting for vertical blank
    #[arg(long)]
    pub no_vsync: bool,

    /// Stretch frames to the window instead of letterboxing them
    #[arg(long)]
    pub stretch: bool,
}

impl DisplayArgs {
    pub fn config(&self, title: &str) -> DisplayConfig {
        DisplayConfig {
            title: title.to_owned(),
            width: self.window_width,
            height: self.window_height,
            vsync: !self.no_vsync,
            keep_aspect: !self.stretch,
        }
    }
}

/// Parses a frame rate given as `N/D` or as a whole number.
pub fn parse_framerate(value: &str) -> Result<(i32, i32), String> {
    let (numerator, denominator) = value.split_once('/').unwrap_or((value, "1"));
    let numerator: i32 = numerator
        .trim()
        .parse()
        .map_err(|err| format!("invalid numerator: {err}"))?;
    let denominator: i32 = denominator
        .trim()
        .parse()
        .map_err(|err| format!("invalid denominator: {err}"))?;
    if numerator <= 0 || denominator <= 0 {
        return Err(format!("{value} is not a positive frame rate"));
    }
    Ok((numerator, denominator))
}

/// Pixel formats selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Yuy2,
    Rgba,
    Bgra,
    Rgbx,
    Bgrx,
}

impl From<FormatArg> for PixelFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Yuy2 => PixelFormat::Yuy2,
            FormatArg::Rgba => PixelFormat::Rgba,
            FormatArg::Bgra => PixelFormat::Bgra,
            FormatArg::Rgbx => PixelFormat::Rgbx,
            FormatArg::Bgrx => PixelFormat::Bgrx,
        }
    }
}

// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the frame pipeline.
//!
//! These tests run real pipelines without a window: frames are pulled from
//! the appsink and inspected through the same mapping the player uses.
//!
//! # Requirements
//!
//! - GStreamer with gst-plugins-base (`videotestsrc`, `uridecodebin`,
//!   `videoconvert`, `videoscale`). Tests return early when a plugin is
//!   missing.

use std::time::{Duration, Instant};

use blit::PixelFormat;
use gstblit::{BusStatus, Delivery, Error, FramePipeline, Pulled, Settings};
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::info;

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

const DEADLINE: Duration = Duration::from_secs(10);

/// Initializes logging and GStreamer.
///
/// Returns false when one of `elements` is not installed.
fn setup_test(elements: &[&str]) -> bool {
    LOG_ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .try_init();
    });

    gstblit::init().unwrap();
    elements.iter().all(|element| {
        let found = gst::ElementFactory::find(element).is_some();
        if !found {
            info!("{element} not available, skipping");
        }
        found
    })
}

/// Test pattern settings that deliver every frame as fast as possible.
fn finite_pattern(num_buffers: u32) -> Settings {
    let mut settings = Settings::test_pattern("smpte").with_num_buffers(num_buffers);
    settings.sync = false;
    settings.drop = false;
    settings
}

/// Pulls until end of stream, checking each frame with `check`.
fn pull_to_eos(pipeline: &FramePipeline, mut check: impl FnMut(&gstblit::SampleFrame)) -> usize {
    let started = Instant::now();
    let mut frames = 0;
    loop {
        assert!(started.elapsed() < DEADLINE, "no end of stream after {frames} frames");
        pipeline.poll_bus().unwrap();
        match pipeline.pull(Duration::from_millis(100)).unwrap() {
            Pulled::Frame(frame) => {
                check(&frame);
                frames += 1;
            }
            Pulled::Timeout => {}
            Pulled::Eos => return frames,
        }
    }
}

#[test]
fn pull_delivers_every_frame_at_requested_size() {
    if !setup_test(&["videotestsrc"]) {
        return;
    }
    let settings = finite_pattern(3)
        .with_size(64, 48)
        .with_format(PixelFormat::Rgba);
    let pipeline = FramePipeline::new(&settings).unwrap();
    pipeline.start().unwrap();

    let frames = pull_to_eos(&pipeline, |frame| {
        assert_eq!(frame.info().width, 64);
        assert_eq!(frame.info().height, 48);
        assert_eq!(frame.info().format, PixelFormat::Rgba);
        frame
            .with_frame(|frame| {
                assert_eq!(frame.stride, 256);
                frame.validate().unwrap();
            })
            .unwrap();
    });

    assert_eq!(frames, 3);
    pipeline.stop().unwrap();
}

#[test]
fn callback_delivery_ends_with_the_last_frame() {
    if !setup_test(&["videotestsrc"]) {
        return;
    }
    let mut settings = finite_pattern(5)
        .with_size(32, 32)
        .with_format(PixelFormat::Bgrx)
        .with_delivery(Delivery::Callback);
    settings.framerate = Some((30, 1));
    let pipeline = FramePipeline::new(&settings).unwrap();
    pipeline.start().unwrap();

    // Intermediate frames may be skipped, the final one never is.
    let mut last_pts = None;
    let frames = pull_to_eos(&pipeline, |frame| {
        assert_eq!(frame.info().format, PixelFormat::Bgrx);
        last_pts = frame.pts();
    });

    assert!((1..=5).contains(&frames), "{frames} frames");
    let fifth = gst::ClockTime::from_nseconds(4 * gst::ClockTime::SECOND.nseconds() / 30);
    assert_eq!(last_pts, Some(fifth));
}

#[test]
fn odd_width_yuy2_rows_are_padded() {
    if !setup_test(&["videotestsrc"]) {
        return;
    }
    let settings = finite_pattern(1)
        .with_size(33, 8)
        .with_format(PixelFormat::Yuy2);
    let pipeline = FramePipeline::new(&settings).unwrap();
    pipeline.start().unwrap();

    let frames = pull_to_eos(&pipeline, |frame| {
        frame
            .with_frame(|frame| {
                assert_eq!(frame.stride, PixelFormat::Yuy2.default_stride(33));
                assert_eq!(frame.row_bytes(), 68);
                assert!(frame.data.len() >= frame.min_len());
            })
            .unwrap();
    });
    assert_eq!(frames, 1);
}

#[test]
fn bus_reports_end_of_stream() {
    if !setup_test(&["videotestsrc"]) {
        return;
    }
    let pipeline = FramePipeline::new(&finite_pattern(2)).unwrap();
    pipeline.start().unwrap();

    let started = Instant::now();
    loop {
        assert!(started.elapsed() < DEADLINE, "no EOS message");
        let _ = pipeline.pull(Duration::from_millis(10)).unwrap();
        if pipeline.poll_bus().unwrap() == BusStatus::Eos {
            break;
        }
    }
}

#[test]
fn pause_and_resume() {
    if !setup_test(&["videotestsrc"]) {
        return;
    }
    let pipeline = FramePipeline::new(&Settings::test_pattern("ball").with_size(16, 16)).unwrap();
    pipeline.start().unwrap();

    pipeline.set_paused(true).unwrap();
    let (result, current, _) = pipeline.pipeline().state(gst::ClockTime::from_seconds(5));
    result.unwrap();
    assert_eq!(current, gst::State::Paused);

    pipeline.set_paused(false).unwrap();
    let (result, current, _) = pipeline.pipeline().state(gst::ClockTime::from_seconds(5));
    result.unwrap();
    assert_eq!(current, gst::State::Playing);
}

#[test]
fn missing_file_surfaces_a_pipeline_error() {
    if !setup_test(&["uridecodebin", "videoconvert", "videoscale"]) {
        return;
    }
    let settings = Settings::file("/nonexistent/gst-blit/clip.webm").unwrap();
    let pipeline = FramePipeline::new(&settings).unwrap();

    let err = match pipeline.start() {
        Err(err) => err,
        Ok(()) => {
            let started = Instant::now();
            loop {
                assert!(started.elapsed() < DEADLINE, "no error reported");
                if let Err(err) = pipeline.poll_bus() {
                    break err;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    };

    info!("Reported: {err}");
    assert!(
        matches!(err, Error::Pipeline { .. } | Error::StateChange(_)),
        "{err:?}"
    );
}

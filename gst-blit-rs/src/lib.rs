//! Pull decoded video frames from GStreamer and blit them into a window
//!
//! This crate connects a GStreamer pipeline ending in an `appsink` to the
//! texture and window surface provided by the [`blit`] crate:
//!
//! - **Sources**: a synthetic `videotestsrc`, or a `uridecodebin` whose video
//!   pad is linked once the media has been inspected
//! - **Delivery**: frames are pulled by the render loop, or forwarded by the
//!   appsink's `new-sample` callback over a channel
//! - **Player**: a winit event loop that pulls a frame, copies it into the
//!   texture and presents it, once per redraw
//!
//! ## Data Flow
//! ```text
//! source [→ videoconvert → videoscale] → appsink ─pull─► SampleFrame ─map─► FrameRef ─► Display
//! ```
//!
//! ## GStreamer Concepts (for non-GStreamer developers)
//! - **Caps**: media format descriptions (format, width, height, framerate)
//! - **Pad**: a connection point on an element; decoders add theirs late and
//!   announce them with the `pad-added` signal
//! - **Bus**: the pipeline's message queue (errors, end of stream, state changes)
//!
//! ## Example
//! ```no_run
//! use gstblit::{Settings, run};
//!
//! # fn main() -> Result<(), gstblit::Error> {
//! run(Settings::test_pattern("smpte"), blit::DisplayConfig::default())
//! # }
//! ```

// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

use gstreamer as gst;

/// Caps negotiation and inspection
pub mod caps;

/// Error types
mod error;

/// Decoded frames pulled from the appsink
mod frame;

/// Pipeline construction, pulling and bus monitoring
mod pipeline;

/// Event loop gluing a pipeline to a window
mod player;

/// Pipeline settings
mod settings;

/// Source elements and their linking
pub mod source;

pub use caps::FrameInfo;
pub use error::{Error, Result};
pub use frame::SampleFrame;
pub use pipeline::{BusStatus, FramePipeline, Pulled};
pub use player::{Player, run};
pub use settings::{
    DEFAULT_MAX_BUFFERS, DEFAULT_PATTERN, DEFAULT_PULL_TIMEOUT, Delivery, Settings, SourceKind,
};

/// Initializes GStreamer. Safe to call more than once.
pub fn init() -> Result<()> {
    gst::init()?;
    Ok(())
}

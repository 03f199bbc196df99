// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for pipeline construction, frame pulling and playback.
//!
//! Every failure is fatal to the player: errors are propagated to the
//! caller, which reports the diagnostic and exits.

use gstreamer as gst;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while building, running or displaying a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// GStreamer could not be initialized.
    #[error("Initializing GStreamer: {0}")]
    Init(#[from] glib::Error),

    /// An element factory is missing (plugin not installed) or refused the
    /// properties it was given.
    #[error("Creating element '{factory}': {source}")]
    ElementCreation {
        factory: &'static str,
        source: glib::BoolError,
    },

    /// Elements could not be added to the pipeline or linked together.
    #[error("Linking: {0}")]
    Link(#[from] glib::BoolError),

    /// The pipeline refused a state change.
    #[error("Changing pipeline state: {0}")]
    StateChange(#[from] gst::StateChangeError),

    /// The sample carried no caps, so the frame format is unknown.
    #[error("Could not get frame format: sample has no caps")]
    MissingCaps,

    /// The caps describe something other than raw video.
    #[error("Unsupported media type '{0}'")]
    UnsupportedMedia(String),

    /// The caps have no positive width and height.
    #[error("Could not get frame dimensions")]
    MissingDimensions,

    /// The caps name a pixel format the display cannot upload.
    #[error("Unsupported pixel format '{0}'")]
    UnsupportedFormat(String),

    /// The sample carried no buffer.
    #[error("Sample has no buffer")]
    MissingBuffer,

    /// The buffer could not be mapped for reading.
    #[error("Mapping frame: {0}")]
    Map(glib::BoolError),

    /// An element posted an error on the bus.
    #[error("Error from {source_name}: {message}{}", debug_suffix(.debug))]
    Pipeline {
        source_name: String,
        message: String,
        debug: Option<String>,
    },

    /// The media location could not be turned into a URI.
    #[error("Invalid media location '{0}'")]
    Uri(String),

    /// Filesystem access failed while resolving a media path.
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    /// The window surface or frame upload failed.
    #[error("Display: {0}")]
    Display(#[from] blit::Error),

    /// The window could not be created.
    #[error("Creating window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop failed.
    #[error("Event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

fn debug_suffix(debug: &Option<String>) -> String {
    debug.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

impl Error {
    /// Wraps a factory failure, keeping the factory name for the diagnostic.
    pub(crate) fn element(factory: &'static str) -> impl FnOnce(glib::BoolError) -> Error {
        move |source| Error::ElementCreation { factory, source }
    }
}

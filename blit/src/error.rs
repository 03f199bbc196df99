// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the display side.
//!
//! GPU setup failures come straight from wgpu; frame errors are raised before
//! any byte reaches the GPU so a malformed buffer never turns into a wgpu
//! validation panic.

use crate::PixelFormat;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while setting up the display or blitting a frame.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The window could not be turned into a wgpu surface.
    #[error("Creating surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No adapter is able to present to the window surface.
    #[error("No compatible GPU adapter found")]
    NoAdapter,

    /// The adapter refused to open a device.
    #[error("Requesting device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The surface reported no texture format at all.
    #[error("Surface reports no supported format")]
    NoSurfaceFormat,

    /// Acquiring the next surface texture failed in an unrecoverable way.
    #[error("Surface: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// The frame's declared geometry does not fit its payload.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// The frame needs a texture larger than the device allows.
    #[error("{width}x{height} {format:?} frame exceeds the maximum texture size of {max_dimension}")]
    TextureTooLarge {
        width: u32,
        height: u32,
        format: PixelFormat,
        max_dimension: u32,
    },

    /// The frame does not match the texture it is being uploaded into.
    #[error(
        "Frame {frame_width}x{frame_height} {frame_format:?} does not match texture \
         {texture_width}x{texture_height} {texture_format:?}"
    )]
    FrameMismatch {
        frame_width: u32,
        frame_height: u32,
        frame_format: PixelFormat,
        texture_width: u32,
        texture_height: u32,
        texture_format: PixelFormat,
    },
}

// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Borrowed view of one decoded frame.
//!
//! A [`FrameRef`] does not own its bytes. It borrows them from whatever keeps
//! the decoded buffer mapped, so the frame is released as soon as the view
//! goes out of scope.

use crate::{Error, PixelFormat, Result};

/// One decoded image, borrowed for the duration of an upload.
#[derive(Debug, Clone, Copy)]
pub struct FrameRef<'a> {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Pixel layout of `data`
    pub format: PixelFormat,

    /// Bytes between the starts of two consecutive rows
    pub stride: u32,

    /// Pixel bytes, `stride * height` at most
    pub data: &'a [u8],
}

impl<'a> FrameRef<'a> {
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: u32,
        data: &'a [u8],
    ) -> Self {
        Self {
            width,
            height,
            format,
            stride,
            data,
        }
    }

    /// Frame whose rows are laid out with GStreamer's default stride.
    pub fn packed(width: u32, height: u32, format: PixelFormat, data: &'a [u8]) -> Self {
        Self::new(width, height, format, format.default_stride(width), data)
    }

    /// Bytes of each row that end up in the texture.
    pub fn row_bytes(&self) -> u32 {
        self.format.row_bytes(self.width)
    }

    /// Smallest payload that holds every row: the last row needs no padding.
    pub fn min_len(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        self.stride as usize * (self.height as usize - 1) + self.row_bytes() as usize
    }

    /// Checks the declared geometry against the payload.
    ///
    /// # Returns
    /// * `Ok(())` if every row fits in `data` at `stride`
    /// * `Err(Error::InvalidFrame)` for a zero dimension, a stride shorter than
    ///   a row, or a payload shorter than [`FrameRef::min_len`]
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidFrame(format!(
                "empty frame {}x{}",
                self.width, self.height
            )));
        }
        if self.stride < self.row_bytes() {
            return Err(Error::InvalidFrame(format!(
                "stride {} shorter than row of {} bytes",
                self.stride,
                self.row_bytes()
            )));
        }
        if self.data.len() < self.min_len() {
            return Err(Error::InvalidFrame(format!(
                "{} bytes for a {}x{} {:?} frame, need {}",
                self.data.len(),
                self.width,
                self.height,
                self.format,
                self.min_len()
            )));
        }
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! # blit
//!
//! Display side of gst-blit: takes decoded video frames that somebody else
//! produced, copies them into a GPU texture and presents them in a window.
//! Nothing in this crate knows about GStreamer.
//!
//! ## Key Concepts
//!
//! - **Frame**: a borrowed view of one decoded image ([`FrameRef`]), valid
//!   only while its producer keeps the buffer mapped
//! - **Texture**: a GPU image sized and formatted for the frames it receives
//!   ([`VideoTexture`])
//! - **Display**: window surface, device and renderer ([`Display`])
//!
//! ## Architecture
//!
//! ```text
//! FrameRef ──validate──► VideoTexture::upload ──► VideoRenderer::render ──► surface.present
//! ```
//!
//! ## Pixel Formats
//!
//! RGBA, BGRA, RGBx and BGRx are uploaded into a matching 8-bit texture.
//! YUY2 is uploaded untouched, two pixels per texel, and decoded by the
//! fragment shader. See [`PixelFormat`].

mod display;
mod error;
mod format;
mod frame;
mod renderer;
mod texture;

pub use display::{DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH, Display, DisplayConfig};
pub use error::{Error, Result};
pub use format::{PixelFormat, round_up_4};
pub use frame::FrameRef;
pub use renderer::{BlitParams, VideoRenderer};
pub use texture::{VideoTexture, copy_layout, texture_size};

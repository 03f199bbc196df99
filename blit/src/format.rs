// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Pixel formats the display can upload without conversion.
//!
//! Every format maps onto an 8-bit-per-channel RGBA texture. Packed 4:2:2
//! YUV (YUY2) is uploaded as-is, two pixels per texel, and decoded in the
//! fragment shader.

/// Rounds `value` up to the next multiple of four (GStreamer's `GST_ROUND_UP_4`).
pub const fn round_up_4(value: u32) -> u32 {
    (value + 3) & !3
}

/// Pixel layout of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Packed 4:2:2 YUV, byte order Y0 U Y1 V.
    Yuy2,
    /// 8-bit RGBA.
    Rgba,
    /// 8-bit BGRA.
    Bgra,
    /// 8-bit RGB with an unused fourth byte.
    Rgbx,
    /// 8-bit BGR with an unused fourth byte.
    Bgrx,
}

impl PixelFormat {
    /// All formats, in order of preference for caps negotiation.
    pub const ALL: [PixelFormat; 5] = [
        PixelFormat::Rgba,
        PixelFormat::Bgra,
        PixelFormat::Rgbx,
        PixelFormat::Bgrx,
        PixelFormat::Yuy2,
    ];

    /// Bytes one pixel occupies in the source buffer.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Yuy2 => 2,
            _ => 4,
        }
    }

    /// Row stride GStreamer uses for a tightly allocated frame of `width` pixels.
    pub const fn default_stride(self, width: u32) -> u32 {
        round_up_4(width * self.bytes_per_pixel())
    }

    /// Width of the texture, in texels, that holds a frame of `width` pixels.
    pub const fn texel_width(self, width: u32) -> u32 {
        match self {
            // Y0 U Y1 V -> one RGBA texel per pixel pair
            PixelFormat::Yuy2 => width.div_ceil(2),
            _ => width,
        }
    }

    /// Bytes of one texture row.
    pub const fn row_bytes(self, width: u32) -> u32 {
        self.texel_width(width) * 4
    }

    /// Texture format the frame bytes are written into verbatim.
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::Yuy2 | PixelFormat::Rgba | PixelFormat::Rgbx => {
                wgpu::TextureFormat::Rgba8Unorm
            }
            PixelFormat::Bgra | PixelFormat::Bgrx => wgpu::TextureFormat::Bgra8Unorm,
        }
    }

    /// Selects the fragment shader path: 0 samples RGB, 1 decodes YUY2.
    pub const fn shader_mode(self) -> u32 {
        match self {
            PixelFormat::Yuy2 => 1,
            _ => 0,
        }
    }

    /// True when the fourth byte carries meaningful alpha.
    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba | PixelFormat::Bgra)
    }
}

// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! GPU texture receiving decoded frames.
//!
//! The size and copy arithmetic live in [`texture_size`] and [`copy_layout`]
//! so they can be checked without a device.

use crate::{Error, FrameRef, PixelFormat, Result};

/// Texture extent for `width` x `height` frames of `format`.
///
/// # Arguments
/// * `width`, `height` - Frame size in pixels
/// * `format` - Pixel layout; YUY2 packs two pixels into one texel
/// * `max_dimension` - The device's `max_texture_dimension_2d`
///
/// # Returns
/// * `Ok(Extent3d)` in texels
/// * `Err(Error::TextureTooLarge)` if either side exceeds `max_dimension`
pub fn texture_size(
    width: u32,
    height: u32,
    format: PixelFormat,
    max_dimension: u32,
) -> Result<wgpu::Extent3d> {
    let texels = format.texel_width(width).max(1);
    let rows = height.max(1);
    if texels > max_dimension || rows > max_dimension {
        return Err(Error::TextureTooLarge {
            width,
            height,
            format,
            max_dimension,
        });
    }
    Ok(wgpu::Extent3d {
        width: texels,
        height: rows,
        depth_or_array_layers: 1,
    })
}

/// How `frame` is laid out for `Queue::write_texture`.
///
/// # Returns
/// * Number of payload bytes read: every row at `stride`, the last one
///   without padding
/// * Buffer layout: `bytes_per_row` is the frame's stride
/// * Copy extent: the frame's texel width by its height
pub fn copy_layout(frame: &FrameRef<'_>) -> (usize, wgpu::TexelCopyBufferLayout, wgpu::Extent3d) {
    let layout = wgpu::TexelCopyBufferLayout {
        offset: 0,
        bytes_per_row: Some(frame.stride),
        rows_per_image: Some(frame.height),
    };
    let extent = wgpu::Extent3d {
        width: frame.format.texel_width(frame.width),
        height: frame.height,
        depth_or_array_layers: 1,
    };
    (frame.min_len(), layout, extent)
}

/// Texture sized and formatted for one stream of frames.
///
/// The texture never converts: a frame is uploaded only if its width, height
/// and pixel format are exactly the ones the texture was created for.
pub struct VideoTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl VideoTexture {
    /// Creates a texture for `width` x `height` frames of `format`.
    ///
    /// # Arguments
    /// * `device` - Device the texture is allocated on
    /// * `width`, `height` - Frame size in pixels
    /// * `format` - Pixel layout of the frames
    ///
    /// # Returns
    /// * `Ok(VideoTexture)` ready for [`VideoTexture::upload`]
    /// * `Err(Error::TextureTooLarge)` if the device cannot hold such a texture
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let size = texture_size(width, height, format, device.limits().max_texture_dimension_2d)?;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Video Frame Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.texture_format(),
            usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
            format,
        })
    }

    /// True if `frame` can be uploaded without recreating the texture.
    pub fn matches(&self, frame: &FrameRef<'_>) -> bool {
        frame.width == self.width && frame.height == self.height && frame.format == self.format
    }

    /// Copies every row of `frame` into the texture, starting at (0, 0).
    ///
    /// # Returns
    /// * `Ok(())` once the copy is queued
    /// * `Err(Error::InvalidFrame)` if the frame's geometry does not fit its payload
    /// * `Err(Error::FrameMismatch)` if the frame was not made for this texture
    pub fn upload(&self, queue: &wgpu::Queue, frame: &FrameRef<'_>) -> Result<()> {
        frame.validate()?;
        if !self.matches(frame) {
            return Err(Error::FrameMismatch {
                frame_width: frame.width,
                frame_height: frame.height,
                frame_format: frame.format,
                texture_width: self.width,
                texture_height: self.height,
                texture_format: self.format,
            });
        }

        let (len, layout, extent) = copy_layout(frame);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &frame.data[..len],
            layout,
            extent,
        );
        Ok(())
    }

    /// View bound by the renderer.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Frame width in pixels (not texels).
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 8192;

    #[test]
    fn odd_width_yuy2_copies_two_texels_per_row() {
        // 3 px: 6 bytes of pixels, stride 8, last texel half used
        let data = [0u8; 16];
        let frame = FrameRef::packed(3, 2, PixelFormat::Yuy2, &data);
        let (len, layout, extent) = copy_layout(&frame);

        assert_eq!(len, 16);
        assert_eq!(layout.offset, 0);
        assert_eq!(layout.bytes_per_row, Some(8));
        assert_eq!(layout.rows_per_image, Some(2));
        assert_eq!(extent.width, 2);
        assert_eq!(extent.height, 2);
        assert_eq!(extent.depth_or_array_layers, 1);
    }

    #[test]
    fn padded_rgba_rows_are_read_at_stride() {
        let data = [0u8; 64 * 4];
        let frame = FrameRef::new(10, 4, PixelFormat::Rgba, 64, &data);
        let (len, layout, extent) = copy_layout(&frame);

        assert_eq!(layout.bytes_per_row, Some(64));
        assert_eq!(extent.width, 10);
        assert_eq!(extent.height, 4);
        // three padded rows, then 40 bytes of the last one
        assert_eq!(len, 64 * 3 + 40);
    }

    #[test]
    fn last_row_without_padding_is_enough() {
        let data = [0u8; 16 * 2 + 8];
        let frame = FrameRef::new(2, 3, PixelFormat::Bgrx, 16, &data);
        assert!(frame.validate().is_ok());
        let (len, _, _) = copy_layout(&frame);
        assert_eq!(len, data.len());
    }

    #[test]
    fn texture_size_packs_yuy2() {
        let size = texture_size(321, 240, PixelFormat::Yuy2, MAX).unwrap();
        assert_eq!((size.width, size.height), (161, 240));
        let size = texture_size(320, 240, PixelFormat::Rgba, MAX).unwrap();
        assert_eq!((size.width, size.height), (320, 240));
    }

    #[test]
    fn texture_size_at_device_limit_is_accepted() {
        assert!(texture_size(MAX, MAX, PixelFormat::Bgra, MAX).is_ok());
        // two pixels per texel
        assert!(texture_size(2 * MAX, 16, PixelFormat::Yuy2, MAX).is_ok());
    }

    #[test]
    fn texture_size_over_device_limit_is_rejected() {
        assert!(matches!(
            texture_size(MAX + 1, 16, PixelFormat::Rgba, MAX),
            Err(Error::TextureTooLarge { width, max_dimension: MAX, .. }) if width == MAX + 1
        ));
        assert!(matches!(
            texture_size(16, MAX + 1, PixelFormat::Yuy2, MAX),
            Err(Error::TextureTooLarge { .. })
        ));
        assert!(texture_size(2 * MAX + 1, 16, PixelFormat::Yuy2, MAX).is_err());
    }
}

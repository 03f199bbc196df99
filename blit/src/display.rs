// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Window surface, device and the texture frames are blitted into.
//!
//! ## Frame Flow
//! 1. [`Display::blit`] receives a borrowed frame
//! 2. The texture is recreated if the frame's size or format changed
//! 3. The frame rows are written into the texture
//! 4. [`Display::present`] clears the surface, draws the texture and presents

use std::sync::Arc;

use tracing::{debug, info, warn};
use winit::window::Window;

use crate::{BlitParams, Error, FrameRef, Result, VideoRenderer, VideoTexture};

/// Default window title
pub const DEFAULT_TITLE: &str = "gst-blit";

/// Default window width, matching the test pattern's default frame
pub const DEFAULT_WIDTH: u32 = 320;

/// Default window height
pub const DEFAULT_HEIGHT: u32 = 240;

/// Window and presentation settings.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Window title
    pub title: String,

    /// Initial inner width in logical pixels
    pub width: u32,

    /// Initial inner height in logical pixels
    pub height: u32,

    /// Wait for vertical blank before presenting
    pub vsync: bool,

    /// Preserve the frame's aspect ratio instead of stretching it
    pub keep_aspect: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            title: DEFAULT_TITLE.to_owned(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            keep_aspect: true,
        }
    }
}

/// Frame texture together with the bind group referencing it.
struct FrameSlot {
    texture: VideoTexture,
    bind_group: wgpu::BindGroup,
}

/// GPU state for one window.
pub struct Display {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: VideoRenderer,
    slot: Option<FrameSlot>,
    keep_aspect: bool,
}

impl Display {
    /// Opens a device able to present to `window` and configures its surface.
    ///
    /// # Arguments
    /// * `window` - Window to present into; shared with the event loop
    /// * `config` - Presentation mode and scaling
    ///
    /// # Returns
    /// * `Ok(Display)` with a configured non-sRGB surface
    /// * `Err(Error)` if no surface, adapter, device or surface format is available
    pub async fn new(window: Arc<Window>, config: &DisplayConfig) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::NoAdapter)?;
        info!("Using GPU adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Blit Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        // Frame bytes are written verbatim, so present without sRGB encoding
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(Error::NoSurfaceFormat)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        debug!(?format, width = surface_config.width, height = surface_config.height, "Configured surface");

        let renderer = VideoRenderer::new(&device, format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            surface_config,
            renderer,
            slot: None,
            keep_aspect: config.keep_aspect,
        })
    }

    /// Window the display presents into.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigures the surface after the window was resized.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.update_params();
    }

    /// Copies `frame` into the frame texture, recreating it when the frame's
    /// geometry or format differs from the current one.
    ///
    /// # Returns
    /// * `Ok(())` once the upload is queued; it is drawn by the next [`Display::present`]
    /// * `Err(Error::InvalidFrame)` if the frame's geometry does not fit its payload
    /// * `Err(Error::TextureTooLarge)` if the frame exceeds the device's texture limit
    pub fn blit(&mut self, frame: &FrameRef<'_>) -> Result<()> {
        frame.validate()?;

        let needs_texture = self
            .slot
            .as_ref()
            .is_none_or(|slot| !slot.texture.matches(frame));
        if needs_texture {
            debug!(
                width = frame.width,
                height = frame.height,
                format = ?frame.format,
                "Creating frame texture"
            );
            let texture =
                VideoTexture::new(&self.device, frame.width, frame.height, frame.format)?;
            let bind_group = self.renderer.create_bind_group(&self.device, &texture);
            self.slot = Some(FrameSlot {
                texture,
                bind_group,
            });
            self.update_params();
        }

        if let Some(slot) = &self.slot {
            slot.texture.upload(&self.queue, frame)?;
        }
        Ok(())
    }

    /// Draws the current frame (or black) and presents it.
    pub fn present(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring surface texture");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Blit Encoder"),
            });
        self.renderer.render(
            &mut encoder,
            &view,
            self.slot.as_ref().map(|slot| &slot.bind_group),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn update_params(&mut self) {
        let Some(slot) = &self.slot else {
            return;
        };
        let texture = &slot.texture;
        let mode = texture.format().shader_mode();
        let params = if self.keep_aspect {
            BlitParams::fit(
                texture.width(),
                texture.height(),
                self.surface_config.width,
                self.surface_config.height,
                mode,
            )
        } else {
            BlitParams::stretch(texture.width(), texture.height(), mode)
        };
        self.renderer.set_params(&self.queue, params);
    }
}

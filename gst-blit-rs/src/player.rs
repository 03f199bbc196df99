// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Window event loop driving the pull → blit → present cycle.
//!
//! Every redraw polls the bus, pulls at most one frame, copies it into the
//! display texture and presents. Playback ends at end of stream, when the
//! window is closed or on Escape. Space toggles pause.

use std::sync::Arc;

use blit::{Display, DisplayConfig};
use tracing::{info, trace};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::{BusStatus, Error, FramePipeline, Pulled, Result, Settings};

/// Window and pipeline, created together once the event loop is running.
struct Session {
    pipeline: FramePipeline,
    display: Display,
}

/// Plays one pipeline into one window.
pub struct Player {
    settings: Settings,
    display_config: DisplayConfig,
    session: Option<Session>,
    paused: bool,
    frames: u64,
    error: Option<Error>,
}

impl Player {
    /// Creates a player; the window and pipeline are opened once the event
    /// loop resumes.
    pub fn new(settings: Settings, display_config: DisplayConfig) -> Self {
        Self {
            settings,
            display_config,
            session: None,
            paused: false,
            frames: 0,
            error: None,
        }
    }

    /// Number of frames blitted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Consumes the player, returning the error that stopped it, if any.
    pub fn finish(self) -> Result<()> {
        info!("Displayed {} frames", self.frames);
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn open(&self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attributes = Window::default_attributes()
            .with_title(self.display_config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.display_config.width,
                self.display_config.height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let display = pollster::block_on(Display::new(window, &self.display_config))?;

        let pipeline = FramePipeline::new(&self.settings)?;
        pipeline.start()?;

        Ok(Session { pipeline, display })
    }

    /// One iteration of the render loop.
    fn step(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(session) = &mut self.session else {
            return Ok(());
        };

        if session.pipeline.poll_bus()? == BusStatus::Eos {
            trace!("End of stream posted, draining queued frames");
        }

        if !self.paused {
            match session.pipeline.pull(self.settings.pull_timeout)? {
                Pulled::Frame(frame) => {
                    frame.with_frame(|frame| session.display.blit(&frame))??;
                    self.frames += 1;
                }
                Pulled::Timeout => trace!("No frame within {:?}", self.settings.pull_timeout),
                Pulled::Eos => {
                    info!("Playback finished");
                    event_loop.exit();
                    return Ok(());
                }
            }
        }

        session.display.present()
    }

    fn toggle_pause(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        self.paused = !self.paused;
        session.pipeline.set_paused(self.paused)?;
        event_loop.set_control_flow(if self.paused {
            ControlFlow::Wait
        } else {
            ControlFlow::Poll
        });
        session.display.window().request_redraw();
        Ok(())
    }

    /// Keeps the first error and stops the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for Player {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }
        match self.open(event_loop) {
            Ok(session) => self.session = Some(session),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => {
                        event_loop.exit();
                        Ok(())
                    }
                    PhysicalKey::Code(KeyCode::Space) => self.toggle_pause(event_loop),
                    _ => Ok(()),
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(session) = &mut self.session {
                    session.display.resize(size.width, size.height);
                }
                Ok(())
            }
            WindowEvent::RedrawRequested => self.step(event_loop),
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.paused {
            return;
        }
        if let Some(session) = &self.session {
            session.display.window().request_redraw();
        }
    }
}

/// Plays `settings` in a new window until end of stream or until the user
/// closes it.
///
/// # Arguments
/// * `settings` - Pipeline to play
/// * `display_config` - Window title, size and presentation options
///
/// # Returns
/// * `Ok(())` after end of stream, window close or Escape
/// * `Err(Error)` with the first error that stopped playback
pub fn run(settings: Settings, display_config: DisplayConfig) -> Result<()> {
    crate::init()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut player = Player::new(settings, display_config);
    event_loop.run_app(&mut player)?;
    player.finish()
}

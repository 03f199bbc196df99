// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Frame pipeline: source → [converters →] appsink.
//!
//! ## Responsibilities
//! - Builds the pipeline and the appsink from [`Settings`]
//! - Moves the pipeline between NULL, PAUSED and PLAYING
//! - Hands out decoded frames, either pulled on demand or forwarded by the
//!   appsink's `new-sample` callback
//! - Reports bus errors and end of stream to the render loop
//!
//! ## Threading
//! Only the render thread calls into a [`FramePipeline`]. In callback
//! delivery the streaming thread does nothing but push samples into a
//! bounded channel, dropping them while the render loop is busy.

use std::sync::LazyLock;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use gst::prelude::*;
use gst_base::prelude::BaseSinkExt;
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_base as gst_base;
use tracing::{debug, info, trace, warn};

use crate::caps::appsink_caps;
use crate::source::{link_source, make_source};
use crate::{Delivery, Error, Result, SampleFrame, Settings};

/// GStreamer debug category for messages bound to pipeline objects.
///
/// Set GST_DEBUG=gstblit:5 to see them.
pub(crate) static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "gstblit",
        gst::DebugColorFlags::empty(),
        Some("gst-blit frame pipeline"),
    )
});

/// Result of one pull.
#[derive(Debug)]
pub enum Pulled {
    /// A decoded frame
    Frame(SampleFrame),

    /// No frame arrived within the timeout
    Timeout,

    /// The stream has ended and every queued frame was consumed
    Eos,
}

/// Pipeline state as seen on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStatus {
    Running,
    Eos,
}

/// A running (or ready to run) frame pipeline.
pub struct FramePipeline {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    bus: gst::Bus,

    /// Samples forwarded by the `new-sample` callback (callback delivery only)
    samples: Option<Receiver<gst::Sample>>,
}

impl FramePipeline {
    /// Builds the pipeline described by `settings`, without starting it.
    ///
    /// # Arguments
    /// * `settings` - Source, caps, appsink queueing and delivery mode
    ///
    /// # Returns
    /// * `Ok(FramePipeline)` in the NULL state
    /// * `Err(Error::ElementCreation)` if a plugin is missing or rejects a property
    /// * `Err(Error::Link)` if the elements cannot be added or linked
    pub fn new(settings: &Settings) -> Result<Self> {
        let pipeline = gst::Pipeline::with_name("test-pipeline");

        let appsink = gst_app::AppSink::builder()
            .name("app_sink")
            .caps(&appsink_caps(settings))
            .max_buffers(settings.max_buffers)
            .drop(settings.drop)
            .build();
        appsink.set_sync(settings.sync);
        pipeline.add(&appsink)?;

        let source = make_source(settings)?;
        link_source(&pipeline, &source, settings, &appsink)?;

        let samples = match settings.delivery {
            Delivery::Pull => None,
            Delivery::Callback => Some(install_callbacks(&appsink, settings.max_buffers)),
        };

        let bus = pipeline
            .bus()
            .ok_or_else(|| Error::Link(glib::bool_error!("Pipeline has no bus")))?;

        gst::debug!(CAT, obj = &pipeline, "Built pipeline for {:?}", settings.source);

        Ok(Self {
            pipeline,
            appsink,
            bus,
            samples,
        })
    }

    /// The underlying pipeline, for state queries and debugging.
    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    /// The appsink frames are taken from.
    pub fn appsink(&self) -> &gst_app::AppSink {
        &self.appsink
    }

    /// Sets the pipeline to PLAYING.
    ///
    /// On failure the pipeline is returned to NULL. An error posted on the bus
    /// by the failing element is preferred over the bare state change error.
    ///
    /// # Returns
    /// * `Ok(())` once the state change is accepted (it may complete asynchronously)
    /// * `Err(Error::Pipeline)` with the failing element's message
    /// * `Err(Error::StateChange)` if no element explained the failure
    pub fn start(&self) -> Result<()> {
        if let Err(err) = self.pipeline.set_state(gst::State::Playing) {
            gst::error!(
                CAT,
                obj = &self.pipeline,
                "Unable to set the pipeline to the playing state"
            );
            let bus_error = self.poll_bus().err();
            let _ = self.pipeline.set_state(gst::State::Null);
            return Err(bus_error.unwrap_or(Error::StateChange(err)));
        }
        info!("Pipeline playing");
        Ok(())
    }

    /// Switches between PAUSED and PLAYING.
    pub fn set_paused(&self, paused: bool) -> Result<()> {
        let state = if paused {
            gst::State::Paused
        } else {
            gst::State::Playing
        };
        self.pipeline.set_state(state)?;
        info!("Pipeline {}", if paused { "paused" } else { "playing" });
        Ok(())
    }

    /// Waits up to `timeout` for the next decoded frame.
    ///
    /// In callback delivery only the newest forwarded frame is returned;
    /// older ones still queued are dropped so a slow render loop catches up.
    ///
    /// # Arguments
    /// * `timeout` - Longest time to wait for a frame
    ///
    /// # Returns
    /// * `Ok(Pulled::Frame)` with a frame whose caps were validated
    /// * `Ok(Pulled::Timeout)` if nothing arrived in time
    /// * `Ok(Pulled::Eos)` once the stream ended and no frame is left
    /// * `Err(Error)` if the sample carries unusable caps or no buffer
    pub fn pull(&self, timeout: Duration) -> Result<Pulled> {
        let received = match &self.samples {
            // appsink only reports EOS once its own queue is empty
            None => match self
                .appsink
                .try_pull_sample(gst::ClockTime::from_nseconds(timeout.as_nanos() as u64))
            {
                Some(sample) => Received::Item(sample),
                None if self.appsink.is_eos() => Received::Eos,
                None => Received::Timeout,
            },
            Some(samples) => recv_newest(samples, timeout, || self.appsink.is_eos()),
        };

        match received {
            Received::Item(sample) => {
                let frame = SampleFrame::from_sample(sample)?;
                trace!(pts = ?frame.pts(), "Pulled frame");
                Ok(Pulled::Frame(frame))
            }
            Received::Timeout => Ok(Pulled::Timeout),
            Received::Eos => Ok(Pulled::Eos),
        }
    }

    /// Drains pending bus messages.
    ///
    /// Never blocks. Warnings and state changes are only logged.
    ///
    /// # Returns
    /// * `Ok(BusStatus::Eos)` if end of stream was among the drained messages
    /// * `Ok(BusStatus::Running)` otherwise
    /// * `Err(Error::Pipeline)` for the first error message
    pub fn poll_bus(&self) -> Result<BusStatus> {
        use gst::MessageView;

        let mut status = BusStatus::Running;
        while let Some(msg) = self.bus.pop() {
            match msg.view() {
                MessageView::Error(err) => {
                    return Err(Error::Pipeline {
                        source_name: err
                            .src()
                            .map(|s| s.path_string().to_string())
                            .unwrap_or_else(|| "pipeline".to_owned()),
                        message: err.error().to_string(),
                        debug: err.debug().map(|d| d.to_string()),
                    });
                }
                MessageView::Warning(warning) => {
                    warn!(
                        "Warning from {:?}: {} ({:?})",
                        warning.src().map(|s| s.path_string()),
                        warning.error(),
                        warning.debug()
                    );
                }
                MessageView::Eos(..) => {
                    info!("End of stream");
                    status = BusStatus::Eos;
                }
                MessageView::StateChanged(changed) => {
                    if changed.src().is_some_and(|s| s == &self.pipeline) {
                        debug!(
                            "Pipeline state changed from {:?} to {:?}",
                            changed.old(),
                            changed.current()
                        );
                    }
                }
                _ => {}
            }
        }
        Ok(status)
    }

    /// Returns the pipeline to NULL, releasing every element's resources.
    pub fn stop(&self) -> Result<()> {
        self.pipeline.set_state(gst::State::Null)?;
        Ok(())
    }
}

impl Drop for FramePipeline {
    fn drop(&mut self) {
        if let Err(err) = self.pipeline.set_state(gst::State::Null) {
            warn!("Failed to stop pipeline: {err}");
        }
    }
}

/// Outcome of one receive from the sample channel.
#[derive(Debug, PartialEq, Eq)]
enum Received<T> {
    Item(T),
    Timeout,
    Eos,
}

/// Waits up to `timeout` for an item and returns the newest one queued.
///
/// `is_eos` is only consulted after the wait timed out. The streaming
/// thread may queue its last sample between the timeout and end of stream
/// being flagged, so the channel is checked again before reporting EOS.
fn recv_newest<T>(
    receiver: &Receiver<T>,
    timeout: Duration,
    is_eos: impl FnOnce() -> bool,
) -> Received<T> {
    if let Ok(item) = receiver.recv_timeout(timeout) {
        let newest = receiver.try_iter().last();
        if newest.is_some() {
            trace!("Render loop behind, skipping queued samples");
        }
        return Received::Item(newest.unwrap_or(item));
    }
    if !is_eos() {
        return Received::Timeout;
    }
    match receiver.try_iter().last() {
        Some(item) => Received::Item(item),
        None => Received::Eos,
    }
}

/// Forwards every new sample into a bounded channel.
///
/// Runs on the streaming thread, so it must never touch the display. When
/// the render loop is behind, the oldest queued sample makes room for the
/// new one.
fn install_callbacks(appsink: &gst_app::AppSink, capacity: u32) -> Receiver<gst::Sample> {
    let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1) as usize);
    let stale = receiver.clone();
    appsink.set_callbacks(
        gst_app::AppSinkCallbacks::builder()
            .new_sample(move |sink| {
                let sample = sink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                if send_newest(&sender, &stale, sample) {
                    Ok(gst::FlowSuccess::Ok)
                } else {
                    Err(gst::FlowError::Flushing)
                }
            })
            .build(),
    );
    receiver
}

/// Queues `item`, evicting the oldest queued items while the channel is full.
///
/// Returns false once the channel is disconnected.
fn send_newest<T>(sender: &Sender<T>, stale: &Receiver<T>, mut item: T) -> bool {
    loop {
        match sender.try_send(item) {
            Ok(()) => return true,
            Err(TrySendError::Full(rejected)) => {
                trace!("Render loop busy, dropping oldest sample");
                let _ = stale.try_recv();
                item = rejected;
            }
            Err(TrySendError::Disconnected(_)) => return false,
        }
    }
}

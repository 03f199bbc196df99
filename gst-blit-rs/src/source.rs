// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Source elements and how they are linked to the appsink.
//!
//! ## Linking Strategies
//! - **Static**: `videotestsrc` has an always-present source pad and is
//!   linked to the appsink directly; the appsink caps drive negotiation.
//! - **Dynamic**: `uridecodebin` only creates its source pads once it has
//!   inspected the media. The converter chain behind it is linked up front
//!   and the decoder's video pad is linked to it from the `pad-added` signal.

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use tracing::{debug, info};

use crate::pipeline::CAT;
use crate::{Error, Result, Settings, SourceKind};

/// Creates the element producing raw or encoded frames for `settings`.
pub fn make_source(settings: &Settings) -> Result<gst::Element> {
    match &settings.source {
        SourceKind::TestPattern { pattern } => {
            let mut builder = gst::ElementFactory::make("videotestsrc")
                .name("source")
                .property_from_str("pattern", pattern);
            if let Some(num_buffers) = settings.num_buffers {
                builder = builder.property("num-buffers", num_buffers as i32);
            }
            builder.build().map_err(Error::element("videotestsrc"))
        }
        SourceKind::Uri(uri) => gst::ElementFactory::make("uridecodebin")
            .name("source")
            .property("uri", uri)
            .build()
            .map_err(Error::element("uridecodebin")),
    }
}

/// Adds `source` (and any converters) to `pipeline` and links them to `appsink`.
///
/// The appsink must already be in the pipeline.
///
/// # Arguments
/// * `pipeline` - Pipeline receiving the elements
/// * `source` - Element returned by [`make_source`]
/// * `settings` - Decides between static and `pad-added` linking
/// * `appsink` - Final element of the chain
///
/// # Returns
/// * `Ok(())` once everything that can be linked up front is linked
/// * `Err(Error::ElementCreation)` if a converter plugin is missing
/// * `Err(Error::Link)` if adding or linking fails
pub fn link_source(
    pipeline: &gst::Pipeline,
    source: &gst::Element,
    settings: &Settings,
    appsink: &gst_app::AppSink,
) -> Result<()> {
    match settings.source {
        SourceKind::TestPattern { .. } => {
            pipeline.add(source)?;
            source.link(appsink)?;
        }
        SourceKind::Uri(_) => {
            let convert = gst::ElementFactory::make("videoconvert")
                .name("convert")
                .build()
                .map_err(Error::element("videoconvert"))?;
            let scale = gst::ElementFactory::make("videoscale")
                .name("scale")
                .build()
                .map_err(Error::element("videoscale"))?;

            pipeline.add_many([source, &convert, &scale])?;
            gst::Element::link_many([&convert, &scale, appsink.upcast_ref()])?;

            let sink_pad = convert
                .static_pad("sink")
                .ok_or_else(|| Error::Link(glib::bool_error!("videoconvert has no sink pad")))?;
            let sink_pad = sink_pad.downgrade();
            source.connect_pad_added(move |src, src_pad| {
                let Some(sink_pad) = sink_pad.upgrade() else {
                    return;
                };
                let outcome = link_decoded_pad(src_pad, &sink_pad);
                match &outcome {
                    PadLinkOutcome::Linked(media) => {
                        info!("Linked {} pad {} ({media})", src.name(), src_pad.name());
                    }
                    PadLinkOutcome::Failed(err) => {
                        gst::warning!(CAT, obj = src, "Linking pad {} failed: {err:?}", src_pad.name());
                    }
                    other => {
                        debug!("Ignoring pad {} of {}: {other:?}", src_pad.name(), src.name());
                    }
                }
            });
        }
    }
    Ok(())
}

/// What happened to a pad offered by a decoding element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadLinkOutcome {
    /// The pad carries raw video and was linked
    Linked(String),

    /// The converter is already fed by an earlier pad
    AlreadyLinked,

    /// The pad has no negotiated caps yet
    NoCaps,

    /// The pad carries something other than raw video (audio, subtitles)
    NotVideo(String),

    /// Linking was refused
    Failed(gst::PadLinkError),
}

/// Links `src_pad` to `sink_pad` if it carries raw video and nothing else
/// feeds `sink_pad` yet.
///
/// # Arguments
/// * `src_pad` - Pad announced by `pad-added`
/// * `sink_pad` - Sink pad of the converter chain
///
/// # Returns
/// The [`PadLinkOutcome`], for logging; nothing is linked unless it is `Linked`.
pub fn link_decoded_pad(src_pad: &gst::Pad, sink_pad: &gst::Pad) -> PadLinkOutcome {
    if sink_pad.is_linked() {
        return PadLinkOutcome::AlreadyLinked;
    }

    let caps = src_pad
        .current_caps()
        .unwrap_or_else(|| src_pad.query_caps(None));
    let Some(media) = caps.structure(0).map(|s| s.name().to_string()) else {
        return PadLinkOutcome::NoCaps;
    };
    if !media.starts_with("video/x-raw") {
        return PadLinkOutcome::NotVideo(media);
    }

    match src_pad.link(sink_pad) {
        Ok(_) => PadLinkOutcome::Linked(media),
        Err(err) => PadLinkOutcome::Failed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        gst::init().unwrap();
    }

    fn src_pad_with_caps(caps: &gst::Caps) -> gst::Pad {
        let template =
            gst::PadTemplate::new("src", gst::PadDirection::Src, gst::PadPresence::Always, caps)
                .unwrap();
        gst::Pad::builder_from_template(&template).build()
    }

    fn sink_pad() -> gst::Pad {
        gst::Pad::builder(gst::PadDirection::Sink).name("sink").build()
    }

    #[test]
    fn audio_pads_are_ignored() {
        init();
        let caps = gst::Caps::builder("audio/x-raw").field("format", "S16LE").build();
        let src = src_pad_with_caps(&caps);
        let sink = sink_pad();
        assert_eq!(
            link_decoded_pad(&src, &sink),
            PadLinkOutcome::NotVideo("audio/x-raw".into())
        );
        assert!(!sink.is_linked());
    }

    #[test]
    fn pad_without_caps_is_ignored() {
        init();
        let src = gst::Pad::builder(gst::PadDirection::Src).name("src").build();
        assert_eq!(link_decoded_pad(&src, &sink_pad()), PadLinkOutcome::NoCaps);
    }

    #[test]
    fn raw_video_pad_is_linked_once() {
        init();
        let caps = gst::Caps::builder("video/x-raw").field("format", "RGBA").build();
        let first = src_pad_with_caps(&caps);
        let second = src_pad_with_caps(&caps);
        let sink = sink_pad();

        assert_eq!(
            link_decoded_pad(&first, &sink),
            PadLinkOutcome::Linked("video/x-raw".into())
        );
        assert!(sink.is_linked());
        assert_eq!(
            link_decoded_pad(&second, &sink),
            PadLinkOutcome::AlreadyLinked
        );
    }

    #[test]
    fn test_pattern_source_takes_pattern_and_buffer_count() {
        init();
        let settings = Settings::test_pattern("ball").with_num_buffers(7);
        let Ok(source) = make_source(&settings) else {
            // gst-plugins-base not installed
            return;
        };
        assert_eq!(source.property::<i32>("num-buffers"), 7);
        assert_eq!(source.name(), "source");
    }
}

//! Frame sinks for the offline show render.
//!
//! Sinks consume rendered frames in playback order; see [`crate::Show::render_to_sink`].

pub(crate) mod ffmpeg;
pub(crate) mod sink;

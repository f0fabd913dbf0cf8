//! Media stream probing.
//!
//! Produces the [`ProbedMetadata`] the video recipe consumes: which kinds of
//! tracks are present, and which embedded streams are fonts or subtitles.

mod ffprobe;
mod types;

pub use ffprobe::{ffprobe_invocation, parse_ffprobe_json, probe_with_ffprobe};
pub use types::*;

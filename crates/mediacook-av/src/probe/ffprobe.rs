//! FFprobe-based stream probing.

use super::types::*;
use crate::invoker::{Invocation, ProcessInvoker};
use crate::template::{TemplateContext, INPUT};
use crate::tools::Tool;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// MIME types ffmpeg and muxers use for font attachments.
const FONT_MIMETYPES: &[&str] = &[
    "application/x-truetype-font",
    "application/x-font-ttf",
    "application/x-font-otf",
    "application/x-font-opentype",
    "application/vnd.ms-opentype",
    "application/font-sfnt",
    "application/font-woff",
    "font/ttf",
    "font/otf",
    "font/sfnt",
    "font/collection",
    "font/woff",
    "font/woff2",
];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc", "woff", "woff2"];

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    #[serde(default)]
    codec_type: Option<String>,
    codec_name: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    filename: Option<String>,
    mimetype: Option<String>,
}

/// The ffprobe command used to list streams as JSON.
pub fn ffprobe_invocation() -> Invocation {
    Invocation::new(Tool::Ffprobe).args([
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_streams",
        "{input}",
    ])
}

/// Probe the streams of a media file using ffprobe.
pub fn probe_with_ffprobe(invoker: &ProcessInvoker, path: &Path) -> Result<ProbedMetadata> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let ctx = TemplateContext::new().with_var(INPUT, &path.display().to_string());
    let output = invoker.run(&ffprobe_invocation(), &ctx)?;

    parse_ffprobe_json(&output.stdout_lines.join("\n"))
}

/// Parse `ffprobe -show_streams -print_format json` output.
pub fn parse_ffprobe_json(json: &str) -> Result<ProbedMetadata> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::parse_error(Tool::Ffprobe.name(), e.to_string()))?;
    Ok(classify_streams(output.streams))
}

fn classify_streams(streams: Vec<FfprobeStream>) -> ProbedMetadata {
    let mut has_video = false;
    let mut has_audio = false;
    let mut descriptors = Vec::with_capacity(streams.len());

    for stream in streams {
        let kind = match stream.codec_type.as_deref() {
            // Cover art is muxed as a single-frame video stream.
            Some("video") if stream.disposition.attached_pic == 0 => {
                has_video = true;
                StreamKind::Other
            }
            Some("audio") => {
                has_audio = true;
                StreamKind::Other
            }
            Some("subtitle") => StreamKind::Subtitle,
            Some("attachment") if is_font(&stream) => StreamKind::Font,
            _ => StreamKind::Other,
        };

        descriptors.push(StreamDescriptor {
            index: stream.index,
            kind,
            codec_name: stream.codec_name,
            filename: stream.tags.filename,
            mimetype: stream.tags.mimetype,
        });
    }

    ProbedMetadata::new(has_video, has_audio, descriptors)
}

fn is_font(stream: &FfprobeStream) -> bool {
    let by_mime = stream
        .tags
        .mimetype
        .as_deref()
        .is_some_and(|m| FONT_MIMETYPES.contains(&m.to_ascii_lowercase().as_str()));
    let by_codec = matches!(stream.codec_name.as_deref(), Some("ttf") | Some("otf"));
    let by_name = stream
        .tags
        .filename
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

    by_mime || by_codec || by_name
}

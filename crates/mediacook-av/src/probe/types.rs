//! Probed stream metadata types.

use serde::{Deserialize, Serialize};

/// How the pipeline treats an embedded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// An attached font (typically in Matroska files carrying ASS subtitles).
    Font,
    /// A subtitle track.
    Subtitle,
    /// Anything else: video, audio, cover art, data.
    Other,
}

/// One stream in a probed container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Absolute stream index within the container.
    pub index: u32,
    /// Classification of the stream.
    #[serde(rename = "type")]
    pub kind: StreamKind,
    /// Codec name as reported by the prober (e.g. `"ssa"`, `"ttf"`).
    pub codec_name: Option<String>,
    /// Attachment file name, for font streams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Attachment MIME type, for font streams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}

impl StreamDescriptor {
    pub fn new(index: u32, kind: StreamKind) -> Self {
        Self {
            index,
            kind,
            codec_name: None,
            filename: None,
            mimetype: None,
        }
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec_name = Some(codec.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Name the extracted attachment is stored under.
    ///
    /// Falls back to the stream index when the container gives no file name.
    #[must_use]
    pub fn attachment_name(&self) -> String {
        match self.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("stream{}", self.index),
        }
    }
}

/// What the prober found in an input container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbedMetadata {
    pub has_video: bool,
    pub has_audio: bool,
    pub has_fonts: bool,
    pub has_subtitles: bool,
    /// Streams in container order.
    pub streams: Vec<StreamDescriptor>,
}

impl ProbedMetadata {
    /// Build metadata from classified streams. `has_fonts` and
    /// `has_subtitles` are derived from the streams.
    pub fn new(has_video: bool, has_audio: bool, streams: Vec<StreamDescriptor>) -> Self {
        let has_fonts = streams.iter().any(|s| s.kind == StreamKind::Font);
        let has_subtitles = streams.iter().any(|s| s.kind == StreamKind::Subtitle);
        Self {
            has_video,
            has_audio,
            has_fonts,
            has_subtitles,
            streams,
        }
    }

    /// Font attachment streams, in container order.
    pub fn fonts(&self) -> impl Iterator<Item = &StreamDescriptor> {
        self.streams.iter().filter(|s| s.kind == StreamKind::Font)
    }

    /// Subtitle streams, in container order.
    pub fn subtitles(&self) -> impl Iterator<Item = &StreamDescriptor> {
        self.streams.iter().filter(|s| s.kind == StreamKind::Subtitle)
    }
}

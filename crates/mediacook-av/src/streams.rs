//! Extraction of embedded fonts and subtitles from video containers.
//!
//! Font attachments are dumped next to the other artifacts and described in a
//! `<hash>_fonts.css` stylesheet so subtitle renderers in the browser can load
//! them. Subtitle tracks are extracted into a standalone file whose extension
//! follows the track's codec.

use crate::fonts::{stylesheet, FontFace, FontMetadata};
use crate::invoker::{Invocation, ProcessInvoker};
use crate::probe::{ProbedMetadata, StreamDescriptor, StreamKind};
use crate::template::TemplateContext;
use crate::tools::Tool;
use crate::Result;
use mediacook_common::{ObjectHash, StorageLayout};
use std::path::PathBuf;

/// Map a subtitle codec name to the extension it is extracted to.
///
/// ffprobe has reported both the legacy (`ssa`, `srt`, `vtt`) and the current
/// (`ass`, `subrip`, `webvtt`) names; both are accepted. Anything else
/// (bitmap formats, mov_text) is not extracted.
pub fn subtitle_extension(codec_name: &str) -> Option<&'static str> {
    match codec_name {
        "ssa" | "ass" => Some("ass"),
        "srt" | "subrip" => Some("srt"),
        "vtt" | "webvtt" => Some("vtt"),
        _ => None,
    }
}

/// Dump one attachment stream. ffmpeg exits non-zero after
/// `-dump_attachment` because there is no regular output file.
pub fn attachment_invocation() -> Invocation {
    Invocation::new(Tool::Ffmpeg)
        .args(["-y", "-dump_attachment:{index}", "{attachment}", "-i", "{input}"])
        .tolerate_nonzero_exit()
}

/// Extract the `{n}`th subtitle track to `{stem}.{subtitle_ext}`.
pub fn subtitle_invocation() -> Invocation {
    Invocation::new(Tool::Ffmpeg).args([
        "-y",
        "-i",
        "{input}",
        "-map",
        "0:s:{n}",
        "{stem}.{subtitle_ext}",
    ])
}

/// Read family/subfamily names from an extracted font. A file otfinfo
/// cannot read degrades to an unnamed face instead of failing the phase.
pub fn font_info_invocation() -> Invocation {
    Invocation::new(Tool::Otfinfo)
        .args(["--info", "{attachment}"])
        .tolerate_nonzero_exit()
}

/// What a classification pass produced.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// One rule per font stream, in container order.
    pub fonts: Vec<FontFace>,
    /// Extensions of the subtitle files that were extracted.
    pub subtitles: Vec<&'static str>,
    /// Path of the written stylesheet.
    pub stylesheet: PathBuf,
}

/// Separates font attachments from subtitle tracks and extracts both.
pub struct StreamClassifier<'a> {
    invoker: &'a ProcessInvoker,
    layout: &'a StorageLayout,
}

impl<'a> StreamClassifier<'a> {
    pub fn new(invoker: &'a ProcessInvoker, layout: &'a StorageLayout) -> Self {
        Self { invoker, layout }
    }

    /// Run classification for one object.
    ///
    /// `ctx` must carry the object's `{input}`, `{stem}` and `{extension}`
    /// bindings. Steps run in container order and stop at the first
    /// untolerated failure. The stylesheet is always written, empty when the
    /// container has no fonts, so its presence marks that classification ran.
    pub fn classify(
        &self,
        hash: &ObjectHash,
        ctx: &TemplateContext,
        metadata: &ProbedMetadata,
    ) -> Result<Classification> {
        let mut fonts: Vec<&StreamDescriptor> = Vec::new();
        let mut subtitles: Vec<&'static str> = Vec::new();

        if metadata.has_fonts || metadata.has_subtitles {
            let mut subtitle_ordinal = 0usize;
            for stream in &metadata.streams {
                match stream.kind {
                    StreamKind::Font => {
                        self.dump_attachment(hash, ctx, stream)?;
                        fonts.push(stream);
                    }
                    StreamKind::Subtitle => {
                        let ordinal = subtitle_ordinal;
                        subtitle_ordinal += 1;
                        let codec = stream.codec_name.as_deref().unwrap_or_default();
                        match subtitle_extension(codec) {
                            Some(ext) if subtitles.contains(&ext) => {
                                tracing::debug!(
                                    "{}: subtitle stream {} skipped, .{} already extracted",
                                    hash,
                                    stream.index,
                                    ext
                                );
                            }
                            Some(ext) => {
                                let sub_ctx = ctx
                                    .clone()
                                    .with_var("n", &ordinal.to_string())
                                    .with_var("subtitle_ext", ext);
                                self.invoker.run(&subtitle_invocation(), &sub_ctx)?;
                                subtitles.push(ext);
                            }
                            None => {
                                tracing::debug!(
                                    "{}: subtitle stream {} has unsupported codec {:?}, skipping",
                                    hash,
                                    stream.index,
                                    codec
                                );
                            }
                        }
                    }
                    StreamKind::Other => {}
                }
            }
        }

        let mut faces = Vec::with_capacity(fonts.len());
        for stream in fonts {
            let name = stream.attachment_name();
            let attachment = self.layout.attachment(hash, &name);
            let font_ctx = ctx
                .clone()
                .with_var("attachment", &attachment.display().to_string());
            let output = self.invoker.run(&font_info_invocation(), &font_ctx)?;
            let metadata = FontMetadata::parse(&output.stdout_lines);
            if metadata.family.is_none() {
                tracing::warn!("{}: no family name found in {}", hash, attachment.display());
            }
            faces.push(FontFace::new(
                &metadata,
                &StorageLayout::attachment_name(hash, &name),
            ));
        }

        let path = self.layout.font_stylesheet(hash);
        std::fs::write(&path, stylesheet(&faces))?;

        tracing::info!(
            "{}: classified {} font(s), extracted {} subtitle track(s)",
            hash,
            faces.len(),
            subtitles.len()
        );

        Ok(Classification {
            fonts: faces,
            subtitles,
            stylesheet: path,
        })
    }

    fn dump_attachment(
        &self,
        hash: &ObjectHash,
        ctx: &TemplateContext,
        stream: &StreamDescriptor,
    ) -> Result<()> {
        let attachment = self.layout.attachment(hash, &stream.attachment_name());
        let dump_ctx = ctx
            .clone()
            .with_var("index", &stream.index.to_string())
            .with_var("attachment", &attachment.display().to_string());
        self.invoker.run(&attachment_invocation(), &dump_ctx)?;
        Ok(())
    }
}

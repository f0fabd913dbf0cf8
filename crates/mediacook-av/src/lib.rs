//! # mediacook-av
//!
//! The external tool boundary of mediacook.
//!
//! This crate provides functionality for:
//! - Running external transcoders and optimizers from command templates
//!   ([`ProcessInvoker`], [`Invocation`], [`TemplateContext`])
//! - Discovering the tools the recipes need ([`check_tools`])
//! - Probing containers for video, audio, subtitle, and font streams
//!   ([`probe`])
//! - Extracting embedded fonts and subtitles and synthesizing a font
//!   stylesheet ([`StreamClassifier`])
//!
//! ## Example
//!
//! ```no_run
//! use mediacook_av::{probe_streams, ProcessInvoker};
//!
//! let invoker = ProcessInvoker::default();
//! let meta = probe_streams(&invoker, "/path/to/video.mkv")?;
//! println!("video: {}, fonts: {}", meta.has_video, meta.has_fonts);
//! # Ok::<(), mediacook_av::Error>(())
//! ```

mod error;
pub mod fonts;
pub mod invoker;
pub mod probe;
pub mod streams;
pub mod template;
pub mod tools;

// Re-exports
pub use error::{Error, Result};
pub use fonts::{FontFace, FontMetadata, FontStyle};
pub use invoker::{
    CommandRunner, Invocation, InvocationOutput, ProcessInvoker, RawOutput, SystemRunner,
};
pub use probe::{ProbedMetadata, StreamDescriptor, StreamKind};
pub use streams::{subtitle_extension, Classification, StreamClassifier};
pub use template::TemplateContext;
pub use tools::{check_tool, check_tools, Tool, ToolInfo, ToolPaths};

/// Probe the streams of a media file with ffprobe.
///
/// # Example
///
/// ```no_run
/// use mediacook_av::{probe_streams, ProcessInvoker};
///
/// let meta = probe_streams(&ProcessInvoker::default(), "/path/to/video.mkv")?;
/// for stream in meta.fonts() {
///     println!("font attachment: {}", stream.attachment_name());
/// }
/// # Ok::<(), mediacook_av::Error>(())
/// ```
pub fn probe_streams<P: AsRef<std::path::Path>>(
    invoker: &ProcessInvoker,
    path: P,
) -> Result<ProbedMetadata> {
    probe::probe_with_ffprobe(invoker, path.as_ref())
}

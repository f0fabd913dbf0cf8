//! External tool detection and management.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// The external binaries recipes invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Video/audio transcoder.
    Ffmpeg,
    /// Stream inspector used to build probed metadata.
    Ffprobe,
    /// ImageMagick raster converter.
    Convert,
    /// Lossless PNG optimizer.
    Optipng,
    /// JPEG metadata stripper.
    Jhead,
    /// XML/SVG normalizer.
    Tidy,
    /// Font metadata probe (lcdf-typetools).
    Otfinfo,
}

impl Tool {
    /// Every tool, in the order `check-tools` reports them.
    pub const ALL: [Tool; 7] = [
        Tool::Ffmpeg,
        Tool::Ffprobe,
        Tool::Convert,
        Tool::Optipng,
        Tool::Jhead,
        Tool::Tidy,
        Tool::Otfinfo,
    ];

    /// Executable name looked up on `PATH`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Ffprobe => "ffprobe",
            Self::Convert => "convert",
            Self::Optipng => "optipng",
            Self::Jhead => "jhead",
            Self::Tidy => "tidy",
            Self::Otfinfo => "otfinfo",
        }
    }

    /// Argument that makes the tool print its version and exit zero.
    fn version_arg(&self) -> &'static str {
        match self {
            Self::Ffmpeg | Self::Ffprobe | Self::Convert => "-version",
            Self::Optipng => "-v",
            Self::Jhead => "-V",
            Self::Tidy => "-v",
            Self::Otfinfo => "--version",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved executable paths, with optional per-tool overrides.
///
/// Tools without an override are spawned by name and found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct ToolPaths {
    overrides: HashMap<Tool, PathBuf>,
}

impl ToolPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit executable for a tool.
    pub fn with_path(mut self, tool: Tool, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(tool, path.into());
        self
    }

    /// Program to spawn for a tool.
    pub fn program(&self, tool: Tool) -> PathBuf {
        self.overrides
            .get(&tool)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(tool.name()))
    }
}

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use mediacook_av::{check_tool, Tool, ToolPaths};
///
/// let info = check_tool(Tool::Ffmpeg, &ToolPaths::new());
/// if info.available {
///     println!("ffmpeg version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(tool: Tool, paths: &ToolPaths) -> ToolInfo {
    let program = paths.program(tool);
    let result = Command::new(&program).arg(tool.version_arg()).output();

    match result {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Some tools print their banner on stderr.
            let version = stdout
                .lines()
                .chain(stderr.lines())
                .find(|line| !line.trim().is_empty())
                .map(|s| s.trim().to_string());

            ToolInfo {
                name: tool.name().to_string(),
                available: true,
                version,
                path: which::which(&program).ok(),
            }
        }
        _ => ToolInfo {
            name: tool.name().to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check every tool the recipes depend on.
pub fn check_tools(paths: &ToolPaths) -> Vec<ToolInfo> {
    Tool::ALL.iter().map(|tool| check_tool(*tool, paths)).collect()
}

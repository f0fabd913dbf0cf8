//! Storage layout and extension resolution.
//!
//! Artifacts live flat under a storage root and are named from the object
//! hash:
//!
//! - `<hash>.<ext>` for every output, including the baseline copy
//! - `<hash>_attachment_<name>` for extracted font attachments
//! - `<hash>_fonts.css` for the synthesized font stylesheet

use std::path::{Path, PathBuf};

use crate::{ContentKey, ObjectHash};

/// Known content types and their canonical file extensions.
const CONTENT_TYPE_EXTENSIONS: &[(&str, &str)] = &[
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
    ("video/ogg", "ogv"),
    ("video/x-matroska", "mkv"),
    ("video/quicktime", "mov"),
    ("video/x-msvideo", "avi"),
    ("video/x-flv", "flv"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("audio/flac", "flac"),
    ("audio/x-flac", "flac"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/mp4", "m4a"),
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("image/webp", "webp"),
    ("image/tiff", "tiff"),
];

/// Whether an artifact exists on disk, and how large it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    /// The artifact exists.
    Present { size: u64 },
    /// The artifact has not been produced (yet).
    Absent,
}

impl ArtifactState {
    /// Stat a path, mapping "does not exist" to [`ArtifactState::Absent`].
    ///
    /// Any other I/O failure is returned as an error.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        match path.try_exists()? {
            false => Ok(Self::Absent),
            true => Ok(Self::Present {
                size: std::fs::metadata(path)?.len(),
            }),
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }
}

/// Deterministic artifact paths under a storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The canonical output stem (`<root>/<hash>`), without extension.
    #[must_use]
    pub fn stem(&self, hash: &ObjectHash) -> PathBuf {
        self.root.join(hash.as_str())
    }

    /// Path of the artifact with the given extension.
    #[must_use]
    pub fn artifact(&self, hash: &ObjectHash, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", hash, extension))
    }

    /// File name (relative to the root) of an extracted attachment.
    #[must_use]
    pub fn attachment_name(hash: &ObjectHash, name: &str) -> String {
        format!("{}_attachment_{}", hash, sanitize_component(name))
    }

    /// Path of an extracted attachment.
    #[must_use]
    pub fn attachment(&self, hash: &ObjectHash, name: &str) -> PathBuf {
        self.root.join(Self::attachment_name(hash, name))
    }

    /// Path of the font stylesheet synthesized for a video.
    #[must_use]
    pub fn font_stylesheet(&self, hash: &ObjectHash) -> PathBuf {
        self.root.join(format!("{}_fonts.css", hash))
    }

    /// Check whether the artifact with the given extension exists.
    pub fn artifact_state(
        &self,
        hash: &ObjectHash,
        extension: &str,
    ) -> std::io::Result<ArtifactState> {
        ArtifactState::of(&self.artifact(hash, extension))
    }
}

/// Replace characters that would escape the storage root.
fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Resolve the file extension an original should be stored under.
///
/// Known content types map to their canonical extension; otherwise the
/// input file's own extension is used, lowercased.
///
/// # Examples
///
/// ```
/// use mediacook_common::paths::resolve_extension;
/// use mediacook_common::ContentKey;
/// use std::path::Path;
///
/// let ext = resolve_extension(&ContentKey::new("image/jpeg"), Path::new("upload"));
/// assert_eq!(ext.as_deref(), Some("jpg"));
///
/// let ext = resolve_extension(&ContentKey::new("video"), Path::new("clip.MKV"));
/// assert_eq!(ext.as_deref(), Some("mkv"));
/// ```
pub fn resolve_extension(content_key: &ContentKey, input: &Path) -> Option<String> {
    CONTENT_TYPE_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == content_key.as_str())
        .map(|(_, ext)| (*ext).to_string())
        .or_else(|| {
            input
                .extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| !ext.is_empty())
                .map(|ext| ext.to_ascii_lowercase())
        })
}

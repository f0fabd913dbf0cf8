//! Core type definitions shared between the pipeline and its collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::ObjectHash;

/// Content-type key used to select a recipe (e.g. `"image/png"` or `"video"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    /// Create a content key. Keys are compared case-insensitively, so they
    /// are stored lowercased and trimmed.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_ascii_lowercase())
    }

    /// The full key as given (e.g. `"image/png"`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The major type (e.g. `"image"` for `"image/png"`).
    ///
    /// A key without a `/` is its own major type.
    #[must_use]
    pub fn major(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An uploaded object as seen by the processing pipeline.
///
/// The object store owns the record; the pipeline only reads these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaObject {
    /// Content-addressed identifier.
    pub hash: ObjectHash,
    /// Content-type key used for recipe selection.
    pub content_key: ContentKey,
    /// Filesystem path of the uploaded original.
    pub input_path: PathBuf,
}

impl MediaObject {
    pub fn new(hash: ObjectHash, content_key: ContentKey, input_path: impl Into<PathBuf>) -> Self {
        Self {
            hash,
            content_key,
            input_path: input_path.into(),
        }
    }
}

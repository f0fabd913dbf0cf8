//! Content-addressed object identifiers.
//!
//! Every artifact an object produces is named after its [`ObjectHash`], so
//! two objects can only share a path if they share content.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::{Error, Result};

/// Number of encoded characters kept from the digest.
pub const HASH_LENGTH: usize = 12;

/// Content-addressed identifier of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectHash(String);

impl ObjectHash {
    /// Parse a hash received from a collaborator.
    ///
    /// Only URL-safe base64 characters are accepted, which keeps the hash
    /// usable as a single path component.
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::invalid_input("object hash is empty"));
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(Error::invalid_input(format!(
                "object hash {value:?} contains invalid character {c:?}"
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// Derive the hash of a file from its contents.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediacook_common::ObjectHash;
    ///
    /// let hash = ObjectHash::from_file("/tmp/upload.mkv")?;
    /// assert_eq!(hash.as_str().len(), 12);
    /// # Ok::<(), mediacook_common::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher)?;
        Ok(Self::from_digest(&hasher.finalize()))
    }

    /// Derive the hash of an in-memory buffer.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_digest(&Sha256::digest(data))
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut encoded = URL_SAFE_NO_PAD.encode(digest);
        encoded.truncate(HASH_LENGTH);
        Self(encoded)
    }

    /// Borrow the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectHash {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ObjectHash> for String {
    fn from(hash: ObjectHash) -> Self {
        hash.0
    }
}

impl std::str::FromStr for ObjectHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

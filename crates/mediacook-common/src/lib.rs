//! Mediacook-Common: Shared identifiers, storage layout, and utilities.
//!
//! This crate provides common functionality used across mediacook:
//!
//! - **Object hashes**: The content-addressed [`ObjectHash`] that namespaces
//!   every artifact belonging to one uploaded object
//! - **Storage layout**: Deterministic artifact paths under a storage root
//! - **Content types**: Content key parsing and content-type to extension
//!   resolution
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use mediacook_common::{ObjectHash, StorageLayout};
//! use std::path::Path;
//!
//! let layout = StorageLayout::new("/srv/storage");
//! let hash = ObjectHash::parse("LxqXxVPAvqqB").unwrap();
//!
//! assert_eq!(
//!     layout.artifact(&hash, "mp4"),
//!     Path::new("/srv/storage/LxqXxVPAvqqB.mp4")
//! );
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::ObjectHash;
pub use paths::{ArtifactState, StorageLayout};
pub use types::{ContentKey, MediaObject};

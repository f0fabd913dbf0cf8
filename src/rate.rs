//! Compression rate of an object's derived artifacts.

use crate::recipe::Recipe;
use anyhow::{Context, Result};
use mediacook_common::{ArtifactState, ObjectHash, StorageLayout};
use std::path::Path;

/// Ratio of the original's size to its smallest existing output.
///
/// The result is rounded to two decimals; `1.0` means no output so far is
/// smaller than the original. Zero-byte sizes are ignored since they cannot
/// be a meaningful encoding, and a zero-byte original rates `0.0`.
///
/// # Example
///
/// ```
/// use mediacook::rate::compression_ratio;
///
/// assert_eq!(compression_ratio(10_000_000, &[4_000_000, 6_000_000]), 2.5);
/// assert_eq!(compression_ratio(500_000, &[]), 1.0);
/// ```
pub fn compression_ratio(original_size: u64, output_sizes: &[u64]) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let smallest = output_sizes
        .iter()
        .copied()
        .filter(|size| *size > 0)
        .fold(original_size, u64::min);
    let ratio = original_size as f64 / smallest as f64;
    (ratio * 100.0).round() / 100.0
}

/// Computes compression rates from the artifacts present on disk.
#[derive(Debug, Clone)]
pub struct CompressionRateCalculator {
    layout: StorageLayout,
}

impl CompressionRateCalculator {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Rate `recipe`'s outputs for `hash` against the file at `original`.
    ///
    /// `original` should be the uploaded file rather than the stored copy,
    /// which in-place steps (PNG optimization) may already have rewritten.
    ///
    /// The default recipe always rates `0.0` and nothing is read. Outputs
    /// that do not exist yet are skipped.
    pub fn rate(&self, original: &Path, hash: &ObjectHash, recipe: Recipe) -> Result<f64> {
        if recipe.is_default() {
            return Ok(0.0);
        }

        let original_size = std::fs::metadata(original)
            .with_context(|| format!("Failed to stat original: {:?}", original))?
            .len();

        let mut sizes = Vec::with_capacity(recipe.outputs().len());
        for extension in recipe.outputs() {
            let path = self.layout.artifact(hash, extension);
            match ArtifactState::of(&path)
                .with_context(|| format!("Failed to stat artifact: {:?}", path))?
            {
                ArtifactState::Present { size } => sizes.push(size),
                ArtifactState::Absent => {
                    tracing::debug!("{}: .{} not produced yet, skipping", hash, extension);
                }
            }
        }

        Ok(compression_ratio(original_size, &sizes))
    }
}

//! Compression rate tests
//!
//! Builds artifact sets on disk (sparse files) and checks the rate reported
//! for them, including the end-to-end scenarios of a processed video and PNG.

mod common;

use common::{hash, invoker, job, write_sized, FakeRunner};
use mediacook::rate::{compression_ratio, CompressionRateCalculator};
use mediacook::recipe::{Recipe, RecipeRegistry, RecipeRunner};
use mediacook_av::ProbedMetadata;
use mediacook_common::{ContentKey, StorageLayout};
use std::sync::Arc;
use tempfile::tempdir;

const MB: u64 = 1024 * 1024;

#[test]
fn test_processed_video_rate() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("upload.mkv");
    write_sized(&input, 10 * MB);
    let layout = StorageLayout::new(dir.path().join("storage"));

    let fake = Arc::new(
        FakeRunner::new()
            .with_output_size("png", 200 * 1024)
            .with_output_size("mp4", 4 * MB)
            .with_output_size("webm", 5 * MB),
    );
    let h = hash("VideoRate001");
    let probe = ProbedMetadata {
        has_video: true,
        has_audio: true,
        ..Default::default()
    };
    let job = job(&input, &h, "video", Recipe::Video, "mkv").with_probe(probe);
    RecipeRunner::new(invoker(&fake), layout.clone())
        .run_sync(&job)
        .unwrap();

    for ext in ["png", "mp4", "webm", "mkv"] {
        assert!(layout.artifact(&h, ext).exists(), "{ext}");
    }

    // The poster is an extra output and does not count; ogv is not there yet.
    let rate = CompressionRateCalculator::new(layout)
        .rate(&input, &h, Recipe::Video)
        .unwrap();
    assert_eq!(rate, 2.5);
}

#[test]
fn test_optimized_png_rate() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("upload.png");
    write_sized(&input, 500_000);
    let layout = StorageLayout::new(dir.path().join("storage"));

    let fake = Arc::new(FakeRunner::new().with_output_size("png", 300_000));
    let h = hash("PngRate00001");
    let job = job(&input, &h, "image/png", Recipe::Png, "png");
    let runner = RecipeRunner::new(invoker(&fake), layout.clone());
    let calculator = CompressionRateCalculator::new(layout);

    runner.run_sync(&job).unwrap();
    assert_eq!(calculator.rate(&input, &h, Recipe::Png).unwrap(), 1.0);

    runner.run_async(&job).unwrap();
    assert_eq!(calculator.rate(&input, &h, Recipe::Png).unwrap(), 1.67);
}

#[test]
fn test_unrecognized_type_rates_zero() {
    let dir = tempdir().unwrap();
    let layout = StorageLayout::new(dir.path());
    let recipe = RecipeRegistry::default().resolve(&ContentKey::new("model/stl"));
    assert_eq!(recipe, Recipe::Default);
    assert!(recipe.async_steps(&ProbedMetadata::default()).is_empty());

    // Nothing is read for the default recipe, not even the original.
    let rate = CompressionRateCalculator::new(layout)
        .rate(&dir.path().join("missing.stl"), &hash("Model0000001"), recipe)
        .unwrap();
    assert_eq!(rate, 0.0);
}

#[test]
fn test_no_outputs_yet_rates_one() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("song.flac");
    write_sized(&input, 12_345);

    let rate = CompressionRateCalculator::new(StorageLayout::new(dir.path()))
        .rate(&input, &hash("AudioRate001"), Recipe::Audio)
        .unwrap();
    assert_eq!(rate, 1.0);
}

#[test]
fn test_rate_matches_formula_for_any_subset() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("clip");
    let original = 9_000_000;
    write_sized(&input, original);
    let layout = StorageLayout::new(dir.path());
    let calculator = CompressionRateCalculator::new(layout.clone());
    let h = hash("Subsets00001");

    let sizes = [("mp4", 3_100_000u64), ("webm", 2_700_000), ("ogv", 12_000_000)];
    for mask in 0..8u32 {
        let mut present = Vec::new();
        for (bit, (ext, size)) in sizes.iter().enumerate() {
            let path = layout.artifact(&h, ext);
            if mask & (1 << bit) != 0 {
                write_sized(&path, *size);
                present.push(*size);
            } else if path.exists() {
                std::fs::remove_file(&path).unwrap();
            }
        }

        let expected = compression_ratio(original, &present);
        let actual = calculator.rate(&input, &h, Recipe::Video).unwrap();
        assert_eq!(actual, expected, "mask {mask:03b}");

        let smallest = present.iter().copied().fold(original, u64::min);
        let formula = ((original as f64 / smallest as f64) * 100.0).round() / 100.0;
        assert_eq!(actual, formula, "mask {mask:03b}");
    }
}

#[test]
fn test_missing_original_is_an_error() {
    let dir = tempdir().unwrap();
    let err = CompressionRateCalculator::new(StorageLayout::new(dir.path()))
        .rate(&dir.path().join("gone"), &hash("Gone00000001"), Recipe::Image)
        .unwrap_err();
    assert!(err.to_string().contains("Failed to stat original"));
}

//! Recipe execution tests
//!
//! Runs each recipe's phases through a fake runner and checks the exact
//! command lines, their order, and fail-fast behaviour.

mod common;

use assert_matches::assert_matches;
use common::{hash, invoker, job, write_sized, FakeRunner};
use mediacook::recipe::{Recipe, RecipeRunner};
use mediacook_av::{ProbedMetadata, StreamDescriptor, StreamKind};
use mediacook_common::StorageLayout;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

struct Fixture {
    _dir: TempDir,
    input: PathBuf,
    storage: PathBuf,
}

impl Fixture {
    fn new(size: u64) -> Self {
        let dir = tempdir().unwrap();
        let input = dir.path().join("upload");
        write_sized(&input, size);
        let storage = dir.path().join("storage");
        Self {
            _dir: dir,
            input,
            storage,
        }
    }

    fn runner(&self, fake: &Arc<FakeRunner>) -> RecipeRunner {
        RecipeRunner::new(invoker(fake), StorageLayout::new(&self.storage))
    }

    fn stem(&self, h: &str) -> String {
        self.storage.join(h).display().to_string()
    }
}

fn av_probe(has_video: bool, has_audio: bool) -> ProbedMetadata {
    ProbedMetadata::new(has_video, has_audio, Vec::new())
}

#[test]
fn test_video_sync_commands() {
    let fx = Fixture::new(1000);
    let fake = Arc::new(FakeRunner::new());
    let h = hash("VideoHash001");
    let job = job(&fx.input, &h, "video/x-matroska", Recipe::Video, "mkv")
        .with_probe(av_probe(true, true));

    fx.runner(&fake).run_sync(&job).unwrap();

    let input = fx.input.display();
    let stem = fx.stem("VideoHash001");
    assert_eq!(
        fake.commands(),
        vec![
            format!("ffmpeg -y -i {input} -vframes 1 -map 0:v:0 {stem}.png"),
            format!(
                "ffmpeg -y -i {input} -vcodec libx264 -pix_fmt yuv420p \
                 -vf scale=trunc(in_w/2)*2:trunc(in_h/2)*2 -map 0:v:0 -map 0:a:0 {stem}.mp4"
            ),
            format!(
                "ffmpeg -y -i {input} -c:v libvpx -c:a libvorbis -pix_fmt yuv420p \
                 -quality good -b:v 2M -crf 5 -map 0:v:0 -map 0:a:0 {stem}.webm"
            ),
        ]
    );

    // The baseline copy is made natively, before any tool runs.
    assert_eq!(
        std::fs::metadata(fx.storage.join("VideoHash001.mkv")).unwrap().len(),
        1000
    );
}

#[test]
fn test_audio_only_video_skips_poster_and_video_map() {
    let fx = Fixture::new(10);
    let fake = Arc::new(FakeRunner::new());
    let h = hash("AudioOnly001");
    let job = job(&fx.input, &h, "video", Recipe::Video, "mka").with_probe(av_probe(false, true));

    fx.runner(&fake).run_sync(&job).unwrap();

    let commands = fake.commands();
    assert_eq!(commands.len(), 2);
    assert!(commands.iter().all(|c| !c.contains("0:v:0")));
    assert!(commands.iter().all(|c| c.contains("-map 0:a:0")));
    assert!(!commands.iter().any(|c| c.ends_with(".png")));
}

#[test]
fn test_video_async_encodes_ogv_then_writes_stylesheet() {
    let fx = Fixture::new(10);
    let fake = Arc::new(FakeRunner::new());
    let h = hash("VideoHash002");
    let job = job(&fx.input, &h, "video", Recipe::Video, "mp4").with_probe(av_probe(true, false));
    let runner = fx.runner(&fake);

    runner.run_sync(&job).unwrap();
    let before = fake.calls().len();
    runner.run_async(&job).unwrap();

    let commands = fake.commands();
    assert_eq!(commands.len(), before + 1);
    assert_eq!(
        commands[before],
        format!(
            "ffmpeg -y -i {} -q 5 -pix_fmt yuv420p -acodec libvorbis -vcodec libtheora -map 0:v:0 {}.ogv",
            fx.input.display(),
            fx.stem("VideoHash002")
        )
    );

    let css = fx.storage.join("VideoHash002_fonts.css");
    assert_eq!(std::fs::read_to_string(css).unwrap(), "");
}

#[test]
fn test_video_async_extracts_subtitles_and_fonts() {
    let fx = Fixture::new(10);
    let fake = Arc::new(FakeRunner::new());
    let h = hash("VideoHash003");
    let probe = ProbedMetadata::new(
        true,
        true,
        vec![
            StreamDescriptor::new(0, StreamKind::Other).with_codec("h264"),
            StreamDescriptor::new(1, StreamKind::Subtitle).with_codec("ssa"),
            StreamDescriptor::new(2, StreamKind::Font)
                .with_codec("ttf")
                .with_filename("Font.ttf"),
        ],
    );
    let job = job(&fx.input, &h, "video", Recipe::Video, "mkv").with_probe(probe);
    let runner = fx.runner(&fake);

    runner.run_sync(&job).unwrap();
    runner.run_async(&job).unwrap();

    let input = fx.input.display();
    let stem = fx.stem("VideoHash003");
    let commands = fake.commands();
    assert_eq!(
        commands[commands.len() - 3..],
        [
            format!("ffmpeg -y -i {input} -map 0:s:0 {stem}.ass"),
            format!("ffmpeg -y -dump_attachment:2 {stem}_attachment_Font.ttf -i {input}"),
            format!("otfinfo --info {stem}_attachment_Font.ttf"),
        ]
    );

    let css = std::fs::read_to_string(fx.storage.join("VideoHash003_fonts.css")).unwrap();
    assert_eq!(
        css,
        "@font-face{font-family: \"\";src:url(\"/VideoHash003_attachment_Font.ttf\");}"
    );
}

#[test]
fn test_audio_phases() {
    let fx = Fixture::new(10);
    let fake = Arc::new(FakeRunner::new());
    let h = hash("AudioHash001");
    let job = job(&fx.input, &h, "audio/flac", Recipe::Audio, "flac");
    let runner = fx.runner(&fake);

    runner.run_sync(&job).unwrap();
    runner.run_async(&job).unwrap();

    let input = fx.input.display();
    let stem = fx.stem("AudioHash001");
    assert_eq!(
        fake.commands(),
        vec![
            format!("ffmpeg -y -i {input} -acodec libmp3lame -q:a 0 -map 0:a:0 {stem}.mp3"),
            format!("ffmpeg -y -i {input} -acodec libvorbis -q:a 10 -map 0:a:0 {stem}.ogg"),
        ]
    );
}

#[test]
fn test_image_recipes() {
    let fx = Fixture::new(10);
    let fake = Arc::new(FakeRunner::new());
    let runner = fx.runner(&fake);

    let gif = hash("ImageHash001");
    runner
        .run_sync(&job(&fx.input, &gif, "image/gif", Recipe::Image, "gif"))
        .unwrap();

    let png = hash("ImageHash002");
    let png_job = job(&fx.input, &png, "image/png", Recipe::Png, "png");
    runner.run_sync(&png_job).unwrap();
    assert_eq!(fake.calls().len(), 1, "png sync is a bare copy");
    runner.run_async(&png_job).unwrap();

    let jpg = hash("ImageHash003");
    runner
        .run_sync(&job(&fx.input, &jpg, "image/jpeg", Recipe::Jpeg, "jpg"))
        .unwrap();

    let svg = hash("ImageHash004");
    runner
        .run_sync(&job(&fx.input, &svg, "image/svg+xml", Recipe::Svg, "svg"))
        .unwrap();

    assert_eq!(
        fake.commands(),
        vec![
            format!("convert {} {}.png", fx.input.display(), fx.stem("ImageHash001")),
            format!("optipng -o5 {}.png", fx.stem("ImageHash002")),
            format!("jhead -purejpg {}.jpg", fx.stem("ImageHash003")),
            format!(
                "tidy -asxml -xml --hide-comments 1 --wrap 0 --quiet --write-back 1 {}.svg",
                fx.stem("ImageHash004")
            ),
        ]
    );

    // In-place steps work on the stored copy, never on the upload.
    for c in fake.commands().iter().skip(1) {
        assert!(!c.contains(&fx.input.display().to_string()), "{c}");
    }
}

#[test]
fn test_failure_aborts_rest_of_phase() {
    let fx = Fixture::new(10);
    let fake = Arc::new(FakeRunner::new().failing_on(".mp4"));
    let h = hash("FailHash0001");
    let job = job(&fx.input, &h, "video", Recipe::Video, "avi").with_probe(av_probe(true, true));

    let err = fx.runner(&fake).run_sync(&job).unwrap_err();

    assert_matches!(
        err.downcast_ref::<mediacook_av::Error>(),
        Some(mediacook_av::Error::ProcessFailed {
            tool,
            exit_code: Some(1),
            ..
        }) if tool == "ffmpeg"
    );
    assert!(format!("{:#}", err).contains("step 3 (ffmpeg)"));

    // poster and mp4 ran, webm never did.
    let commands = fake.commands();
    assert_eq!(commands.len(), 2);
    assert!(commands.iter().all(|c| !c.ends_with(".webm")));

    // Outputs produced before the failure stay.
    assert!(fx.storage.join("FailHash0001.avi").exists());
}

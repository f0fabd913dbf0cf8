//! Command tables for every recipe.
//!
//! The flags here decide which codecs and containers end up in the browser,
//! so they are kept exactly as the players downstream expect them.

use mediacook_av::{Invocation, ProbedMetadata, Tool};

/// Stream selection shared by every video encode: the first video track
/// and the first audio track, each only if the probe found one.
pub fn stream_maps(probe: &ProbedMetadata) -> Vec<&'static str> {
    let mut maps = Vec::with_capacity(4);
    if probe.has_video {
        maps.extend(["-map", "0:v:0"]);
    }
    if probe.has_audio {
        maps.extend(["-map", "0:a:0"]);
    }
    maps
}

/// Single poster frame from the first video track.
pub fn poster_frame() -> Invocation {
    Invocation::new(Tool::Ffmpeg).args([
        "-y",
        "-i",
        "{input}",
        "-vframes",
        "1",
        "-map",
        "0:v:0",
        "{stem}.png",
    ])
}

/// H.264/yuv420p MP4. Dimensions are rounded down to even numbers, which
/// libx264 requires for 4:2:0 chroma.
pub fn mp4(probe: &ProbedMetadata) -> Invocation {
    Invocation::new(Tool::Ffmpeg)
        .args([
            "-y",
            "-i",
            "{input}",
            "-vcodec",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-vf",
            "scale=trunc(in_w/2)*2:trunc(in_h/2)*2",
        ])
        .args(stream_maps(probe))
        .arg("{stem}.mp4")
}

/// VP8/Vorbis WebM.
pub fn webm(probe: &ProbedMetadata) -> Invocation {
    Invocation::new(Tool::Ffmpeg)
        .args([
            "-y",
            "-i",
            "{input}",
            "-c:v",
            "libvpx",
            "-c:a",
            "libvorbis",
            "-pix_fmt",
            "yuv420p",
            "-quality",
            "good",
            "-b:v",
            "2M",
            "-crf",
            "5",
        ])
        .args(stream_maps(probe))
        .arg("{stem}.webm")
}

/// Theora/Vorbis OGV.
pub fn ogv(probe: &ProbedMetadata) -> Invocation {
    Invocation::new(Tool::Ffmpeg)
        .args([
            "-y",
            "-i",
            "{input}",
            "-q",
            "5",
            "-pix_fmt",
            "yuv420p",
            "-acodec",
            "libvorbis",
            "-vcodec",
            "libtheora",
        ])
        .args(stream_maps(probe))
        .arg("{stem}.ogv")
}

pub fn mp3() -> Invocation {
    Invocation::new(Tool::Ffmpeg).args([
        "-y",
        "-i",
        "{input}",
        "-acodec",
        "libmp3lame",
        "-q:a",
        "0",
        "-map",
        "0:a:0",
        "{stem}.mp3",
    ])
}

pub fn ogg() -> Invocation {
    Invocation::new(Tool::Ffmpeg).args([
        "-y",
        "-i",
        "{input}",
        "-acodec",
        "libvorbis",
        "-q:a",
        "10",
        "-map",
        "0:a:0",
        "{stem}.ogg",
    ])
}

/// Generic raster conversion to PNG.
pub fn convert_png() -> Invocation {
    Invocation::new(Tool::Convert).args(["{input}", "{stem}.png"])
}

/// Lossless re-optimization of the stored PNG, in place.
pub fn optipng() -> Invocation {
    Invocation::new(Tool::Optipng).args(["-o5", "{stem}.png"])
}

/// Drop everything but the image data from the stored JPEG, in place.
pub fn jhead_strip() -> Invocation {
    Invocation::new(Tool::Jhead).args(["-purejpg", "{stem}.{extension}"])
}

/// Normalize the stored SVG as XML and drop comments, in place.
pub fn tidy_svg() -> Invocation {
    Invocation::new(Tool::Tidy).args([
        "-asxml",
        "-xml",
        "--hide-comments",
        "1",
        "--wrap",
        "0",
        "--quiet",
        "--write-back",
        "1",
        "{stem}.{extension}",
    ])
}

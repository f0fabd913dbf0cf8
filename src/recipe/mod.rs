//! Per-content-type processing recipes.
//!
//! A [`Recipe`] is a closed set of variants, each a fixed pair of step lists:
//! a mandatory `sync` phase that always starts with a verbatim copy of the
//! original, and a best-effort `async` phase that may only run after `sync`
//! finished for the same object.

pub mod commands;
mod registry;
mod runner;

pub use registry::RecipeRegistry;
pub use runner::{Job, PhaseReport, RecipeRunner};

use mediacook_av::{Invocation, ProbedMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One content-type class and the steps that process it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipe {
    Video,
    Audio,
    Image,
    Png,
    Jpeg,
    Svg,
    /// Bare copy, no outputs, no async phase.
    Default,
}

/// Which half of a recipe is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Sync,
    Async,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::Async => f.write_str("async"),
        }
    }
}

/// A single step of a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Copy the original to `{stem}.{extension}`.
    CopyOriginal,
    /// Run an external tool.
    Run(Invocation),
    /// Extract font attachments and subtitle tracks and write the font
    /// stylesheet.
    ClassifyStreams,
}

impl Recipe {
    pub const ALL: [Recipe; 7] = [
        Recipe::Video,
        Recipe::Audio,
        Recipe::Image,
        Recipe::Png,
        Recipe::Jpeg,
        Recipe::Svg,
        Recipe::Default,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Svg => "svg",
            Self::Default => "default",
        }
    }

    /// Advisory upper bound for the sync phase. Nothing inside the recipe
    /// enforces it; the scheduler only warns on overrun.
    #[must_use]
    pub fn time_budget(&self) -> Duration {
        let secs = match self {
            Self::Video => 6000,
            Self::Audio => 300,
            Self::Image => 60,
            Self::Png => 120,
            Self::Jpeg | Self::Svg | Self::Default => 5,
        };
        Duration::from_secs(secs)
    }

    /// Extensions this recipe may produce, in preference order.
    ///
    /// A listed extension whose file is missing has simply not been produced
    /// yet.
    #[must_use]
    pub fn outputs(&self) -> &'static [&'static str] {
        match self {
            Self::Video => &["mp4", "webm", "ogv"],
            Self::Audio => &["mp3", "ogg"],
            Self::Image | Self::Png => &["png"],
            Self::Jpeg | Self::Svg | Self::Default => &[],
        }
    }

    /// Auxiliary artifacts that are not alternative encodings of the
    /// original (the video poster frame).
    #[must_use]
    pub fn extra_outputs(&self) -> &'static [&'static str] {
        match self {
            Self::Video => &["png"],
            _ => &[],
        }
    }

    #[must_use]
    pub fn has_async_phase(&self) -> bool {
        matches!(self, Self::Video | Self::Audio | Self::Png)
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Steps of a phase, in execution order.
    ///
    /// Only the video recipe looks at `probe`; the others ignore it.
    pub fn steps(&self, phase: Phase, probe: &ProbedMetadata) -> Vec<Step> {
        match phase {
            Phase::Sync => self.sync_steps(probe),
            Phase::Async => self.async_steps(probe),
        }
    }

    pub fn sync_steps(&self, probe: &ProbedMetadata) -> Vec<Step> {
        let mut steps = vec![Step::CopyOriginal];
        match self {
            Self::Video => {
                if probe.has_video {
                    steps.push(Step::Run(commands::poster_frame()));
                }
                steps.push(Step::Run(commands::mp4(probe)));
                steps.push(Step::Run(commands::webm(probe)));
            }
            Self::Audio => steps.push(Step::Run(commands::mp3())),
            Self::Image => steps.push(Step::Run(commands::convert_png())),
            Self::Jpeg => steps.push(Step::Run(commands::jhead_strip())),
            Self::Svg => steps.push(Step::Run(commands::tidy_svg())),
            Self::Png | Self::Default => {}
        }
        steps
    }

    pub fn async_steps(&self, probe: &ProbedMetadata) -> Vec<Step> {
        match self {
            Self::Video => vec![Step::Run(commands::ogv(probe)), Step::ClassifyStreams],
            Self::Audio => vec![Step::Run(commands::ogg())],
            Self::Png => vec![Step::Run(commands::optipng())],
            Self::Image | Self::Jpeg | Self::Svg | Self::Default => Vec::new(),
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Recipe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recipe::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown recipe: {}", s))
    }
}

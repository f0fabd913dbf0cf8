use crate::recipe::{Recipe, RecipeRegistry};
use mediacook_av::{Tool, ToolPaths};
use mediacook_common::StorageLayout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Extra content key to recipe mappings, applied on top of the
    /// standard table (e.g. `"image/gif" = "video"`).
    #[serde(default)]
    pub recipes: BTreeMap<String, Recipe>,
}

impl Config {
    /// Storage layout rooted at the configured (tilde-expanded) root.
    pub fn storage_layout(&self) -> StorageLayout {
        StorageLayout::new(self.storage.expanded_root())
    }

    pub fn tool_paths(&self) -> ToolPaths {
        self.tools.to_tool_paths()
    }

    pub fn registry(&self) -> RecipeRegistry {
        RecipeRegistry::with_overrides(self.recipes.iter().map(|(k, r)| (k.as_str(), *r)))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory all artifacts are written to.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./storage")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

impl StorageConfig {
    pub fn expanded_root(&self) -> PathBuf {
        let raw = self.root.to_string_lossy();
        PathBuf::from(shellexpand::tilde(&raw).into_owned())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    #[serde(default)]
    pub convert_path: Option<PathBuf>,

    #[serde(default)]
    pub optipng_path: Option<PathBuf>,

    #[serde(default)]
    pub jhead_path: Option<PathBuf>,

    #[serde(default)]
    pub tidy_path: Option<PathBuf>,

    #[serde(default)]
    pub otfinfo_path: Option<PathBuf>,
}

impl ToolsConfig {
    pub fn path(&self, tool: Tool) -> Option<&PathBuf> {
        match tool {
            Tool::Ffmpeg => self.ffmpeg_path.as_ref(),
            Tool::Ffprobe => self.ffprobe_path.as_ref(),
            Tool::Convert => self.convert_path.as_ref(),
            Tool::Optipng => self.optipng_path.as_ref(),
            Tool::Jhead => self.jhead_path.as_ref(),
            Tool::Tidy => self.tidy_path.as_ref(),
            Tool::Otfinfo => self.otfinfo_path.as_ref(),
        }
    }

    pub fn to_tool_paths(&self) -> ToolPaths {
        Tool::ALL
            .into_iter()
            .fold(ToolPaths::new(), |paths, tool| match self.path(tool) {
                Some(path) => {
                    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
                    paths.with_path(tool, expanded)
                }
                None => paths,
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessingConfig {
    /// Phases allowed to run at once across all objects (default: 2)
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Log a warning when a sync phase outlives its recipe's time budget
    /// (default: true)
    #[serde(default = "default_enforce_budget_warning")]
    pub enforce_budget_warning: bool,
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_enforce_budget_warning() -> bool {
    true
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            enforce_budget_warning: default_enforce_budget_warning(),
        }
    }
}

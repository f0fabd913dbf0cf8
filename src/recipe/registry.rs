use super::Recipe;
use mediacook_common::ContentKey;
use std::collections::HashMap;

/// Content key to recipe dispatch table.
///
/// Built once at startup and shared read-only afterwards. Resolution never
/// fails: an exact key match wins, then the major type, then
/// [`Recipe::Default`].
#[derive(Debug, Clone)]
pub struct RecipeRegistry {
    table: HashMap<String, Recipe>,
}

impl Default for RecipeRegistry {
    fn default() -> Self {
        Self::empty()
            .with("video", Recipe::Video)
            .with("audio", Recipe::Audio)
            .with("image", Recipe::Image)
            .with("image/png", Recipe::Png)
            .with("image/jpeg", Recipe::Jpeg)
            .with("image/svg+xml", Recipe::Svg)
    }
}

impl RecipeRegistry {
    /// A registry that resolves everything to [`Recipe::Default`].
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// The standard table plus `overrides`, which replace or add entries.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a str, Recipe)>) -> Self {
        let mut registry = Self::default();
        for (key, recipe) in overrides {
            registry.register(key, recipe);
        }
        registry
    }

    /// Map a content key (or major type) to a recipe.
    pub fn register(&mut self, key: impl AsRef<str>, recipe: Recipe) {
        let key = ContentKey::new(key);
        tracing::debug!("registering recipe {} for {}", recipe, key);
        self.table.insert(key.as_str().to_string(), recipe);
    }

    /// Builder form of [`RecipeRegistry::register`].
    pub fn with(mut self, key: impl AsRef<str>, recipe: Recipe) -> Self {
        self.register(key, recipe);
        self
    }

    pub fn resolve(&self, key: &ContentKey) -> Recipe {
        self.table
            .get(key.as_str())
            .or_else(|| self.table.get(key.major()))
            .copied()
            .unwrap_or(Recipe::Default)
    }

    /// Registered entries, sorted by key.
    pub fn entries(&self) -> Vec<(&str, Recipe)> {
        let mut entries: Vec<_> = self
            .table
            .iter()
            .map(|(k, r)| (k.as_str(), *r))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(registry: &RecipeRegistry, key: &str) -> Recipe {
        registry.resolve(&ContentKey::new(key))
    }

    #[test]
    fn test_exact_match_wins_over_major() {
        let registry = RecipeRegistry::default();
        assert_eq!(resolve(&registry, "image/png"), Recipe::Png);
        assert_eq!(resolve(&registry, "image/jpeg"), Recipe::Jpeg);
        assert_eq!(resolve(&registry, "image/svg+xml"), Recipe::Svg);
    }

    #[test]
    fn test_major_type_fallback() {
        let registry = RecipeRegistry::default();
        assert_eq!(resolve(&registry, "image/gif"), Recipe::Image);
        assert_eq!(resolve(&registry, "video/x-matroska"), Recipe::Video);
        assert_eq!(resolve(&registry, "audio/flac"), Recipe::Audio);
        assert_eq!(resolve(&registry, "video"), Recipe::Video);
    }

    #[test]
    fn test_unknown_resolves_to_default() {
        let registry = RecipeRegistry::default();
        for key in ["model/stl", "application/pdf", "", "text"] {
            assert_eq!(resolve(&registry, key), Recipe::Default, "{key:?}");
        }
        assert_eq!(resolve(&RecipeRegistry::empty(), "video"), Recipe::Default);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let registry = RecipeRegistry::default();
        assert_eq!(resolve(&registry, "Image/PNG"), Recipe::Png);
    }

    #[test]
    fn test_overrides() {
        let registry = RecipeRegistry::with_overrides([
            ("image/gif", Recipe::Video),
            ("image/png", Recipe::Image),
        ]);
        assert_eq!(resolve(&registry, "image/gif"), Recipe::Video);
        assert_eq!(resolve(&registry, "image/png"), Recipe::Image);
        assert_eq!(resolve(&registry, "image/jpeg"), Recipe::Jpeg);
    }

    #[test]
    fn test_entries_sorted() {
        let registry = RecipeRegistry::default();
        let entries = registry.entries();
        assert_eq!(entries.first(), Some(&("audio", Recipe::Audio)));
        assert_eq!(entries.len(), 6);
    }
}

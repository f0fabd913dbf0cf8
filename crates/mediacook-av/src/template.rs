//! Placeholder substitution for command templates.

use std::collections::HashMap;
use std::path::Path;

/// Placeholder for the original input file.
pub const INPUT: &str = "input";
/// Placeholder for the canonical output stem (`<storage root>/<hash>`).
pub const STEM: &str = "stem";
/// Placeholder for the original's inferred extension.
pub const EXTENSION: &str = "extension";

/// Variable substitution context for command templates.
///
/// Arguments are written with `{name}` placeholders and resolved against the
/// bound values. Every invocation binds the three fixed placeholders
/// (`{input}`, `{stem}`, `{extension}`); steps that need more (an attachment
/// index, a stream ordinal) add their own with [`TemplateContext::with_var`].
///
/// # Example
///
/// ```
/// use mediacook_av::TemplateContext;
/// use std::path::Path;
///
/// let ctx = TemplateContext::new()
///     .with_bindings(Path::new("/tmp/upload"), Path::new("/srv/abc123"), "mkv")
///     .with_var("n", "0");
///
/// assert_eq!(ctx.substitute("{stem}.{extension}"), "/srv/abc123.mkv");
/// assert_eq!(ctx.substitute("0:s:{n}"), "0:s:0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty template context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the fixed placeholder contract: input path, output stem, and the
    /// original's extension.
    pub fn with_bindings(mut self, input: &Path, stem: &Path, extension: &str) -> Self {
        self.set(INPUT, &input.display().to_string());
        self.set(STEM, &stem.display().to_string());
        self.set(EXTENSION, extension);
        self
    }

    /// Add a custom variable.
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Set a variable.
    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    /// Substitute variables in a string.
    ///
    /// Substitution is single-pass: a bound value is never itself scanned for
    /// placeholders, so paths containing braces survive intact. Unknown
    /// placeholders are left as-is.
    pub fn substitute(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match self.vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push('{');
                            result.push_str(key);
                            result.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Substitute variables in a list of strings.
    pub fn substitute_all(&self, templates: &[String]) -> Vec<String> {
        templates.iter().map(|t| self.substitute(t)).collect()
    }
}

//! Font metadata parsing and `@font-face` stylesheet synthesis.

/// Family and subfamily names reported by `otfinfo --info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontMetadata {
    pub family: Option<String>,
    pub subfamily: Option<String>,
}

impl FontMetadata {
    /// Parse `otfinfo --info` output.
    ///
    /// The first `Family:` and `Subfamily:` lines win. Missing fields stay
    /// `None`; unparsable output is not an error.
    ///
    /// # Example
    ///
    /// ```
    /// use mediacook_av::FontMetadata;
    ///
    /// let meta = FontMetadata::parse(&[
    ///     "Family:              Open Sans",
    ///     "Subfamily:           Bold",
    /// ]);
    /// assert_eq!(meta.family.as_deref(), Some("Open Sans"));
    /// assert_eq!(meta.subfamily.as_deref(), Some("Bold"));
    /// ```
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut meta = Self::default();
        for line in lines {
            let line = line.as_ref();
            if meta.family.is_none() {
                if let Some(value) = line.strip_prefix("Family:") {
                    meta.family = Some(value.trim_matches([' ', '\t']).to_string());
                    continue;
                }
            }
            if meta.subfamily.is_none() {
                if let Some(value) = line.strip_prefix("Subfamily:") {
                    meta.subfamily = Some(value.trim_matches([' ', '\t']).to_string());
                }
            }
        }
        meta
    }
}

/// The weight/style declaration a subfamily maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    SemiBold,
    Bold,
    Italic,
    Regular,
}

impl FontStyle {
    /// Map a subfamily name by substring. `SemiBold` is checked before
    /// `Bold`, which is checked before `Italic`.
    pub fn from_subfamily(subfamily: Option<&str>) -> Self {
        match subfamily {
            Some(s) if s.contains("SemiBold") => Self::SemiBold,
            Some(s) if s.contains("Bold") => Self::Bold,
            Some(s) if s.contains("Italic") => Self::Italic,
            _ => Self::Regular,
        }
    }

    fn declaration(&self) -> &'static str {
        match self {
            Self::SemiBold => "font-weight: 600;",
            Self::Bold => "font-weight: bold;",
            Self::Italic => "font-style: italic;",
            Self::Regular => "",
        }
    }
}

/// One `@font-face` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    /// Family name; empty when the probe reported none.
    pub family: String,
    /// Root-relative URL of the extracted attachment.
    pub url: String,
    pub style: FontStyle,
}

impl FontFace {
    /// Build a rule for an attachment served at `/<file_name>`.
    pub fn new(metadata: &FontMetadata, file_name: &str) -> Self {
        Self {
            family: metadata.family.clone().unwrap_or_default(),
            url: format!("/{file_name}"),
            style: FontStyle::from_subfamily(metadata.subfamily.as_deref()),
        }
    }

    /// Render the rule.
    pub fn to_css(&self) -> String {
        format!(
            "@font-face{{font-family: \"{}\";src:url(\"{}\");{}}}",
            escape_css_string(&self.family),
            escape_css_string(&self.url),
            self.style.declaration()
        )
    }
}

/// Concatenate rules into a stylesheet. Zero rules yield an empty string.
pub fn stylesheet(faces: &[FontFace]) -> String {
    faces.iter().map(FontFace::to_css).collect()
}

fn escape_css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' | '\r' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

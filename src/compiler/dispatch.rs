//! Extension-to-renderer table.
//!
//! Lookup is a two-step process: the lowercased extension is first folded
//! through [`ALIASES`], then looked up in [`RENDERERS`]. Anything not in the
//! table is served raw.

use std::path::Path;

/// Stylesheet source dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleDialect {
    /// Brace syntax (`.scss`)
    Scss,
    /// Indented syntax (`.sass`)
    Sass,
}

/// Which pipeline renders a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// Template engine, output is HTML
    Template,
    /// Stylesheet compiler, output is CSS
    Stylesheet(StyleDialect),
    /// Script validation and optional minification
    Script,
    /// Markdown converted and wrapped in the page shell
    Markdown,
    /// Served as-is but treated as HTML
    Html,
    /// Served as-is with a looked-up content type
    Raw,
}

impl RenderKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Stylesheet(StyleDialect::Scss) => "scss",
            Self::Stylesheet(StyleDialect::Sass) => "sass",
            Self::Script => "script",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Raw => "raw",
        }
    }
}

/// Shorthand extensions and the canonical extension they stand for.
pub const ALIASES: &[(&str, &str)] = &[("md", "markdown"), ("htm", "html")];

/// Canonical extension to renderer.
pub const RENDERERS: &[(&str, RenderKind)] = &[
    ("jinja", RenderKind::Template),
    ("scss", RenderKind::Stylesheet(StyleDialect::Scss)),
    ("sass", RenderKind::Stylesheet(StyleDialect::Sass)),
    ("js", RenderKind::Script),
    ("mjs", RenderKind::Script),
    ("markdown", RenderKind::Markdown),
    ("html", RenderKind::Html),
];

/// Lowercased extension with aliases applied.
pub fn canonical_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == ext)
        .map_or(ext, |(_, target)| (*target).to_string());
    Some(canonical)
}

/// Renderer for `path`.
pub fn kind_for(path: &Path) -> RenderKind {
    let Some(ext) = canonical_extension(path) else {
        return RenderKind::Raw;
    };
    RENDERERS
        .iter()
        .find(|(key, _)| *key == ext)
        .map_or(RenderKind::Raw, |(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_folds_before_lookup() {
        assert_eq!(
            canonical_extension(Path::new("notes.md")).as_deref(),
            Some("markdown")
        );
        assert_eq!(
            canonical_extension(Path::new("old.htm")).as_deref(),
            Some("html")
        );
        assert_eq!(kind_for(Path::new("notes.md")), kind_for(Path::new("notes.markdown")));
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(kind_for(Path::new("README.MD")), RenderKind::Markdown);
        assert_eq!(
            kind_for(Path::new("Theme.SCSS")),
            RenderKind::Stylesheet(StyleDialect::Scss)
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(kind_for(Path::new("page.jinja")), RenderKind::Template);
        assert_eq!(
            kind_for(Path::new("a.sass")),
            RenderKind::Stylesheet(StyleDialect::Sass)
        );
        assert_eq!(kind_for(Path::new("app.js")), RenderKind::Script);
        assert_eq!(kind_for(Path::new("app.mjs")), RenderKind::Script);
        assert_eq!(kind_for(Path::new("index.html")), RenderKind::Html);
    }

    #[test]
    fn test_unknown_is_raw() {
        assert_eq!(kind_for(Path::new("logo.png")), RenderKind::Raw);
        assert_eq!(kind_for(Path::new("plain.css")), RenderKind::Raw);
        assert_eq!(kind_for(Path::new("Makefile")), RenderKind::Raw);
    }

    #[test]
    fn test_aliases_point_into_table() {
        for (alias, target) in ALIASES {
            assert!(
                RENDERERS.iter().any(|(ext, _)| ext == target),
                "alias {alias} -> {target} has no renderer"
            );
        }
    }
}

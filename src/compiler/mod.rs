//! Render dispatcher.
//!
//! Turns a resolved file into response bytes and a content type. The
//! renderer is chosen by extension through [`dispatch::kind_for`]:
//!
//! ```text
//! path --ext--> alias --table--> RenderKind --> RenderResult | RenderError
//! ```
//!
//! Every request either produces a complete [`RenderResult`] or a
//! [`RenderError`]. Nothing is cached between requests.

pub mod dispatch;
mod markdown;
mod script;
mod style;
mod template;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ServeConfig;
use crate::utils::mime::{self, types};
pub use dispatch::{RenderKind, StyleDialect, kind_for};

/// Rendered response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl RenderResult {
    fn text(body: String, content_type: &'static str) -> Self {
        Self {
            bytes: body.into_bytes(),
            content_type,
        }
    }
}

/// A renderer could not produce output for a resolved file.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}` is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    #[error("template error in `{}`\n{message}", path.display())]
    Template { path: PathBuf, message: String },

    #[error("stylesheet error in `{}`\n{message}", path.display())]
    Stylesheet { path: PathBuf, message: String },

    #[error("script error in `{}`\n{message}", path.display())]
    Script { path: PathBuf, message: String },
}

impl RenderError {
    /// File the error belongs to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. }
            | Self::Encoding { path }
            | Self::Template { path, .. }
            | Self::Stylesheet { path, .. }
            | Self::Script { path, .. } => path,
        }
    }
}

/// Render a resolved file.
pub fn render(path: &Path, config: &ServeConfig) -> Result<RenderResult, RenderError> {
    let kind = kind_for(path);
    crate::debug!("render"; "{} via {}", path.display(), kind.label());

    let bytes = fs::read(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match kind {
        RenderKind::Raw => Ok(RenderResult {
            bytes,
            content_type: mime::from_path(path),
        }),
        RenderKind::Html => Ok(RenderResult {
            bytes,
            content_type: types::HTML,
        }),
        RenderKind::Template => {
            let source = into_text(path, bytes)?;
            let html = template::render(path, &source, config)?;
            Ok(RenderResult::text(html, types::HTML))
        }
        RenderKind::Stylesheet(dialect) => {
            let source = into_text(path, bytes)?;
            let css = style::compile(path, source, dialect, config.ugly())?;
            Ok(RenderResult::text(css, types::CSS))
        }
        RenderKind::Script => {
            let source = into_text(path, bytes)?;
            let js = script::bundle(path, &source, config.ugly())?;
            Ok(RenderResult::text(js, types::JAVASCRIPT))
        }
        RenderKind::Markdown => {
            let source = into_text(path, bytes)?;
            Ok(RenderResult::text(
                markdown::render_page(path, &source),
                types::HTML,
            ))
        }
    }
}

fn into_text(path: &Path, bytes: Vec<u8>) -> Result<String, RenderError> {
    String::from_utf8(bytes).map_err(|_| RenderError::Encoding {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(files: &[(&str, &str)]) -> (TempDir, ServeConfig) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            let path = temp.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        let config = ServeConfig::for_root(temp.path()).unwrap();
        (temp, config)
    }

    fn render_file(config: &ServeConfig, name: &str) -> Result<RenderResult, RenderError> {
        render(&config.root.join(name), config)
    }

    fn body(result: &RenderResult) -> &str {
        std::str::from_utf8(&result.bytes).unwrap()
    }

    #[test]
    fn test_html_passthrough() {
        let html = "<html><body><p>hi</p></body></html>";
        let (_temp, config) = setup(&[("index.html", html)]);

        let result = render_file(&config, "index.html").unwrap();
        assert_eq!(result.content_type, types::HTML);
        assert_eq!(body(&result), html);
    }

    #[test]
    fn test_htm_is_html() {
        let (_temp, config) = setup(&[("old.HTM", "<p>old</p>")]);
        let result = render_file(&config, "old.HTM").unwrap();
        assert_eq!(result.content_type, types::HTML);
    }

    #[test]
    fn test_raw_passthrough_keeps_bytes() {
        let (temp, config) = setup(&[]);
        let png = [0x89, b'P', b'N', b'G', 0xff, 0x00];
        fs::write(temp.path().join("logo.png"), png).unwrap();

        let result = render_file(&config, "logo.png").unwrap();
        assert_eq!(result.content_type, types::PNG);
        assert_eq!(result.bytes, png);
    }

    #[test]
    fn test_plain_css_not_compiled() {
        let css = "a{color:red}";
        let (_temp, config) = setup(&[("site.css", css)]);
        let result = render_file(&config, "site.css").unwrap();
        assert_eq!(result.content_type, types::CSS);
        assert_eq!(body(&result), css);
    }

    #[test]
    fn test_scss_compiled() {
        let (_temp, config) = setup(&[("style.scss", "$c: red;\n.a { .b { color: $c; } }\n")]);
        let result = render_file(&config, "style.scss").unwrap();
        assert_eq!(result.content_type, types::CSS);
        assert!(body(&result).contains(".a .b"));
        assert!(body(&result).contains("color: red"));
    }

    #[test]
    fn test_scss_syntax_error_is_failure() {
        let (_temp, config) = setup(&[("broken.scss", ".a { color: red;\n")]);
        let err = render_file(&config, "broken.scss").unwrap_err();
        assert!(matches!(err, RenderError::Stylesheet { .. }));
        assert!(err.path().ends_with("broken.scss"));
    }

    #[test]
    fn test_markdown_page() {
        let (_temp, config) = setup(&[("about.md", "# About\n\nHello *world*.\n")]);
        let result = render_file(&config, "about.md").unwrap();
        assert_eq!(result.content_type, types::HTML);

        let html = body(&result);
        assert!(html.contains("<title>About</title>"));
        assert!(html.contains("<h1>About</h1>"));
        assert!(html.contains("<em>world</em>"));
        assert!(html.contains("</body>"));
    }

    #[test]
    fn test_template_rendered() {
        let (_temp, config) = setup(&[
            ("base.jinja", "<body>{% block main %}{% endblock %}</body>"),
            (
                "page.jinja",
                "{% extends \"base.jinja\" %}{% block main %}{{ 1 + 2 }} {{ path }}{% endblock %}",
            ),
        ]);
        let result = render_file(&config, "page.jinja").unwrap();
        assert_eq!(result.content_type, types::HTML);
        assert_eq!(body(&result), "<body>3 page.jinja</body>");
    }

    #[test]
    fn test_template_error_is_failure() {
        let (_temp, config) = setup(&[("bad.jinja", "{% if %}")]);
        let err = render_file(&config, "bad.jinja").unwrap_err();
        assert!(matches!(err, RenderError::Template { .. }));
    }

    #[test]
    fn test_script_passthrough_when_not_ugly() {
        let js = "export const answer = 40 + 2;\n";
        let (_temp, config) = setup(&[("app.js", js)]);
        let result = render_file(&config, "app.js").unwrap();
        assert_eq!(result.content_type, types::JAVASCRIPT);
        assert_eq!(body(&result), js);
    }

    #[test]
    fn test_script_minified_when_ugly() {
        let js = "function greet(longName) {\n  return 'hi ' + longName;\n}\nconsole.log(greet('x'));\n";
        let (_temp, mut config) = setup(&[("app.js", js)]);
        config.serve.ugly = true;

        let result = render_file(&config, "app.js").unwrap();
        assert!(result.bytes.len() < js.len());
        assert!(!body(&result).contains("longName"));
    }

    #[test]
    fn test_script_syntax_error_is_failure() {
        let (_temp, config) = setup(&[("bad.js", "let = ;")]);
        let err = render_file(&config, "bad.js").unwrap_err();
        assert!(matches!(err, RenderError::Script { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let (_temp, config) = setup(&[]);
        let err = render_file(&config, "gone.html").unwrap_err();
        assert!(matches!(err, RenderError::Read { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let (temp, config) = setup(&[]);
        fs::write(temp.path().join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();
        let err = render_file(&config, "bad.md").unwrap_err();
        assert!(matches!(err, RenderError::Encoding { .. }));
    }
}

//! SCSS and indented Sass compiled with grass.

use std::path::Path;

use grass::{InputSyntax, Options, OutputStyle};

use super::{RenderError, StyleDialect};

pub(super) fn compile(
    path: &Path,
    source: String,
    dialect: StyleDialect,
    ugly: bool,
) -> Result<String, RenderError> {
    let syntax = match dialect {
        StyleDialect::Scss => InputSyntax::Scss,
        StyleDialect::Sass => InputSyntax::Sass,
    };
    let style = if ugly {
        OutputStyle::Compressed
    } else {
        OutputStyle::Expanded
    };

    let mut options = Options::default().input_syntax(syntax).style(style);
    // `@use` / `@import` resolve next to the stylesheet
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }

    grass::from_string(source, &options).map_err(|e| RenderError::Stylesheet {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

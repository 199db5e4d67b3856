//! Script pipeline: parse with oxc, minify when `ugly` is set.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::RenderError;

/// Validate a script and minify it in ugly mode.
///
/// Outside ugly mode a valid script is returned byte-for-byte.
pub(super) fn bundle(path: &Path, source: &str, ugly: bool) -> Result<String, RenderError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());

    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        return Err(RenderError::Script {
            path: path.to_path_buf(),
            message,
        });
    }

    if !ugly {
        return Ok(source.to_string());
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_script_unchanged() {
        let src = "// comment kept\nconst a = 1;\n";
        assert_eq!(bundle(Path::new("a.js"), src, false).unwrap(), src);
    }

    #[test]
    fn test_minify_drops_comments() {
        let src = "// comment dropped\nconst value = 1;\nconsole.log(value);\n";
        let out = bundle(Path::new("a.js"), src, true).unwrap();
        assert!(!out.contains("comment dropped"));
        assert!(out.contains("console.log"));
    }

    #[test]
    fn test_parse_error_reported_even_when_not_ugly() {
        let err = bundle(Path::new("a.js"), "function (", false).unwrap_err();
        assert!(matches!(err, RenderError::Script { .. }));
    }
}

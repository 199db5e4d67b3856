//! Template pages rendered with minijinja.
//!
//! Templates are loaded relative to the served root, so `{% extends %}` and
//! `{% include %}` take root-relative names.

use std::path::{Component, Path};

use minijinja::{AutoEscape, Environment, context};

use super::RenderError;
use crate::config::ServeConfig;

pub(super) fn render(path: &Path, source: &str, config: &ServeConfig) -> Result<String, RenderError> {
    let to_error = |e: minijinja::Error| RenderError::Template {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    };

    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(&config.root));
    env.set_auto_escape_callback(|_| AutoEscape::Html);

    let name = template_name(&config.root, path);
    env.add_template_owned(name.clone(), source.to_owned())
        .map_err(to_error)?;

    let template = env.get_template(&name).map_err(to_error)?;
    template
        .render(context! {
            path => name.as_str(),
            ugly => config.ugly(),
        })
        .map_err(to_error)
}

/// Root-relative name with `/` separators.
fn template_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

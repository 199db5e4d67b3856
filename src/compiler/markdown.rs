//! Markdown to HTML page conversion using pulldown-cmark.

use std::path::Path;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::embed::page::{PAGE_HTML, PageVars};
use crate::utils::html::escape;

/// Extensions enabled for served markdown.
fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Convert markdown and wrap it in the page shell.
///
/// The title is the text of the first level-1 heading, or the file stem.
pub(super) fn render_page(path: &Path, source: &str) -> String {
    let events: Vec<Event<'_>> = Parser::new_ext(source, options()).collect();

    let title = first_heading(&events).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut content = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut content, events.into_iter());

    PAGE_HTML.render(&PageVars {
        title: escape(&title).into_owned(),
        content,
    })
}

/// Plain text of the first `# heading`.
fn first_heading(events: &[Event<'_>]) -> Option<String> {
    let start = events.iter().position(|e| {
        matches!(
            e,
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            })
        )
    })?;

    let mut text = String::new();
    for event in &events[start + 1..] {
        match event {
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

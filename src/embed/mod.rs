//! Embedded static resources.
//!
//! - `serve::CLIENT_JS` - live reload bootstrap, served at [`serve::CLIENT_PATH`]
//! - `page::PAGE_HTML` - page shell wrapped around rendered markdown
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{CLIENT_JS, ClientVars};
//! use embed::page::{PAGE_HTML, PageVars};
//!
//! let js = CLIENT_JS.render(&ClientVars { ws_port: 35729 });
//! let html = PAGE_HTML.render(&PageVars { title: "About".into(), content: body });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Reserved URL of the live reload client. Never goes through resolution.
    pub const CLIENT_PATH: &str = "/zapp/client";

    /// Variables for client.js.
    pub struct ClientVars {
        pub ws_port: u16,
    }

    impl TemplateVars for ClientVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__ZAPP_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live reload client with WebSocket port injection.
    pub const CLIENT_JS: Template<ClientVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/client.min.js")));

    /// `<script>` tag referencing the client, inserted into HTML responses.
    pub fn client_tag() -> String {
        format!(r#"<script src="{CLIENT_PATH}"></script>"#)
    }
}

pub mod page {
    use super::{Template, TemplateVars};

    /// Variables for page.html.
    pub struct PageVars {
        /// Already escaped title text.
        pub title: String,
        /// Rendered HTML body.
        pub content: String,
    }

    impl TemplateVars for PageVars {
        fn apply(&self, content: &str) -> String {
            // Values are inserted verbatim, never rescanned for placeholders.
            let title = |part: &str| part.replace("__TITLE__", &self.title);
            match content.split_once("__CONTENT__") {
                Some((head, tail)) => format!("{}{}{}", title(head), self.content, title(tail)),
                None => title(content),
            }
        }
    }

    /// Page shell for rendered markdown.
    pub const PAGE_HTML: Template<PageVars> =
        Template::new(include_str!("serve/page.html"));
}

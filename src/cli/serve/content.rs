//! Live reload injection into HTML responses.

use crate::embed::serve::client_tag;
use crate::utils::mime;

/// Closing body tag, matched byte for byte.
const BODY_CLOSE: &[u8] = b"</body>";

/// Inject the client tag when the body is HTML and live reload is on.
pub fn maybe_inject(body: Vec<u8>, content_type: &str, enabled: bool) -> Vec<u8> {
    if enabled && mime::is_html(content_type) {
        inject(&body).unwrap_or(body)
    } else {
        body
    }
}

/// Insert the client tag right before the last `</body>`.
///
/// Returns `None` when there is no closing body tag.
pub fn inject(content: &[u8]) -> Option<Vec<u8>> {
    let pos = content
        .windows(BODY_CLOSE.len())
        .rposition(|w| w == BODY_CLOSE)?;

    let tag = client_tag();
    let mut result = Vec::with_capacity(content.len() + tag.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(tag.as_bytes());
    result.extend_from_slice(&content[pos..]);
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types;

    const TAG: &str = r#"<script src="/zapp/client"></script>"#;

    fn injected(html: &str) -> Option<String> {
        inject(html.as_bytes()).map(|bytes| String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn test_inserted_before_body_close() {
        assert_eq!(
            injected("<html><body><p>hi</p></body></html>").unwrap(),
            format!("<html><body><p>hi</p>{TAG}</body></html>")
        );
    }

    #[test]
    fn test_last_body_close_used() {
        let html = "<body><pre>&lt;/body&gt; </body></pre></body>";
        let out = injected(html).unwrap();
        assert!(out.ends_with(&format!("{TAG}</body>")));
        assert_eq!(out.matches(TAG).count(), 1);
    }

    #[test]
    fn test_only_literal_tag_matches() {
        assert_eq!(injected("<BODY>x</BODY>"), None);
        assert_eq!(
            injected("<body>x</body><!-- </BODY> -->").unwrap(),
            format!("<body>x{TAG}</body><!-- </BODY> -->")
        );
    }

    #[test]
    fn test_no_body_close_unchanged() {
        assert_eq!(injected("<p>fragment</p>"), None);
        let body = b"<p>fragment</p>".to_vec();
        assert_eq!(maybe_inject(body.clone(), types::HTML, true), body);
    }

    #[test]
    fn test_only_html_and_only_when_enabled() {
        let body = b"<body></body>".to_vec();
        assert_eq!(maybe_inject(body.clone(), types::PLAIN, true), body);
        assert_eq!(maybe_inject(body.clone(), types::HTML, false), body);
        assert_ne!(maybe_inject(body.clone(), types::HTML, true), body);
    }

    #[test]
    fn test_non_utf8_bytes_preserved() {
        let mut body = vec![0xff, 0xfe];
        body.extend_from_slice(b"</body>");
        let out = inject(&body).unwrap();
        assert_eq!(&out[..2], &[0xff, 0xfe]);
        assert!(out.ends_with(b"</body>"));
    }
}

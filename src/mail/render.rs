/**
 * Letter Rendering
 *
 * Pure transformation from subject/body text to the stored HTML
 * document. Escapes everything, converts newlines to line breaks, and
 * wraps the result in a fixed letter template.
 */

/// Escape text for safe embedding in HTML.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render a letter body as a standalone HTML document.
///
/// A missing subject falls back to "Letter". No side effects; the
/// output is exactly what gets stored and handed to providers.
pub fn render_html(subject: Option<&str>, body: &str) -> String {
    let subject = escape_html(subject.unwrap_or("Letter"));
    let body = escape_html(body).replace('\n', "<br/>");
    format!(
        "<html><body><h3>{subject}</h3><div style='font-family:sans-serif'>{body}</div></body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_render_newlines_become_breaks() {
        let html = render_html(Some("Hello"), "line one\nline two");
        assert!(html.contains("<h3>Hello</h3>"));
        assert!(html.contains("line one<br/>line two"));
    }

    #[test]
    fn test_render_default_subject() {
        let html = render_html(None, "hi");
        assert!(html.contains("<h3>Letter</h3>"));
    }

    #[test]
    fn test_render_escapes_injection() {
        let html = render_html(Some("<script>"), "a<b>c");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a&lt;b&gt;c"));
    }
}

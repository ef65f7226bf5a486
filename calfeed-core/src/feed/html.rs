//! HTML to plain text for SUMMARY and DESCRIPTION.

/// Wide enough that ordinary paragraphs are never re-wrapped.
const TEXT_WIDTH: usize = 10_000;

/// Render `html` as undecorated plain text.
///
/// Input that cannot be rendered is passed through unchanged.
pub fn strip_html_tags(html: &str) -> String {
    match html2text::config::plain_no_decorate().string_from_read(html.as_bytes(), TEXT_WIDTH) {
        Ok(text) => text.trim_end().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to convert HTML to text");
            html.trim_end().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_tags() {
        assert_eq!(strip_html_tags("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(strip_html_tags("Monthly kernel hacking"), "Monthly kernel hacking");
    }

    #[test]
    fn paragraphs_become_lines() {
        let text = strip_html_tags("<p>first</p><p>second</p>");
        assert!(text.starts_with("first"));
        assert!(text.ends_with("second"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn empty_input() {
        assert_eq!(strip_html_tags(""), "");
    }
}

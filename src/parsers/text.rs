//! Plain text upconversion
//!
//! Text documents are turned into minimal HTML so they go through the same
//! pipeline as markup: blank lines (or a line starting with two spaces)
//! separate paragraphs, `_word_` becomes emphasis and `*word*` strong.

use std::sync::OnceLock;

use regex::Regex;

use crate::utils::xml::escape_text;

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n(\r?\n|  )").expect("valid regex"))
}

fn emphasis() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_([^_<>]+)_").expect("valid regex"))
}

fn strong() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*<>]+)\*").expect("valid regex"))
}

/// Wraps decoded text into an HTML document headed by `heading`
pub fn text_to_html(text: &str, heading: &str) -> String {
    let body = escape_text(text);
    let body = paragraph_break().replace_all(&body, "</p>\n<p>");
    let body = emphasis().replace_all(&body, "<em>$1</em>");
    let body = strong().replace_all(&body, "<strong>$1</strong>");

    format!(
        "<html><body>\n<h1>{}</h1>\n<p>{}</p>\n</body></html>",
        escape_text(heading),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs() {
        let html = text_to_html("one\nstill one\n\ntwo\r\n\r\nthree\n  four", "story.txt");
        assert_eq!(
            html,
            "<html><body>\n<h1>story.txt</h1>\n<p>one\nstill one</p>\n<p>two</p>\n<p>three</p>\n<p>four</p>\n</body></html>"
        );
    }

    #[test]
    fn test_inline_markers() {
        let html = text_to_html("a _quiet_ and *loud* word", "t");
        assert!(html.contains("a <em>quiet</em> and <strong>loud</strong> word"));
    }

    #[test]
    fn test_markup_is_escaped() {
        let html = text_to_html("1 < 2 & <b>_x_</b>", "<h>");
        assert!(html.contains("<h1>&lt;h&gt;</h1>"));
        assert!(html.contains("1 &lt; 2 &amp; &lt;b&gt;<em>x</em>&lt;/b&gt;"));
    }
}

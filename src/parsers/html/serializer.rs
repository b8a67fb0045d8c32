//! XHTML 序列化
//!
//! Writes a [`SanitizedNode`] tree as an indented, well-formed XHTML 1.1
//! document. Block-level elements whose text children are all whitespace get
//! one child per line; anything with inline content is written on a single
//! line exactly as is, so no significant whitespace is added or lost.

use crate::utils::xml::{escape_attribute, escape_text};

use super::sanitizer::{Child, SanitizedNode};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
pub const XHTML_DOCTYPE: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#;
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

const INDENT: &str = "  ";

const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "hr", "img", "input", "link", "meta", "param"];

const INLINE_ELEMENTS: &[&str] = &[
    "a", "b", "big", "br", "em", "font", "i", "img", "s", "small", "span", "strong", "sub", "sup",
    "u",
];

fn is_inline(name: &str) -> bool {
    INLINE_ELEMENTS.contains(&name)
}

/// 序列化文档
pub fn serialize_document(html: &SanitizedNode) -> Vec<u8> {
    let mut buf = String::new();

    buf.push_str(XML_DECLARATION);
    buf.push('\n');
    buf.push_str(XHTML_DOCTYPE);
    buf.push('\n');

    let mut root = html.clone();
    root.attrs.retain(|(name, _)| name != "xmlns");
    root.attrs.insert(0, ("xmlns".to_string(), XHTML_NAMESPACE.to_string()));
    write_element(&mut buf, &root, 0);
    buf.push('\n');

    buf.into_bytes()
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Children can go on their own lines without changing the rendering: the
/// element and all of its element children are block-level, and the text
/// between them is whitespace
fn is_block_layout(node: &SanitizedNode) -> bool {
    !is_inline(&node.name)
        && node.children.iter().any(|c| matches!(c, Child::Element(_)))
        && node.children.iter().all(|child| match child {
            Child::Text(text) => text.trim().is_empty(),
            Child::Element(element) => !is_inline(&element.name),
        })
}

/// XML names: a letter, `_` or `:` followed by letters, digits, `-`, `.`, `_`, `:`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
}

fn write_start_tag(buf: &mut String, node: &SanitizedNode) {
    buf.push('<');
    buf.push_str(&node.name);
    for (name, value) in &node.attrs {
        if !is_valid_name(name) {
            continue;
        }
        buf.push(' ');
        buf.push_str(name);
        buf.push_str("=\"");
        buf.push_str(&escape_attribute(value));
        buf.push('"');
    }
}

fn write_element(buf: &mut String, node: &SanitizedNode, depth: usize) {
    write_start_tag(buf, node);

    if is_void(&node.name) {
        buf.push_str(" />");
        return;
    }
    buf.push('>');

    if is_block_layout(node) {
        for child in &node.children {
            if let Child::Element(element) = child {
                buf.push('\n');
                buf.push_str(&INDENT.repeat(depth + 1));
                write_element(buf, element, depth + 1);
            }
        }
        buf.push('\n');
        buf.push_str(&INDENT.repeat(depth));
    } else {
        for child in &node.children {
            write_inline(buf, child);
        }
    }

    buf.push_str("</");
    buf.push_str(&node.name);
    buf.push('>');
}

fn write_inline(buf: &mut String, child: &Child) {
    match child {
        Child::Text(text) => buf.push_str(&escape_text(text)),
        Child::Element(node) => {
            write_start_tag(buf, node);
            if is_void(&node.name) {
                buf.push_str(" />");
            } else {
                buf.push('>');
                for grandchild in &node.children {
                    write_inline(buf, grandchild);
                }
                buf.push_str("</");
                buf.push_str(&node.name);
                buf.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::dom::html_to_dom;
    use super::super::sanitizer::{sanitize_document, SanitizePolicy};
    use super::*;

    fn render(node: &SanitizedNode) -> String {
        String::from_utf8(serialize_document(node)).unwrap()
    }

    #[test]
    fn test_document_prologue_and_namespace() {
        let html = SanitizedNode::new("html")
            .with_child(SanitizedNode::new("head").with_child(SanitizedNode::new("title").with_text("T")))
            .with_child(SanitizedNode::new("body"));

        assert_eq!(
            render(&html),
            format!(
                "{XML_DECLARATION}\n{XHTML_DOCTYPE}\n\
                 <html xmlns=\"{XHTML_NAMESPACE}\">\n  <head>\n    <title>T</title>\n  </head>\n  <body></body>\n</html>\n"
            )
        );
    }

    #[test]
    fn test_inline_content_written_verbatim() {
        let body = SanitizedNode::new("body")
            .with_text("\n")
            .with_child(
                SanitizedNode::new("p")
                    .with_text("a  ")
                    .with_child(SanitizedNode::new("b").with_text("bold"))
                    .with_child(SanitizedNode::new("br"))
                    .with_text(" c"),
            )
            .with_text("\n  ");
        let html = SanitizedNode::new("html").with_child(body);
        let out = render(&html);

        assert!(out.contains("  <body>\n    <p>a  <b>bold</b><br /> c</p>\n  </body>"));
    }

    #[test]
    fn test_adjacent_inline_elements_stay_joined() {
        let dom = html_to_dom(
            b"<h1><em>Ch</em><b>apter</b></h1>\n<p><b>un</b><i>believable</i></p>",
            "utf-8",
        );
        let (html, _) = sanitize_document(&dom.document, &SanitizePolicy::portable());
        let out = render(&html);

        assert!(out.contains("<h1><em>Ch</em><b>apter</b></h1>"));
        assert!(out.contains("<p><b>un</b><i>believable</i></p>"));
        assert!(out.contains("<body>\n    <h1>"));
    }

    #[test]
    fn test_block_children_mixed_with_inline_stay_on_one_line() {
        let body = SanitizedNode::new("body")
            .with_child(SanitizedNode::new("p").with_text("one"))
            .with_text("\n")
            .with_child(SanitizedNode::new("a").with_attr("href", "x").with_text("two"));
        let out = render(&SanitizedNode::new("html").with_child(body));

        assert!(out.contains("<body><p>one</p>\n<a href=\"x\">two</a></body>"));
    }

    #[test]
    fn test_escaping_and_invalid_attribute_names() {
        let body = SanitizedNode::new("body").with_child(
            SanitizedNode::new("a")
                .with_attr("href", "x?a=1&b=\"2\"")
                .with_attr("1bad", "y")
                .with_text("<&>"),
        );
        let out = render(&SanitizedNode::new("html").with_child(body));

        assert!(out.contains("<a href=\"x?a=1&amp;b=&quot;2&quot;\">&lt;&amp;&gt;</a>"));
        assert!(!out.contains("1bad"));
    }

    #[test]
    fn test_mixed_text_keeps_element_on_one_line() {
        let body = SanitizedNode::new("body")
            .with_text("loose text ")
            .with_child(SanitizedNode::new("p").with_text("para"));
        let out = render(&SanitizedNode::new("html").with_child(body));

        assert!(out.contains("<body>loose text <p>para</p></body>"));
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("href"));
        assert!(is_valid_name("xml:lang"));
        assert!(is_valid_name("data-x_y.z"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("-x"));
        assert!(!is_valid_name("a\"b"));
    }
}

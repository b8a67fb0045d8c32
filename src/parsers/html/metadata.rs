//! HTML 文档元数据处理模块
//!
//! 从页面 `<head>` 中读取标题与字符编码声明。

use markup5ever_rcdom::Handle;

use crate::core::parse_content_type;

use super::dom::{find_nodes, get_node_attr, get_text_content};

/// 获取文档字符编码
///
/// Supports both `<meta charset="...">` and the older
/// `<meta http-equiv="content-type" content="text/html; charset=...">`.
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, vec!["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            return Some(meta_charset_node_attr_value);
        }

        if is_content_type_meta(meta_node) {
            if let Some(meta_content_type_node_attr_value) = get_node_attr(meta_node, "content") {
                let (_media_type, charset) = parse_content_type(&meta_content_type_node_attr_value);
                if !charset.is_empty() {
                    return Some(charset);
                }
            }
        }
    }

    None
}

/// True for `<meta http-equiv="content-type">`
pub fn is_content_type_meta(meta_node: &Handle) -> bool {
    get_node_attr(meta_node, "http-equiv")
        .unwrap_or_default()
        .eq_ignore_ascii_case("content-type")
}

/// 获取文档标题
///
/// Text of the first `<title>`, whitespace trimmed; `None` when missing or
/// blank.
pub fn get_title(node: &Handle) -> Option<String> {
    find_nodes(node, vec!["html", "head", "title"])
        .first()
        .map(|title_node| get_text_content(title_node).trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::super::dom::html_to_dom;
    use super::*;

    #[test]
    fn test_get_charset() {
        let dom = html_to_dom(b"<head><meta charset='iso-8859-1'></head>", "utf-8");
        assert_eq!(get_charset(&dom.document).as_deref(), Some("iso-8859-1"));

        let dom = html_to_dom(
            b"<head><meta http-equiv='Content-Type' content='text/html; charset=koi8-r'></head>",
            "utf-8",
        );
        assert_eq!(get_charset(&dom.document).as_deref(), Some("koi8-r"));

        let dom = html_to_dom(b"<p>none</p>", "utf-8");
        assert_eq!(get_charset(&dom.document), None);
    }

    #[test]
    fn test_get_title() {
        let dom = html_to_dom(b"<title>\n  Chapter 1 </title><p>x</p>", "utf-8");
        assert_eq!(get_title(&dom.document).as_deref(), Some("Chapter 1"));

        let dom = html_to_dom(b"<title>  </title>", "utf-8");
        assert_eq!(get_title(&dom.document), None);
    }
}

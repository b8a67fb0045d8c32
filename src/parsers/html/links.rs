//! 链接重写模块
//!
//! Anchors either lead to documents that become part of the book, in which
//! case they are rewritten to the archive-local file, or are made absolute
//! so they keep working from inside the e-book. Images are always pulled
//! into the archive when possible.

use markup5ever_rcdom::Handle;
use tracing::debug;

use crate::crawler::Crawler;
use crate::utils::url::{clean_url, encode_path, is_same_document, relative_path, resolve_url, Url};

use super::dom::{find_elements, get_node_attr, set_node_attr};

/// 判断是否应该跳过重写的链接
pub fn should_skip_link(href: &str) -> bool {
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
        || href.starts_with("blob:")
}

/// Archive-local reference from `document_name` to `target_name`, with the
/// fragment of the original reference carried over
fn local_reference(target_name: &str, document_name: &str, fragment: Option<&str>) -> String {
    let path = encode_path(&relative_path(target_name, document_name));
    match fragment {
        Some(fragment) => format!("{path}#{fragment}"),
        None => path,
    }
}

/// Rewrites every `a[href]` of a document
///
/// With `recursive` set and recursion budget left, each target is parsed
/// into the book one level deeper and the link points at the local copy.
/// Every other link is made absolute. Links back to the document itself are
/// left alone.
pub fn follow_links(
    crawler: &mut Crawler,
    document: &Handle,
    base_url: &Url,
    document_name: &str,
    recursive: bool,
) {
    let accept_recursion = recursive && crawler.recursion_allowed();

    for anchor in find_elements(document, "a", None) {
        let Some(href) = get_node_attr(&anchor, "href") else {
            continue;
        };
        let href = href.trim();
        if should_skip_link(href) {
            continue;
        }
        let Some(target) = resolve_url(base_url, href) else {
            debug!("cannot resolve link \"{}\" in {}", href, base_url);
            continue;
        };
        if is_same_document(&target, base_url) {
            continue;
        }

        let local_name = if accept_recursion {
            crawler.descend(|crawler| crawler.parse_url(&clean_url(&target)))
        } else {
            None
        };

        let rewritten = match local_name {
            Some(name) => local_reference(&name, document_name, target.fragment()),
            None => target.to_string(),
        };
        set_node_attr(&anchor, "href", Some(rewritten));
    }
}

/// Stores every `img[src]` in the archive and points it at the local copy
///
/// Images that cannot be retrieved point at their absolute location.
pub fn rewrite_images(crawler: &mut Crawler, document: &Handle, base_url: &Url, document_name: &str) {
    for image in find_elements(document, "img", None) {
        let Some(src) = get_node_attr(&image, "src") else {
            continue;
        };
        let src = src.trim();
        if src.is_empty() || src.starts_with("data:") {
            continue;
        }
        let Some(target) = resolve_url(base_url, src) else {
            continue;
        };

        let rewritten = match crawler.fetch_resource(&clean_url(&target)) {
            Some(name) => local_reference(&name, document_name, None),
            None => target.to_string(),
        };
        set_node_attr(&image, "src", Some(rewritten));
    }
}

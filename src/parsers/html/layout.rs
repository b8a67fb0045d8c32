//! 书籍页面布局处理
//!
//! Structured layout pages are book pages of a community fiction site: the
//! story text sits between a `span.print-link` and a `div.book-navigation`
//! listing the child pages; a `span.submitted` line names the author and a
//! `span.taxonomy` block carries tags. Everything here works on the parsed
//! DOM before it is sanitized.

use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};

use super::dom::{
    append_child, create_element_node, create_text_node, find_element, find_elements, get_node_attr,
    get_node_name, get_parent_node, get_text_content, prepend_child, remove_after, remove_before,
    remove_node,
};
use super::metadata::get_title;

/// Tag some sites use for authors without a profile; never an author name
pub const PLACEHOLDER_AUTHOR_TAG: &str = "New Author";

const PROFILE_LINK_TITLE: &str = "View user profile.";
const AUTHOR_MARKERS: &[&str] = &["ubmitted by ", "wned by "];

/// Document title with site suffixes removed
pub fn page_title(document: &Handle, suffixes: &[String]) -> Option<String> {
    let mut title = get_title(document)?;
    for suffix in suffixes {
        title = title.replace(suffix.as_str(), "");
    }
    let title = title.trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// Texts of `a[rel=tag]` links inside `span.taxonomy`, in page order
pub fn taxonomy_tags(document: &Handle) -> Vec<String> {
    let Some(taxonomy) = find_element(document, "span", Some("taxonomy")) else {
        return vec![];
    };

    find_elements(&taxonomy, "a", None)
        .iter()
        .filter(|a| {
            get_node_attr(a, "rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r == "tag"))
        })
        .map(|a| get_text_content(a).trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

pub fn submission_span(document: &Handle) -> Option<Handle> {
    find_element(document, "span", Some("submitted"))
}

/// Whitespace-normalised text of the submission line
pub fn submission_text(submitted: &Handle) -> Option<String> {
    let text = get_text_content(submitted)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

/// Guesses the author of a page
///
/// The first taxonomy tag names the author unless it is the placeholder.
/// Otherwise the submission line is used: its profile link, any link, or
/// the words following "submitted by" / "owned by".
pub fn detect_author(tags: &[String], submitted: Option<&Handle>) -> Option<String> {
    if let Some(first_tag) = tags.first() {
        if first_tag != PLACEHOLDER_AUTHOR_TAG {
            return Some(first_tag.clone());
        }
    }

    let submitted = submitted?;
    let links = find_elements(submitted, "a", None);
    let link = links
        .iter()
        .find(|a| get_node_attr(a, "title").as_deref() == Some(PROFILE_LINK_TITLE))
        .or_else(|| links.first());

    if let Some(link) = link {
        let name = get_text_content(link).trim().to_string();
        return (!name.is_empty()).then_some(name);
    }

    let text = submission_text(submitted)?;
    let info = AUTHOR_MARKERS
        .iter()
        .find_map(|marker| text.split_once(marker).map(|(_, rest)| rest))?;
    let name = info.split(" on").next().unwrap_or_default().trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Cuts the page down to the story: everything before `span.print-link` and
/// after `div.book-navigation` goes
pub fn prune_page_chrome(document: &Handle) {
    if let Some(print_link) = find_element(document, "span", Some("print-link")) {
        remove_before(&print_link);
    }
    if let Some(navigation) = find_element(document, "div", Some("book-navigation")) {
        remove_after(&navigation);
    }
}

/// Takes the child page links out of `div.book-navigation`
///
/// Returns the raw hrefs, `li.leaf` entries before `li.collapsed` ones, and
/// detaches the navigation block. Pages without one are trimmed after their
/// `div.content` instead and `None` is returned.
pub fn take_book_navigation(document: &Handle) -> Option<Vec<String>> {
    let Some(navigation) = find_element(document, "div", Some("book-navigation")) else {
        trim_after_content(document);
        return None;
    };

    let mut hrefs = vec![];
    if find_element(&navigation, "ul", None).is_some() {
        for class in ["leaf", "collapsed"] {
            for item in find_elements(&navigation, "li", Some(class)) {
                if let Some(href) = find_element(&item, "a", None).and_then(|a| get_node_attr(&a, "href")) {
                    hrefs.push(href);
                }
            }
        }
    }

    remove_node(&navigation);
    Some(hrefs)
}

/// Without book navigation the story ends with the content block; a vote
/// widget inside it and the line preceding the widget are dropped too
fn trim_after_content(document: &Handle) {
    let Some(content) = find_element(document, "div", Some("content")) else {
        return;
    };
    remove_after(&content);

    let Some(vote) = find_element(&content, "div", Some("vote-wrap")) else {
        return;
    };

    let cut = preceding_sibling(&vote, Some("font")).or_else(|| preceding_sibling(&vote, None));
    if let Some(cut) = cut {
        remove_after(&cut);
        remove_node(&cut);
    }
}

/// Nearest earlier sibling, optionally the nearest one named `name`
fn preceding_sibling(node: &Handle, name: Option<&str>) -> Option<Handle> {
    let parent = get_parent_node(node)?;
    let siblings = parent.children.borrow();
    let position = siblings.iter().position(|sibling| Rc::ptr_eq(sibling, node))?;

    siblings[..position]
        .iter()
        .rev()
        .find(|sibling| name.map_or(true, |name| get_node_name(sibling) == Some(name)))
        .cloned()
}

/// Puts the submission line at the top of the body as `<p><em>text</em></p>`
pub fn prepend_submission(dom: &RcDom, text: &str) {
    let Some(body) = find_element(&dom.document, "body", None) else {
        return;
    };

    let em = create_element_node(dom, "em", vec![]);
    append_child(dom, &em, create_text_node(text));
    let p = create_element_node(dom, "p", vec![]);
    append_child(dom, &p, em);
    prepend_child(dom, &body, p);
}

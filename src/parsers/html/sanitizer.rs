//! Restricting a parsed page to a portable tag vocabulary
//!
//! Filtering never touches the DOM: it reads the html5ever tree and returns
//! an owned [`SanitizedNode`] tree. Elements outside the vocabulary are
//! replaced by their (filtered) children so their text survives; denied
//! elements vanish together with everything inside them.

use std::collections::{BTreeSet, HashMap, HashSet};

use markup5ever_rcdom::{Handle, NodeData};

use super::dom::{get_child_node_by_name, get_node_attr, get_node_name};
use super::metadata::is_content_type_meta;

/// Key under which attributes allowed or denied on every tag are stored
pub const ANY_TAG: &str = "*";

pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "p", "a", "img", "font", "u", "b", "strong", "i", "em", "s", "center", "big", "small", "br",
    "hr", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
];
pub const DEFAULT_DENIED_TAGS: &[&str] = &["script", "style"];
pub const DEFAULT_ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "name", "title"]),
    ("img", &["src", "width", "height", "alt", "align"]),
    ("p", &["align"]),
    ("font", &["size", "color", "face"]),
    (ANY_TAG, &["id", "style", "class"]),
];
pub const DEFAULT_DENIED_ATTRIBUTES: &[(&str, &[&str])] = &[("img", &["border"])];

/// Head children worth keeping
pub const HEAD_TAGS: &[&str] = &["title", "link", "meta"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Child {
    Text(String),
    Element(SanitizedNode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizedNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Child>,
}

impl SanitizedNode {
    pub fn new(name: &str) -> SanitizedNode {
        SanitizedNode {
            name: name.to_string(),
            attrs: vec![],
            children: vec![],
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> SanitizedNode {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_text(mut self, text: &str) -> SanitizedNode {
        self.children.push(Child::Text(text.to_string()));
        self
    }

    pub fn with_child(mut self, child: SanitizedNode) -> SanitizedNode {
        self.children.push(Child::Element(child));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child element called `name`
    pub fn child_mut(&mut self, name: &str) -> Option<&mut SanitizedNode> {
        self.children.iter_mut().find_map(|child| match child {
            Child::Element(node) if node.name == name => Some(node),
            _ => None,
        })
    }

    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                Child::Text(s) => text.push_str(s),
                Child::Element(node) => text.push_str(&node.text_content()),
            }
        }
        text
    }
}

/// What the document loses to the policy, reported for diagnostics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Elements that were unwrapped or removed
    pub dropped_tags: BTreeSet<String>,
    /// `tag@attribute` pairs that were removed
    pub dropped_attributes: BTreeSet<String>,
}

impl SanitizeReport {
    pub fn is_empty(&self) -> bool {
        self.dropped_tags.is_empty() && self.dropped_attributes.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SanitizePolicy {
    allowed_tags: HashSet<String>,
    denied_tags: HashSet<String>,
    allowed_attributes: HashMap<String, HashSet<String>>,
    denied_attributes: HashMap<String, HashSet<String>>,
}

impl SanitizePolicy {
    /// A policy that keeps no tags at all; every element gets unwrapped
    pub fn empty() -> SanitizePolicy {
        SanitizePolicy::default()
    }

    /// Vocabulary of simple e-book friendly formatting
    pub fn portable() -> SanitizePolicy {
        let mut policy = SanitizePolicy::empty();
        for tag in DEFAULT_ALLOWED_TAGS {
            policy = policy.allow_tag(tag);
        }
        for tag in DEFAULT_DENIED_TAGS {
            policy = policy.deny_tag(tag);
        }
        for (tag, attributes) in DEFAULT_ALLOWED_ATTRIBUTES {
            for attribute in attributes.iter() {
                policy = policy.allow_attribute(tag, attribute);
            }
        }
        for (tag, attributes) in DEFAULT_DENIED_ATTRIBUTES {
            for attribute in attributes.iter() {
                policy = policy.deny_attribute(tag, attribute);
            }
        }
        policy
    }

    pub fn allow_tag(mut self, tag: &str) -> SanitizePolicy {
        self.allowed_tags.insert(tag.to_lowercase());
        self
    }

    pub fn deny_tag(mut self, tag: &str) -> SanitizePolicy {
        self.denied_tags.insert(tag.to_lowercase());
        self
    }

    /// `tag` may be [`ANY_TAG`]
    pub fn allow_attribute(mut self, tag: &str, attribute: &str) -> SanitizePolicy {
        self.allowed_attributes
            .entry(tag.to_lowercase())
            .or_default()
            .insert(attribute.to_lowercase());
        self
    }

    /// `tag` may be [`ANY_TAG`]
    pub fn deny_attribute(mut self, tag: &str, attribute: &str) -> SanitizePolicy {
        self.denied_attributes
            .entry(tag.to_lowercase())
            .or_default()
            .insert(attribute.to_lowercase());
        self
    }

    pub fn is_tag_allowed(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    pub fn is_tag_denied(&self, tag: &str) -> bool {
        self.denied_tags.contains(tag)
    }

    /// Allowed for the tag or globally, and denied neither way
    pub fn is_attribute_allowed(&self, tag: &str, attribute: &str) -> bool {
        let listed = |table: &HashMap<String, HashSet<String>>| {
            [tag, ANY_TAG]
                .iter()
                .any(|key| table.get(*key).is_some_and(|set| set.contains(attribute)))
        };

        listed(&self.allowed_attributes) && !listed(&self.denied_attributes)
    }
}

/// Filters one node into the sequence that takes its place in the parent
pub fn filter_node(node: &Handle, policy: &SanitizePolicy, report: &mut SanitizeReport) -> Vec<Child> {
    match node.data {
        NodeData::Text { ref contents } => vec![Child::Text(contents.borrow().to_string())],
        NodeData::Element { ref name, .. } => {
            let tag = name.local.as_ref();

            if policy.is_tag_denied(tag) {
                report.dropped_tags.insert(tag.to_string());
                return vec![];
            }

            let children = filter_children(node, policy, report);

            if policy.is_tag_allowed(tag) {
                vec![Child::Element(SanitizedNode {
                    name: tag.to_string(),
                    attrs: filter_attributes(node, tag, policy, report),
                    children,
                })]
            } else {
                report.dropped_tags.insert(tag.to_string());
                children
            }
        }
        // 注释、文档类型、处理指令
        _ => vec![],
    }
}

/// Filtered children of `node`, concatenated in document order
pub fn filter_children(node: &Handle, policy: &SanitizePolicy, report: &mut SanitizeReport) -> Vec<Child> {
    node.children
        .borrow()
        .iter()
        .flat_map(|child_node| filter_node(child_node, policy, report))
        .collect()
}

fn filter_attributes(
    node: &Handle,
    tag: &str,
    policy: &SanitizePolicy,
    report: &mut SanitizeReport,
) -> Vec<(String, String)> {
    let NodeData::Element { ref attrs, .. } = node.data else {
        return vec![];
    };

    let mut kept = vec![];
    for attr in attrs.borrow().iter() {
        let attribute = attr.name.local.as_ref();
        if policy.is_attribute_allowed(tag, attribute) {
            kept.push((attribute.to_string(), attr.value.to_string()));
        } else {
            report.dropped_attributes.insert(format!("{tag}@{attribute}"));
        }
    }
    kept
}

/// Verbatim copy of a subtree, comments excepted
fn copy_node(node: &Handle) -> Option<Child> {
    match node.data {
        NodeData::Text { ref contents } => Some(Child::Text(contents.borrow().to_string())),
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => Some(Child::Element(SanitizedNode {
            name: name.local.to_string(),
            attrs: attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect(),
            children: node.children.borrow().iter().filter_map(copy_node).collect(),
        })),
        _ => None,
    }
}

/// Keeps `title`, `link` and `meta` children of the head
///
/// Declarations of the page's original encoding are dropped since the
/// document is written back as UTF-8.
fn filter_head(head: &Handle) -> SanitizedNode {
    let mut filtered = SanitizedNode::new("head");

    for child_node in head.children.borrow().iter() {
        let Some(tag) = get_node_name(child_node) else {
            continue;
        };
        if !HEAD_TAGS.contains(&tag) {
            continue;
        }
        if tag == "meta"
            && (get_node_attr(child_node, "charset").is_some()
                || is_content_type_meta(child_node))
        {
            continue;
        }
        if let Some(child) = copy_node(child_node) {
            filtered.children.push(child);
        }
    }

    filtered
}

/// Filters a whole parsed document into an `html` element
///
/// The result always has a `head` and a `body`; the body survives the policy
/// even though it is not part of the vocabulary.
pub fn sanitize_document(document: &Handle, policy: &SanitizePolicy) -> (SanitizedNode, SanitizeReport) {
    let mut report = SanitizeReport::default();
    let mut html = SanitizedNode::new("html");
    let html_node = get_child_node_by_name(document, "html");

    let head = html_node
        .as_ref()
        .and_then(|html_node| get_child_node_by_name(html_node, "head"))
        .map(|head| filter_head(&head))
        .unwrap_or_else(|| SanitizedNode::new("head"));

    let body = match html_node
        .as_ref()
        .and_then(|html_node| get_child_node_by_name(html_node, "body"))
    {
        Some(body_node) => SanitizedNode {
            name: "body".to_string(),
            attrs: filter_attributes(&body_node, "body", policy, &mut report),
            children: filter_children(&body_node, policy, &mut report),
        },
        None => SanitizedNode::new("body"),
    };

    html.children.push(Child::Element(head));
    html.children.push(Child::Element(body));

    (html, report)
}

/// Footer naming the page a document was made from
pub fn attribution_paragraph(location: &str) -> SanitizedNode {
    SanitizedNode::new("p")
        .with_attr("style", "font-size: 0.5em")
        .with_text("Downloaded from: ")
        .with_child(
            SanitizedNode::new("a")
                .with_attr("href", location)
                .with_text(location),
        )
}

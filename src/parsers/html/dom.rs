use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::tree_builder::{create_element, NodeOrText, TreeSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
///
/// html5ever recovers from any markup, so this never fails.
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => encoding.decode(data).0.to_string(),
        None => String::from_utf8_lossy(data).to_string(),
    };

    parse_document(RcDom::default(), Default::default()).one(s)
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let Some(&node_name) = node_names.first() else {
        return found_nodes;
    };

    if node_names.len() == 1 {
        if get_node_name(node) == Some(node_name) {
            found_nodes.push(node.clone());
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    } else if get_node_name(node) == Some(node_name) {
        let mut new_node_names = node_names;
        new_node_names.remove(0);
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, new_node_names.clone()));
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// All elements named `node_name` (and carrying `class`, if given), in
/// document order
pub fn find_elements(node: &Handle, node_name: &str, class: Option<&str>) -> Vec<Handle> {
    let mut found_nodes = Vec::new();

    if get_node_name(node) == Some(node_name) && class.map_or(true, |c| has_class(node, c)) {
        found_nodes.push(node.clone());
    }

    for child_node in node.children.borrow().iter() {
        found_nodes.append(&mut find_elements(child_node, node_name, class));
    }

    found_nodes
}

/// First element named `node_name` (and carrying `class`, if given)
pub fn find_element(node: &Handle, node_name: &str, class: Option<&str>) -> Option<Handle> {
    if get_node_name(node) == Some(node_name) && class.map_or(true, |c| has_class(node, c)) {
        return Some(node.clone());
    }

    node.children
        .borrow()
        .iter()
        .find_map(|child_node| find_element(child_node, node_name, class))
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children
        .iter()
        .find(|child| get_node_name(child) == Some(node_name));
    matching_children.cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    get_node_attr(node, "class")
        .is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

/// 获取父节点
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let parent = child.parent.take();
    child.parent.set(parent.clone());
    parent.and_then(|node| node.upgrade())
}

/// Concatenated text of a node and its descendants
pub fn get_text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, text: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        text.push_str(&contents.borrow());
    }
    for child_node in node.children.borrow().iter() {
        collect_text(child_node, text);
    }
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            // Add new attribute (since originally the target node didn't have it)
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// Detaches a node from its parent
pub fn remove_node(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// Removes everything preceding `node` up to the `body` element: its earlier
/// siblings, then the earlier siblings of each ancestor below `body`
pub fn remove_before(node: &Handle) {
    remove_siblings(node, true);
}

/// Counterpart of [`remove_before`] for everything following `node`
pub fn remove_after(node: &Handle) {
    remove_siblings(node, false);
}

fn remove_siblings(node: &Handle, before: bool) {
    let mut current = node.clone();

    while get_node_name(&current) != Some("body") {
        let Some(parent) = get_parent_node(&current) else {
            break;
        };

        {
            let mut children = parent.children.borrow_mut();
            if let Some(position) = children.iter().position(|c| Rc::ptr_eq(c, &current)) {
                let removed: Vec<Handle> = if before {
                    children.drain(..position).collect()
                } else {
                    children.drain(position + 1..).collect()
                };
                for removed_node in removed {
                    removed_node.parent.set(None);
                }
            }
        }

        current = parent;
    }
}

pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: std::cell::RefCell::new(StrTendril::from(text)),
    })
}

/// Creates a detached element owned by `dom`
pub fn create_element_node(dom: &RcDom, name: &str, attrs: Vec<(&str, &str)>) -> Handle {
    create_element(
        dom,
        QualName::new(None, ns!(html), LocalName::from(name)),
        attrs
            .into_iter()
            .map(|(attr_name, attr_value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                value: format_tendril!("{}", attr_value),
            })
            .collect(),
    )
}

pub fn append_child(dom: &RcDom, parent: &Handle, child: Handle) {
    dom.append(parent, NodeOrText::AppendNode(child));
}

/// Inserts `child` as the first child of `parent`
pub fn prepend_child(dom: &RcDom, parent: &Handle, child: Handle) {
    let first_child = parent.children.borrow().first().cloned();
    match first_child {
        Some(first_child) => dom.append_before_sibling(&first_child, NodeOrText::AppendNode(child)),
        None => dom.append(parent, NodeOrText::AppendNode(child)),
    }
}

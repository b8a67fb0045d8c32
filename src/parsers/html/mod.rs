//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作
//! - `metadata`: 标题与字符编码
//! - `layout`: 书籍页面布局（导航、提交信息、分类标签）
//! - `links`: 链接跟随与图片重写
//! - `sanitizer`: 标签/属性白名单过滤
//! - `serializer`: XHTML 序列化

pub mod dom;
pub mod layout;
pub mod links;
pub mod metadata;
pub mod sanitizer;
pub mod serializer;

pub use dom::{
    find_element, find_elements, find_nodes, get_child_node_by_name, get_node_attr, get_node_name,
    get_parent_node, get_text_content, html_to_dom, set_node_attr,
};
pub use links::{follow_links, rewrite_images, should_skip_link};
pub use metadata::{get_charset, get_title};
pub use sanitizer::{
    attribution_paragraph, filter_node, sanitize_document, Child, SanitizePolicy, SanitizeReport,
    SanitizedNode,
};
pub use serializer::serialize_document;

//! # 解析器模块
//!
//! 把下载的页面变成电子书内容：
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM操作、布局处理、过滤与序列化
//! - `text` - 纯文本升级为 HTML

pub mod html;
pub mod text;

pub use html::{html_to_dom, sanitize_document, serialize_document, SanitizePolicy};
pub use text::text_to_html;

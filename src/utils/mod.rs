//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - URL处理和解析工具
//! - 归档内相对路径计算
//! - XML转义
//!
//! # 模块组织
//!
//! - `url` - URL解析、文件名推导、相对路径
//! - `xml` - XML文本和属性转义

pub mod url;
pub mod xml;

// Re-export commonly used items for convenience
pub use self::url::{
    clean_url, encode_path, is_same_document, relative_path, resolve_url, url_basename, Url,
};
pub use self::xml::{escape_attribute, escape_text};

//! # 构建器模块
//!
//! 把抓取结果组装成 EPUB：
//!
//! # 模块组织
//!
//! - `package` - container.xml、OPF 包文件与 NCX 目录的生成
//! - `archive` - zip 容器写出

pub mod archive;
pub mod package;

pub use archive::{write_archive, write_archive_to_path};
pub use package::{render, RenderedPackage};

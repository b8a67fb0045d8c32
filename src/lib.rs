//! # TopShelf Library
//!
//! 把一棵互相链接的网页树打包成一本 EPUB 电子书：下载页面、过滤为可移植的
//! XHTML、建立层级目录，最后写出 zip 容器。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型、运行选项和内容类型工具
//! - `book` - 文件命名、目录树、元数据与资源集合
//! - `crawler` - 深度优先的抓取调度
//! - `parsers` - HTML 解析、布局处理、过滤与序列化，纯文本升级
//! - `builders` - OPF/NCX 生成与 zip 打包
//! - `network` - 下载、缓存和 URL 过滤
//! - `utils` - URL 与 XML 工具函数
//! - `env` / `logging` - 环境变量与日志初始化

pub mod book;
pub mod builders;
pub mod core;
pub mod crawler;
pub mod env;
pub mod logging;
pub mod network;
pub mod parsers;
pub mod utils;

// Re-export commonly used items for convenience
pub use self::book::{Book, Metadata, NameRegistry, NavigationTree};
pub use self::builders::{write_archive, write_archive_to_path};
pub use self::core::{Layout, Replacement, ShelfError, ShelfOptions};
pub use self::crawler::Crawler;
pub use self::network::{FetchError, FetchedResource, Fetcher, HttpFetcher};

//! # 网络模块
//!
//! 这个模块包含所有与网络通信、缓存和会话管理相关的功能：
//!
//! - 资源下载（HTTP 以及本地 file:// 地址）
//! - 单次运行内的下载缓存
//! - URL 接受/拒绝过滤
//!
//! # 模块组织
//!
//! - `fetcher` - 下载接口和基于 reqwest 的实现
//! - `cache` - 按地址记忆的下载缓存
//! - `session` - 会话：过滤、缓存、错误标记

pub mod cache;
pub mod fetcher;
pub mod session;

// Re-export commonly used items for convenience
pub use cache::Cache;
pub use fetcher::{FetchError, FetchedResource, Fetcher, HttpFetcher};
pub use session::{Session, UrlFilter};

//! # 电子书模块
//!
//! 一次运行中累积的全部状态：
//!
//! - `registry` - 来源地址到归档内文件名的映射
//! - `navigation` - 层级目录（带插入点栈）
//! - `metadata` - Dublin Core 元数据
//!
//! `Book` 持有以上三者以及所有已下载/已改写的资源。

pub mod metadata;
pub mod navigation;
pub mod registry;

use std::collections::HashMap;

use uuid::Uuid;

pub use self::metadata::Metadata;
pub use self::navigation::{NavMark, NavPoint, NavigationTree, SectionHandle};
pub use self::registry::NameRegistry;

pub const DEFAULT_TOC_TITLE: &str = "Table Of Contents";

/// One archive entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    /// `fileN`, assigned in insertion order starting at 1
    pub id: String,
    pub name: String,
    pub location: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Resource {
    /// Identifier used by manifest and spine entries
    pub fn manifest_id(&self) -> String {
        format!("item_{}", self.id)
    }
}

pub struct Book {
    pub registry: NameRegistry,
    pub navigation: NavigationTree,
    pub metadata: Metadata,
    pub toc_title: String,
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
    uid: String,
}

impl Default for Book {
    fn default() -> Self {
        Book::new()
    }
}

impl Book {
    pub fn new() -> Book {
        Book {
            registry: NameRegistry::new(),
            navigation: NavigationTree::new(),
            metadata: Metadata::default(),
            toc_title: DEFAULT_TOC_TITLE.to_string(),
            resources: vec![],
            index: HashMap::new(),
            uid: Uuid::new_v4().to_string(),
        }
    }

    /// Identifier of the navigation document
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Stores a payload under `name`; a name is only ever stored once
    pub fn add_resource(&mut self, name: &str, location: &str, content_type: &str, data: Vec<u8>) -> &Resource {
        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                let position = self.resources.len();
                self.resources.push(Resource {
                    id: format!("file{}", position + 1),
                    name: name.to_string(),
                    location: location.to_string(),
                    content_type: content_type.to_string(),
                    data,
                });
                self.index.insert(name.to_string(), position);
                position
            }
        };

        &self.resources[position]
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.index.get(name).map(|&position| &self.resources[position])
    }

    /// Resources in id order
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

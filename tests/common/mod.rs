// 集成测试公共模块
//
// 提供内存中的站点模拟和共享的断言工具

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use topshelf::core::{Layout, ShelfOptions};
use topshelf::crawler::Crawler;
use topshelf::network::{FetchError, FetchedResource, Fetcher};
use topshelf::utils::url::Url;
use topshelf::Book;

pub const SITE: &str = "http://example.com";

/// In-memory site; every request is counted per URL
#[derive(Clone, Default)]
pub struct MockSite {
    pages: HashMap<String, (String, Vec<u8>)>,
    requests: Rc<RefCell<HashMap<String, usize>>>,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page under `SITE`
    pub fn page(mut self, path: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.pages
            .insert(format!("{SITE}{path}"), (content_type.to_string(), body.into()));
        self
    }

    pub fn html(self, path: &str, body: &str) -> Self {
        self.page(path, "text/html; charset=utf-8", body)
    }

    /// Number of requests made for `path`
    pub fn requests(&self, path: &str) -> usize {
        self.requests
            .borrow()
            .get(&format!("{SITE}{path}"))
            .copied()
            .unwrap_or(0)
    }
}

impl Fetcher for MockSite {
    fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        *self
            .requests
            .borrow_mut()
            .entry(url.to_string())
            .or_insert(0) += 1;

        match self.pages.get(url.as_str()) {
            Some((content_type, body)) => Ok(FetchedResource::new(content_type, body.clone())),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub fn url(path: &str) -> Url {
    Url::parse(&format!("{SITE}{path}")).unwrap()
}

pub fn raw_options() -> ShelfOptions {
    ShelfOptions {
        layout: Layout::Raw,
        ..Default::default()
    }
}

/// Crawls `roots` against `site` and returns the finished book
pub fn crawl(site: &MockSite, options: ShelfOptions, roots: &[&str]) -> (Book, bool) {
    let mut crawler = Crawler::new(options, Box::new(site.clone())).unwrap();
    let roots: Vec<Url> = roots.iter().map(|path| url(path)).collect();
    crawler.crawl(&roots);

    let had_errors = crawler.had_errors();
    (crawler.into_book().unwrap(), had_errors)
}

/// Serialized content of an archive entry
pub fn content(book: &Book, name: &str) -> String {
    let resource = book
        .resource(name)
        .unwrap_or_else(|| panic!("{name} is not in the book"));
    String::from_utf8(resource.data.clone()).unwrap()
}

/// Table of contents as `(depth, file, title)` in reading order
pub fn toc(book: &Book) -> Vec<(usize, String, String)> {
    book.navigation
        .pre_order()
        .into_iter()
        .map(|(depth, point)| (depth, point.file.clone(), point.title.clone()))
        .collect()
}

//! # 抓取调度
//!
//! 深度优先地遍历页面树：下载、命名、分类、解析、过滤并写入 `Book`。
//!
//! The walk is a plain recursive descent. Each document parse saves the
//! navigation insertion point and restores it on the way out; following a
//! link in raw layout bumps the recursion counter for exactly the duration
//! of that nested parse.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::book::metadata::Metadata;
use crate::book::Book;
use crate::core::{
    detect_media_type_by_file_name, is_html_media_type, parse_content_type, print_info_message,
    Layout, ShelfError, ShelfOptions, DEFAULT_USER_AGENT, XHTML_MEDIA_TYPE,
};
use crate::network::{Fetcher, HttpFetcher, Session, UrlFilter};
use crate::parsers::html::dom::html_to_dom;
use crate::parsers::html::layout::{
    detect_author, page_title, prepend_submission, prune_page_chrome, submission_span,
    submission_text, taxonomy_tags, take_book_navigation,
};
use crate::parsers::html::links::{follow_links, rewrite_images};
use crate::parsers::html::metadata::get_charset;
use crate::parsers::html::sanitizer::{attribution_paragraph, sanitize_document, Child, SanitizePolicy};
use crate::parsers::html::serializer::serialize_document;
use crate::parsers::text::text_to_html;
use crate::utils::url::{clean_url, resolve_url, url_basename, Url};

/// What to do with a location
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ParseMode {
    /// Parse markup (and register the name as a document)
    parse: bool,
    /// Store the result in the book
    output: bool,
    /// Record non-document resources in the table of contents
    toc: bool,
}

impl ParseMode {
    const DOCUMENT: ParseMode = ParseMode {
        parse: true,
        output: true,
        toc: true,
    };
    const RESOURCE: ParseMode = ParseMode {
        parse: false,
        output: true,
        toc: false,
    };
    const SKIPPED: ParseMode = ParseMode {
        parse: true,
        output: false,
        toc: true,
    };
}

pub struct Crawler {
    options: ShelfOptions,
    session: Session,
    book: Book,
    replacements: Vec<(Regex, String)>,
    policy: SanitizePolicy,
    // Document name -> whether its content went into the book
    visited: HashMap<String, bool>,
    recursion_index: usize,
    started_at: DateTime<Utc>,
}

impl Crawler {
    pub fn new(options: ShelfOptions, fetcher: Box<dyn Fetcher>) -> Result<Crawler, ShelfError> {
        let filter = UrlFilter::new(options.accept.as_deref(), options.reject.as_deref())?;

        let replacements = options
            .replacements
            .iter()
            .map(|replacement| {
                Regex::new(&replacement.search)
                    .map(|re| (re, replacement.replace.clone()))
                    .map_err(|source| ShelfError::InvalidPattern {
                        pattern: replacement.search.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Reject unknown metadata keys before any download happens
        Metadata::default().apply_overrides(&options.metadata)?;

        Ok(Crawler {
            session: Session::new(fetcher, filter),
            book: Book::new(),
            replacements,
            policy: SanitizePolicy::portable(),
            visited: HashMap::new(),
            recursion_index: 0,
            started_at: Utc::now(),
            options,
        })
    }

    /// Crawler downloading over HTTP(S) and from local files
    pub fn with_http(options: ShelfOptions) -> Result<Crawler, ShelfError> {
        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let fetcher = HttpFetcher::new(&user_agent, options.timeout)?;
        Crawler::new(options, Box::new(fetcher))
    }

    pub fn with_policy(mut self, policy: SanitizePolicy) -> Crawler {
        self.policy = policy;
        self
    }

    pub fn options(&self) -> &ShelfOptions {
        &self.options
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    /// True once any download failed
    pub fn had_errors(&self) -> bool {
        self.session.had_errors()
    }

    /// Walks every root in order; with `skip_first` the first root is parsed
    /// for its links but not stored
    pub fn crawl(&mut self, urls: &[Url]) {
        for (i, url) in urls.iter().enumerate() {
            let mode = if i == 0 && self.options.skip_first {
                ParseMode::SKIPPED
            } else {
                ParseMode::DOCUMENT
            };
            self.parse_url_with(url, mode);
        }
    }

    /// Adds a document (and whatever it leads to) to the book
    ///
    /// Returns the archive name, or `None` when the location was rejected or
    /// could not be downloaded.
    pub fn parse_url(&mut self, url: &Url) -> Option<String> {
        self.parse_url_with(url, ParseMode::DOCUMENT)
    }

    /// Stores a resource without parsing it or listing it in the table of
    /// contents
    pub fn fetch_resource(&mut self, url: &Url) -> Option<String> {
        self.parse_url_with(url, ParseMode::RESOURCE)
    }

    pub fn recursion_allowed(&self) -> bool {
        self.options
            .recursion_limit
            .map_or(true, |limit| self.recursion_index < limit)
    }

    pub fn recursion_index(&self) -> usize {
        self.recursion_index
    }

    /// Runs `f` one recursion level deeper
    pub fn descend<T>(&mut self, f: impl FnOnce(&mut Crawler) -> T) -> T {
        self.recursion_index += 1;
        let result = f(self);
        self.recursion_index -= 1;
        result
    }

    /// Finishes the run: fills metadata defaults and applies the overrides
    pub fn into_book(self) -> Result<Book, ShelfError> {
        let mut book = self.book;
        book.metadata.fill_defaults(&self.started_at);
        book.metadata.apply_overrides(&self.options.metadata)?;
        Ok(book)
    }

    fn parse_url_with(&mut self, url: &Url, mode: ParseMode) -> Option<String> {
        let url = clean_url(url);

        if mode.output && !self.session.allows(&url) {
            info!("Don't download:   {}", url);
            return None;
        }
        if mode.output {
            self.book.metadata.note_ident(url.as_str());
        }

        let Some(fetched) = self.session.retrieve(&url) else {
            info!("Fail to download: {}", url);
            return None;
        };

        let (mut media_type, mut charset) = parse_content_type(&fetched.content_type);
        let mut data = fetched.data;
        let mut is_html = is_html_media_type(&media_type);

        if mode.parse && fetched.content_type == "text/plain" {
            let text = String::from_utf8_lossy(&data).into_owned();
            data = text_to_html(&text, &url_basename(&url)).into_bytes();
            media_type = "text/html".to_string();
            charset = "utf-8".to_string();
            is_html = true;
        }

        let suffix = mode
            .parse
            .then_some(self.options.document_extension.as_deref())
            .flatten();
        let name = self
            .book
            .registry
            .resolve_with_suffix(&url, mode.parse, suffix);

        if mode.parse && is_html {
            match self.visited.get(&name) {
                Some(&stored) if stored || !mode.output => {
                    debug!("Use file      {}", name);
                    return Some(name);
                }
                _ => {}
            }
            self.visited.insert(name.clone(), mode.output);

            if mode.output {
                info!("Process file  {}:\t{}", name, url);
            } else {
                info!("Process file* {}:\t{}", name, url);
            }

            let markup = self.prefilter(decode_markup(&data, &charset));
            let dom = html_to_dom(markup.as_bytes(), "utf-8");
            let content = self.parse_document(dom, &name, &url, mode.output);

            if mode.output && !self.book.contains(&name) {
                self.book
                    .add_resource(&name, url.as_str(), XHTML_MEDIA_TYPE, content);
            }
        } else if self.book.contains(&name) {
            debug!("Use file      {}", name);
        } else if mode.output {
            info!("Download file {}:\t{}", name, url);

            if mode.toc {
                self.book.navigation.record_leaf(&name, &name);
            }
            if media_type.is_empty() {
                media_type = detect_media_type_by_file_name(&name);
            }
            self.book.add_resource(&name, url.as_str(), &media_type, data);
        }

        Some(name)
    }

    /// Applies the configured substitutions to raw markup
    fn prefilter(&self, mut markup: String) -> String {
        if self.replacements.is_empty() {
            return markup;
        }

        for (search, replace) in &self.replacements {
            markup = search.replace_all(&markup, replace.as_str()).into_owned();
        }

        if self.options.show_replaced {
            print_info_message("== code ==");
            print_info_message(&markup);
            print_info_message("== /code ==");
        }

        markup
    }

    /// Turns a parsed page into serialized XHTML, leaving the navigation
    /// insertion point as it found it
    fn parse_document(&mut self, dom: RcDom, name: &str, url: &Url, output: bool) -> Vec<u8> {
        let mark = self.book.navigation.mark();

        let content = match self.options.layout {
            Layout::Raw => self.process_raw(dom, name, url, output),
            Layout::Structured => self.process_structured(dom, name, url, output),
        };

        self.book.navigation.restore(mark);
        content
    }

    fn document_title(&self, dom: &RcDom, name: &str, suffixes: &[String]) -> String {
        page_title(&dom.document, suffixes).unwrap_or_else(|| {
            name.rsplit('/').next().unwrap_or(name).to_string()
        })
    }

    fn process_raw(&mut self, dom: RcDom, name: &str, url: &Url, output: bool) -> Vec<u8> {
        let title = self.document_title(&dom, name, &[]);

        let section = output.then(|| {
            self.book.metadata.note_title(&title);
            self.book.navigation.begin_section(name, &title)
        });

        follow_links(self, &dom.document, url, name, true);
        rewrite_images(self, &dom.document, url, name);

        if let Some(section) = section {
            self.book.navigation.end_section(section);
        }

        self.finish_document(&dom, url)
    }

    fn process_structured(&mut self, dom: RcDom, name: &str, url: &Url, output: bool) -> Vec<u8> {
        let title = self.document_title(&dom, name, &self.options.title_suffixes);
        let submitted = submission_span(&dom.document);
        let submitted_text = submitted.as_ref().and_then(submission_text);

        let section = output.then(|| {
            self.book.metadata.note_title(&title);
            self.book.navigation.begin_section(name, &title)
        });

        if output {
            for tag in taxonomy_tags(&dom.document) {
                self.book.metadata.add_subject(&tag);
            }
            if self.book.metadata.creator.is_none() {
                if let Some(author) = detect_author(&self.book.metadata.subject, submitted.as_ref()) {
                    self.book.metadata.note_creator(&author);
                }
            }
        }

        prune_page_chrome(&dom.document);
        if let Some(hrefs) = take_book_navigation(&dom.document) {
            for href in hrefs {
                match resolve_url(url, &href) {
                    Some(target) => {
                        self.parse_url(&target);
                    }
                    None => warn!("cannot resolve book navigation link \"{}\" in {}", href, url),
                }
            }
        }

        if let Some(text) = submitted_text {
            prepend_submission(&dom, &text);
        }

        follow_links(self, &dom.document, url, name, false);
        rewrite_images(self, &dom.document, url, name);

        if let Some(section) = section {
            self.book.navigation.end_section(section);
        }

        self.finish_document(&dom, url)
    }

    /// Sanitizes, appends the provenance footer and serializes
    fn finish_document(&self, dom: &RcDom, url: &Url) -> Vec<u8> {
        let (mut html, report) = sanitize_document(&dom.document, &self.policy);
        if !report.is_empty() {
            debug!(
                "sanitized {}: dropped tags {:?}, dropped attributes {:?}",
                url, report.dropped_tags, report.dropped_attributes
            );
        }

        if let Some(body) = html.child_mut("body") {
            body.children
                .push(Child::Element(attribution_paragraph(url.as_str())));
        }

        serialize_document(&html)
    }
}

/// Decodes page bytes, preferring the charset of the response header over
/// the one declared in the markup
fn decode_markup(data: &[u8], header_charset: &str) -> String {
    let mut charset = header_charset.to_string();

    if charset.is_empty() {
        let dom = html_to_dom(data, "utf-8");
        charset = get_charset(&dom.document).unwrap_or_default();
    }

    match Encoding::for_label(charset.trim().as_bytes()) {
        Some(encoding) => encoding.decode(data).0.into_owned(),
        None => String::from_utf8_lossy(data).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{FetchError, FetchedResource};

    struct SinglePage;

    impl Fetcher for SinglePage {
        fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
            match url.path() {
                "/page" => Ok(FetchedResource::new(
                    "text/html",
                    "<title>Page</title><p>Hello</p><script>x()</script>",
                )),
                "/notes.txt" => Ok(FetchedResource::new("text/plain", "Some _notes_.")),
                _ => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn crawler(options: ShelfOptions) -> Crawler {
        Crawler::new(options, Box::new(SinglePage)).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_descend_restores_counter() {
        let mut crawler = crawler(ShelfOptions {
            recursion_limit: Some(1),
            ..Default::default()
        });
        assert!(crawler.recursion_allowed());

        let inside = crawler.descend(|c| (c.recursion_index(), c.recursion_allowed()));
        assert_eq!(inside, (1, false));
        assert_eq!(crawler.recursion_index(), 0);
    }

    #[test]
    fn test_single_document() {
        let mut crawler = crawler(ShelfOptions::default());
        crawler.crawl(&[url("http://example.com/page")]);
        assert!(!crawler.had_errors());

        let book = crawler.into_book().unwrap();
        let resource = book.resource("content/page").unwrap();
        let text = String::from_utf8(resource.data.clone()).unwrap();

        assert_eq!(resource.content_type, XHTML_MEDIA_TYPE);
        assert!(text.contains("<p>Hello</p>"));
        assert!(!text.contains("x()"));
        assert!(text.contains("Downloaded from: <a href=\"http://example.com/page\">"));
        assert_eq!(book.metadata.get("title"), "Page");
        assert_eq!(book.metadata.get("ident"), "http://example.com/page");
        assert!(book.navigation.is_balanced());
    }

    #[test]
    fn test_plain_text_is_upgraded() {
        let mut crawler = crawler(ShelfOptions::default());
        crawler.crawl(&[url("http://example.com/notes.txt")]);

        let book = crawler.into_book().unwrap();
        let resource = book.resource("content/notes.txt").unwrap();
        let text = String::from_utf8(resource.data.clone()).unwrap();
        assert!(text.contains("<h1>notes.txt</h1>"));
        assert!(text.contains("<em>notes</em>"));
    }

    #[test]
    fn test_failed_root_flags_run() {
        let mut crawler = crawler(ShelfOptions::default());
        crawler.crawl(&[url("http://example.com/missing")]);

        assert!(crawler.had_errors());
        assert!(crawler.book().resources().is_empty());
    }

    #[test]
    fn test_bad_options_are_rejected_up_front() {
        let bad_pattern = ShelfOptions {
            reject: Some("(".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Crawler::new(bad_pattern, Box::new(SinglePage)),
            Err(ShelfError::InvalidPattern { .. })
        ));

        let mut bad_metadata = ShelfOptions::default();
        bad_metadata
            .metadata
            .insert("colour".to_string(), "red".to_string());
        assert!(matches!(
            Crawler::new(bad_metadata, Box::new(SinglePage)),
            Err(ShelfError::Config(_))
        ));
    }

    #[test]
    fn test_decode_markup_uses_declared_charset() {
        let data = b"<meta charset='windows-1252'><p>caf\xe9</p>";
        assert!(decode_markup(data, "").contains("café"));
        assert!(decode_markup("<p>café</p>".as_bytes(), "utf-8").contains("café"));
    }
}

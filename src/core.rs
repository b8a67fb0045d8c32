use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::network::fetcher::FetchError;
use crate::utils::url::{url_basename, Url};

/// Represents errors that can occur while building an e-book
///
/// Per-document failures never show up here: they are logged, flag the run
/// as errored and the crawl goes on. Only configuration problems and a
/// failure to write the final archive are reported through this type.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("invalid URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("cannot write {}: {source}", path.display())]
    UnwritableOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("some files could not be downloaded")]
    IncompleteBook,
}

/// How downloaded pages are interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Book pages: chapters are found through the page's book navigation,
    /// submission details and taxonomy feed the e-book metadata (default)
    #[default]
    Structured,
    /// Any HTML: every link is followed recursively
    Raw,
}

/// A regular expression substitution applied to raw markup before parsing
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Replacement {
    pub search: String,
    pub replace: String,
}

/// Configuration options for an e-book run
///
/// Options can be read from a TOML file; command line flags are applied on
/// top of whatever the file sets.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ShelfOptions {
    pub layout: Layout,
    pub accept: Option<String>,
    pub reject: Option<String>,
    pub recursion_limit: Option<usize>,
    pub replacements: Vec<Replacement>,
    pub show_replaced: bool,
    pub metadata: BTreeMap<String, String>,
    pub document_extension: Option<String>,
    pub title_suffixes: Vec<String>,
    pub user_agent: Option<String>,
    pub timeout: u64,
    pub ignore_errors: bool,
    pub skip_first: bool,
}

impl Default for ShelfOptions {
    fn default() -> Self {
        ShelfOptions {
            layout: Layout::default(),
            accept: None,
            reject: None,
            recursion_limit: None,
            replacements: vec![],
            show_replaced: false,
            metadata: BTreeMap::new(),
            document_extension: None,
            title_suffixes: DEFAULT_TITLE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            user_agent: None,
            timeout: DEFAULT_NETWORK_TIMEOUT,
            ignore_errors: false,
            skip_first: false,
        }
    }
}

impl ShelfOptions {
    pub fn from_toml_str(s: &str) -> Result<ShelfOptions, ShelfError> {
        toml::from_str(s).map_err(|e| ShelfError::Config(format!("cannot parse options: {e}")))
    }

    pub fn from_toml_file(path: &Path) -> Result<ShelfOptions, ShelfError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ShelfError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }
}

pub const DEFAULT_NETWORK_TIMEOUT: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = concat!("topshelf/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TITLE_SUFFIXES: &[&str] = &[" | TopShelf", " | BigCloset TopShelf"];
pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Determines the media type based on file extension
pub fn detect_media_type_by_file_name(filename: &str) -> String {
    let filename_lowercased = filename.to_lowercase();

    if filename_lowercased.ends_with(".html") || filename_lowercased.ends_with(".htm") {
        "text/html".to_string()
    } else if filename_lowercased.ends_with(".xhtml") {
        XHTML_MEDIA_TYPE.to_string()
    } else if filename_lowercased.ends_with(".txt") {
        "text/plain".to_string()
    } else if filename_lowercased.ends_with(".css") {
        "text/css".to_string()
    } else if filename_lowercased.ends_with(".svg") {
        "image/svg+xml".to_string()
    } else if filename_lowercased.ends_with(".png") {
        "image/png".to_string()
    } else if filename_lowercased.ends_with(".jpg") || filename_lowercased.ends_with(".jpeg") {
        "image/jpeg".to_string()
    } else if filename_lowercased.ends_with(".gif") {
        "image/gif".to_string()
    } else if filename_lowercased.ends_with(".webp") {
        "image/webp".to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

/// Parses Content-Type header value into media type and charset
pub fn parse_content_type(content_type: &str) -> (String, String) {
    let mut parts = content_type.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_lowercase();
    let mut charset = String::new();

    for part in parts {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("charset=") {
            charset = value.trim_matches('"').to_string();
        }
    }

    (media_type, charset)
}

/// Checks if the given media type is markup the crawler rewrites
pub fn is_html_media_type(media_type: &str) -> bool {
    media_type.starts_with("text/html") || media_type.starts_with("application/xhtml")
}

/// Returns the top-level category of a content type ("text" for "text/html")
pub fn media_type_category(content_type: &str) -> &str {
    content_type
        .split_once('/')
        .map_or(content_type, |(category, _)| category)
        .trim()
}

/// Reduces a string to alphanumerics joined by single underscores
pub fn make_filename(s: &str) -> String {
    let mut result = String::new();

    for c in s.chars() {
        if c.is_alphanumeric() {
            result.push(c);
        } else if !result.is_empty() && !result.ends_with('_') {
            result.push('_');
        }
    }

    result
}

/// Picks the archive file name used when none was given
///
/// `Author-Title.epub` when both are known, `Title.epub` otherwise; the last
/// path segment of the first URL stands in for a missing title.
pub fn default_output_file_name(author: Option<&str>, title: Option<&str>, first_url: &Url) -> String {
    let author = make_filename(author.unwrap_or_default());
    let mut title = make_filename(title.unwrap_or_default());

    if title.is_empty() {
        title = url_basename(first_url);
    }
    if title.is_empty() {
        title = "book".to_string();
    }

    if author.is_empty() {
        format!("{title}.epub")
    } else {
        format!("{author}-{title}.epub")
    }
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_media_type_by_file_name_common_types() {
        assert_eq!(detect_media_type_by_file_name("index.html"), "text/html");
        assert_eq!(detect_media_type_by_file_name("notes.txt"), "text/plain");
        assert_eq!(detect_media_type_by_file_name("image.png"), "image/png");
        assert_eq!(detect_media_type_by_file_name("photo.JPG"), "image/jpeg");
        assert_eq!(
            detect_media_type_by_file_name("file.unknown"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_parse_content_type_basic() {
        let (media_type, charset) = parse_content_type("text/html");
        assert_eq!(media_type, "text/html");
        assert_eq!(charset, "");
    }

    #[test]
    fn test_parse_content_type_with_charset() {
        let (media_type, charset) = parse_content_type("Text/HTML; charset=\"ISO-8859-1\"");
        assert_eq!(media_type, "text/html");
        assert_eq!(charset, "ISO-8859-1");
    }

    #[test]
    fn test_is_html_media_type() {
        assert!(is_html_media_type("text/html"));
        assert!(is_html_media_type("application/xhtml+xml"));
        assert!(!is_html_media_type("text/plain"));
        assert!(!is_html_media_type("image/png"));
    }

    #[test]
    fn test_media_type_category() {
        assert_eq!(media_type_category("application/xhtml+xml"), "application");
        assert_eq!(media_type_category("image/png"), "image");
        assert_eq!(media_type_category("text"), "text");
    }

    #[test]
    fn test_make_filename() {
        assert_eq!(make_filename("Jane Doe"), "Jane_Doe");
        assert_eq!(make_filename("  A -- tale!"), "A_tale_");
        assert_eq!(make_filename(""), "");
    }

    #[test]
    fn test_default_output_file_name() {
        let url = Url::parse("http://example.com/book/my-story").unwrap();
        assert_eq!(
            default_output_file_name(Some("Jane Doe"), Some("A Tale"), &url),
            "Jane_Doe-A_Tale.epub"
        );
        assert_eq!(default_output_file_name(None, Some("A Tale"), &url), "A_Tale.epub");
        assert_eq!(default_output_file_name(None, None, &url), "my-story.epub");
    }

    #[test]
    fn test_options_from_toml() {
        let options = ShelfOptions::from_toml_str(
            r#"
            layout = "raw"
            reject = "logout"
            recursion_limit = 2

            [[replacements]]
            search = "<br><br>"
            replace = "</p><p>"

            [metadata]
            lang = "fr"
            "#,
        )
        .unwrap();

        assert_eq!(options.layout, Layout::Raw);
        assert_eq!(options.reject.as_deref(), Some("logout"));
        assert_eq!(options.recursion_limit, Some(2));
        assert_eq!(options.replacements.len(), 1);
        assert_eq!(options.metadata.get("lang").map(String::as_str), Some("fr"));
        assert_eq!(options.timeout, DEFAULT_NETWORK_TIMEOUT);
        assert_eq!(options.title_suffixes.len(), 2);
    }

    #[test]
    fn test_options_from_bad_toml() {
        assert!(matches!(
            ShelfOptions::from_toml_str("layout = 3"),
            Err(ShelfError::Config(_))
        ));
    }
}

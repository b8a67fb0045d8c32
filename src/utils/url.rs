use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

pub use url::Url;

/// Characters escaped when an archive path is written into an href
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Resolves a possibly relative reference against a document URL
pub fn resolve_url(from: &Url, to: &str) -> Option<Url> {
    from.join(to.trim()).ok()
}

/// Returns the URL without its fragment
pub fn clean_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// Checks whether two URLs point at the same document, fragments ignored
pub fn is_same_document(a: &Url, b: &Url) -> bool {
    clean_url(a) == clean_url(b)
}

/// Last non-empty path segment of a URL, percent-decoded
pub fn url_basename(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();

    percent_decode_str(segment).decode_utf8_lossy().to_string()
}

/// Expresses an archive path relative to the directory of another archive path
///
/// Paths sharing the document's directory lose that prefix; anything else
/// climbs one level per separator in the document path.
pub fn relative_path(target: &str, document: &str) -> String {
    let directory = match document.rfind('/') {
        Some(i) => &document[..=i],
        None => "",
    };

    if let Some(stripped) = target.strip_prefix(directory) {
        stripped.to_string()
    } else {
        format!("{}{}", "../".repeat(document.matches('/').count()), target)
    }
}

/// Percent-encodes an archive path for use in href/src attributes
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("http://example.com/book/chapter-1").unwrap();
        assert_eq!(
            resolve_url(&base, "chapter-2").unwrap().as_str(),
            "http://example.com/book/chapter-2"
        );
        assert_eq!(
            resolve_url(&base, " /img/a.png ").unwrap().as_str(),
            "http://example.com/img/a.png"
        );
    }

    #[test]
    fn test_is_same_document() {
        let a = Url::parse("http://example.com/page#top").unwrap();
        let b = Url::parse("http://example.com/page").unwrap();
        let c = Url::parse("http://example.com/other").unwrap();
        assert!(is_same_document(&a, &b));
        assert!(!is_same_document(&a, &c));
    }

    #[test]
    fn test_url_basename() {
        let url = Url::parse("http://example.com/a/b/page%20one.html?x=1").unwrap();
        assert_eq!(url_basename(&url), "page one.html");

        let url = Url::parse("http://example.com/a/b/").unwrap();
        assert_eq!(url_basename(&url), "b");

        let url = Url::parse("http://example.com/").unwrap();
        assert_eq!(url_basename(&url), "");
    }

    #[test]
    fn test_relative_path_same_directory() {
        assert_eq!(
            relative_path("content/resources/a.png", "content/page"),
            "resources/a.png"
        );
        assert_eq!(relative_path("content/other", "content/page"), "other");
    }

    #[test]
    fn test_relative_path_climbs() {
        assert_eq!(relative_path("content/page", "toc.ncx"), "content/page");
        assert_eq!(
            relative_path("content/page", "content/resources/x.html"),
            "../../content/page"
        );
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("content/page one?.html"), "content/page%20one%3F.html");
        assert_eq!(encode_path("content/resources/a.png"), "content/resources/a.png");
    }
}

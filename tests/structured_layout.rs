// 书籍页面布局测试
//
// Structured layout: child pages come from the book navigation block,
// everything else is made absolute.

mod common;

use common::{content, crawl, toc, MockSite};
use topshelf::core::ShelfOptions;

const STORY: &str = r#"<html><head><title>The Story | TopShelf</title></head><body>
<div id="header">Site header <a href="/login">Log in</a></div>
<span class="submitted">Submitted by <a href="/user/7" title="View user profile.">Jane Doe</a> on 1 May</span>
<span class="taxonomy"><a href="/t/1" rel="tag">New Author</a> <a href="/t/2" rel="tag">Fantasy</a></span>
<span class="print-link"></span>
<p>Story intro with a <a href="/elsewhere">link</a>.</p>
<div class="book-navigation"><ul>
<li class="collapsed"><a href="/book/part-2">Part 2</a></li>
<li class="leaf"><a href="/book/part-1">Part 1</a></li>
</ul></div>
<div id="footer">Site footer</div>
</body></html>"#;

const PART_ONE: &str = r#"<html><head><title>Part 1 | TopShelf</title></head><body>
<div class="content"><p>First part.</p>
<font>Rate this</font><div class="vote-wrap">vote</div></div>
<div id="comments">Comments</div>
</body></html>"#;

const PART_TWO: &str = r#"<html><head><title>Part 2 | BigCloset TopShelf</title></head><body>
<span class="taxonomy"><a href="/t/3" rel="tag">Romance</a></span>
<div class="content"><p>Second part.</p></div>
</body></html>"#;

fn site() -> MockSite {
    MockSite::new()
        .html("/book/story", STORY)
        .html("/book/part-1", PART_ONE)
        .html("/book/part-2", PART_TWO)
}

#[test]
fn test_navigation_children_become_sections() {
    let site = site();
    let (book, had_errors) = crawl(&site, ShelfOptions::default(), &["/book/story"]);

    assert!(!had_errors);
    assert_eq!(
        toc(&book),
        [
            (1, "content/story".to_string(), "The Story".to_string()),
            (2, "content/part-1".to_string(), "Part 1".to_string()),
            (2, "content/part-2".to_string(), "Part 2".to_string()),
        ]
    );
    assert_eq!(book.metadata.get("title"), "The Story");
}

#[test]
fn test_other_links_are_absolute_and_not_followed() {
    let site = site();
    let (book, _) = crawl(&site, ShelfOptions::default(), &["/book/story"]);

    let story = content(&book, "content/story");
    assert!(story.contains(r#"href="http://example.com/elsewhere""#));
    assert_eq!(site.requests("/elsewhere"), 0);
    assert_eq!(site.requests("/user/7"), 0);
}

#[test]
fn test_page_chrome_is_removed() {
    let site = site();
    let (book, _) = crawl(&site, ShelfOptions::default(), &["/book/story"]);

    let story = content(&book, "content/story");
    assert!(story.contains("Story intro"));
    assert!(!story.contains("Site header"));
    assert!(!story.contains("Site footer"));
    assert!(!story.contains("Part 2"));

    let part = content(&book, "content/part-1");
    assert!(part.contains("First part."));
    assert!(!part.contains("Rate this"));
    assert!(!part.contains("vote"));
    assert!(!part.contains("Comments"));
}

#[test]
fn test_submission_line_opens_the_page() {
    let site = site();
    let (book, _) = crawl(&site, ShelfOptions::default(), &["/book/story"]);

    let story = content(&book, "content/story");
    let submitted = story
        .find("<em>Submitted by Jane Doe on 1 May</em>")
        .expect("submission line");
    let intro = story.find("Story intro").unwrap();
    assert!(submitted < intro);

    assert!(!content(&book, "content/part-1").contains("<em>"));
}

#[test]
fn test_author_and_tags() {
    let site = site();
    let (book, _) = crawl(&site, ShelfOptions::default(), &["/book/story"]);

    assert_eq!(book.metadata.get("creator"), "Jane Doe");
    assert_eq!(book.metadata.get("subject"), "New Author, Fantasy, Romance");
}

#[test]
fn test_footer_names_the_source() {
    let site = site();
    let (book, _) = crawl(&site, ShelfOptions::default(), &["/book/story"]);

    let part = content(&book, "content/part-2");
    assert!(part.contains(
        r#"Downloaded from: <a href="http://example.com/book/part-2">http://example.com/book/part-2</a>"#
    ));
}

//! Table of contents built while the crawl discovers documents
//!
//! Entries are appended at the current insertion point. Opening a section
//! makes the new entry the insertion point until the section is closed, so
//! pages discovered while a page is processed end up as its children.

/// One table of contents entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavPoint {
    pub file: String,
    pub title: String,
    pub children: Vec<NavPoint>,
}

impl NavPoint {
    pub fn new(file: &str, title: &str) -> NavPoint {
        NavPoint {
            file: file.to_string(),
            title: title.to_string(),
            children: vec![],
        }
    }

    /// Nesting levels at and below this entry (a leaf counts 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(NavPoint::depth).max().unwrap_or(0)
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(NavPoint::count).sum::<usize>()
    }
}

/// Returned by [`NavigationTree::begin_section`]; closing it restores the
/// insertion point that was active when the section was opened
#[must_use = "a section stays open until passed to end_section"]
#[derive(Debug)]
pub struct SectionHandle {
    depth: usize,
}

/// Snapshot of the insertion point, see [`NavigationTree::restore`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavMark(usize);

#[derive(Debug, Default)]
pub struct NavigationTree {
    roots: Vec<NavPoint>,
    // Child indices leading from the roots to the open section
    cursor: Vec<usize>,
}

impl NavigationTree {
    pub fn new() -> NavigationTree {
        NavigationTree::default()
    }

    fn insertion_point(&mut self) -> &mut Vec<NavPoint> {
        let mut level = &mut self.roots;
        for &index in &self.cursor {
            level = &mut level[index].children;
        }
        level
    }

    pub fn begin_section(&mut self, file: &str, title: &str) -> SectionHandle {
        let depth = self.cursor.len();
        let level = self.insertion_point();
        level.push(NavPoint::new(file, title));
        let index = level.len() - 1;
        self.cursor.push(index);

        SectionHandle { depth }
    }

    /// Closes `handle` along with any section opened inside it and left open
    pub fn end_section(&mut self, handle: SectionHandle) {
        self.cursor.truncate(handle.depth);
    }

    pub fn record_leaf(&mut self, file: &str, title: &str) {
        self.insertion_point().push(NavPoint::new(file, title));
    }

    pub fn mark(&self) -> NavMark {
        NavMark(self.cursor.len())
    }

    pub fn restore(&mut self, mark: NavMark) {
        self.cursor.truncate(mark.0);
    }

    /// True when no section is open
    pub fn is_balanced(&self) -> bool {
        self.cursor.is_empty()
    }

    pub fn roots(&self) -> &[NavPoint] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of entries in the whole tree
    pub fn len(&self) -> usize {
        self.roots.iter().map(NavPoint::count).sum()
    }

    /// Longest chain of nested entries; root entries are level 1
    pub fn depth(&self) -> usize {
        self.roots.iter().map(NavPoint::depth).max().unwrap_or(0)
    }

    /// Entries in reading order, each with its nesting level
    pub fn pre_order(&self) -> Vec<(usize, &NavPoint)> {
        fn visit<'a>(point: &'a NavPoint, level: usize, out: &mut Vec<(usize, &'a NavPoint)>) {
            out.push((level, point));
            for child in &point.children {
                visit(child, level + 1, out);
            }
        }

        let mut out = Vec::new();
        for root in &self.roots {
            visit(root, 1, &mut out);
        }
        out
    }
}

//! EPUB 2 package documents
//!
//! Renders the container descriptor, the OPF package (metadata, manifest,
//! spine) and the NCX navigation document from a finished [`Book`].

use std::collections::HashSet;

use crate::book::navigation::NavPoint;
use crate::book::Book;
use crate::core::media_type_category;
use crate::utils::url::encode_path;
use crate::utils::xml::{escape_attribute, escape_text};

pub const MIMETYPE: &str = "application/epub+zip";
pub const MIMETYPE_PATH: &str = "mimetype";
pub const CONTAINER_PATH: &str = "META-INF/container.xml";
pub const OPF_PATH: &str = "metadata.opf";
pub const NCX_PATH: &str = "toc.ncx";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Top-level content types that belong in the reading order
const SPINE_CATEGORIES: &[&str] = &["text", "application"];

/// The three generated documents of a package
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPackage {
    pub container: String,
    pub opf: String,
    pub ncx: String,
}

pub fn render(book: &Book) -> RenderedPackage {
    RenderedPackage {
        container: render_container(),
        opf: render_opf(book),
        ncx: render_ncx(book),
    }
}

pub fn render_container() -> String {
    format!(
        r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{OPF_PATH}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#
    )
}

fn render_metadata(book: &Book) -> String {
    let field = |name: &str| escape_text(&book.metadata.get(name));

    format!(
        r#"  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"
      xmlns:dcterms="http://purl.org/dc/terms/"
      xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
      xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>{}</dc:title>
    <dc:language xsi:type="dcterms:RFC3066">{}</dc:language>
    <dc:identifier id="dcidid" opf:scheme="URI">{}</dc:identifier>
    <dc:subject>{}</dc:subject>
    <dc:description>{}</dc:description>
    <dc:relation>{}</dc:relation>
    <dc:creator>{}</dc:creator>
    <dc:publisher>{}</dc:publisher>
    <dc:date xsi:type="dcterms:W3CDTF">{}</dc:date>
    <dc:rights>{}</dc:rights>
  </metadata>"#,
        field("title"),
        field("lang"),
        field("ident"),
        field("subject"),
        field("description"),
        field("relation"),
        field("creator"),
        field("publisher"),
        field("date"),
        field("rights"),
    )
}

fn render_manifest(book: &Book) -> String {
    let mut manifest = String::from("  <manifest>\n");
    manifest.push_str(&format!(
        "    <item id=\"ncx\" href=\"{NCX_PATH}\" media-type=\"{NCX_MEDIA_TYPE}\"/>\n"
    ));

    for resource in book.resources() {
        manifest.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
            resource.manifest_id(),
            escape_attribute(&encode_path(&resource.name)),
            escape_attribute(&resource.content_type),
        ));
    }

    manifest.push_str("  </manifest>\n");
    manifest
}

/// Manifest ids in reading order: navigation pre-order, restricted to
/// textual resources, each at most once
pub fn spine_ids(book: &Book) -> Vec<String> {
    let mut seen = HashSet::new();

    book.navigation
        .pre_order()
        .into_iter()
        .filter_map(|(_, point)| book.resource(&point.file))
        .filter(|resource| SPINE_CATEGORIES.contains(&media_type_category(&resource.content_type)))
        .map(|resource| resource.manifest_id())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

fn render_spine(book: &Book) -> String {
    let mut spine = String::from("  <spine toc=\"ncx\">\n");
    for id in spine_ids(book) {
        spine.push_str(&format!("    <itemref idref=\"{id}\"/>\n"));
    }
    spine.push_str("  </spine>\n");
    spine
}

pub fn render_opf(book: &Book) -> String {
    format!(
        r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="dcidid"
   version="2.0">

{}

{}

{}

</package>
"#,
        render_metadata(book),
        render_manifest(book),
        render_spine(book),
    )
}

fn render_nav_point(out: &mut String, point: &NavPoint, indent: usize, order: &mut usize) {
    let pad = "  ".repeat(indent);

    out.push_str(&format!(
        "{pad}<navPoint id=\"navPoint_{order}\" playOrder=\"{order}\">\n",
        order = *order
    ));
    out.push_str(&format!(
        "{pad}  <navLabel><text>{}</text></navLabel>\n",
        escape_text(&point.title)
    ));
    out.push_str(&format!(
        "{pad}  <content src=\"{}\"/>\n",
        escape_attribute(&encode_path(&point.file))
    ));
    *order += 1;

    for child in &point.children {
        render_nav_point(out, child, indent + 1, order);
    }

    out.push_str(&format!("{pad}</navPoint>\n"));
}

pub fn render_ncx(book: &Book) -> String {
    let mut nav_map = String::new();
    let mut order = 1;
    for root in book.navigation.roots() {
        render_nav_point(&mut nav_map, root, 2, &mut order);
    }

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1" xml:lang="en">
  <head>
    <meta name="dtb:uid" content="{}"/>
    <meta name="dtb:depth" content="{}"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{}</text></docTitle>
  <navMap>
{}  </navMap>
</ncx>
"#,
        escape_attribute(book.uid()),
        book.navigation.depth(),
        escape_text(&book.toc_title),
        nav_map,
    )
}

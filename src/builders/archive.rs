//! EPUB 容器打包
//!
//! The `mimetype` entry comes first and is stored uncompressed so readers
//! can sniff the format at a fixed offset; everything else is deflated.

use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

use chrono::{Datelike, Timelike, Utc};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::result::ZipError;
use zip::{CompressionMethod, ZipWriter};

use crate::book::Book;
use crate::core::ShelfError;

use super::package::{render, CONTAINER_PATH, MIMETYPE, MIMETYPE_PATH, NCX_PATH, OPF_PATH};

fn entry_options(method: CompressionMethod) -> SimpleFileOptions {
    let now = Utc::now();
    let options = SimpleFileOptions::default()
        .compression_method(method)
        .unix_permissions(0o644);

    match zip::DateTime::from_date_and_time(
        now.year() as u16,
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    ) {
        Ok(timestamp) => options.last_modified_time(timestamp),
        Err(_) => options,
    }
}

/// Writes the whole e-book into `writer`
pub fn write_archive<W: Write + Seek>(book: &Book, writer: W) -> Result<W, ShelfError> {
    let package = render(book);
    let mut zip = ZipWriter::new(writer);

    zip.start_file(MIMETYPE_PATH, entry_options(CompressionMethod::Stored))?;
    zip.write_all(MIMETYPE.as_bytes())?;

    for (path, content) in [
        (CONTAINER_PATH, &package.container),
        (OPF_PATH, &package.opf),
        (NCX_PATH, &package.ncx),
    ] {
        zip.start_file(path, entry_options(CompressionMethod::Deflated))?;
        zip.write_all(content.as_bytes())?;
    }

    for resource in book.resources() {
        zip.start_file(resource.name.as_str(), entry_options(CompressionMethod::Deflated))?;
        zip.write_all(&resource.data)?;
    }

    Ok(zip.finish()?)
}

/// Reports any write failure on `path` as [`ShelfError::UnwritableOutput`]
fn unwritable(path: &Path, error: ShelfError) -> ShelfError {
    let source = match error {
        ShelfError::Io(source) => source,
        ShelfError::Archive(ZipError::Io(source)) => source,
        ShelfError::Archive(other) => io::Error::other(other),
        other => return other,
    };

    ShelfError::UnwritableOutput {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes the e-book to `path`, replacing any existing file
pub fn write_archive_to_path(book: &Book, path: &Path) -> Result<(), ShelfError> {
    let written = File::create(path)
        .map_err(ShelfError::Io)
        .and_then(|file| write_archive(book, BufWriter::new(file)))
        .and_then(|mut writer| writer.flush().map_err(ShelfError::Io));
    written.map_err(|error| unwritable(path, error))?;

    info!("Wrote {} ({} files)", path.display(), book.resources().len());
    Ok(())
}

// crates/archive/src/lib.rs
//! Streaming tar.gz writing for deploy packages.
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Writes one gzip-compressed tar archive. Entry names are forward-slash
/// relative paths; no directory entries and no root entry are written.
pub struct ArchiveWriter<W: Write> {
    inner: tar::Builder<GzEncoder<W>>,
}

impl<W: Write> ArchiveWriter<W> {
    /// Wraps `writer` in a gzip encoder at the default compression level.
    pub fn new(writer: W) -> Self {
        let encoder = GzEncoder::new(writer, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.mode(tar::HeaderMode::Deterministic);
        Self { inner: builder }
    }

    /// Streams the file at `src` into the archive under `name`, without
    /// buffering the whole file or archive in memory.
    pub fn append_path(&mut self, src: &Path, name: &str) -> io::Result<()> {
        let mut file = File::open(src)?;
        self.inner.append_file(name, &mut file)
    }

    /// Finishes the tar stream and flushes the gzip trailer, returning the
    /// underlying writer.
    pub fn finish(self) -> io::Result<W> {
        let encoder = self.inner.into_inner()?;
        encoder.finish()
    }
}

// tests/logging.rs
use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use oc_pack::package_dir;
use tempfile::tempdir;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::with_default;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, writer::MakeWriter},
    layer::SubscriberExt,
};

#[derive(Clone, Default)]
struct VecWriter(Arc<Mutex<Vec<u8>>>);

struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

impl Write for VecWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for VecWriter {
    type Writer = VecWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        VecWriterGuard(self.0.clone())
    }
}

#[test]
fn packaging_emits_load_prune_and_summary_events() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join("vendor")).unwrap();
    fs::write(root.join("vendor/lib.php"), b"lib").unwrap();
    fs::write(root.join("app.php"), b"<?php").unwrap();
    fs::write(root.join(".gitignore"), "vendor/\n").unwrap();

    let writer = VecWriter::default();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .without_time()
            .with_ansi(false)
            .with_writer(writer.clone()),
    );

    let archive = with_default(subscriber, || package_dir(root).unwrap());

    let log = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
    assert!(log.contains("loaded ignore rules"));
    assert!(log.contains("pruned ignored directory"));
    assert!(log.contains("added to package"));
    let summary = log
        .lines()
        .find(|l| l.contains("created deploy package"))
        .unwrap();
    assert!(summary.contains("files=1"));

    fs::remove_file(archive).unwrap();
}

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A Common Log Format file in a private temp dir.
pub struct AccessLog {
    _dir: TempDir,
    path: PathBuf,
}

impl AccessLog {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("access.log");
        File::create(&path).expect("failed to create access log");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one request line for `path`.
    pub fn request(&self, method: &str, path: &str, status: u16) {
        self.append(&format!(
            "127.0.0.1 - frank [09/May/2018:16:00:39 +0000] \"{method} {path} HTTP/1.0\" {status} 1234\n"
        ));
    }

    pub fn append(&self, content: &str) {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .expect("failed to open access log");
        f.write_all(content.as_bytes())
            .expect("failed to append to access log");
        f.sync_all().expect("failed to sync access log");
    }
}

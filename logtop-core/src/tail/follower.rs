use std::fs::{self, File, Metadata};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Identity of the file behind a path; changes when the file is recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileId {
    dev: u64,
    ino: u64,
}

#[cfg(unix)]
fn file_id(meta: &Metadata) -> Option<FileId> {
    use std::os::unix::fs::MetadataExt;
    Some(FileId {
        dev: meta.dev(),
        ino: meta.ino(),
    })
}

#[cfg(not(unix))]
fn file_id(_meta: &Metadata) -> Option<FileId> {
    None
}

#[derive(Debug, PartialEq, Eq)]
enum Change {
    Unchanged,
    Truncated,
    Replaced,
    Missing,
}

/// An open file plus the read position and any unterminated trailing line.
pub(crate) struct Source {
    reader: BufReader<File>,
    offset: u64,
    id: Option<FileId>,
    partial: Vec<u8>,
}

impl Source {
    pub(crate) fn open(path: &Path, from_end: bool) -> io::Result<Self> {
        let file = File::open(path)?;
        let meta = file.metadata()?;
        let mut reader = BufReader::new(file);

        let offset = if from_end {
            reader.seek(SeekFrom::End(0))?
        } else {
            0
        };

        Ok(Self {
            reader,
            offset,
            id: file_id(&meta),
            partial: Vec::new(),
        })
    }

    /// Read every complete line currently available. Returns `false` once
    /// `emit` refuses a line.
    fn read_available(&mut self, emit: &mut impl FnMut(String) -> bool) -> io::Result<bool> {
        loop {
            let n = self.reader.read_until(b'\n', &mut self.partial)?;
            if n == 0 {
                return Ok(true);
            }
            self.offset += n as u64;

            if self.partial.last() != Some(&b'\n') {
                // Unterminated; wait for the rest of the line.
                return Ok(true);
            }

            self.partial.pop();
            if self.partial.last() == Some(&b'\r') {
                self.partial.pop();
            }
            let line = String::from_utf8_lossy(&self.partial).into_owned();
            self.partial.clear();

            if !emit(line) {
                return Ok(false);
            }
        }
    }

    fn check(&self, path: &Path) -> io::Result<Change> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Change::Missing),
            Err(e) => return Err(e),
        };

        if file_id(&meta) != self.id {
            Ok(Change::Replaced)
        } else if meta.len() < self.offset {
            Ok(Change::Truncated)
        } else {
            Ok(Change::Unchanged)
        }
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.offset = 0;
        self.partial.clear();
        Ok(())
    }
}

pub(crate) struct Follower {
    pub(crate) path: PathBuf,
    pub(crate) source: Source,
    pub(crate) poll_interval: Duration,
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) lines: mpsc::Sender<String>,
}

impl Follower {
    pub(crate) fn run(mut self) {
        let path = self.path.display().to_string();
        tracing::debug!(path = %path, "following file");

        loop {
            // Sampled before reading so a stop still delivers everything
            // written before it.
            let stopping = self.stop.load(Ordering::Acquire);

            let lines = &self.lines;
            match self.source.read_available(&mut |line| lines.send(line).is_ok()) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(path = %path, "line consumer gone, stop following");
                    break;
                }
                Err(e) => tracing::warn!(path = %path, error = %e, "failed to read file"),
            }

            if stopping {
                break;
            }

            if let Err(e) = self.follow_changes() {
                tracing::warn!(path = %path, error = %e, "failed to check file");
            }

            thread::sleep(self.poll_interval);
        }

        tracing::debug!(path = %path, "stopped following file");
    }

    fn follow_changes(&mut self) -> io::Result<()> {
        match self.source.check(&self.path)? {
            Change::Unchanged | Change::Missing => Ok(()),
            Change::Truncated => {
                tracing::info!(path = %self.path.display(), "file truncated, rereading from start");
                self.source.rewind()
            }
            Change::Replaced => {
                tracing::info!(path = %self.path.display(), "file replaced, reopening");
                self.source = Source::open(&self.path, false)?;
                Ok(())
            }
        }
    }
}

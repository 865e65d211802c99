//! Staged frames and the daily output artifact.
//!
//! Frames are named `<output>_<YYYY-MM-DD_HH-MM-SS-mmm>.jpg` inside the working
//! directory, so lexical order is capture order. The artifact for a day is
//! `<output>_<YYYY-MM-DD>.mp4`.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of staged still images.
pub const FRAME_EXTENSION: &str = "jpg";

/// Extension of compiled videos.
pub const ARTIFACT_EXTENSION: &str = "mp4";

const FRAME_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S-%3f";
const DATE_FORMAT: &str = "%Y-%m-%d";
const BACKUP_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// What [`StagingArea::prepare_artifact`] did with a pre-existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPrep {
    /// Nothing was there.
    Fresh,
    /// A zero-length leftover from an aborted encode was deleted.
    RemovedEmpty,
    /// Earlier footage was moved aside to this path.
    BackedUp(PathBuf),
}

/// The working directory as seen by one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingArea {
    dir: PathBuf,
    prefix: String,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a still captured at `at`.
    pub fn frame_path(&self, at: NaiveDateTime) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.{}",
            self.prefix,
            at.format(FRAME_STAMP_FORMAT),
            FRAME_EXTENSION
        ))
    }

    /// Glob matching every staged still, in FFmpeg's `-pattern_type glob` syntax.
    ///
    /// Glob metacharacters in the directory are escaped so they match
    /// literally. The prefix is validated to contain none.
    pub fn frame_glob(&self) -> String {
        let dir = escape_glob(&self.dir.to_string_lossy());
        PathBuf::from(dir)
            .join(format!("{}_*.{}", self.prefix, FRAME_EXTENSION))
            .to_string_lossy()
            .into_owned()
    }

    fn is_staged_frame(&self, name: &str) -> bool {
        name.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|rest| rest.strip_suffix(FRAME_EXTENSION))
            .map(|stem| stem.ends_with('.'))
            .unwrap_or(false)
    }

    /// All staged stills, oldest first.
    pub fn staged_frames(&self) -> io::Result<Vec<PathBuf>> {
        let mut frames = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if name.to_str().map(|n| self.is_staged_frame(n)).unwrap_or(false) {
                frames.push(entry.path());
            }
        }
        frames.sort();
        Ok(frames)
    }

    /// Delete every staged still. Returns how many were removed.
    ///
    /// A file that cannot be removed is logged and skipped.
    pub fn clear(&self) -> io::Result<usize> {
        let mut removed = 0;
        for frame in self.staged_frames()? {
            match fs::remove_file(&frame) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Error while deleting file {}: {}", frame.display(), e),
            }
        }
        Ok(removed)
    }

    /// Path of the video compiled on `date`.
    pub fn artifact_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.{}",
            self.prefix,
            date.format(DATE_FORMAT),
            ARTIFACT_EXTENSION
        ))
    }

    /// Make room for a new artifact at `path` without losing footage.
    ///
    /// An empty file is deleted. A non-empty one is renamed to
    /// `<name>.old_<stamp>`, with a counter appended if that name is taken.
    pub fn prepare_artifact(&self, path: &Path, now: NaiveDateTime) -> io::Result<ArtifactPrep> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ArtifactPrep::Fresh),
            Err(e) => return Err(e),
        };

        if metadata.len() == 0 {
            fs::remove_file(path)?;
            return Ok(ArtifactPrep::RemovedEmpty);
        }

        let backup = backup_path(path, now);
        fs::rename(path, &backup)?;
        Ok(ArtifactPrep::BackedUp(backup))
    }
}

fn backup_path(path: &Path, now: NaiveDateTime) -> PathBuf {
    let base = format!(
        "{}.old_{}",
        path.to_string_lossy(),
        now.format(BACKUP_STAMP_FORMAT)
    );
    let mut candidate = PathBuf::from(&base);
    let mut n = 1;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{}_{}", base, n));
        n += 1;
    }
    candidate
}

/// Backslash-escape glob(3) metacharacters.
fn escape_glob(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if cfg!(unix) && matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

//! Error types for media operations.
//!
//! FFmpeg reports failures only as text on stderr. That text is classified
//! once, when the error is built, so callers match on [`MediaErrorKind`]
//! instead of scanning diagnostics themselves.

use std::path::PathBuf;

/// What a failed media call means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    /// The stream host could not be reached. Usually recovers on its own.
    TransientNetwork,
    /// The requested encoder does not exist or failed to open.
    EncoderUnavailable,
    /// Anything else.
    Other,
}

/// Diagnostic fragments (lowercase) that mark an unreachable stream host.
const TRANSIENT_NETWORK_PATTERNS: &[&str] = &["connection refused", "no route to host"];

/// Diagnostic fragments (lowercase) that mark an encoder that cannot be used.
const ENCODER_UNAVAILABLE_PATTERNS: &[&str] = &[
    "unknown encoder",
    "encoder not found",
    "could not open encoder",
    "error while opening encoder",
];

/// Classify FFmpeg diagnostic text.
pub fn classify(diagnostic: &str) -> MediaErrorKind {
    let text = diagnostic.to_lowercase();
    if TRANSIENT_NETWORK_PATTERNS.iter().any(|p| text.contains(p)) {
        MediaErrorKind::TransientNetwork
    } else if ENCODER_UNAVAILABLE_PATTERNS.iter().any(|p| text.contains(p)) {
        MediaErrorKind::EncoderUnavailable
    } else {
        MediaErrorKind::Other
    }
}

/// Errors that can occur while grabbing a frame or encoding a video.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("FFmpeg not found. Please install it and make sure `ffmpeg` is on your PATH")]
    FfmpegNotFound,

    #[error("Failed to spawn FFmpeg: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("FFmpeg exited with code {exit_code:?}\n{stderr}")]
    ProcessFailed {
        exit_code: Option<i32>,
        stderr: String,
        kind: MediaErrorKind,
    },

    #[error("FFmpeg exited successfully but did not write {}", .0.display())]
    MissingOutput(PathBuf),
}

impl MediaError {
    /// Build a process failure, classifying its diagnostic text.
    pub fn failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        let kind = classify(&stderr);
        MediaError::ProcessFailed {
            exit_code,
            stderr,
            kind,
        }
    }

    pub fn kind(&self) -> MediaErrorKind {
        match self {
            MediaError::ProcessFailed { kind, .. } => *kind,
            _ => MediaErrorKind::Other,
        }
    }
}

impl From<std::io::Error> for MediaError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            MediaError::FfmpegNotFound
        } else {
            MediaError::SpawnFailed(e)
        }
    }
}

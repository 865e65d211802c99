//! Compile cycle: turn the staged stills into the day's video.
//!
//! Frames are deleted only after an encode succeeds. On any failure they stay
//! on disk so the operator can inspect them or run `stream-timelapse compile`
//! by hand.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::clock::Clock;
use crate::job::JobConfig;
use crate::media::{MediaError, MediaErrorKind, MediaService};
use crate::staging::ArtifactPrep;

/// Errors that abort a compile. All are fatal to the job.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Failed to list staged frames in {}: {source}", .dir.display())]
    Staging {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to make room for {}: {source}", .path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Encoding failed: {0}")]
    Encode(MediaError),

    #[error("Encoder '{encoder}' could not be opened ({first}), and the default encoder failed too: {fallback}")]
    FallbackFailed {
        encoder: String,
        first: MediaError,
        fallback: MediaError,
    },
}

/// Result of a compile that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// A video was written and its frames removed.
    Compiled {
        artifact: PathBuf,
        frames: usize,
        used_fallback: bool,
    },
    /// No frames were staged, so nothing was encoded.
    NothingStaged,
}

/// Encode every staged frame into today's artifact, then clear the frames.
///
/// If the configured encoder cannot be opened, the encode is retried once
/// with FFmpeg's default encoder.
pub fn compile(
    job: &JobConfig,
    media: &dyn MediaService,
    clock: &dyn Clock,
) -> Result<CompileOutcome, CompileError> {
    let staging = job.staging();
    let frames = staging
        .staged_frames()
        .map_err(|source| CompileError::Staging {
            dir: staging.dir().to_path_buf(),
            source,
        })?;

    if frames.is_empty() {
        log::warn!(
            "No frames staged in {}, skipping compile",
            staging.dir().display()
        );
        return Ok(CompileOutcome::NothingStaged);
    }

    let now = clock.now();
    let artifact = staging.artifact_path(now.date());
    let prepare_err = |source| CompileError::Prepare {
        path: artifact.clone(),
        source,
    };

    match staging.prepare_artifact(&artifact, now).map_err(prepare_err)? {
        ArtifactPrep::Fresh => {}
        ArtifactPrep::RemovedEmpty => {
            log::info!("Removed empty {} left by an earlier encode", artifact.display())
        }
        ArtifactPrep::BackedUp(backup) => log::info!(
            "{} already exists, moved it to {}",
            artifact.display(),
            backup.display()
        ),
    }

    log::info!(
        "Compiling {} frames into {}",
        frames.len(),
        artifact.display()
    );

    let request = job.encode_request(artifact.clone());
    let used_fallback = match media.encode(&request) {
        Ok(()) => false,
        Err(first) => match (&request.encoder, first.kind()) {
            (Some(encoder), MediaErrorKind::EncoderUnavailable) => {
                log::warn!(
                    "Encoder '{}' could not be opened, retrying with the default encoder",
                    encoder
                );
                // Whatever the failed attempt left behind is ours, not earlier footage.
                if artifact.exists() {
                    fs::remove_file(&artifact).map_err(prepare_err)?;
                }
                if let Err(fallback) = media.encode(&request.without_encoder()) {
                    log::error!("Default encoder failed as well");
                    return Err(CompileError::FallbackFailed {
                        encoder: encoder.clone(),
                        first,
                        fallback,
                    });
                }
                true
            }
            _ => return Err(CompileError::Encode(first)),
        },
    };

    log::info!("Compiled {}", artifact.display());

    match staging.clear() {
        Ok(removed) => log::info!("Cleaned up working directory ({} frames)", removed),
        Err(e) => log::warn!("Failed to clean up working directory: {}", e),
    }

    Ok(CompileOutcome::Compiled {
        artifact,
        frames: frames.len(),
        used_fallback,
    })
}

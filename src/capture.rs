//! Capture cycle: grab one still, then wait out the configured spacing.

use std::path::PathBuf;

use crate::clock::{Clock, Sleeper};
use crate::job::JobConfig;
use crate::media::{MediaError, MediaService};
use crate::retry::{retry_transient, RetryPolicy};

/// Errors that end a capture cycle. Both are fatal to the job.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Stream unreachable after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: MediaError },

    #[error("Frame capture failed: {0}")]
    Fatal(MediaError),
}

/// Grab one still into the working directory, retrying transient failures.
///
/// Every attempt gets a fresh timestamp, so the returned path is the one that
/// was actually written.
pub fn capture_frame(
    job: &JobConfig,
    media: &dyn MediaService,
    clock: &dyn Clock,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
) -> Result<PathBuf, CaptureError> {
    let staging = job.staging();
    let mut frame = PathBuf::new();

    retry_transient(policy, sleeper, || {
        frame = staging.frame_path(clock.now());
        media.grab_frame(&job.url, &frame)
    })?;

    log::debug!("Captured {}", frame.display());
    Ok(frame)
}

/// One step of the capture cycle: a frame, then the pacing delay.
pub fn capture_step(
    job: &JobConfig,
    media: &dyn MediaService,
    clock: &dyn Clock,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
) -> Result<PathBuf, CaptureError> {
    let frame = capture_frame(job, media, clock, sleeper, policy)?;
    sleeper.sleep(job.delay);
    Ok(frame)
}

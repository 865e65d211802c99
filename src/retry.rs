//! Retry policy for frame grabs.
//!
//! Only unreachable-host failures are retried, a bounded number of times with
//! a fixed pause between attempts.

use std::time::Duration;

use crate::capture::CaptureError;
use crate::clock::Sleeper;
use crate::media::{MediaError, MediaErrorKind};

/// Total grab attempts before giving up on a transient failure.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Fixed pause between attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Determine if a media error is a transient network error that should be retried.
pub fn is_transient_network_error(error: &MediaError) -> bool {
    error.kind() == MediaErrorKind::TransientNetwork
}

/// Operator-facing hint for a transient failure.
pub fn diagnostic_hint(error: &MediaError) -> &'static str {
    let text = error.to_string().to_lowercase();
    if text.contains("no route to host") {
        "No route to host. Check that the camera is on the network and the address in the URL is correct."
    } else {
        "Connection refused. Check that the camera is powered on and that the port in the URL is right."
    }
}

/// Run `attempt` until it succeeds, retrying transient network failures.
///
/// Returns the number of attempts used. Non-transient errors are returned on
/// the spot as [`CaptureError::Fatal`]; running out of attempts yields
/// [`CaptureError::Exhausted`].
pub fn retry_transient<F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut attempt: F,
) -> Result<u32, CaptureError>
where
    F: FnMut() -> Result<(), MediaError>,
{
    let max_attempts = policy.max_attempts.max(1);

    for n in 1..=max_attempts {
        match attempt() {
            Ok(()) => {
                if n > 1 {
                    log::info!("Stream reachable again after {} attempts", n);
                }
                return Ok(n);
            }
            Err(e) if is_transient_network_error(&e) => {
                log::warn!("{}", diagnostic_hint(&e));

                if n >= max_attempts {
                    log::error!(
                        "Could not reach the stream after {} attempts. Giving up.",
                        n
                    );
                    return Err(CaptureError::Exhausted {
                        attempts: n,
                        last: e,
                    });
                }

                log::info!(
                    "Capture failed (attempt {}/{}). Retrying in {:?}...",
                    n,
                    max_attempts,
                    policy.backoff
                );
                sleeper.sleep(policy.backoff);
            }
            Err(e) => return Err(CaptureError::Fatal(e)),
        }
    }

    unreachable!("retry loop always returns")
}

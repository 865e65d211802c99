//! Ctrl+C handling.
//!
//! The handler only raises a flag. The scheduler checks it between ticks and
//! [`crate::clock::ThreadSleeper`] checks it while waiting.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for handling Ctrl+C across the application
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C has been received.
pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Ask the scheduler to stop at its next check.
pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        request_shutdown();
        eprintln!("\nReceived Ctrl+C, stopping after the current step...");
    })
}

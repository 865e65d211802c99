//! stream-timelapse library crate.
//!
//! Captures stills from a live stream during a daily window and compiles them
//! into one video per day. The binary wires these modules to FFmpeg and the
//! system clock; tests drive them with fakes.

pub mod capture;
pub mod cli;
pub mod clock;
pub mod compile;
pub mod config;
pub mod error;
pub mod job;
pub mod media;
pub mod retry;
pub mod scheduler;
pub mod shutdown;
pub mod staging;
pub mod window;

pub use error::Error;

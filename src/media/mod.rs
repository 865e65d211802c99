//! External media capability: grab a still from a stream, encode stills into
//! a video.
//!
//! # Structure
//!
//! - [`error`] - Error types and diagnostic classification
//! - [`request`] - FFmpeg argument generation
//! - [`ffmpeg`] - The FFmpeg process runner

mod error;
mod ffmpeg;
mod request;

use std::path::Path;

pub use error::{classify, MediaError, MediaErrorKind};
pub use ffmpeg::Ffmpeg;
pub use request::{grab_args, EncodeRequest, Rotation, ENCODE_BUFFER_SIZE};

/// The two operations the scheduler needs from a media tool.
pub trait MediaService {
    /// Write exactly one still image from `url` to `dest`.
    fn grab_frame(&self, url: &str, dest: &Path) -> Result<(), MediaError>;

    /// Encode the stills matched by the request into one video file.
    fn encode(&self, request: &EncodeRequest) -> Result<(), MediaError>;
}

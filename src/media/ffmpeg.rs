//! FFmpeg-backed media service.
//!
//! Each call spawns one short-lived `ffmpeg` process, waits for it, and
//! turns a non-zero exit into a classified [`MediaError`].

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::error::MediaError;
use super::request::{grab_args, EncodeRequest};
use super::MediaService;

/// Runs the `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
        }
    }
}

impl Ffmpeg {
    /// Use a specific FFmpeg binary instead of the one on PATH.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run FFmpeg to completion with the given arguments.
    fn run(&self, args: &[String]) -> Result<(), MediaError> {
        log::debug!("Running {} {}", self.binary.display(), args.join(" "));

        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        // Own process group: a terminal Ctrl+C reaches only us, so the grab
        // or encode in flight runs to completion before the loop stops.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let output = command.output()?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        for line in stderr.lines() {
            log::debug!("[ffmpeg] {}", line);
        }
        Err(MediaError::failed(output.status.code(), stderr))
    }
}

impl MediaService for Ffmpeg {
    fn grab_frame(&self, url: &str, dest: &Path) -> Result<(), MediaError> {
        self.run(&grab_args(url, dest))?;

        // A stream that closes before its first frame still exits 0.
        if !dest.is_file() {
            return Err(MediaError::MissingOutput(dest.to_path_buf()));
        }
        Ok(())
    }

    fn encode(&self, request: &EncodeRequest) -> Result<(), MediaError> {
        self.run(&request.to_ffmpeg_args())
    }
}

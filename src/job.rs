//! Resolved job configuration.
//!
//! Raw values arrive from command-line flags and the config file as
//! [`JobSettings`]. [`JobSettings::resolve`] validates them once, before the
//! loop starts, producing the immutable [`JobConfig`] every component reads.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::media::{EncodeRequest, Rotation};
use crate::staging::StagingArea;
use crate::window::{CaptureWindow, WindowError};

/// Time one frame grab takes on its own. The configured delay is total
/// spacing between grabs, so this much is subtracted before sleeping.
pub const GRAB_LATENCY_FLOOR_SECS: f64 = 2.5;

/// Delay used when none is configured.
pub const DEFAULT_DELAY_SECS: f64 = 2.5;

/// Output frame rate used when none is configured.
pub const DEFAULT_FRAMERATE: u32 = 25;

/// Environment variable consulted for the stream URL when no flag or config
/// value provides one.
pub const STREAM_URL_ENV: &str = "STREAM_TIMELAPSE_URL";

/// Errors found while validating job settings.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Missing required setting '{0}'. Pass it as a flag or set it in the config file")]
    MissingSetting(&'static str),

    #[error("Invalid output name '{0}'. Use a plain file name without path separators or glob characters")]
    InvalidOutputName(String),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error("Invalid delay {0}. Delay must be a non-negative number of seconds")]
    InvalidDelay(f64),

    #[error("Invalid frame rate {0}. Frame rate must be greater than 0")]
    InvalidFramerate(u32),

    #[error("Invalid rotation code {0}. Use 1 (90° clockwise), 2 (90° counter-clockwise), 3 (180°) or 4 (mirror)")]
    InvalidRotation(u8),

    #[error("Invalid bitrate '{0}'. Bitrate must be a whole number of kbit/s, e.g. 4000")]
    InvalidBitrate(String),

    #[error("Specified path not found: {}", .0.display())]
    WorkingDirNotFound(PathBuf),
}

/// Unvalidated job values from any source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSettings {
    pub url: Option<String>,
    pub output: Option<String>,
    pub path: Option<PathBuf>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub delay: Option<f64>,
    pub framerate: Option<u32>,
    pub encoder: Option<String>,
    pub bitrate: Option<String>,
    pub chroma: Option<String>,
    pub rotation: Option<u8>,
}

/// Treat empty strings the same as unset values.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl JobSettings {
    /// Settings taken from a config file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            url: config.stream.url.clone(),
            output: config.output.name.clone(),
            path: config.output.path.clone(),
            start: config.capture.start.clone(),
            end: config.capture.end.clone(),
            delay: config.capture.delay,
            framerate: config.output.framerate,
            encoder: config.output.encoder.clone(),
            bitrate: config.output.bitrate.map(|b| b.to_string()),
            chroma: config.output.chroma.clone(),
            rotation: config.output.rotation,
        }
    }

    /// Fill every unset value from `fallback`.
    pub fn or(self, fallback: JobSettings) -> Self {
        Self {
            url: non_empty(self.url).or(non_empty(fallback.url)),
            output: non_empty(self.output).or(non_empty(fallback.output)),
            path: self.path.or(fallback.path),
            start: non_empty(self.start).or(non_empty(fallback.start)),
            end: non_empty(self.end).or(non_empty(fallback.end)),
            delay: self.delay.or(fallback.delay),
            framerate: self.framerate.or(fallback.framerate),
            encoder: non_empty(self.encoder).or(non_empty(fallback.encoder)),
            bitrate: non_empty(self.bitrate).or(non_empty(fallback.bitrate)),
            chroma: non_empty(self.chroma).or(non_empty(fallback.chroma)),
            rotation: self.rotation.or(fallback.rotation),
        }
    }

    /// Use `STREAM_TIMELAPSE_URL` when no URL is set.
    pub fn with_env_url(mut self) -> Self {
        if non_empty(self.url.clone()).is_none() {
            self.url = non_empty(std::env::var(STREAM_URL_ENV).ok());
        }
        self
    }

    /// Validate everything and build the job.
    pub fn resolve(self) -> Result<JobConfig, JobError> {
        let url = non_empty(self.url).ok_or(JobError::MissingSetting("url"))?;
        let output_name = non_empty(self.output).ok_or(JobError::MissingSetting("output"))?;
        validate_output_name(&output_name)?;

        let working_dir = self.path.ok_or(JobError::MissingSetting("path"))?;
        if !working_dir.is_dir() {
            return Err(JobError::WorkingDirNotFound(working_dir));
        }

        let start = non_empty(self.start).ok_or(JobError::MissingSetting("start"))?;
        let end = non_empty(self.end).ok_or(JobError::MissingSetting("end"))?;
        let window = CaptureWindow::parse(&start, &end)?;

        let requested_delay = self.delay.unwrap_or(DEFAULT_DELAY_SECS);
        if !requested_delay.is_finite() || requested_delay < 0.0 {
            return Err(JobError::InvalidDelay(requested_delay));
        }
        let delay = effective_delay(requested_delay)?;
        if requested_delay < GRAB_LATENCY_FLOOR_SECS {
            log::warn!(
                "Delay less than {}s, captures will run back to back",
                GRAB_LATENCY_FLOOR_SECS
            );
        }

        let framerate = self.framerate.unwrap_or(DEFAULT_FRAMERATE);
        if framerate == 0 {
            return Err(JobError::InvalidFramerate(framerate));
        }

        let rotation = match self.rotation {
            Some(code) => Some(Rotation::from_code(code).ok_or(JobError::InvalidRotation(code))?),
            None => None,
        };

        let bitrate_kbps = match non_empty(self.bitrate) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(kbps) if kbps > 0 => Some(kbps),
                _ => return Err(JobError::InvalidBitrate(raw)),
            },
            None => None,
        };

        Ok(JobConfig {
            url,
            output_name,
            working_dir,
            window,
            requested_delay,
            delay,
            framerate,
            encoder: non_empty(self.encoder),
            bitrate_kbps,
            chroma: non_empty(self.chroma),
            rotation,
        })
    }
}

fn validate_output_name(name: &str) -> Result<(), JobError> {
    let forbidden = ['/', '\\', '*', '?', '[', ']', '{', '}'];
    if name.contains(&forbidden[..]) || name == "." || name == ".." {
        return Err(JobError::InvalidOutputName(name.to_string()));
    }
    Ok(())
}

/// Sleep between grabs for a configured total spacing of `requested` seconds.
///
/// Anything at or below the grab latency floor yields zero. Values that do
/// not fit a `Duration` are rejected.
pub fn effective_delay(requested: f64) -> Result<Duration, JobError> {
    let secs = requested - GRAB_LATENCY_FLOOR_SECS;
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).map_err(|_| JobError::InvalidDelay(requested))
    } else {
        Ok(Duration::ZERO)
    }
}

/// One timelapse job, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub url: String,
    pub output_name: String,
    pub working_dir: PathBuf,
    pub window: CaptureWindow,
    /// Spacing between grabs as configured
    pub requested_delay: f64,
    /// Sleep after each grab, after subtracting the latency floor
    pub delay: Duration,
    pub framerate: u32,
    pub encoder: Option<String>,
    pub bitrate_kbps: Option<u32>,
    pub chroma: Option<String>,
    pub rotation: Option<Rotation>,
}

impl JobConfig {
    pub fn staging(&self) -> StagingArea {
        StagingArea::new(&self.working_dir, &self.output_name)
    }

    /// Encode request for the currently staged frames.
    pub fn encode_request(&self, output: PathBuf) -> EncodeRequest {
        EncodeRequest {
            input_pattern: self.staging().frame_glob(),
            output,
            framerate: self.framerate,
            encoder: self.encoder.clone(),
            bitrate_kbps: self.bitrate_kbps,
            chroma: self.chroma.clone(),
            rotation: self.rotation,
        }
    }
}

//! The scheduling loop.
//!
//! Each tick reads the clock once, decides what to do from the current state
//! and whether the capture window is open, and does it:
//!
//! | state     | in window | action                        | next state |
//! |-----------|-----------|-------------------------------|------------|
//! | Idle      | yes       | capture                       | Capturing  |
//! | Capturing | yes       | capture                       | Capturing  |
//! | Capturing | no        | compile once, then wait       | Idle       |
//! | Idle      | no        | wait                          | Idle       |

use std::time::Duration;

use crate::capture::{capture_step, CaptureError};
use crate::clock::{Clock, Sleeper};
use crate::compile::{compile, CompileError, CompileOutcome};
use crate::job::JobConfig;
use crate::media::MediaService;
use crate::retry::RetryPolicy;
use crate::shutdown::shutdown_requested;
use crate::window::TimeOfDay;

/// Pause between window checks while idle, and after a compile.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Capturing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Capture,
    Compile,
    Wait,
}

/// Pure transition function of the loop.
pub fn next_action(state: LoopState, in_window: bool) -> (Action, LoopState) {
    match (state, in_window) {
        (_, true) => (Action::Capture, LoopState::Capturing),
        (LoopState::Capturing, false) => (Action::Compile, LoopState::Idle),
        (LoopState::Idle, false) => (Action::Wait, LoopState::Idle),
    }
}

/// Errors that stop the loop.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Drives capture and compile for one job.
pub struct Scheduler<'a> {
    job: &'a JobConfig,
    media: &'a dyn MediaService,
    clock: &'a dyn Clock,
    sleeper: &'a dyn Sleeper,
    retry: RetryPolicy,
    state: LoopState,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        job: &'a JobConfig,
        media: &'a dyn MediaService,
        clock: &'a dyn Clock,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            job,
            media,
            clock,
            sleeper,
            retry: RetryPolicy::default(),
            state: LoopState::Idle,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run one iteration of the loop.
    pub fn tick(&mut self) -> Result<Action, SchedulerError> {
        let now = TimeOfDay::from_time(self.clock.now().time());
        let in_window = self.job.window.contains(now);
        let (action, next) = next_action(self.state, in_window);

        if self.state == LoopState::Idle && next == LoopState::Capturing {
            log::info!("Capture window {} open, capturing", self.job.window);
        }

        match action {
            Action::Capture => {
                capture_step(self.job, self.media, self.clock, self.sleeper, &self.retry)?;
            }
            Action::Compile => {
                log::info!("Capture window {} closed", self.job.window);
                match compile(self.job, self.media, self.clock)? {
                    CompileOutcome::Compiled { artifact, .. } => {
                        log::info!("Timelapse ready: {}", artifact.display())
                    }
                    CompileOutcome::NothingStaged => {}
                }
                self.sleeper.sleep(IDLE_POLL_INTERVAL);
            }
            Action::Wait => self.sleeper.sleep(IDLE_POLL_INTERVAL),
        }

        self.state = next;
        Ok(action)
    }

    /// Tick until `should_stop` returns true or a fatal error occurs.
    ///
    /// A failure that coincides with a stop request is the interrupted
    /// FFmpeg call, not a fault, and ends the loop cleanly. Staged frames
    /// stay on disk either way.
    pub fn run_until<F>(&mut self, should_stop: F) -> Result<(), SchedulerError>
    where
        F: Fn() -> bool,
    {
        while !should_stop() {
            match self.tick() {
                Ok(_) => {}
                Err(e) if should_stop() => {
                    log::info!("Interrupted: {}", e);
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Tick until Ctrl+C or a fatal error.
    pub fn run(&mut self) -> Result<(), SchedulerError> {
        log::info!("Beginning job...");
        log::info!("Captures start at {}", self.job.window.start());
        log::info!("Captures end at {}", self.job.window.end());
        log::info!(
            "Waiting {:.1}s between frames ({:.1}s requested)",
            self.job.delay.as_secs_f64(),
            self.job.requested_delay
        );
        self.run_until(shutdown_requested)?;
        log::info!("Stopped");
        Ok(())
    }
}

use clap::Parser;

use stream_timelapse::cli::{handle_config_action, Args, Command};
use stream_timelapse::clock::{SystemClock, ThreadSleeper};
use stream_timelapse::compile::{compile, CompileOutcome};
use stream_timelapse::config::Config;
use stream_timelapse::job::{JobConfig, JobSettings};
use stream_timelapse::media::Ffmpeg;
use stream_timelapse::scheduler::Scheduler;
use stream_timelapse::shutdown::setup_ctrlc_handler;
use stream_timelapse::Error;

/// Load environment variables from .env file
fn load_env() {
    // Silently ignore if .env doesn't exist
    let _ = dotenv::dotenv();
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Load the config file. An explicit --config must exist; the default one is
/// optional.
fn load_config(args: &Args) -> Result<Config, Error> {
    let config = match args.config {
        Some(ref path) => Config::load_from_explicit(path.clone())?,
        None => Config::load(None)?,
    };
    Ok(config)
}

/// Flags first, then the config file, then the environment.
fn merged_settings(args: &Args, config: &Config) -> JobSettings {
    JobSettings::from(args.job.clone())
        .or(JobSettings::from_config(config))
        .with_env_url()
}

fn resolve_job(args: &Args) -> Result<JobConfig, Error> {
    let config = load_config(args)?;
    Ok(merged_settings(args, &config).resolve()?)
}

fn run(args: &Args) -> Result<(), Error> {
    let job = resolve_job(args)?;
    setup_ctrlc_handler()?;

    let ffmpeg = Ffmpeg::default();
    let clock = SystemClock;
    let sleeper = ThreadSleeper;
    Scheduler::new(&job, &ffmpeg, &clock, &sleeper).run()?;
    Ok(())
}

fn compile_now(args: &Args) -> Result<(), Error> {
    let job = resolve_job(args)?;
    match compile(&job, &Ffmpeg::default(), &SystemClock)? {
        CompileOutcome::Compiled { artifact, .. } => println!("Compiled {}", artifact.display()),
        CompileOutcome::NothingStaged => println!("No staged frames to compile."),
    }
    Ok(())
}

fn main() {
    // Load .env file before anything else
    load_env();
    init_logging();

    let args = Args::parse();

    let result = match args.command {
        Some(Command::Config { ref action }) => {
            let settings = match load_config(&args) {
                Ok(config) => merged_settings(&args, &config),
                Err(e) => {
                    eprintln!("Warning: {}", e);
                    eprintln!("Showing command-line settings only.\n");
                    JobSettings::from(args.job.clone()).with_env_url()
                }
            };
            handle_config_action(action.clone(), args.config.as_deref(), settings)
                .map_err(Error::from)
        }
        Some(Command::Compile) => compile_now(&args),
        Some(Command::Run) | None => run(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

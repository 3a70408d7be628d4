use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{info, warn, LevelFilter};
use objprobe_core::client::S3ClientFactory;
use objprobe_core::{
    CommandLoop, Console, ConsoleError, Error, HealthProbe, ProbeTiming, ProfileStore,
    SessionManager, StoreError,
};

use super::terminal::TerminalConsole;

/// Command-line arguments. Every flag is optional; a bare `objprobe` uses
/// the user config dir and the timings the interactive menu was designed for.
#[derive(Parser, Debug)]
#[command(name = "objprobe", version, about = "Manage S3/MinIO connections and probe their health")]
pub struct Args {
    /// Connection store file [default: <config dir>/objprobe/connections.json]
    #[arg(long, env = "OBJPROBE_STORE")]
    pub store: Option<PathBuf>,

    /// Region sent with every S3 request
    #[arg(long, env = "OBJPROBE_REGION", default_value = objprobe_core::client::s3::DEFAULT_REGION)]
    pub region: String,

    /// Pause before a one-shot check, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub startup_grace_ms: u64,

    /// How long a failed one-shot check stays on screen, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub failure_hold_ms: u64,

    /// Give up on a single check after this many seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub attempt_timeout_secs: u64,

    /// Stop an interval check on its own after this many seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_limit_secs: Option<u64>,

    /// Log level for every module (overrides RUST_LOG)
    #[arg(long, env = "OBJPROBE_LOG")]
    pub log_level: Option<LevelFilter>,
}

impl Args {
    pub fn probe_timing(&self) -> ProbeTiming {
        ProbeTiming {
            startup_grace: Duration::from_millis(self.startup_grace_ms),
            failure_hold: Duration::from_millis(self.failure_hold_ms),
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
        }
    }

    pub fn interval_limit(&self) -> Option<Duration> {
        self.interval_limit_secs.map(Duration::from_secs)
    }

    pub fn profile_store(&self) -> Result<ProfileStore, StoreError> {
        match &self.store {
            Some(path) => Ok(ProfileStore::at(path)),
            None => ProfileStore::new(),
        }
    }
}

pub async fn run_cli(args: Args) -> Result<(), Error> {
    let store = args.profile_store()?;
    info!("Using connection store {:?}", store.path());
    // once, before the console draws anything
    warn!("Credentials in {:?} are stored unencrypted", store.path());

    let factory = Arc::new(S3ClientFactory::new(args.region.clone()));
    let sessions = SessionManager::new(store, factory);

    let mut console = TerminalConsole::new();
    console.intro();

    let mut command_loop =
        CommandLoop::new(console, &sessions, HealthProbe::new(args.probe_timing()))
            .with_interval_limit(args.interval_limit());

    match command_loop.bootstrap().await {
        Ok(()) => {}
        Err(Error::Console(ConsoleError::Closed)) => return Ok(()),
        // an unreadable store has no sensible menu to fall back to
        Err(e @ Error::Store(_)) => return Err(e),
        Err(e) => command_loop.console_mut().error(&e.to_string()),
    }

    command_loop.run().await?;
    info!("Bye.");
    Ok(())
}

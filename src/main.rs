use anyhow::Context;
use clap::{Parser, Subcommand};
use relic_recorder::capture::{StillImageSource, WindowLocator};
use relic_recorder::cleaner;
use relic_recorder::config::{Config, ConfigArgs};
use relic_recorder::console::{self, Command};
use relic_recorder::error::CaptureError;
use relic_recorder::session::Session;
use relic_recorder::store::RecordStore;
use relic_recorder::worker::{CaptureWorker, WorkerState};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "relic-recorder")]
#[command(about = "Record OCR'd item panels into a deduplicated, date-grouped log")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture records from the target window until `q` or end of input
    Watch {
        /// Start capturing right away instead of waiting for `s`
        #[arg(long)]
        start: bool,
    },
    /// Remove near-duplicate lines from a record log
    Clean {
        /// Log to clean (defaults to --record-log)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from(cli.config);

    // Held until exit so buffered file logs are flushed
    let _guard = init_tracing(&config)?;

    tracing::info!("Starting relic-recorder v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Watch { start } => watch(config, start).await,
        Commands::Clean { path } => clean(path.as_deref().unwrap_or(&config.record_log)),
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("log file {:?} has no file name", path))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn clean(path: &Path) -> anyhow::Result<()> {
    match cleaner::clean_log(path) {
        Ok(report) => {
            println!(
                "removed {} duplicate lines from {} ({} kept)",
                report.removed,
                path.display(),
                report.kept
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(code = e.code(), "Cleanup failed: {}", e);
            Err(e.into())
        }
    }
}

async fn watch(config: Config, start: bool) -> anyhow::Result<()> {
    let source = StillImageSource::new(&config.capture);
    let window = source
        .locate()
        .ok_or_else(|| CaptureError::WindowNotFound(config.capture.window_title.clone()))?;

    let (mut worker, mut records) = CaptureWorker::with_engine(window, Box::new(source), &config)?;
    let mut session = Session::new(&config.record_log).with_observer(Box::new(
        |store: &RecordStore| println!("{}", console::render_page(store)),
    ));

    println!("{}", console::HELP);
    if start {
        worker.start()?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(record) = records.recv() => {
                let outcome = session.accept_now(record);
                if let Some(e) = outcome.persist_error {
                    eprintln!("record kept in memory but not saved: {}", e);
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Ignoring unreadable command: {}", e);
                        eprintln!("unreadable command: {}", e);
                        continue;
                    }
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => run_command(command, &mut worker, &mut session),
                    Err(e) => eprintln!("{}", e),
                }
            }
        }
    }

    worker.stop();
    tracing::info!("Kept {} records this session", session.store().len());
    Ok(())
}

fn run_command(command: Command, worker: &mut CaptureWorker, session: &mut Session) {
    match command {
        Command::Toggle => match worker.toggle() {
            Ok(WorkerState::Running) => println!("capturing"),
            Ok(WorkerState::Paused) => println!("paused"),
            Ok(WorkerState::Stopped) => println!("stopped"),
            Err(e) => eprintln!("{}", e),
        },
        Command::Previous => session.previous_page(),
        Command::Next => session.next_page(),
        Command::Clean => match session.run_cleanup(worker.state()) {
            Ok(report) => println!(
                "removed {} duplicate lines ({} kept)",
                report.removed, report.kept
            ),
            Err(e) => {
                tracing::error!(code = e.code(), "Cleanup failed: {}", e);
                eprintln!("{}", e);
            }
        },
        Command::Open => match session.open_log() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => eprintln!("cannot open {}: {}", session.record_log().display(), e),
        },
        Command::Show => println!("{}", console::render_page(session.store())),
        Command::Help => println!("{}", console::HELP),
        Command::Quit => {}
    }
}

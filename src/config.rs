use clap::Args;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Settings shared by every subcommand, parsed from flags or the environment
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the RapidOCR-json executable
    #[arg(long, env = "RELIC_ENGINE_PATH", default_value = "RapidOCR-json/RapidOCR-json")]
    pub engine_path: PathBuf,

    /// Extra arguments passed to the OCR engine
    #[arg(long = "engine-arg", value_name = "ARG")]
    pub engine_args: Vec<String>,

    /// Delay between capture attempts, in milliseconds
    #[arg(long, env = "RELIC_POLL_INTERVAL_MS", default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Record log the accepted captures are appended to
    #[arg(long, env = "RELIC_RECORD_LOG", default_value = "relic-records.txt")]
    pub record_log: PathBuf,

    /// Title of the window to capture
    #[arg(long, env = "RELIC_WINDOW_TITLE", default_value = "原神")]
    pub window_title: String,

    /// Image the capture source reads in place of the live window
    #[arg(long, env = "RELIC_CAPTURE_IMAGE")]
    pub capture_image: Option<PathBuf>,

    /// Region of the window holding the item panel, as x,y,width,height
    #[arg(long, env = "RELIC_REGION")]
    pub region: Option<Region>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Also write diagnostics to this file
    #[arg(long, env = "RELIC_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Rectangle inside a window, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid region {:?}: {}", s, e))?;

        match parts[..] {
            [x, y, width, height] if width > 0 && height > 0 => Ok(Self {
                x,
                y,
                width,
                height,
            }),
            [_, _, _, _] => Err(format!("region {:?} has zero size", s)),
            _ => Err(format!("region {:?} must be x,y,width,height", s)),
        }
    }
}

/// OCR engine process settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
}

/// Capture target settings
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub window_title: String,
    pub image: Option<PathBuf>,
    pub region: Option<Region>,
}

/// Application configuration, handed to each component at construction
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub capture: CaptureConfig,
    pub poll_interval: Duration,
    pub record_log: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Self {
            engine: EngineConfig {
                path: args.engine_path,
                args: args.engine_args,
            },
            capture: CaptureConfig {
                window_title: args.window_title,
                image: args.capture_image,
                region: args.region,
            },
            poll_interval: Duration::from_millis(args.poll_interval_ms.max(1)),
            record_log: args.record_log,
            log_level: args.log_level,
            log_file: args.log_file,
        }
    }
}

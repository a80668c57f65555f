use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use tvnav::commands::{self, TvSetting};
use tvnav::config;
use tvnav::detection::DeviceProfile;

// Default Configuration Constants
/// Default log level when not specified
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file path (no logging to file)
const DEFAULT_LOG_FILE: &str = "/dev/null";

#[derive(Parser)]
#[command(name = "tvnav")]
#[command(about = "Spatial TV remote navigation for UI trees", long_about = "Spatial TV remote navigation for UI trees\n\nPreview a layout under remote control, inspect TV detection and manage the TV mode override.")]
struct Cli {
    /// Set log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    /// Log file path (default: /dev/null for no logging)
    #[arg(short = 'F', long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum TvSwitch {
    /// Force TV mode on
    On,
    /// Force TV mode off
    Off,
    /// Stored preference, then auto-detection
    Auto,
}

impl TvSwitch {
    /// Convert CLI TvSwitch enum to commands::TvSetting
    fn to_setting(self) -> TvSetting {
        match self {
            TvSwitch::On => TvSetting::On,
            TvSwitch::Off => TvSetting::Off,
            TvSwitch::Auto => TvSetting::Auto,
        }
    }
}

/// Device properties fed to the TV heuristic
#[derive(clap::Args)]
struct DeviceArgs {
    /// User agent string
    #[arg(long)]
    user_agent: Option<String>,

    /// Screen width in pixels
    #[arg(long)]
    screen_width: Option<u32>,

    /// Screen height in pixels
    #[arg(long)]
    screen_height: Option<u32>,

    /// Window width in pixels
    #[arg(long)]
    window_width: Option<u32>,

    /// Device pixel ratio
    #[arg(long)]
    pixel_ratio: Option<f64>,

    /// Maximum touch points
    #[arg(long)]
    touch_points: Option<u32>,

    /// The device reports touch events
    #[arg(long)]
    touch: bool,
}

impl DeviceArgs {
    fn to_profile(&self) -> DeviceProfile {
        DeviceProfile {
            user_agent: self.user_agent.clone(),
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            window_width: self.window_width,
            device_pixel_ratio: self.pixel_ratio,
            max_touch_points: self.touch_points,
            touch_events: self.touch,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a layout snapshot with the keyboard in the terminal
    Preview {
        /// Layout file (TOML)
        layout: PathBuf,

        /// TV mode: on, off, or auto
        #[arg(short, long, default_value = "auto")]
        tv: TvSwitch,
    },
    /// Show how TV mode would be resolved for a device
    Detect {
        #[command(flatten)]
        device: DeviceArgs,

        /// Page query string, e.g. "?tv=true"
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Store or clear the TV mode override
    TvMode {
        /// on, off, or auto (clears the override)
        setting: TvSwitch,

        #[command(flatten)]
        device: DeviceArgs,
    },
    /// List recognized remote key codes
    Keys,
    /// Display current configuration
    Config,
}

fn init_logging(log_level: &str, log_file: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_file, e);
            return;
        }
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Handle the config command - display current configuration
fn handle_config_command() {
    let cfg = config::read();

    let (path_str, exists) = match config::get_config_path() {
        Some(path) => {
            let exists = path.exists();
            (path.display().to_string(), exists)
        }
        None => ("Unable to determine config path".to_string(), false),
    };
    let prefs = config::get_preferences_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "Unable to determine preferences path".to_string());

    println!("Configuration File: {} (Exists: {})", path_str, if exists { "yes" } else { "no" });
    println!("Preferences File: {}", prefs);
    println!();
    println!("Current Configuration:");
    println!("=====================");
    println!("log_level: {}", cfg.log_level);
    println!("log_file: {}", cfg.log_file);
    println!();
    println!("[timing]");
    println!("startup_delay_ms: {}", cfg.timing.startup_delay_ms);
    println!("mutation_debounce_ms: {}", cfg.timing.mutation_debounce_ms);
    println!("slide_delay_ms: {}", cfg.timing.slide_delay_ms);
    println!();
    println!("[navigation]");
    let nav = &cfg.navigation;
    println!("vertical_threshold: {}", nav.vertical_threshold);
    println!("horizontal_threshold: {}", nav.horizontal_threshold);
    println!("row_tolerance: {}", nav.row_tolerance);
    println!("vertical_cross_axis: {}", nav.vertical_cross_axis);
    println!("horizontal_cross_axis: {}", nav.horizontal_cross_axis);
    println!("leave_navbar_down: {}", nav.leave_navbar_down);
    println!("leave_carousel_down: {}", nav.leave_carousel_down);
    println!("same_carousel_down: {}", nav.same_carousel_down);
    println!("enter_navbar_up: {}", nav.enter_navbar_up);
    println!("low_value_up: {}", nav.low_value_up);
    println!();
    println!("[focus]");
    println!("color: {:?}", cfg.focus.color);
    println!("border_px: {}", cfg.focus.border_px);
    println!("glow_px: {}", cfg.focus.glow_px);
    println!("z_index: {}", cfg.focus.z_index);
}

/// Resolve log configuration from CLI args and config file
/// CLI arguments take precedence over config file
fn resolve_log_config<'a>(cli: &'a Cli, config: &'a config::Config) -> (&'a str, &'a str) {
    let log_level = if cli.log_level != DEFAULT_LOG_LEVEL {
        cli.log_level.as_str()
    } else {
        config.log_level.as_str()
    };

    let log_file = if cli.log_file != DEFAULT_LOG_FILE {
        cli.log_file.as_str()
    } else {
        config.log_file.as_str()
    };

    (log_level, log_file)
}

/// Execute a CLI command by routing it to the appropriate command handler
async fn execute_command(command: Commands, config: config::Config) -> anyhow::Result<()> {
    match command {
        Commands::Config => unreachable!("Config command should be handled before execute_command"),
        Commands::Preview { layout, tv } => {
            commands::preview::run(&layout, tv.to_setting(), config).await
        }
        Commands::Detect { device, query } => {
            commands::detect::run(device.to_profile(), query)
        }
        Commands::TvMode { setting, device } => {
            commands::tv_mode::run(setting.to_setting(), device.to_profile())
        }
        Commands::Keys => commands::keys::run(),
    }
}

#[tokio::main]
async fn main() {
    let config = config::read();
    let cli = Cli::parse();

    // Resolve and initialize logging
    let (log_level, log_file) = resolve_log_config(&cli, &config);
    if log_file != DEFAULT_LOG_FILE {
        init_logging(log_level, log_file);
    }

    let command = cli.command;

    // Handle Config command separately (no runtime state needed)
    if let Commands::Config = command {
        handle_config_command();
        return;
    }

    if let Err(e) = execute_command(command, config).await {
        eprintln!("Error: {:#}", e);
        tracing::error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
}

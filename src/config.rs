use xdg::BaseDirectories;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use ratatui::style::Color;

use crate::navigator::NavigationWeights;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub log_file: String,
    pub timing: TimingConfig,
    pub navigation: NavigationWeights,
    pub focus: FocusStyle,
}

/// Fixed delays used to wait for the host to settle
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between TV mode turning on and the first focus
    pub startup_delay_ms: u64,
    /// Quiet period before a mutation triggers a rebuild
    pub mutation_debounce_ms: u64,
    /// Time a carousel slide transition takes before the new slide is focusable
    pub slide_delay_ms: u64,
}

/// Highlight applied to the focused element
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FocusStyle {
    #[serde(deserialize_with = "deserialize_color")]
    pub color: Color,
    pub border_px: u16,
    pub glow_px: u16,
    pub z_index: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            log_file: "/dev/null".to_string(),
            timing: TimingConfig::default(),
            navigation: NavigationWeights::default(),
            focus: FocusStyle::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            startup_delay_ms: 1000,
            mutation_debounce_ms: 100,
            slide_delay_ms: 300,
        }
    }
}

impl TimingConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }

    pub fn slide_delay(&self) -> Duration {
        Duration::from_millis(self.slide_delay_ms)
    }
}

impl Default for FocusStyle {
    fn default() -> Self {
        FocusStyle {
            color: Color::Rgb(255, 165, 0), // Orange
            border_px: 3,
            glow_px: 20,
            z_index: 1000,
        }
    }
}

/// Deserialize a color from a string (supports named colors, RGB hex, or RGB tuple)
fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color(&s).ok_or_else(|| serde::de::Error::custom(format!("Invalid color: {}", s)))
}

/// Parse a color string into a ratatui Color
/// Supports:
/// - Named colors: "red", "blue", "cyan", "orange", etc.
/// - Hex colors: "#FF6600", "#f60"
/// - RGB tuples: "255,165,0"
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "black" => return Some(Color::Black),
        "red" => return Some(Color::Red),
        "green" => return Some(Color::Green),
        "yellow" => return Some(Color::Yellow),
        "blue" => return Some(Color::Blue),
        "magenta" => return Some(Color::Magenta),
        "cyan" => return Some(Color::Cyan),
        "gray" | "grey" => return Some(Color::Gray),
        "white" => return Some(Color::White),
        "orange" => return Some(Color::Rgb(255, 165, 0)),
        _ => {}
    }

    if let Some(hex) = s.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        } else if hex.len() == 3 {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        }
    }

    if s.contains(',') {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() == 3 {
            let r = parts[0].trim().parse::<u8>().ok()?;
            let g = parts[1].trim().parse::<u8>().ok()?;
            let b = parts[2].trim().parse::<u8>().ok()?;
            return Some(Color::Rgb(r, g, b));
        }
    }

    None
}

fn base_dirs() -> BaseDirectories {
    BaseDirectories::with_prefix(env!("CARGO_PKG_NAME"))
}

pub fn get_config_path() -> Option<PathBuf> {
    let config_home = base_dirs().get_config_home()?;
    Some(config_home.join("config.toml"))
}

/// Where the TV mode override is persisted
pub fn get_preferences_path() -> Option<PathBuf> {
    let data_home = base_dirs().get_data_home()?;
    Some(data_home.join("preferences.toml"))
}

pub fn read() -> Config {
    let config_path = match get_config_path() {
        Some(path) => path,
        None => return Config::default(),
    };

    if !config_path.exists() {
        return Config::default();
    }

    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };

    parse(&content)
}

/// Parse config text, falling back to defaults when it is malformed
pub fn parse(content: &str) -> Config {
    toml::from_str(content).unwrap_or_else(|e| {
        tracing::warn!("CONFIG: ignoring malformed config: {}", e);
        Config::default()
    })
}

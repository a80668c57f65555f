use anyhow::{Context, Result};

use crate::commands::parse_url_flag;
use crate::detection::{
    detect_heuristic, matches_tv_user_agent, DeviceProfile, FilePreferences, PreferenceStore,
    TvDetection, TvResolution, TV_MODE_KEY,
};

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Render the inputs and the outcome of TV detection
pub fn format_detection(
    profile: &DeviceProfile,
    preference: Option<bool>,
    url_param: Option<bool>,
    resolution: TvResolution,
) -> String {
    let mut output = String::new();
    output.push_str("\nTV Detection\n");
    output.push_str(&format!("{}\n", "═".repeat(40)));
    output.push_str(&format!("{:<22}{}\n", "user agent:", profile.user_agent.as_deref().unwrap_or("-")));
    output.push_str(&format!(
        "{:<22}{}\n",
        "  tv signature:",
        yes_no(profile.user_agent.as_deref().is_some_and(matches_tv_user_agent))
    ));
    output.push_str(&format!(
        "{:<22}{} x {}\n",
        "screen:",
        show(profile.screen_width),
        show(profile.screen_height)
    ));
    output.push_str(&format!("{:<22}{}\n", "window width:", show(profile.window_width)));
    output.push_str(&format!("{:<22}{}\n", "pixel ratio:", show(profile.device_pixel_ratio)));
    output.push_str(&format!("{:<22}{}\n", "touch:", yes_no(profile.has_touch())));
    output.push_str(&format!("{:<22}{}\n", "heuristic:", yes_no(detect_heuristic(profile))));
    output.push('\n');
    output.push_str(&format!("{:<22}{}\n", "stored preference:", show(preference)));
    output.push_str(&format!("{:<22}{}\n", "url parameter:", show(url_param)));
    output.push_str(&format!("{}\n", "─".repeat(40)));
    output.push_str(&format!(
        "{:<22}{} (via {})\n",
        "TV mode:",
        if resolution.is_tv { "on" } else { "off" },
        resolution.source.label()
    ));
    output
}

pub fn run(profile: DeviceProfile, query: Option<String>) -> Result<()> {
    let store = FilePreferences::open_default().context("Failed to open preferences")?;
    let preference = store.get(TV_MODE_KEY);
    let url_param = parse_url_flag(query.as_deref());
    let detection = TvDetection::new(store, url_param, profile);
    let resolution = detection.announce_ready();

    print!(
        "{}",
        format_detection(
            detection.profile(),
            detection.preference(),
            url_param,
            resolution
        )
    );
    if let Some(raw) = preference.filter(|_| detection.preference().is_none()) {
        println!("(ignoring unrecognized stored value {:?})", raw);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{resolve, TvModeSource};

    #[test]
    fn test_format_detection_reports_source() {
        let profile = DeviceProfile {
            screen_width: Some(3840),
            ..Default::default()
        };
        let resolution = resolve(Some(false), Some(true), &profile);
        let output = format_detection(&profile, Some(false), Some(true), resolution);

        assert_eq!(resolution.source, TvModeSource::Preference);
        let line = |label: &str| {
            output
                .lines()
                .find(|l| l.starts_with(label))
                .map(|l| l[label.len()..].trim().to_string())
                .unwrap()
        };
        assert_eq!(line("heuristic:"), "yes");
        assert_eq!(line("url parameter:"), "true");
        assert_eq!(line("TV mode:"), "off (via stored preference)");
    }
}

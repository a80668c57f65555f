use anyhow::{Context, Result};

use crate::commands::TvSetting;
use crate::detection::{DeviceProfile, FilePreferences, PreferenceStore, TvDetection, TvResolution};
use crate::error::NavResult;

/// Store (or clear) the user's override and return the new effective mode
pub fn apply<P: PreferenceStore>(
    detection: &mut TvDetection<P>,
    setting: TvSetting,
) -> NavResult<TvResolution> {
    match setting {
        TvSetting::On => detection.set_tv_mode(true)?,
        TvSetting::Off => detection.set_tv_mode(false)?,
        TvSetting::Auto => detection.reset_to_auto()?,
    }
    Ok(detection.resolution())
}

pub fn run(setting: TvSetting, profile: DeviceProfile) -> Result<()> {
    let store = FilePreferences::open_default().context("Failed to open preferences")?;
    let path = store.path().display().to_string();
    let mut detection = TvDetection::new(store, None, profile);
    let resolution = apply(&mut detection, setting)
        .with_context(|| format!("Failed to update preferences at {}", path))?;

    println!(
        "TV mode is now {} (via {})",
        if resolution.is_tv { "on" } else { "off" },
        resolution.source.label()
    );
    println!("Preferences: {}", path);
    Ok(())
}

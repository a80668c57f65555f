use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::commands::TvSetting;
use crate::config::Config;
use crate::controller::{Event, NavigationController};
use crate::detection::{
    resolve, DeviceProfile, FilePreferences, PreferenceStore, TvModeEvent, TvModeSource,
    TvResolution, TV_MODE_KEY,
};
use crate::layout::load_layout;
use crate::runtime::Runtime;
use crate::surface::MemorySurface;
use crate::tui;

/// Decide the initial TV mode for the preview
///
/// A terminal has no user agent and no touch; auto mode therefore relies on
/// the stored preference.
pub fn initial_mode(setting: TvSetting, stored: Option<bool>) -> TvResolution {
    match setting {
        TvSetting::On => TvResolution {
            is_tv: true,
            source: TvModeSource::Override,
        },
        TvSetting::Off => TvResolution {
            is_tv: false,
            source: TvModeSource::Override,
        },
        TvSetting::Auto => resolve(stored, None, &DeviceProfile::default()),
    }
}

fn stored_preference() -> Option<bool> {
    match FilePreferences::open_default() {
        Ok(store) => store.get(TV_MODE_KEY).and_then(|v| v.parse().ok()),
        Err(e) => {
            warn!("DETECT: preferences unavailable: {}", e);
            None
        }
    }
}

pub async fn run(layout: &Path, setting: TvSetting, config: Config) -> Result<()> {
    let tree = load_layout(layout)
        .with_context(|| format!("Failed to load layout {}", layout.display()))?;

    let stored = match setting {
        TvSetting::Auto => stored_preference(),
        TvSetting::On | TvSetting::Off => None,
    };
    let mode = initial_mode(setting, stored);

    let controller = NavigationController::new(MemorySurface::new(tree), &config);
    let mut runtime = Runtime::new(controller);
    runtime.dispatch(Event::TvMode(TvModeEvent::Ready { is_tv: mode.is_tv }));

    tui::run(runtime, config.focus.clone())
        .await
        .context("Terminal preview failed")
}

//! TV device detection
//!
//! Decides whether the UI should run in TV mode. The answer comes from, in
//! strict order:
//!
//! 1. an explicit user preference persisted under [`TV_MODE_KEY`]
//! 2. a one-shot `tv=true|false` URL query parameter
//! 3. a heuristic over the device profile
//!
//! Earlier sources always win; values are never merged.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::{NavError, NavResult};

/// Preference key holding the user override
pub const TV_MODE_KEY: &str = "tvMode";

/// Screen width at which a display is assumed to be a TV regardless of other signals
const UHD_WIDTH: u32 = 3840;

/// Minimum screen width for the full-HD, non-touch heuristic
const FULL_HD_WIDTH: u32 = 1920;

/// Highest pixel ratio a TV browser is expected to report
const MAX_TV_PIXEL_RATIO: f64 = 1.5;

/// Capacity of the mode-change broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// User agent fragments identifying TVs, set-top boxes and consoles (lowercase)
const TV_USER_AGENT_SIGNATURES: &[&str] = &[
    "smart-tv",
    "smarttv",
    "googletv",
    "google tv",
    "android tv",
    "appletv",
    "apple tv",
    "hbbtv",
    "netcast",
    "webos",
    "web0s",
    "tizen",
    "roku",
    "crkey",
    "aftb",
    "aftm",
    "afts",
    "aftt",
    "bravia",
    "viera",
    "philipstv",
    "vidaa",
    "opera tv",
    "playstation",
    "xbox",
    "nintendo",
];

/// Device features the heuristic looks at
///
/// Fields are optional because hosts do not always expose them; a missing
/// value never counts as evidence for TV mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceProfile {
    pub user_agent: Option<String>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    pub window_width: Option<u32>,
    pub device_pixel_ratio: Option<f64>,
    pub max_touch_points: Option<u32>,
    pub touch_events: bool,
}

impl DeviceProfile {
    pub fn has_touch(&self) -> bool {
        self.touch_events || self.max_touch_points.unwrap_or(0) > 0
    }
}

/// Where a TV mode decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvModeSource {
    /// Forced for one run, not persisted
    Override,
    Preference,
    UrlParameter,
    Heuristic,
}

impl TvModeSource {
    pub fn label(&self) -> &'static str {
        match self {
            TvModeSource::Override => "command line",
            TvModeSource::Preference => "stored preference",
            TvModeSource::UrlParameter => "url parameter",
            TvModeSource::Heuristic => "auto-detect",
        }
    }
}

/// Resolved TV mode together with its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvResolution {
    pub is_tv: bool,
    pub source: TvModeSource,
}

/// Notifications emitted by [`TvDetection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvModeEvent {
    /// Detection finished its initial resolution
    Ready { is_tv: bool },
    /// The effective mode was changed by the user or reset to auto
    Changed { is_tv: bool },
}

/// True when the user agent carries a known TV or console signature
pub fn matches_tv_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    TV_USER_AGENT_SIGNATURES.iter().any(|sig| ua.contains(sig))
}

/// Heuristic TV classification
pub fn detect_heuristic(profile: &DeviceProfile) -> bool {
    if profile
        .user_agent
        .as_deref()
        .is_some_and(matches_tv_user_agent)
    {
        return true;
    }

    let Some(width) = profile.screen_width else {
        return false;
    };
    if width >= UHD_WIDTH {
        return true;
    }

    width >= FULL_HD_WIDTH
        && !profile.has_touch()
        && profile
            .device_pixel_ratio
            .is_some_and(|ratio| ratio <= MAX_TV_PIXEL_RATIO)
        && profile.window_width == Some(width)
}

/// Read the `tv` flag from a URL query string
///
/// Accepts an optional leading `?`. Values other than `true`/`false` are ignored.
pub fn parse_tv_param(query: &str) -> Option<bool> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "tv")
        .and_then(|(_, value)| parse_flag(value))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Apply the precedence chain
pub fn resolve(
    preference: Option<bool>,
    url_param: Option<bool>,
    profile: &DeviceProfile,
) -> TvResolution {
    if let Some(is_tv) = preference {
        return TvResolution {
            is_tv,
            source: TvModeSource::Preference,
        };
    }
    if let Some(is_tv) = url_param {
        return TvResolution {
            is_tv,
            source: TvModeSource::UrlParameter,
        };
    }
    TvResolution {
        is_tv: detect_heuristic(profile),
        source: TvModeSource::Heuristic,
    }
}

/// Key/value persistence for user preferences
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> NavResult<()>;
    fn remove(&mut self, key: &str) -> NavResult<()>;
}

/// Preferences kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> NavResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> NavResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Preferences persisted as a flat TOML table
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> NavResult<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| NavError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(NavError::Preferences)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    /// Open the store at the default XDG location
    pub fn open_default() -> NavResult<Self> {
        let path = crate::config::get_preferences_path().ok_or(NavError::NoPreferencesPath)?;
        Self::open(path)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn flush(&self) -> NavResult<()> {
        let write_err = |source| NavError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string(&self.values)?;
        fs::write(&self.path, content).map_err(write_err)
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> NavResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> NavResult<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// TV mode resolution bound to a preference store and a page load
pub struct TvDetection<P: PreferenceStore> {
    store: P,
    url_param: Option<bool>,
    profile: DeviceProfile,
    events: broadcast::Sender<TvModeEvent>,
}

impl<P: PreferenceStore> TvDetection<P> {
    pub fn new(store: P, url_param: Option<bool>, profile: DeviceProfile) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            url_param,
            profile,
            events,
        }
    }

    /// Stored override, if any
    pub fn preference(&self) -> Option<bool> {
        self.store
            .get(TV_MODE_KEY)
            .as_deref()
            .and_then(parse_flag)
    }

    pub fn resolution(&self) -> TvResolution {
        resolve(self.preference(), self.url_param, &self.profile)
    }

    pub fn is_tv(&self) -> bool {
        self.resolution().is_tv
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TvModeEvent> {
        self.events.subscribe()
    }

    /// Persist a user override and announce it
    pub fn set_tv_mode(&mut self, enabled: bool) -> NavResult<()> {
        self.store
            .set(TV_MODE_KEY, if enabled { "true" } else { "false" })?;
        info!("DETECT: TV mode set to {} by user", enabled);
        self.emit(TvModeEvent::Changed { is_tv: enabled });
        Ok(())
    }

    /// Drop the override and announce the heuristic result
    pub fn reset_to_auto(&mut self) -> NavResult<()> {
        self.store.remove(TV_MODE_KEY)?;
        let is_tv = detect_heuristic(&self.profile);
        info!("DETECT: TV mode reset to auto ({})", is_tv);
        self.emit(TvModeEvent::Changed { is_tv });
        Ok(())
    }

    /// Announce the initial resolution
    pub fn announce_ready(&self) -> TvResolution {
        let resolution = self.resolution();
        debug!(
            "DETECT: ready, is_tv={} via {}",
            resolution.is_tv,
            resolution.source.label()
        );
        self.emit(TvModeEvent::Ready {
            is_tv: resolution.is_tv,
        });
        resolution
    }

    fn emit(&self, event: TvModeEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uhd_profile() -> DeviceProfile {
        DeviceProfile {
            screen_width: Some(3840),
            window_width: Some(3840),
            device_pixel_ratio: Some(1.0),
            ..Default::default()
        }
    }

    fn desktop_profile() -> DeviceProfile {
        DeviceProfile {
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/130.0".to_string()),
            screen_width: Some(1920),
            window_width: Some(1600),
            device_pixel_ratio: Some(1.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_user_agent_signatures() {
        assert!(matches_tv_user_agent(
            "Mozilla/5.0 (SMART-TV; Linux; Tizen 6.0) AppleWebKit/537.36"
        ));
        assert!(matches_tv_user_agent("Mozilla/5.0 (Linux; Android 9; AFTMM Build/PS7233)"));
        assert!(matches_tv_user_agent("Mozilla/5.0 (Web0S; Linux/SmartTV)"));
        assert!(!matches_tv_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)"));
    }

    #[test]
    fn test_heuristic_uhd_width() {
        assert!(detect_heuristic(&uhd_profile()));
    }

    #[test]
    fn test_heuristic_full_hd_fullscreen_no_touch() {
        let profile = DeviceProfile {
            screen_width: Some(1920),
            window_width: Some(1920),
            device_pixel_ratio: Some(1.0),
            ..Default::default()
        };
        assert!(detect_heuristic(&profile));

        let touch = DeviceProfile {
            max_touch_points: Some(5),
            ..profile.clone()
        };
        assert!(!detect_heuristic(&touch));

        let hidpi = DeviceProfile {
            device_pixel_ratio: Some(2.0),
            ..profile.clone()
        };
        assert!(!detect_heuristic(&hidpi));
    }

    #[test]
    fn test_heuristic_desktop_window() {
        assert!(!detect_heuristic(&desktop_profile()));
    }

    #[test]
    fn test_heuristic_missing_properties() {
        assert!(!detect_heuristic(&DeviceProfile::default()));
        let no_ratio = DeviceProfile {
            screen_width: Some(1920),
            window_width: Some(1920),
            ..Default::default()
        };
        assert!(!detect_heuristic(&no_ratio));
    }

    #[test]
    fn test_parse_tv_param() {
        assert_eq!(parse_tv_param("?tv=true"), Some(true));
        assert_eq!(parse_tv_param("page=2&tv=false"), Some(false));
        assert_eq!(parse_tv_param("?tv=yes"), None);
        assert_eq!(parse_tv_param("?tvx=true"), None);
        assert_eq!(parse_tv_param(""), None);
    }

    #[test]
    fn test_precedence_for_all_combinations() {
        let profiles = [uhd_profile(), desktop_profile()];
        let options = [None, Some(true), Some(false)];

        for profile in &profiles {
            for preference in options {
                for url in options {
                    let resolution = resolve(preference, url, profile);
                    match (preference, url) {
                        (Some(p), _) => {
                            assert_eq!(resolution.is_tv, p);
                            assert_eq!(resolution.source, TvModeSource::Preference);
                        }
                        (None, Some(u)) => {
                            assert_eq!(resolution.is_tv, u);
                            assert_eq!(resolution.source, TvModeSource::UrlParameter);
                        }
                        (None, None) => {
                            assert_eq!(resolution.is_tv, detect_heuristic(profile));
                            assert_eq!(resolution.source, TvModeSource::Heuristic);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_stored_false_beats_url_and_4k() {
        let store = MemoryPreferences::new().with(TV_MODE_KEY, "false");
        let detection = TvDetection::new(store, parse_tv_param("?tv=true"), uhd_profile());
        assert!(!detection.is_tv());
        assert_eq!(detection.resolution().source, TvModeSource::Preference);
    }

    #[test]
    fn test_garbage_preference_is_ignored() {
        let store = MemoryPreferences::new().with(TV_MODE_KEY, "maybe");
        let detection = TvDetection::new(store, Some(true), desktop_profile());
        assert_eq!(detection.preference(), None);
        assert_eq!(detection.resolution().source, TvModeSource::UrlParameter);
    }

    #[test]
    fn test_set_tv_mode_persists_and_emits() {
        let mut detection = TvDetection::new(MemoryPreferences::new(), None, desktop_profile());
        let mut rx = detection.subscribe();

        detection.set_tv_mode(true).unwrap();
        assert!(detection.is_tv());
        assert_eq!(rx.try_recv().unwrap(), TvModeEvent::Changed { is_tv: true });
    }

    #[test]
    fn test_reset_to_auto_emits_heuristic() {
        let store = MemoryPreferences::new().with(TV_MODE_KEY, "false");
        let mut detection = TvDetection::new(store, None, uhd_profile());
        let mut rx = detection.subscribe();

        detection.reset_to_auto().unwrap();
        assert_eq!(detection.preference(), None);
        assert!(detection.is_tv());
        assert_eq!(rx.try_recv().unwrap(), TvModeEvent::Changed { is_tv: true });
    }

    #[test]
    fn test_announce_ready() {
        let detection = TvDetection::new(MemoryPreferences::new(), Some(true), desktop_profile());
        let mut rx = detection.subscribe();

        let resolution = detection.announce_ready();
        assert_eq!(resolution.source, TvModeSource::UrlParameter);
        assert_eq!(rx.try_recv().unwrap(), TvModeEvent::Ready { is_tv: true });
    }

    #[test]
    fn test_file_preferences_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let mut store = FilePreferences::open(&path).unwrap();
        assert_eq!(store.get(TV_MODE_KEY), None);
        store.set(TV_MODE_KEY, "true").unwrap();

        let reopened = FilePreferences::open(&path).unwrap();
        assert_eq!(reopened.get(TV_MODE_KEY).as_deref(), Some("true"));

        let mut reopened = reopened;
        reopened.remove(TV_MODE_KEY).unwrap();
        let cleared = FilePreferences::open(&path).unwrap();
        assert_eq!(cleared.get(TV_MODE_KEY), None);
    }

    #[test]
    fn test_file_preferences_rejects_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "tvMode = [").unwrap();

        assert!(matches!(
            FilePreferences::open(&path),
            Err(NavError::Preferences(_))
        ));
    }
}

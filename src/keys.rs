//! Remote control key normalization
//!
//! TV platforms report the same button with different key codes. Five vendor
//! tables (standard keyboard, Samsung/Tizen, Fire TV, WebOS and a catch-all)
//! are merged into one compile-time map keyed by raw code; codes shared by
//! several vendors appear once with the first vendor that defines them.
//! DOM key names are vendor agnostic and take precedence over codes.

use phf::phf_map;
use tracing::{debug, trace};

use crate::navigator::Direction;

/// Platform family a key code table comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Standard,
    Samsung,
    FireTv,
    WebOs,
    Misc,
}

impl Vendor {
    pub fn label(&self) -> &'static str {
        match self {
            Vendor::Standard => "standard",
            Vendor::Samsung => "samsung/tizen",
            Vendor::FireTv => "fire tv",
            Vendor::WebOs => "webos",
            Vendor::Misc => "misc",
        }
    }
}

/// Canonical remote buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Escape,
    PlayPause,
    Play,
    Pause,
    Stop,
    FastForward,
    Rewind,
    Menu,
    Info,
    Red,
    Green,
    Yellow,
    Blue,
}

/// Player transport commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCommand {
    PlayPause,
    Play,
    Pause,
    Stop,
    FastForward,
    Rewind,
}

/// What the controller does with a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Move(Direction),
    Activate,
    Back,
    Media(MediaCommand),
}

impl RemoteKey {
    pub fn name(&self) -> &'static str {
        match self {
            RemoteKey::ArrowUp => "ArrowUp",
            RemoteKey::ArrowDown => "ArrowDown",
            RemoteKey::ArrowLeft => "ArrowLeft",
            RemoteKey::ArrowRight => "ArrowRight",
            RemoteKey::Enter => "Enter",
            RemoteKey::Space => "Space",
            RemoteKey::Escape => "Escape",
            RemoteKey::PlayPause => "PlayPause",
            RemoteKey::Play => "Play",
            RemoteKey::Pause => "Pause",
            RemoteKey::Stop => "Stop",
            RemoteKey::FastForward => "FastForward",
            RemoteKey::Rewind => "Rewind",
            RemoteKey::Menu => "Menu",
            RemoteKey::Info => "Info",
            RemoteKey::Red => "Red",
            RemoteKey::Green => "Green",
            RemoteKey::Yellow => "Yellow",
            RemoteKey::Blue => "Blue",
        }
    }

    /// Command bound to the key, if any
    ///
    /// Keys without a command are still recognized (and so suppressed).
    pub fn command(&self) -> Option<NavCommand> {
        match self {
            RemoteKey::ArrowUp => Some(NavCommand::Move(Direction::Up)),
            RemoteKey::ArrowDown => Some(NavCommand::Move(Direction::Down)),
            RemoteKey::ArrowLeft => Some(NavCommand::Move(Direction::Left)),
            RemoteKey::ArrowRight => Some(NavCommand::Move(Direction::Right)),
            RemoteKey::Enter | RemoteKey::Space => Some(NavCommand::Activate),
            RemoteKey::Escape => Some(NavCommand::Back),
            RemoteKey::PlayPause => Some(NavCommand::Media(MediaCommand::PlayPause)),
            RemoteKey::Play => Some(NavCommand::Media(MediaCommand::Play)),
            RemoteKey::Pause => Some(NavCommand::Media(MediaCommand::Pause)),
            RemoteKey::Stop => Some(NavCommand::Media(MediaCommand::Stop)),
            RemoteKey::FastForward => Some(NavCommand::Media(MediaCommand::FastForward)),
            RemoteKey::Rewind => Some(NavCommand::Media(MediaCommand::Rewind)),
            RemoteKey::Menu
            | RemoteKey::Info
            | RemoteKey::Red
            | RemoteKey::Green
            | RemoteKey::Yellow
            | RemoteKey::Blue => None,
        }
    }
}

/// A recognized key with the table it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: RemoteKey,
    pub vendor: Vendor,
}

const fn bind(key: RemoteKey, vendor: Vendor) -> KeyBinding {
    KeyBinding { key, vendor }
}

static KEY_CODES: phf::Map<u32, KeyBinding> = phf_map! {
    // Standard keyboard
    37u32 => bind(RemoteKey::ArrowLeft, Vendor::Standard),
    38u32 => bind(RemoteKey::ArrowUp, Vendor::Standard),
    39u32 => bind(RemoteKey::ArrowRight, Vendor::Standard),
    40u32 => bind(RemoteKey::ArrowDown, Vendor::Standard),
    13u32 => bind(RemoteKey::Enter, Vendor::Standard),
    32u32 => bind(RemoteKey::Space, Vendor::Standard),
    27u32 => bind(RemoteKey::Escape, Vendor::Standard),
    // Samsung / Tizen
    10009u32 => bind(RemoteKey::Escape, Vendor::Samsung),
    10182u32 => bind(RemoteKey::Escape, Vendor::Samsung),
    10252u32 => bind(RemoteKey::PlayPause, Vendor::Samsung),
    415u32 => bind(RemoteKey::Play, Vendor::Samsung),
    19u32 => bind(RemoteKey::Pause, Vendor::Samsung),
    413u32 => bind(RemoteKey::Stop, Vendor::Samsung),
    417u32 => bind(RemoteKey::FastForward, Vendor::Samsung),
    412u32 => bind(RemoteKey::Rewind, Vendor::Samsung),
    403u32 => bind(RemoteKey::Red, Vendor::Samsung),
    404u32 => bind(RemoteKey::Green, Vendor::Samsung),
    405u32 => bind(RemoteKey::Yellow, Vendor::Samsung),
    406u32 => bind(RemoteKey::Blue, Vendor::Samsung),
    457u32 => bind(RemoteKey::Info, Vendor::Samsung),
    // Fire TV
    4u32 => bind(RemoteKey::Escape, Vendor::FireTv),
    23u32 => bind(RemoteKey::Enter, Vendor::FireTv),
    179u32 => bind(RemoteKey::PlayPause, Vendor::FireTv),
    227u32 => bind(RemoteKey::Rewind, Vendor::FireTv),
    228u32 => bind(RemoteKey::FastForward, Vendor::FireTv),
    // WebOS
    461u32 => bind(RemoteKey::Escape, Vendor::WebOs),
    // Misc
    166u32 => bind(RemoteKey::Escape, Vendor::Misc),
    178u32 => bind(RemoteKey::Stop, Vendor::Misc),
    93u32 => bind(RemoteKey::Menu, Vendor::Misc),
};

static KEY_NAMES: phf::Map<&'static str, RemoteKey> = phf_map! {
    "ArrowUp" => RemoteKey::ArrowUp,
    "Up" => RemoteKey::ArrowUp,
    "ArrowDown" => RemoteKey::ArrowDown,
    "Down" => RemoteKey::ArrowDown,
    "ArrowLeft" => RemoteKey::ArrowLeft,
    "Left" => RemoteKey::ArrowLeft,
    "ArrowRight" => RemoteKey::ArrowRight,
    "Right" => RemoteKey::ArrowRight,
    "Enter" => RemoteKey::Enter,
    "Accept" => RemoteKey::Enter,
    " " => RemoteKey::Space,
    "Spacebar" => RemoteKey::Space,
    "Escape" => RemoteKey::Escape,
    "Esc" => RemoteKey::Escape,
    "GoBack" => RemoteKey::Escape,
    "BrowserBack" => RemoteKey::Escape,
    "XF86Back" => RemoteKey::Escape,
    "MediaPlayPause" => RemoteKey::PlayPause,
    "MediaPlay" => RemoteKey::Play,
    "MediaPause" => RemoteKey::Pause,
    "MediaStop" => RemoteKey::Stop,
    "MediaFastForward" => RemoteKey::FastForward,
    "MediaRewind" => RemoteKey::Rewind,
    "ContextMenu" => RemoteKey::Menu,
    "Info" => RemoteKey::Info,
    "ColorF0Red" => RemoteKey::Red,
    "ColorF1Green" => RemoteKey::Green,
    "ColorF2Yellow" => RemoteKey::Yellow,
    "ColorF3Blue" => RemoteKey::Blue,
};

/// Phase of a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
    Press,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Host-agnostic key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// DOM-style key name (`"ArrowUp"`, `"Enter"`, `"t"`), may be empty
    pub key: String,
    /// Raw key code, 0 when unknown
    pub code: u32,
    pub kind: KeyEventKind,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, code: u32, kind: KeyEventKind) -> Self {
        Self {
            key: key.into(),
            code,
            kind,
            modifiers: Modifiers::default(),
        }
    }

    /// Key-down event for a named key
    pub fn down(key: impl Into<String>, code: u32) -> Self {
        Self::new(key, code, KeyEventKind::Down)
    }

    /// Key-down event carrying only a raw code, as some remotes send
    pub fn code(code: u32) -> Self {
        Self::new("", code, KeyEventKind::Down)
    }

    pub fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// `Ctrl+Alt+T` toggles the debug navigator
    pub fn is_debug_toggle(&self) -> bool {
        self.modifiers.ctrl
            && self.modifiers.alt
            && (self.key.eq_ignore_ascii_case("t") || self.code == 84)
    }
}

/// Map a key event to a canonical remote key
pub fn normalize(event: &KeyEvent) -> Option<KeyBinding> {
    if let Some(key) = KEY_NAMES.get(event.key.as_str()) {
        trace!("KEY: '{}' matched by name as {}", event.key, key.name());
        return Some(bind(*key, Vendor::Standard));
    }
    match KEY_CODES.get(&event.code) {
        Some(binding) => {
            trace!(
                "KEY: code {} matched {} via {} table",
                event.code,
                binding.key.name(),
                binding.vendor.label()
            );
            Some(*binding)
        }
        None => {
            debug!("KEY: unrecognized key '{}' (code {})", event.key, event.code);
            None
        }
    }
}

/// All code bindings, sorted by code
pub fn code_bindings() -> Vec<(u32, KeyBinding)> {
    let mut entries: Vec<(u32, KeyBinding)> =
        KEY_CODES.entries().map(|(code, binding)| (*code, *binding)).collect();
    entries.sort_by_key(|(code, _)| *code);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_arrows_by_code() {
        assert_eq!(normalize(&KeyEvent::code(37)).unwrap().key, RemoteKey::ArrowLeft);
        assert_eq!(normalize(&KeyEvent::code(38)).unwrap().key, RemoteKey::ArrowUp);
        assert_eq!(normalize(&KeyEvent::code(39)).unwrap().key, RemoteKey::ArrowRight);
        assert_eq!(normalize(&KeyEvent::code(40)).unwrap().key, RemoteKey::ArrowDown);
    }

    #[test]
    fn test_vendor_back_keys() {
        for (code, vendor) in [
            (10009, Vendor::Samsung),
            (4, Vendor::FireTv),
            (461, Vendor::WebOs),
            (166, Vendor::Misc),
        ] {
            let binding = normalize(&KeyEvent::code(code)).unwrap();
            assert_eq!(binding.key, RemoteKey::Escape);
            assert_eq!(binding.vendor, vendor);
        }
    }

    #[test]
    fn test_name_beats_code() {
        // A keyboard reporting "ArrowDown" with an unrelated code
        let event = KeyEvent::down("ArrowDown", 19);
        assert_eq!(normalize(&event).unwrap().key, RemoteKey::ArrowDown);
    }

    #[test]
    fn test_legacy_names() {
        assert_eq!(normalize(&KeyEvent::down("Up", 0)).unwrap().key, RemoteKey::ArrowUp);
        assert_eq!(normalize(&KeyEvent::down("Esc", 0)).unwrap().key, RemoteKey::Escape);
        assert_eq!(normalize(&KeyEvent::down(" ", 0)).unwrap().key, RemoteKey::Space);
    }

    #[test]
    fn test_unrecognized_key() {
        assert_eq!(normalize(&KeyEvent::down("a", 65)), None);
        assert_eq!(normalize(&KeyEvent::code(0)), None);
    }

    #[test]
    fn test_commands() {
        assert_eq!(RemoteKey::Enter.command(), Some(NavCommand::Activate));
        assert_eq!(RemoteKey::Space.command(), Some(NavCommand::Activate));
        assert_eq!(RemoteKey::Escape.command(), Some(NavCommand::Back));
        assert_eq!(
            RemoteKey::ArrowLeft.command(),
            Some(NavCommand::Move(Direction::Left))
        );
        assert_eq!(
            RemoteKey::PlayPause.command(),
            Some(NavCommand::Media(MediaCommand::PlayPause))
        );
        assert_eq!(RemoteKey::Red.command(), None);
    }

    #[test]
    fn test_debug_toggle() {
        let mods = Modifiers {
            ctrl: true,
            alt: true,
            ..Default::default()
        };
        assert!(KeyEvent::down("t", 84).with_modifiers(mods).is_debug_toggle());
        assert!(KeyEvent::down("T", 0).with_modifiers(mods).is_debug_toggle());
        assert!(!KeyEvent::down("t", 84).is_debug_toggle());
    }

    #[test]
    fn test_code_bindings_sorted() {
        let bindings = code_bindings();
        assert!(bindings.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(bindings.iter().any(|(code, _)| *code == 10252));
    }
}

pub mod detect;
pub mod keys;
pub mod preview;
pub mod tv_mode;

use crate::detection::parse_tv_param;

/// How the user wants TV mode decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvSetting {
    On,
    Off,
    /// Stored preference first, then auto-detection
    Auto,
}

/// Read an optional `?tv=` query string
///
/// Anything that is not a recognizable `tv=true|false` counts as absent.
pub fn parse_url_flag(query: Option<&str>) -> Option<bool> {
    query.and_then(parse_tv_param)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_flag() {
        assert_eq!(parse_url_flag(None), None);
        assert_eq!(parse_url_flag(Some("?tv=true")), Some(true));
        assert_eq!(parse_url_flag(Some("page=2&tv=false")), Some(false));
        assert_eq!(parse_url_flag(Some("tv=yes")), None);
    }
}

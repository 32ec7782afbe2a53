//! Device classification for the root-path redirect.
//!
//! A heuristic: a known mobile platform in the user agent, or a viewport
//! narrower than [`MOBILE_MAX_VIEWPORT`], means mobile. Evaluated each time
//! `/` is resolved; never cached and not re-evaluated on resize.

/// User-agent substrings (case-insensitive) that mark a mobile device.
pub const MOBILE_UA_MARKERS: &[&str] = &[
    "Android",
    "webOS",
    "iPhone",
    "iPad",
    "iPod",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

/// Viewports strictly narrower than this many logical pixels are mobile.
pub const MOBILE_MAX_VIEWPORT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

/// What the client told us about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientHints {
    pub user_agent: Option<String>,
    pub viewport_width: Option<u32>,
}

impl ClientHints {
    pub fn new(user_agent: Option<&str>, viewport_width: Option<u32>) -> Self {
        Self {
            user_agent: user_agent.map(str::to_string),
            viewport_width,
        }
    }
}

pub fn classify(hints: &ClientHints) -> DeviceClass {
    let mobile_ua = hints
        .user_agent
        .as_deref()
        .map(|ua| {
            let ua = ua.to_ascii_lowercase();
            MOBILE_UA_MARKERS
                .iter()
                .any(|marker| ua.contains(&marker.to_ascii_lowercase()))
        })
        .unwrap_or(false);

    let narrow = hints
        .viewport_width
        .map(|w| w < MOBILE_MAX_VIEWPORT)
        .unwrap_or(false);

    if mobile_ua || narrow {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
    const DESKTOP_UA: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/126.0 Safari/537.36";

    #[test]
    fn test_mobile_user_agents() {
        for marker in MOBILE_UA_MARKERS {
            let ua = format!("Mozilla/5.0 ({}) test", marker.to_uppercase());
            assert_eq!(
                classify(&ClientHints::new(Some(&ua), None)),
                DeviceClass::Mobile,
                "{}",
                marker
            );
        }
        assert_eq!(classify(&ClientHints::new(Some(IPHONE_UA), Some(1280))), DeviceClass::Mobile);
    }

    #[test]
    fn test_narrow_viewport_is_mobile() {
        assert_eq!(classify(&ClientHints::new(Some(DESKTOP_UA), Some(767))), DeviceClass::Mobile);
        assert_eq!(classify(&ClientHints::new(Some(DESKTOP_UA), Some(768))), DeviceClass::Desktop);
    }

    #[test]
    fn test_no_hints_is_desktop() {
        assert_eq!(classify(&ClientHints::default()), DeviceClass::Desktop);
        assert_eq!(classify(&ClientHints::new(Some(DESKTOP_UA), None)), DeviceClass::Desktop);
    }
}

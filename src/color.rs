// File: src/color.rs

/// Marker orange used for user-placed points and as the fallback event
/// color.
pub const DEFAULT_EVENT_COLOR: &str = "#e27728";
/// Blue dot marking the device's own location.
pub const USER_LOCATION_COLOR: &str = "#0096ff";
/// Solved route lines.
pub const ROUTE_COLOR: &str = "#0596ff";
/// Marker outlines.
pub const OUTLINE_COLOR: &str = "#ffffff";

/// Validates a user/backend supplied hex color and normalizes it to
/// lowercase `#rrggbb` (or `#rrggbbaa`). `#rgb` shorthand is expanded.
/// Returns `None` for anything that is not a hex color.
pub fn normalize_hex(color: &str) -> Option<String> {
    let digits = color.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        3 => {
            let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
            Some(format!("#{}", expanded.to_lowercase()))
        }
        6 | 8 => Some(format!("#{}", digits.to_lowercase())),
        _ => None,
    }
}

/// Appends an alpha channel to a normalized `#rrggbb` color, replacing
/// any alpha already present. Used for semi-transparent polygon fills.
pub fn with_alpha(color: &str, alpha: u8) -> String {
    let base = &color[..color.len().min(7)];
    format!("{}{:02x}", base, alpha)
}

//! Color helpers for highlight/overlay settings.

/// True for a 6-digit RRGGBB hex string (no leading `#`).
pub fn is_hex_rgb(value: &str) -> bool {
    value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Expands RRGGBB to the AARRGGBB form spreadsheet fills use.
pub fn to_argb(rgb: &str) -> String {
    format!("FF{}", rgb.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_hex() {
        assert!(is_hex_rgb("90EE90"));
        assert!(is_hex_rgb("ffd700"));
    }

    #[test]
    fn rejects_invalid_hex() {
        assert!(!is_hex_rgb("#90EE90"));
        assert!(!is_hex_rgb("90EE9"));
        assert!(!is_hex_rgb("GGGGGG"));
    }

    #[test]
    fn argb_prefixes_opaque_alpha() {
        assert_eq!(to_argb("90ee90"), "FF90EE90");
    }
}

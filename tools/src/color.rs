//! Hex colour helpers used by the theme generator

use anyhow::{bail, Result};

/// Parse `#rrggbb` or `#rgb` into its channels
pub fn parse_hex(color: &str) -> Result<[u8; 3]> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid hex colour: {color}");
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => bail!("invalid hex colour: {color}"),
    };

    let mut channels = [0u8; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16)
            .map_err(|_| anyhow::anyhow!("invalid hex colour: {color}"))?;
    }
    Ok(channels)
}

/// Lighten (positive `percent`) or darken (negative) a hex colour.
///
/// Each channel moves by `round(255 * percent / 100)` and is clamped to 0..=255.
pub fn adjust_hex_brightness(color: &str, percent: f64) -> Result<String> {
    let delta = (255.0 * percent / 100.0).round() as i32;
    let [r, g, b] = parse_hex(color)?;
    let shift = |c: u8| (c as i32 + delta).clamp(0, 255) as u8;
    Ok(format!("#{:02x}{:02x}{:02x}", shift(r), shift(g), shift(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_long_and_short() {
        assert_eq!(parse_hex("#0066cc").unwrap(), [0x00, 0x66, 0xcc]);
        assert_eq!(parse_hex("#fff").unwrap(), [0xff, 0xff, 0xff]);
        assert_eq!(parse_hex("1a2B3c").unwrap(), [0x1a, 0x2b, 0x3c]);
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#gggggg").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn test_lighten() {
        // 10% → +26 per channel
        assert_eq!(adjust_hex_brightness("#0066cc", 10.0).unwrap(), "#1a80e6");
    }

    #[test]
    fn test_darken() {
        assert_eq!(adjust_hex_brightness("#0066cc", -10.0).unwrap(), "#004cb2");
    }

    #[test]
    fn test_clamps_channels() {
        assert_eq!(adjust_hex_brightness("#ffffff", 50.0).unwrap(), "#ffffff");
        assert_eq!(adjust_hex_brightness("#000", -50.0).unwrap(), "#000000");
    }

    #[test]
    fn test_zero_is_identity() {
        assert_eq!(adjust_hex_brightness("#ABCDEF", 0.0).unwrap(), "#abcdef");
    }
}

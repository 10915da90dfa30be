//! Color string parsing for callers (CLI flags, serialized presets).
//!
//! Accepts `#RGB`/`#RRGGBB` hex strings, a small set of named colors, and
//! `r,g,b` decimal triples. Components of a triple are clamped into [0, 255].

/// Parse a color string into an RGB triple.
///
/// Returns an error message describing the accepted forms when the string
/// matches none of them.
pub fn parse_color(s: &str) -> Result<[u8; 3], String> {
    let trimmed = s.trim();

    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex);
    }

    match trimmed.to_lowercase().as_str() {
        "red" => return Ok([255, 0, 0]),
        "green" => return Ok([0, 255, 0]),
        "blue" => return Ok([0, 0, 255]),
        "white" => return Ok([255, 255, 255]),
        "black" => return Ok([0, 0, 0]),
        "yellow" => return Ok([255, 255, 0]),
        "cyan" => return Ok([0, 255, 255]),
        "magenta" => return Ok([255, 0, 255]),
        _ => {}
    }

    if trimmed.contains(',') {
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() == 3 {
            let mut rgb = [0u8; 3];
            for (slot, part) in rgb.iter_mut().zip(&parts) {
                let v: i64 = part
                    .parse()
                    .map_err(|_| format!("invalid color component: {}", part))?;
                *slot = v.clamp(0, 255) as u8;
            }
            return Ok(rgb);
        }
    }

    Err(format!(
        "color must be #RGB, #RRGGBB, r,g,b or a color name, got '{}'",
        s
    ))
}

fn parse_hex(hex: &str) -> Result<[u8; 3], String> {
    match hex.len() {
        3 => {
            // #RGB: each digit doubled, 0xF -> 0xFF
            let r = u8::from_str_radix(&hex[0..1], 16).map_err(|_| bad_hex(hex))?;
            let g = u8::from_str_radix(&hex[1..2], 16).map_err(|_| bad_hex(hex))?;
            let b = u8::from_str_radix(&hex[2..3], 16).map_err(|_| bad_hex(hex))?;
            Ok([r * 17, g * 17, b * 17])
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| bad_hex(hex))?;
            let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| bad_hex(hex))?;
            let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| bad_hex(hex))?;
            Ok([r, g, b])
        }
        _ => Err(format!(
            "hex color must be #RGB or #RRGGBB, got {} digits",
            hex.len()
        )),
    }
}

fn bad_hex(hex: &str) -> String {
    format!("invalid hex digits in color '#{}'", hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_rrggbb() {
        assert_eq!(parse_color("#FF0000").unwrap(), [255, 0, 0]);
        assert_eq!(parse_color("#00ff00").unwrap(), [0, 255, 0]);
        assert_eq!(parse_color("#000000").unwrap(), [0, 0, 0]);
    }

    #[test]
    fn test_parse_hex_rgb_doubles_digits() {
        assert_eq!(parse_color("#FFF").unwrap(), [255, 255, 255]);
        // A=10*17=170, B=11*17=187, C=12*17=204
        assert_eq!(parse_color("#abc").unwrap(), [170, 187, 204]);
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color("white").unwrap(), [255, 255, 255]);
        assert_eq!(parse_color("Magenta").unwrap(), [255, 0, 255]);
        assert_eq!(parse_color(" cyan ").unwrap(), [0, 255, 255]);
    }

    #[test]
    fn test_parse_triple_clamps_components() {
        assert_eq!(parse_color("10, 20, 30").unwrap(), [10, 20, 30]);
        assert_eq!(parse_color("300,-5,255").unwrap(), [255, 0, 255]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_color("#GG0000").is_err());
        assert!(parse_color("#FF00").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
        assert!(parse_color("1,2").is_err());
    }
}

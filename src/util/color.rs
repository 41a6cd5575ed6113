/// Derive a stable `#rrggbb` color for a token key.
///
/// Hashes the UTF-16 code units of `key` with a wrapping 32-bit rolling hash,
/// maps the hash onto a hue and converts HSL(hue, 60%, 52%) to hex. Different
/// keys may collide; the same key always yields the same color.
pub fn color_from_string(key: &str) -> String {
    let mut hash: i32 = 0;
    for unit in key.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    let hue = (i64::from(hash).abs() % 360) as f64;
    hsl_to_hex(hue, 60.0, 52.0)
}

fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let s = saturation / 100.0;
    let l = lightness / 100.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = hue / 60.0;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());

    let (r, g, b) = if (0.0..1.0).contains(&h) {
        (c, x, 0.0)
    } else if h < 2.0 {
        (x, c, 0.0)
    } else if h < 3.0 {
        (0.0, c, x)
    } else if h < 4.0 {
        (0.0, x, c)
    } else if h < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let m = l - c / 2.0;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel_byte(r + m),
        channel_byte(g + m),
        channel_byte(b + m)
    )
}

/// Scale a 0..1 channel to a byte, rounding halves up.
fn channel_byte(channel: f64) -> u8 {
    (channel * 255.0 + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Mix each channel of a `#rrggbb` color toward white by `amount` (0..1).
///
/// Anything that is not a six-digit hex color comes back unchanged.
pub fn lighten_color(color: &str, amount: f64) -> String {
    let hex = color.trim_start_matches('#');
    if hex.len() != 6 {
        return color.to_string();
    }
    let Ok(num) = u32::from_str_radix(hex, 16) else {
        return color.to_string();
    };
    let mix = |channel: u32| -> u8 {
        let channel = f64::from(channel);
        (channel + (255.0 - channel) * amount + 0.5)
            .floor()
            .clamp(0.0, 255.0) as u8
    };
    format!(
        "#{:02x}{:02x}{:02x}",
        mix((num >> 16) & 0xff),
        mix((num >> 8) & 0xff),
        mix(num & 0xff)
    )
}

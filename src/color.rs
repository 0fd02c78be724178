//! HSL to RGB565 conversion for the trace colour map

use embedded_graphics::pixelcolor::Rgb565;
use micromath::F32Ext;

/// Convert hue (degrees), saturation and lightness (both `0.0..=1.0`) to a
/// packed RGB565 colour.
///
/// Hues outside `0..360` wrap. Each channel saturates at its field width.
pub fn hsl_to_rgb565(hue: f32, saturation: f32, lightness: f32) -> Rgb565 {
    let mut hue = hue % 360.0;
    if hue < 0.0 {
        hue += 360.0;
    }

    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h_prime = hue / 60.0;
    let sector = h_prime as u32;
    let pair_start = (sector / 2 * 2) as f32;
    let x = chroma * (1.0 - (h_prime - pair_start - 1.0).abs());

    let (r1, g1, b1) = match sector {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        // Float rounding can land a hue just under 360 here too
        _ => (chroma, 0.0, x),
    };

    let m = lightness - chroma / 2.0;
    let channel = |value: f32, levels: f32, max: u8| ((value + m) * levels).min(max as f32) as u8;

    Rgb565::new(
        channel(r1, 32.0, 31),
        channel(g1, 64.0, 63),
        channel(b1, 32.0, 31),
    )
}

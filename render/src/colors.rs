//! Panel palette.

use tiny_skia::Color;

#[inline]
pub fn panel_backdrop() -> Color {
    Color::from_rgba8(0, 0, 0, 128)
}

#[inline]
pub fn panel_face() -> Color {
    Color::from_rgba8(255, 255, 255, 128)
}

#[inline]
pub fn bar_bg() -> Color {
    Color::from_rgba8(0, 0, 0, 128)
}

#[inline]
pub fn hp_fill() -> Color {
    Color::from_rgba8(192, 0, 0, 255)
}

#[inline]
pub fn text_light() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

#[inline]
pub fn text_dark() -> Color {
    Color::from_rgba8(20, 20, 20, 255)
}

/// Lap badge palette indexed by "this slot's lap differs from the base lap".
#[inline]
pub fn lap_badge(ahead: bool) -> Color {
    if ahead {
        Color::from_rgba8(106, 152, 243, 255)
    } else {
        Color::from_rgba8(228, 94, 104, 255)
    }
}

const PHASE_RGB: [(u8, u8, u8); 5] = [
    (132, 1, 244),
    (115, 166, 231),
    (206, 105, 165),
    (206, 80, 66),
    (181, 105, 206),
];

/// Background clear color for a phase; phases past the palette wrap around.
#[inline]
pub fn phase_background(phase: usize) -> Color {
    let (r, g, b) = PHASE_RGB[phase % PHASE_RGB.len()];
    Color::from_rgba8(r, g, b, 255)
}

use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color gradient for multi-file overlays
// ---------------------------------------------------------------------------

/// Viridis anchor colours (sRGB), dark purple to yellow.
const VIRIDIS_STOPS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

/// Colour used when a single file is plotted.
pub const SINGLE_FILE_COLOR: Color32 = Color32::BLACK;

fn to_linear(rgb: [u8; 3]) -> LinSrgb {
    Srgb::new(rgb[0], rgb[1], rgb[2])
        .into_format::<f32>()
        .into_linear()
}

/// Sample the gradient at `t` in `[0, 1]`, interpolating in linear RGB.
fn sample(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let last = VIRIDIS_STOPS.len() - 1;
    let pos = t * last as f32;
    let lo = (pos.floor() as usize).min(last - 1);
    let factor = pos - lo as f32;

    let mixed = to_linear(VIRIDIS_STOPS[lo]).mix(to_linear(VIRIDIS_STOPS[lo + 1]), factor);
    let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// `n` colours evenly spaced along the gradient, one per file position.
pub fn gradient(n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![sample(0.0)],
        _ => (0..n).map(|i| sample(i as f32 / (n - 1) as f32)).collect(),
    }
}

/// One line colour per plotted file: black for a lone file, the gradient
/// otherwise.
pub fn series_colors(n: usize) -> Vec<Color32> {
    if n <= 1 {
        return vec![SINGLE_FILE_COLOR; n];
    }
    gradient(n)
}

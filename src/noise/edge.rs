//! Sobel edge detection over RGBA pixels.

/// Default gradient magnitude above which a pixel counts as an edge.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 30.0;

/// Rec. 601 luma of one RGB triple.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

/// Per-pixel luminance plane of a `width * height * 4` RGBA buffer.
fn luminance_plane(rgba: &[u8]) -> Vec<f64> {
    rgba.chunks_exact(4)
        .map(|px| luminance(px[0], px[1], px[2]))
        .collect()
}

/// Row-major edge mask. Border pixels are never edges.
///
/// The caller guarantees `rgba.len() == width * height * 4`.
pub fn edge_mask(rgba: &[u8], width: usize, height: usize, threshold: f64) -> Vec<bool> {
    let mut mask = vec![false; width * height];
    if width < 3 || height < 3 {
        return mask;
    }

    let lum = luminance_plane(rgba);
    let at = |x: usize, y: usize| lum[y * width + x];

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = -at(x - 1, y - 1) - 2.0 * at(x - 1, y) - at(x - 1, y + 1)
                + at(x + 1, y - 1)
                + 2.0 * at(x + 1, y)
                + at(x + 1, y + 1);
            let gy = -at(x - 1, y - 1) - 2.0 * at(x, y - 1) - at(x + 1, y - 1)
                + at(x - 1, y + 1)
                + 2.0 * at(x, y + 1)
                + at(x + 1, y + 1);
            mask[y * width + x] = (gx * gx + gy * gy).sqrt() > threshold;
        }
    }
    mask
}

//! Image preprocessing for the local recognition path
//!
//! Optional grayscale + adaptive binarization pass over the captured RGBA
//! buffer. Card photos tend to have uneven lighting, so the threshold is
//! computed per pixel against the local neighborhood mean. Dimensions are
//! always preserved.

use tracing::debug;

/// Subtracted from the local mean before thresholding; biases toward
/// keeping dark strokes.
const THRESHOLD_BIAS: i32 = 10;

/// Convert RGBA pixels to grayscale in place (RGBA layout kept)
pub fn apply_grayscale(data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(4) {
        // Standard luminance weights
        let gray = (0.299 * chunk[0] as f32 + 0.587 * chunk[1] as f32 + 0.114 * chunk[2] as f32)
            as u8;
        chunk[0] = gray;
        chunk[1] = gray;
        chunk[2] = gray;
        // Alpha unchanged
    }
}

/// Grayscale + adaptive mean-threshold binarization.
///
/// Returns a new RGBA buffer of identical dimensions where every pixel is
/// either black or white.
pub fn binarize_for_ocr(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 {
        return data.to_vec();
    }

    let mut gray = data.to_vec();
    apply_grayscale(&mut gray);

    // Summed-area table over the grayscale channel, one extra row/column of
    // zeros so window sums need no edge special-casing.
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += gray[(y * w + x) * 4] as u64;
            integral[(y + 1) * (w + 1) + (x + 1)] = integral[y * (w + 1) + (x + 1)] + row_sum;
        }
    }

    // Window spans roughly an eighth of the shorter side.
    let radius = (w.min(h) / 16).max(1);
    debug!("binarizing {}x{} frame, window radius {}", w, h, radius);

    let mut result = data.to_vec();
    for y in 0..h {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(h);
        for x in 0..w {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(w);

            let sum = integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                - integral[y0 * (w + 1) + x1]
                - integral[y1 * (w + 1) + x0];
            let count = ((y1 - y0) * (x1 - x0)) as u64;
            let mean = (sum / count) as i32;

            let idx = (y * w + x) * 4;
            let value = if (gray[idx] as i32) < mean - THRESHOLD_BIAS {
                0
            } else {
                255
            };
            result[idx] = value;
            result[idx + 1] = value;
            result[idx + 2] = value;
            result[idx + 3] = 255;
        }
    }

    result
}

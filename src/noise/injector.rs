//! Seed-keyed perturbation of edge pixels.
//!
//! Only R, G and B of pixels on a luminance edge are touched, each by a
//! single intensity step whose sign comes from a hash of the seed, the pixel
//! coordinates and the channel. Flat regions and alpha stay bit-identical,
//! which keeps the change invisible while still moving any hash of the canvas.

use std::borrow::Cow;

use tracing::{trace, warn};

use crate::error::{EngineError, EngineResult};
use crate::noise::edge::{edge_mask, DEFAULT_EDGE_THRESHOLD};
use crate::noise::PixelBuffer;
use crate::random::{Fnv1a, Seed};

/// Default noise amplitude as a fraction of full scale.
pub const DEFAULT_NOISE_LEVEL: f64 = 0.001;

/// Tunables for [`EdgeAwareNoiseInjector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    /// Sobel magnitude a pixel must exceed to be perturbed.
    pub edge_threshold: f64,
    /// Amplitude as a fraction of 255. Zero disables perturbation.
    pub noise_level: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            noise_level: DEFAULT_NOISE_LEVEL,
        }
    }
}

/// Stateless, deterministic canvas noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeAwareNoiseInjector {
    config: NoiseConfig,
}

impl EdgeAwareNoiseInjector {
    pub fn new(config: NoiseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Perturb `rgba`; malformed buffers are logged and returned untouched.
    pub fn perturb<'a>(
        &self,
        seed: &Seed,
        width: u32,
        height: u32,
        rgba: &'a [u8],
    ) -> Cow<'a, [u8]> {
        match self.try_perturb(seed, width, height, rgba) {
            Ok(out) => out,
            Err(e) => {
                warn!("Skipping pixel perturbation: {}", e);
                Cow::Borrowed(rgba)
            }
        }
    }

    /// Perturb `rgba`, rejecting a length other than `width * height * 4`.
    ///
    /// Returns [`Cow::Borrowed`] when no pixel qualifies.
    pub fn try_perturb<'a>(
        &self,
        seed: &Seed,
        width: u32,
        height: u32,
        rgba: &'a [u8],
    ) -> EngineResult<Cow<'a, [u8]>> {
        let expected = expected_len(width, height);
        if expected != Some(rgba.len()) {
            return Err(EngineError::MalformedBuffer {
                width,
                height,
                expected: expected.unwrap_or(usize::MAX),
                len: rgba.len(),
            });
        }
        if self.config.noise_level <= 0.0 || rgba.is_empty() {
            return Ok(Cow::Borrowed(rgba));
        }

        let (w, h) = (width as usize, height as usize);
        let mask = edge_mask(rgba, w, h, self.config.edge_threshold);
        if !mask.iter().any(|edge| *edge) {
            return Ok(Cow::Borrowed(rgba));
        }

        let prefix = Fnv1a::new().update(seed.as_bytes());
        let mut out = rgba.to_vec();
        let mut touched = 0usize;

        for (position, _) in mask.iter().enumerate().filter(|(_, edge)| **edge) {
            let x = (position % w) as u32;
            let y = (position / w) as u32;
            let pixel = prefix.update_u32(x).update_u32(y);
            for channel in 0..3u8 {
                let u = pixel.update(&[channel]).unit();
                let step = noise_step(u, self.config.noise_level);
                let offset = position * 4 + usize::from(channel);
                out[offset] = (i32::from(out[offset]) + step).clamp(0, 255) as u8;
            }
            touched += 1;
        }

        trace!(width, height, edge_pixels = touched, "perturbed pixel buffer");
        Ok(Cow::Owned(out))
    }

    /// Perturb a [`PixelBuffer`] into a new buffer.
    pub fn perturb_buffer(&self, seed: &Seed, buffer: &PixelBuffer) -> PixelBuffer {
        let data = self
            .perturb(seed, buffer.width(), buffer.height(), buffer.data())
            .into_owned();
        PixelBuffer::from_parts_unchecked(buffer.width(), buffer.height(), data)
    }
}

/// `width * height * 4`, or `None` on overflow.
pub fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
}

/// Offset `(2u - 1) * level * 255`, rounded away from zero to at least one step.
fn noise_step(u: f64, noise_level: f64) -> i32 {
    let offset = (2.0 * u - 1.0) * noise_level * 255.0;
    let magnitude = offset.abs().ceil().max(1.0) as i32;
    if offset < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(token: &str) -> Seed {
        Seed::new(token).unwrap()
    }

    fn checkerboard(width: u32, height: u32, cell: u32) -> Vec<u8> {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if ((x / cell) + (y / cell)) % 2 == 0 { 40 } else { 200 };
                rgba.extend_from_slice(&[v, v, v, 255]);
            }
        }
        rgba
    }

    #[test]
    fn test_noise_step() {
        assert_eq!(noise_step(0.0, 0.001), -1);
        assert_eq!(noise_step(0.999, 0.001), 1);
        assert_eq!(noise_step(0.5, 0.001), 1);
        assert_eq!(noise_step(0.0, 0.02), -6);
        assert_eq!(noise_step(0.75, 0.02), 3);
    }

    #[test]
    fn test_expected_len() {
        assert_eq!(expected_len(2, 3), Some(24));
        assert_eq!(expected_len(0, 100), Some(0));
    }

    #[test]
    fn test_flat_buffer_is_borrowed() {
        let rgba = vec![90u8; 16 * 16 * 4];
        let out = EdgeAwareNoiseInjector::default()
            .try_perturb(&seed("flat"), 16, 16, &rgba)
            .unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_only_edges_and_never_alpha_change() {
        let (w, h) = (24, 24);
        let rgba = checkerboard(w, h, 6);
        let mask = edge_mask(&rgba, w as usize, h as usize, DEFAULT_EDGE_THRESHOLD);
        let out = EdgeAwareNoiseInjector::default().perturb(&seed("edges"), w, h, &rgba);

        assert!(matches!(out, Cow::Owned(_)));
        let mut changed_pixels = 0;
        for (i, is_edge) in mask.iter().enumerate() {
            let before = &rgba[i * 4..i * 4 + 4];
            let after = &out[i * 4..i * 4 + 4];
            assert_eq!(before[3], after[3], "alpha changed at {}", i);
            if !is_edge {
                assert_eq!(before, after, "non-edge pixel {} changed", i);
            } else {
                for c in 0..3 {
                    let diff = (i32::from(after[c]) - i32::from(before[c])).abs();
                    assert_eq!(diff, 1, "edge pixel {} channel {} moved by {}", i, c, diff);
                }
                changed_pixels += 1;
            }
        }
        assert!(changed_pixels > 0);
    }

    #[test]
    fn test_deterministic_and_seed_dependent() {
        let (w, h) = (32, 32);
        let rgba = checkerboard(w, h, 4);
        let injector = EdgeAwareNoiseInjector::default();

        let a1 = injector.perturb(&seed("alpha"), w, h, &rgba);
        let a2 = injector.perturb(&seed("alpha"), w, h, &rgba);
        let b = injector.perturb(&seed("bravo"), w, h, &rgba);

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
    }

    #[test]
    fn test_malformed_buffer() {
        let injector = EdgeAwareNoiseInjector::default();
        let rgba = vec![0u8; 15];
        let out = injector.perturb(&seed("bad"), 2, 2, &rgba);
        assert!(matches!(out, Cow::Borrowed(b) if b.len() == 15));

        let err = injector.try_perturb(&seed("bad"), 2, 2, &rgba).unwrap_err();
        assert_eq!(
            err,
            EngineError::MalformedBuffer {
                width: 2,
                height: 2,
                expected: 16,
                len: 15
            }
        );
    }

    #[test]
    fn test_zero_noise_level_disables() {
        let (w, h) = (16, 16);
        let rgba = checkerboard(w, h, 4);
        let injector = EdgeAwareNoiseInjector::new(NoiseConfig {
            noise_level: 0.0,
            ..NoiseConfig::default()
        });
        assert!(matches!(
            injector.perturb(&seed("off"), w, h, &rgba),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_saturated_channels_stay_in_range() {
        let (w, h) = (12, 12);
        let mut rgba = Vec::new();
        for _y in 0..h {
            for x in 0..w {
                let v = if x < w / 2 { 0 } else { 255 };
                rgba.extend_from_slice(&[v, v, v, 128]);
            }
        }
        let config = NoiseConfig {
            noise_level: 0.5,
            ..NoiseConfig::default()
        };
        let out = EdgeAwareNoiseInjector::new(config).perturb(&seed("clamp"), w, h, &rgba);
        assert_eq!(out.len(), rgba.len());
        assert!(out.chunks_exact(4).all(|px| px[3] == 128));
    }
}

//! Edge-aware canvas noise.
//!
//! - `edge` - luminance and Sobel edge mask
//! - `injector` - deterministic per-channel perturbation of edge pixels
//!
//! # Example
//!
//! ```rust
//! use ki_fingerprint_engine::noise::EdgeAwareNoiseInjector;
//! use ki_fingerprint_engine::random::Seed;
//!
//! let seed = Seed::generate();
//! let flat = vec![200u8; 8 * 8 * 4];
//!
//! // Nothing to perturb on a flat image.
//! let out = EdgeAwareNoiseInjector::default().perturb(&seed, 8, 8, &flat);
//! assert_eq!(&*out, &flat[..]);
//! ```

pub mod edge;
pub mod injector;

use image::RgbaImage;

use crate::error::{EngineError, EngineResult};

pub use edge::{edge_mask, luminance, DEFAULT_EDGE_THRESHOLD};
pub use injector::{EdgeAwareNoiseInjector, NoiseConfig, DEFAULT_NOISE_LEVEL};

/// Row-major RGBA8 raster with a validated length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap `data`, which must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> EngineResult<Self> {
        let expected = injector::expected_len(width, height);
        if expected != Some(data.len()) {
            return Err(EngineError::MalformedBuffer {
                width,
                height,
                expected: expected.unwrap_or(usize::MAX),
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub(crate) fn from_parts_unchecked(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Convert into an `image` buffer for encoding.
    pub fn into_image(self) -> EngineResult<RgbaImage> {
        let (width, height, len) = (self.width, self.height, self.data.len());
        RgbaImage::from_raw(width, height, self.data).ok_or(EngineError::MalformedBuffer {
            width,
            height,
            expected: len,
            len,
        })
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_parts_unchecked(width, height, image.into_raw())
    }
}

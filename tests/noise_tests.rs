//! Integration tests for edge-aware canvas noise
//!
//! Exercises the injector through the public API with synthetic images:
//! edge-only changes, alpha preservation, seed sensitivity and the
//! malformed-buffer path.

use image::{Rgba, RgbaImage};

use ki_fingerprint_engine::{
    noise::{edge_mask, EdgeAwareNoiseInjector, NoiseConfig, PixelBuffer, DEFAULT_EDGE_THRESHOLD},
    EngineError, IdentityEngine, Seed,
};

/// White canvas with a filled dark rectangle and a diagonal line.
fn drawing(width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, Rgba([250, 250, 250, 255]));
    for y in height / 4..height / 2 {
        for x in width / 4..width / 2 {
            image.put_pixel(x, y, Rgba([20, 40, 200, 255]));
        }
    }
    for i in 0..width.min(height) {
        image.put_pixel(i, i, Rgba([0, 0, 0, 180]));
    }
    image
}

fn seed(token: &str) -> Seed {
    Seed::new(token).unwrap()
}

#[test]
fn test_only_edge_pixels_change() {
    let buffer = PixelBuffer::from(drawing(64, 48));
    let injector = EdgeAwareNoiseInjector::default();
    let out = injector.perturb_buffer(&seed("edges"), &buffer);

    let mask = edge_mask(buffer.data(), 64, 48, DEFAULT_EDGE_THRESHOLD);
    let mut changed = 0;
    for (i, (before, after)) in buffer
        .data()
        .chunks_exact(4)
        .zip(out.data().chunks_exact(4))
        .enumerate()
    {
        assert_eq!(before[3], after[3], "alpha changed at pixel {}", i);
        if before != after {
            assert!(mask[i], "non-edge pixel {} changed", i);
            changed += 1;
        }
    }
    assert!(changed > 0);
    assert_eq!(out.width(), 64);
    assert_eq!(out.height(), 48);
}

#[test]
fn test_distinct_seeds_give_distinct_noise() {
    let buffer = PixelBuffer::from(drawing(96, 96));
    let engine = IdentityEngine::default();

    let a = engine.perturb_pixels(&seed("seed-a"), 96, 96, buffer.data());
    let b = engine.perturb_pixels(&seed("seed-b"), 96, 96, buffer.data());

    let differing = a
        .chunks_exact(4)
        .zip(b.chunks_exact(4))
        .filter(|(pa, pb)| pa != pb)
        .count();
    let edges = edge_mask(buffer.data(), 96, 96, DEFAULT_EDGE_THRESHOLD)
        .iter()
        .filter(|e| **e)
        .count();

    // Each channel of each edge pixel has a coin-flip sign, so nearly every
    // edge pixel should differ between two seeds.
    assert!(edges > 50);
    assert!(differing * 4 > edges * 3, "{} of {} differ", differing, edges);
}

#[test]
fn test_same_seed_is_repeatable() {
    let buffer = PixelBuffer::from(drawing(40, 40));
    let injector = EdgeAwareNoiseInjector::default();
    let a = injector.perturb_buffer(&seed("same"), &buffer);
    let b = injector.perturb_buffer(&seed("same"), &buffer);
    assert_eq!(a, b);
}

#[test]
fn test_higher_noise_level_moves_further() {
    let buffer = PixelBuffer::from(drawing(40, 40));
    let strong = EdgeAwareNoiseInjector::new(NoiseConfig {
        noise_level: 0.05,
        ..NoiseConfig::default()
    });
    let out = strong.perturb_buffer(&seed("strong"), &buffer);

    let max_delta = buffer
        .data()
        .iter()
        .zip(out.data())
        .map(|(a, b)| (i32::from(*a) - i32::from(*b)).abs())
        .max()
        .unwrap();
    assert!(max_delta > 1);
    assert!(max_delta <= 13);
}

#[test]
fn test_malformed_buffer_passthrough() {
    let engine = IdentityEngine::default();
    let short = vec![7u8; 10 * 10 * 4 - 1];

    let out = engine.perturb_pixels(&seed("short"), 10, 10, &short);
    assert_eq!(&*out, &short[..]);

    assert!(matches!(
        engine.try_perturb_pixels(&seed("short"), 10, 10, &short),
        Err(EngineError::MalformedBuffer { expected: 400, len: 399, .. })
    ));
}

#[test]
fn test_round_trip_through_image() {
    let image = drawing(32, 24);
    let buffer = PixelBuffer::from(image.clone());
    let out = EdgeAwareNoiseInjector::default()
        .perturb_buffer(&seed("png"), &buffer)
        .into_image()
        .unwrap();

    assert_eq!(out.dimensions(), image.dimensions());
    assert_ne!(out, image);
}

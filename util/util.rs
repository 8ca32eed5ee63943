#![allow(dead_code)]

use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use tessera::{pack_rgb, Image};

/// A smooth image with a little noise, standing in for a natural photo.
#[allow(clippy::cast_possible_truncation)]
pub fn gradient_image(width: u32, height: u32, seed: u64) -> Image {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    Image::from_fn(width, height, |x, y| {
        let r = (x * 255 / width) as u8;
        let g = (y * 255 / height) as u8;
        let b = ((x ^ y) & 0xFF) as u8;
        pack_rgb(
            r.saturating_add(rng.gen_range(0..16)),
            g.saturating_add(rng.gen_range(0..16)),
            b.saturating_add(rng.gen_range(0..16)),
        )
    })
}

/// An image of uniformly random colors.
pub fn noise_image(width: u32, height: u32, seed: u64) -> Image {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    Image::from_fn(width, height, |_, _| pack_rgb(rng.gen(), rng.gen(), rng.gen()))
}

static PALETTES: OnceLock<Vec<(String, Image)>> = OnceLock::new();

/// Palette images of a few sizes.
pub fn palettes() -> &'static [(String, Image)] {
    PALETTES.get_or_init(|| {
        [(64, 64), (128, 96), (256, 128)]
            .into_iter()
            .map(|(w, h)| (format!("{w}x{h}"), gradient_image(w, h, u64::from(w * h))))
            .collect()
    })
}

static FRAME: OnceLock<Image> = OnceLock::new();

/// The input frame used by every benchmark.
pub fn frame() -> &'static Image {
    FRAME.get_or_init(|| noise_image(320, 240, 7))
}

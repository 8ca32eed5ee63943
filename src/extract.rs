//! Block feature extraction.

use crate::{BlockOrigin, BlockSize, Image, Orientation, Similarity};
use num_traits::Zero;

/// Extracts the prototype (and optionally the raw pixels) of one block.
///
/// Pixels are visited row by row in the block's local coordinates, and each local offset
/// is remapped by `orientation` before it is read from `image`. For every pixel, the color
/// (masked to 24 bits) is appended to `bucket` if one is given, and the metric's features
/// are appended to `prototype` after the metric's header values.
///
/// `prototype` must have a length of `metric.prototype_len(block)`,
/// and `bucket` must have a length of `block.area()`.
///
/// # Panics
/// Panics if the block does not lie within `image` or if the output slices are too short.
pub fn extract_block<M: Similarity>(
    image: &Image,
    origin: BlockOrigin,
    orientation: Orientation,
    block: BlockSize,
    metric: &M,
    prototype: &mut [M::Feature],
    mut bucket: Option<&mut [u32]>,
) {
    let side = block.side();
    let channels = metric.channels();
    assert!(
        origin.x + side <= image.width() && origin.y + side <= image.height(),
        "block at ({}, {}) does not fit in a {}x{} image",
        origin.x,
        origin.y,
        image.width(),
        image.height(),
    );

    let features = &mut prototype[M::HEADER..];
    let mut i = 0;
    for ly in 0..side {
        for lx in 0..side {
            let (dx, dy) = orientation.remap(side, lx, ly);
            let color = image.pixel(origin.x + dx, origin.y + dy) & 0xFF_FFFF;
            let offset = i * channels;

            if let Some(bucket) = bucket.as_deref_mut() {
                bucket[i] = color;
            }

            metric.write_features(color, &mut features[offset..(offset + channels)]);
            i += 1;
        }
    }

    metric.finish(prototype);
}

/// Extracts the prototype and raw pixels of one block into newly allocated vectors.
#[must_use]
pub fn extract<M: Similarity>(
    image: &Image,
    origin: BlockOrigin,
    orientation: Orientation,
    block: BlockSize,
    metric: &M,
) -> (Vec<M::Feature>, Vec<u32>) {
    let mut prototype = vec![M::Feature::zero(); metric.prototype_len(block)];
    let mut bucket = vec![0; block.area()];
    extract_block(
        image,
        origin,
        orientation,
        block,
        metric,
        &mut prototype,
        Some(bucket.as_mut_slice()),
    );
    (prototype, bucket)
}

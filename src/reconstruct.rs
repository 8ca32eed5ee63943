//! Assembly of the output image from dictionary buckets.

use crate::{dictionary::Dictionary, error::try_reserve, BlockGrid, Image, PipelineError, Similarity};

/// Builds the output image by copying the bucket of each chosen entry into place.
///
/// `results` holds one dictionary index per block of `grid`, in row-major order.
/// The output has the block-aligned dimensions of `grid`.
///
/// # Errors
/// Returns [`PipelineError::Allocation`] if the output image cannot be allocated.
///
/// # Panics
/// Panics if `results` does not have one entry per block, if an index is out of bounds,
/// or if `grid` and `dictionary` use different block sizes.
pub fn reconstruct<M: Similarity>(
    dictionary: &Dictionary<M>,
    grid: &BlockGrid,
    results: &[u32],
) -> Result<Image, PipelineError> {
    assert_eq!(results.len(), grid.len());
    assert_eq!(grid.block_size(), dictionary.block_size());

    let (width, height) = grid.dimensions();
    let side = grid.block_size().side() as usize;
    let stride = width as usize;

    let mut pixels = Vec::new();
    try_reserve(&mut pixels, stride * height as usize, "output image")?;
    pixels.resize(stride * height as usize, 0);

    for (origin, &index) in grid.origins().zip(results) {
        let bucket = dictionary.bucket(index as usize);
        let start = origin.y as usize * stride + origin.x as usize;
        for (ly, src) in bucket.chunks_exact(side).enumerate() {
            let dst = start + ly * stride;
            pixels[dst..(dst + side)].copy_from_slice(src);
        }
    }

    Ok(Image::from_parts(width, height, pixels))
}

use crate::BlockSize;
use num_traits::{NumAssignOps, NumOps, Zero};
use std::fmt::Debug;

/// The element type of prototype feature vectors.
pub trait Feature: Zero + NumOps + NumAssignOps + Copy + PartialEq + Debug + Send + Sync + 'static {}

impl Feature for i32 {}

impl Feature for f64 {}

/// A similarity metric between two prototypes, together with the transform that produces them.
///
/// Implementors describe everything that depends on the metric: the feature type,
/// how a pixel is turned into features, any leading header values, the preparation of the
/// stored dictionary prototypes, and the score itself.
/// Larger scores mean more similar prototypes; only the relative order of scores matters.
///
/// The search loops are generic over this trait, so each metric gets its own
/// monomorphized copy of the hot loop.
pub trait Similarity: Copy + Send + Sync + 'static {
    /// The element type of the prototypes.
    type Feature: Feature;

    /// The type of the score.
    type Score: Copy + PartialOrd + Debug + Send + Sync;

    /// The number of values stored before the per-pixel features.
    const HEADER: usize = 0;

    /// The number of feature values produced for each pixel.
    fn channels(&self) -> usize;

    /// Writes the `channels` features for the packed `color` into `out`.
    fn write_features(&self, color: u32, out: &mut [Self::Feature]);

    /// Finalizes a freshly extracted prototype, e.g., by filling in header values.
    #[inline]
    fn finish(&self, _prototype: &mut [Self::Feature]) {}

    /// Prepares the stored dictionary prototypes after all of them have been extracted.
    fn prepare_dictionary(&self, _prototypes: &mut [Self::Feature]) {}

    /// Scores a query prototype against a stored dictionary prototype.
    fn score(&self, query: &[Self::Feature], entry: &[Self::Feature]) -> Self::Score;

    /// The length of one prototype for the given block size.
    #[must_use]
    fn prototype_len(&self, block: BlockSize) -> usize {
        Self::HEADER + block.area() * self.channels()
    }
}

//! The prototype dictionary built from the palette image.

use crate::{
    error::try_reserve,
    extract::extract_block,
    BlockSize, Image, Orientation, PipelineError, Similarity, ORIENTATIONS,
};
use num_traits::Zero;

/// The search space for a palette image: a prototype and a bucket of raw pixels
/// for every palette block under every [`Orientation`].
///
/// Entries are stored block-major and contiguously. Entry `i` is the palette block
/// `i / ORIENTATIONS` (in row-major order) under the orientation `i % ORIENTATIONS`.
/// A dictionary is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary<M: Similarity> {
    /// The metric that the prototypes were extracted and prepared for.
    metric: M,
    /// The block size of the entries.
    block: BlockSize,
    /// The length of one prototype.
    prototype_len: usize,
    /// `len * prototype_len` features.
    prototypes: Vec<M::Feature>,
    /// `len * block.area()` packed colors.
    buckets: Vec<u32>,
}

impl<M: Similarity> Dictionary<M> {
    /// Builds the dictionary for the whole blocks of `palette`.
    ///
    /// The palette is truncated to a multiple of the block size,
    /// and every block is extracted under all orientations.
    ///
    /// # Errors
    /// Returns [`PipelineError::Allocation`] if the storage cannot be allocated.
    pub fn build(palette: &Image, block: BlockSize, metric: M) -> Result<Self, PipelineError> {
        let grid = palette.block_grid(block);
        let len = grid.len() * ORIENTATIONS;
        let prototype_len = metric.prototype_len(block);
        let area = block.area();

        let mut prototypes = Vec::new();
        try_reserve(
            &mut prototypes,
            len.saturating_mul(prototype_len),
            "dictionary prototypes",
        )?;
        prototypes.resize(len * prototype_len, M::Feature::zero());

        let mut buckets = Vec::new();
        try_reserve(&mut buckets, len.saturating_mul(area), "dictionary buckets")?;
        buckets.resize(len * area, 0);

        let entries = prototypes
            .chunks_exact_mut(prototype_len)
            .zip(buckets.chunks_exact_mut(area));

        let orientations = grid
            .origins()
            .flat_map(|origin| Orientation::ALL.map(|orientation| (origin, orientation)));

        for ((prototype, bucket), (origin, orientation)) in entries.zip(orientations) {
            extract_block(
                palette,
                origin,
                orientation,
                block,
                &metric,
                prototype,
                Some(bucket),
            );
        }

        metric.prepare_dictionary(&mut prototypes);

        log::debug!(
            "built dictionary of {len} entries from {} palette blocks ({} features each)",
            grid.len(),
            prototype_len,
        );

        Ok(Self { metric, block, prototype_len, prototypes, buckets })
    }

    /// The metric of this dictionary.
    #[must_use]
    pub const fn metric(&self) -> &M {
        &self.metric
    }

    /// The block size of the entries.
    #[must_use]
    pub const fn block_size(&self) -> BlockSize {
        self.block
    }

    /// The length of each prototype.
    #[must_use]
    pub const fn prototype_len(&self) -> usize {
        self.prototype_len
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len() / self.block.area()
    }

    /// Returns whether the dictionary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// All prototypes, back to back.
    #[must_use]
    pub fn prototypes(&self) -> &[M::Feature] {
        &self.prototypes
    }

    /// Iterates over the prototypes in entry order.
    pub fn iter_prototypes(&self) -> impl ExactSizeIterator<Item = &[M::Feature]> + '_ {
        self.prototypes.chunks_exact(self.prototype_len)
    }

    /// The stored prototype of entry `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn prototype(&self, index: usize) -> &[M::Feature] {
        let start = index * self.prototype_len;
        &self.prototypes[start..(start + self.prototype_len)]
    }

    /// The raw pixels of entry `index`, in row-major order of the block's local coordinates.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn bucket(&self, index: usize) -> &[u32] {
        let area = self.block.area();
        let start = index * area;
        &self.buckets[start..(start + area)]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        extract::extract,
        metric::{AbsoluteDifference, TrigCosine, XorApprox},
        tests::*,
        transform::{AngleTransform, ChannelTransform},
        BlockOrigin,
    };

    #[test]
    fn entry_count_and_order() {
        let palette = random_image(20, 9, 1);
        let block = BlockSize::new(4).unwrap();
        let metric = AbsoluteDifference::new(ChannelTransform::Rgb);
        let dictionary = Dictionary::build(&palette, block, metric).unwrap();

        // 5 x 2 whole blocks
        assert_eq!(dictionary.len(), 10 * ORIENTATIONS);
        assert_eq!(dictionary.iter_prototypes().len(), dictionary.len());

        for (index, origin) in palette.block_grid(block).origins().enumerate() {
            for orientation in Orientation::ALL {
                let entry = index * ORIENTATIONS + orientation.index();
                let (prototype, bucket) = extract(&palette, origin, orientation, block, &metric);
                assert_eq!(dictionary.prototype(entry), prototype);
                assert_eq!(dictionary.bucket(entry), bucket);
            }
        }
    }

    #[test]
    fn build_is_idempotent() {
        let palette = gradient_image(32, 24, 2);
        let block = BlockSize::new(8).unwrap();
        let metric = TrigCosine::new(AngleTransform::Rgb);
        let first = Dictionary::build(&palette, block, metric).unwrap();
        let second = Dictionary::build(&palette, block, metric).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn xor_prototypes_are_inverted() {
        let palette = random_image(8, 8, 4);
        let block = BlockSize::new(8).unwrap();
        let metric = XorApprox::new(ChannelTransform::Rgb);
        let dictionary = Dictionary::build(&palette, block, metric).unwrap();

        let (raw, _) = extract(
            &palette,
            BlockOrigin { x: 0, y: 0 },
            Orientation::Identity,
            block,
            &metric,
        );
        let inverted = raw.iter().map(|v| v ^ 255).collect::<Vec<_>>();
        assert_eq!(dictionary.prototype(0), inverted);
    }

    #[test]
    fn palette_smaller_than_block_is_empty() {
        let palette = random_image(7, 30, 5);
        let block = BlockSize::new(8).unwrap();
        let metric = AbsoluteDifference::new(ChannelTransform::Luma);
        let dictionary = Dictionary::build(&palette, block, metric).unwrap();
        assert!(dictionary.is_empty());
        assert_eq!(dictionary.len(), 0);
    }
}

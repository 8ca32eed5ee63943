//! The similarity metrics that prototypes are compared with.
//!
//! Each metric is its own type implementing [`Similarity`], which fixes the feature type,
//! the per-pixel transform, and the score function at compile time.
//! See [`Metric`](crate::Metric) for choosing one at configuration time.

use crate::{
    transform::{AngleTransform, ChannelTransform},
    Similarity,
};
use std::array;
use wide::f64x4;

/// The inner product of two equal length slices.
///
/// The bulk is summed in four lanes followed by a scalar tail, so the result is
/// deterministic for a given pair of slices.
#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let chunks_a = a.chunks_exact(4);
    let chunks_b = b.chunks_exact(4);
    let tail = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| x * y)
        .sum::<f64>();

    let mut acc = f64x4::ZERO;
    for (x, y) in chunks_a.zip(chunks_b) {
        let x = f64x4::new(array::from_fn(|i| x[i]));
        let y = f64x4::new(array::from_fn(|i| y[i]));
        acc += x * y;
    }

    acc.reduce_add() + tail
}

/// Cosine similarity of angles encoded as sine/cosine pairs.
///
/// Every pair of features lies on the unit circle, so the inner product of two prototypes
/// is already a sum of cosines of angle differences and no normalization is needed.
/// The score is the inner product scaled by `2 / prototype_len`, which puts a perfect match at `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrigCosine {
    /// The angular transform producing the features.
    transform: AngleTransform,
}

impl TrigCosine {
    /// Creates a new [`TrigCosine`] metric over the given transform.
    #[must_use]
    pub const fn new(transform: AngleTransform) -> Self {
        Self { transform }
    }
}

impl Similarity for TrigCosine {
    type Feature = f64;
    type Score = f64;

    fn channels(&self) -> usize {
        self.transform.channels()
    }

    #[inline]
    fn write_features(&self, color: u32, out: &mut [f64]) {
        self.transform.write(color, out);
    }

    #[inline]
    fn score(&self, query: &[f64], entry: &[f64]) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let scale = 2.0 / query.len() as f64;
        dot(query, entry) * scale
    }
}

/// Cosine similarity of raw channel values.
///
/// The first value of every prototype holds its squared magnitude,
/// so the score only needs one inner product and one square root.
/// Scores involving an all-zero (black) prototype are defined to be `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedCosine {
    /// The channel transform producing the features.
    transform: ChannelTransform,
}

impl NormalizedCosine {
    /// Creates a new [`NormalizedCosine`] metric over the given transform.
    #[must_use]
    pub const fn new(transform: ChannelTransform) -> Self {
        Self { transform }
    }
}

impl Similarity for NormalizedCosine {
    type Feature = f64;
    type Score = f64;

    const HEADER: usize = 1;

    fn channels(&self) -> usize {
        self.transform.channels()
    }

    #[inline]
    fn write_features(&self, color: u32, out: &mut [f64]) {
        self.transform.write_real(color, out);
    }

    fn finish(&self, prototype: &mut [f64]) {
        prototype[0] = prototype[1..].iter().map(|v| v * v).sum::<f64>();
    }

    #[inline]
    fn score(&self, query: &[f64], entry: &[f64]) -> f64 {
        let magnitude = query[0] * entry[0];
        if magnitude == 0.0 {
            0.0
        } else {
            dot(&query[1..], &entry[1..]) / magnitude.sqrt()
        }
    }
}

/// Similarity from the sum of absolute channel differences.
///
/// The score starts at `510 * prototype_len` and every absolute difference is subtracted from it,
/// so identical prototypes get the largest possible score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteDifference {
    /// The channel transform producing the features.
    transform: ChannelTransform,
}

impl AbsoluteDifference {
    /// The per-feature baseline of the score.
    pub const BASELINE: i64 = 510;

    /// Creates a new [`AbsoluteDifference`] metric over the given transform.
    #[must_use]
    pub const fn new(transform: ChannelTransform) -> Self {
        Self { transform }
    }
}

impl Similarity for AbsoluteDifference {
    type Feature = i32;
    type Score = i64;

    fn channels(&self) -> usize {
        self.transform.channels()
    }

    #[inline]
    fn write_features(&self, color: u32, out: &mut [i32]) {
        self.transform.write_int(color, out);
    }

    #[inline]
    fn score(&self, query: &[i32], entry: &[i32]) -> i64 {
        #[allow(clippy::cast_possible_wrap)]
        let baseline = Self::BASELINE * query.len() as i64;
        let distance = query
            .iter()
            .zip(entry)
            .map(|(&a, &b)| i64::from((a - b).abs()))
            .sum::<i64>();

        baseline - distance
    }
}

/// A fast, approximate similarity from the bitwise XOR of channel values.
///
/// The stored dictionary prototypes are inverted (`v ^ 255`) once when the dictionary is built,
/// so that XOR-ing a query value with a stored value gives `255` for equal channels and
/// smaller values the more bits differ. This is the least faithful metric, but also the cheapest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorApprox {
    /// The channel transform producing the features.
    transform: ChannelTransform,
}

impl XorApprox {
    /// Creates a new [`XorApprox`] metric over the given transform.
    #[must_use]
    pub const fn new(transform: ChannelTransform) -> Self {
        Self { transform }
    }
}

impl Similarity for XorApprox {
    type Feature = i32;
    type Score = i64;

    fn channels(&self) -> usize {
        self.transform.channels()
    }

    #[inline]
    fn write_features(&self, color: u32, out: &mut [i32]) {
        self.transform.write_int(color, out);
    }

    fn prepare_dictionary(&self, prototypes: &mut [i32]) {
        for value in prototypes {
            *value ^= 255;
        }
    }

    #[inline]
    fn score(&self, query: &[i32], entry: &[i32]) -> i64 {
        query
            .iter()
            .zip(entry)
            .map(|(&a, &b)| i64::from(a ^ b))
            .sum()
    }
}

//! Contains the types and functions for the high level [`Mosaic`] API.

mod engine;
mod mosaic;

pub use mosaic::Mosaic;

use crate::{search::SearchMethod, BlockSize, Transform, WorkerCount};
use std::fmt::Display;

/// The set of supported similarity metrics.
///
/// Each metric only works with some of the [`Transform`]s (see [`Metric::supports`]).
/// See the descriptions on each enum variant for more information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    /// Cosine similarity of per-channel angles.
    ///
    /// Requires [`Transform::RgbAngles`] or [`Transform::LumaAngles`].
    /// See [`TrigCosine`](crate::metric::TrigCosine) for more details.
    Cosine,
    /// Cosine similarity of raw channel values, normalized by prototype magnitude.
    ///
    /// Requires [`Transform::Rgb`] or [`Transform::Luma`].
    /// See [`NormalizedCosine`](crate::metric::NormalizedCosine) for more details.
    NormalizedCosine,
    /// Sum of absolute channel differences.
    ///
    /// Requires [`Transform::Rgb`] or [`Transform::Luma`].
    /// See [`AbsoluteDifference`](crate::metric::AbsoluteDifference) for more details.
    #[default]
    AbsoluteDifference,
    /// A cheap approximation from the bitwise XOR of channel values.
    ///
    /// Requires [`Transform::Rgb`] or [`Transform::Luma`].
    /// See [`XorApprox`](crate::metric::XorApprox) for more details.
    Xor,
}

impl Metric {
    /// Returns whether this metric can compare prototypes produced by `transform`.
    ///
    /// # Examples
    /// ```
    /// # use tessera::{Metric, Transform};
    /// assert!(Metric::Cosine.supports(Transform::LumaAngles));
    /// assert!(!Metric::Cosine.supports(Transform::Rgb));
    /// assert!(Metric::Xor.supports(Transform::Luma));
    /// ```
    #[must_use]
    pub const fn supports(self, transform: Transform) -> bool {
        match self {
            Metric::Cosine => transform.as_angles().is_some(),
            Metric::NormalizedCosine | Metric::AbsoluteDifference | Metric::Xor => {
                transform.as_channels().is_some()
            }
        }
    }

    /// The full color transform that this metric works with.
    #[must_use]
    pub const fn default_transform(self) -> Transform {
        match self {
            Metric::Cosine => Transform::RgbAngles,
            Metric::NormalizedCosine | Metric::AbsoluteDifference | Metric::Xor => Transform::Rgb,
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Metric::Cosine => "cosine",
                Metric::NormalizedCosine => "normalized cosine",
                Metric::AbsoluteDifference => "absolute difference",
                Metric::Xor => "xor",
            }
        )
    }
}

/// A builder struct to specify the parameters of a [`Mosaic`].
///
/// # Examples
/// ```
/// # use tessera::{BlockSize, Metric, MosaicOptions, Transform, WorkerCount};
/// let options = MosaicOptions::new()
///     .block_size(BlockSize::DEFAULT)
///     .metric(Metric::Cosine)
///     .transform(Transform::LumaAngles)
///     .workers(WorkerCount::DEFAULT);
///
/// assert_eq!(options.get_metric(), Metric::Cosine);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MosaicOptions {
    /// The side length of the blocks.
    block_size: BlockSize,
    /// The similarity metric.
    metric: Metric,
    /// The per-pixel feature transform.
    transform: Transform,
    /// The number of workers to divide each frame between.
    workers: WorkerCount,
    /// How to scan the dictionary.
    search: SearchMethod,
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MosaicOptions {
    /// Creates a new [`MosaicOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block_size: BlockSize::DEFAULT,
            metric: Metric::AbsoluteDifference,
            transform: Transform::Rgb,
            workers: WorkerCount::DEFAULT,
            search: SearchMethod::SinglePass,
        }
    }

    /// Sets the side length of the blocks.
    ///
    /// The default is `8`.
    #[must_use]
    pub const fn block_size(mut self, block_size: BlockSize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the similarity metric.
    ///
    /// The default is [`Metric::AbsoluteDifference`].
    /// Note that this does not change the transform, which must be supported by the metric.
    #[must_use]
    pub const fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the per-pixel feature transform.
    ///
    /// The default is [`Transform::Rgb`].
    #[must_use]
    pub const fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the number of workers that the blocks of each frame are divided between.
    ///
    /// The default is `8`. The output does not depend on this value.
    #[must_use]
    pub const fn workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }

    /// Sets how the dictionary is scanned.
    ///
    /// The default is [`SearchMethod::SinglePass`]. The output does not depend on this value.
    #[must_use]
    pub const fn search(mut self, search: SearchMethod) -> Self {
        self.search = search;
        self
    }

    /// The configured block size.
    #[must_use]
    pub const fn get_block_size(&self) -> BlockSize {
        self.block_size
    }

    /// The configured metric.
    #[must_use]
    pub const fn get_metric(&self) -> Metric {
        self.metric
    }

    /// The configured transform.
    #[must_use]
    pub const fn get_transform(&self) -> Transform {
        self.transform
    }

    /// The configured number of workers.
    #[must_use]
    pub const fn get_workers(&self) -> WorkerCount {
        self.workers
    }

    /// The configured search method.
    #[must_use]
    pub const fn get_search(&self) -> SearchMethod {
        self.search
    }
}

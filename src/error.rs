//! Error types for the matching pipeline.

use crate::{BlockSize, Metric, Transform};
use thiserror::Error;

/// Errors that can occur while configuring or running a [`Mosaic`](crate::Mosaic).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The image has no pixels.
    #[error("the {role} image is empty")]
    EmptyImage {
        /// Which image was empty (`"palette"` or `"input"`).
        role: &'static str,
    },

    /// The image is smaller than a single block.
    #[error("the {role} image ({width}x{height}) does not contain a whole {block_size}x{block_size} block")]
    ImageTooSmall {
        /// Which image was too small (`"palette"` or `"input"`).
        role: &'static str,
        /// The width of the image.
        width: u32,
        /// The height of the image.
        height: u32,
        /// The configured block size.
        block_size: BlockSize,
    },

    /// The feature transform cannot be used with the similarity metric.
    #[error("the {transform} transform cannot be used with the {metric} metric")]
    IncompatibleTransform {
        /// The configured metric.
        metric: Metric,
        /// The configured transform.
        transform: Transform,
    },

    /// A buffer could not be allocated.
    #[error("failed to allocate {bytes} bytes for the {what}")]
    Allocation {
        /// What the buffer was for.
        what: &'static str,
        /// The requested size in bytes.
        bytes: usize,
    },
}

/// Reserves room for exactly `additional` more elements in `buf`,
/// reporting failure as [`PipelineError::Allocation`].
pub(crate) fn try_reserve<T>(
    buf: &mut Vec<T>,
    additional: usize,
    what: &'static str,
) -> Result<(), PipelineError> {
    buf.try_reserve_exact(additional)
        .map_err(|_| PipelineError::Allocation {
            what,
            bytes: additional.saturating_mul(std::mem::size_of::<T>()),
        })
}

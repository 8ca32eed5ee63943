//! Dispatch from the runtime [`Metric`] choice to a monomorphized dictionary.

use crate::{
    dictionary::Dictionary,
    metric::{AbsoluteDifference, NormalizedCosine, TrigCosine, XorApprox},
    reconstruct::reconstruct,
    workers::{self, Assignment},
    Image, Metric, MosaicOptions, PipelineError, Similarity,
};

/// A built dictionary for one of the supported metrics.
#[derive(Debug, Clone)]
pub(crate) enum Engine {
    Cosine(Dictionary<TrigCosine>),
    NormalizedCosine(Dictionary<NormalizedCosine>),
    AbsoluteDifference(Dictionary<AbsoluteDifference>),
    Xor(Dictionary<XorApprox>),
}

impl Engine {
    /// Builds the dictionary of `palette` for the configured metric and transform.
    pub(crate) fn build(palette: &Image, options: &MosaicOptions) -> Result<Self, PipelineError> {
        let block = options.get_block_size();
        let metric = options.get_metric();
        let transform = options.get_transform();
        let incompatible = || PipelineError::IncompatibleTransform { metric, transform };

        let engine = match metric {
            Metric::Cosine => {
                let angles = transform.as_angles().ok_or_else(incompatible)?;
                Self::Cosine(Dictionary::build(palette, block, TrigCosine::new(angles))?)
            }
            Metric::NormalizedCosine => {
                let channels = transform.as_channels().ok_or_else(incompatible)?;
                Self::NormalizedCosine(Dictionary::build(
                    palette,
                    block,
                    NormalizedCosine::new(channels),
                )?)
            }
            Metric::AbsoluteDifference => {
                let channels = transform.as_channels().ok_or_else(incompatible)?;
                Self::AbsoluteDifference(Dictionary::build(
                    palette,
                    block,
                    AbsoluteDifference::new(channels),
                )?)
            }
            Metric::Xor => {
                let channels = transform.as_channels().ok_or_else(incompatible)?;
                Self::Xor(Dictionary::build(palette, block, XorApprox::new(channels))?)
            }
        };

        Ok(engine)
    }

    /// The number of dictionary entries.
    pub(crate) fn len(&self) -> usize {
        match self {
            Engine::Cosine(dictionary) => dictionary.len(),
            Engine::NormalizedCosine(dictionary) => dictionary.len(),
            Engine::AbsoluteDifference(dictionary) => dictionary.len(),
            Engine::Xor(dictionary) => dictionary.len(),
        }
    }

    /// Resolves every block of `image` and assembles the output.
    pub(crate) fn process(
        &self,
        image: &Image,
        options: &MosaicOptions,
        parallel: bool,
    ) -> Result<Image, PipelineError> {
        match self {
            Engine::Cosine(dictionary) => resynthesize(dictionary, image, options, parallel),
            Engine::NormalizedCosine(dictionary) => {
                resynthesize(dictionary, image, options, parallel)
            }
            Engine::AbsoluteDifference(dictionary) => {
                resynthesize(dictionary, image, options, parallel)
            }
            Engine::Xor(dictionary) => resynthesize(dictionary, image, options, parallel),
        }
    }
}

/// Partitions, resolves, and reconstructs one frame.
fn resynthesize<M: Similarity>(
    dictionary: &Dictionary<M>,
    image: &Image,
    options: &MosaicOptions,
    parallel: bool,
) -> Result<Image, PipelineError> {
    let grid = image.block_grid(options.get_block_size());
    let assignments = workers::partition(&grid, options.get_workers());
    let results = resolve(dictionary, image, options, &assignments, parallel);
    reconstruct(dictionary, &grid, &results)
}

#[cfg(feature = "threads")]
fn resolve<M: Similarity>(
    dictionary: &Dictionary<M>,
    image: &Image,
    options: &MosaicOptions,
    assignments: &[Vec<Assignment>],
    parallel: bool,
) -> Vec<u32> {
    if parallel {
        workers::resolve_par(dictionary, image, options.get_search(), assignments)
    } else {
        workers::resolve(dictionary, image, options.get_search(), assignments)
    }
}

#[cfg(not(feature = "threads"))]
fn resolve<M: Similarity>(
    dictionary: &Dictionary<M>,
    image: &Image,
    options: &MosaicOptions,
    assignments: &[Vec<Assignment>],
    _parallel: bool,
) -> Vec<u32> {
    workers::resolve(dictionary, image, options.get_search(), assignments)
}


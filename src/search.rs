//! Exhaustive nearest neighbor search over a [`Dictionary`].

use crate::{
    dictionary::Dictionary, extract::extract_block, BlockOrigin, Image, Orientation, Similarity,
};
use num_traits::Zero;
use std::fmt::Display;

/// The set of supported ways to scan the dictionary.
///
/// Both methods compute every score with the same function and pick the winner with the same
/// comparison, so they always return the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMethod {
    /// Score each entry and compare it against the running maximum in the same loop.
    #[default]
    SinglePass,
    /// Write all scores into a scratch buffer first, then scan the buffer for the maximum.
    ///
    /// This keeps the scoring loop free of branches at the cost of one extra pass over memory.
    Precomputed,
}

impl Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SearchMethod::SinglePass => "single-pass",
                SearchMethod::Precomputed => "precomputed",
            }
        )
    }
}

/// Returns the index of the first maximum of `scores`.
///
/// An entry only replaces the current best if its score is strictly greater,
/// so ties resolve to the lowest index. Returns `0` for an empty iterator.
#[inline]
fn first_max<S: PartialOrd + Copy>(scores: impl IntoIterator<Item = S>) -> usize {
    let mut scores = scores.into_iter().enumerate();
    let Some((_, mut max)) = scores.next() else {
        return 0;
    };

    let mut closest = 0;
    for (i, score) in scores {
        if score > max {
            closest = i;
            max = score;
        }
    }
    closest
}

/// Finds the most similar dictionary entries for blocks of an input image.
///
/// A [`Searcher`] owns the scratch buffers for one worker (the query prototype and,
/// for [`SearchMethod::Precomputed`], the scores), so it should be reused across blocks.
pub struct Searcher<'a, M: Similarity> {
    /// The dictionary being searched.
    dictionary: &'a Dictionary<M>,
    /// How to scan the dictionary.
    method: SearchMethod,
    /// The prototype of the current query block.
    query: Vec<M::Feature>,
    /// The scores of the current query against every entry.
    scores: Vec<M::Score>,
}

impl<'a, M: Similarity> Searcher<'a, M> {
    /// Creates a new [`Searcher`] over `dictionary`.
    #[must_use]
    pub fn new(dictionary: &'a Dictionary<M>, method: SearchMethod) -> Self {
        let scores = match method {
            SearchMethod::SinglePass => Vec::new(),
            SearchMethod::Precomputed => Vec::with_capacity(dictionary.len()),
        };

        Self {
            dictionary,
            method,
            query: vec![M::Feature::zero(); dictionary.prototype_len()],
            scores,
        }
    }

    /// Returns the index of the dictionary entry most similar to the block of `image` at `origin`.
    ///
    /// The block is read with [`Orientation::Identity`]. If several entries share the highest
    /// score, the one with the lowest index is returned.
    ///
    /// # Panics
    /// Panics if the block does not lie within `image`.
    pub fn nearest(&mut self, image: &Image, origin: BlockOrigin) -> u32 {
        let Self { dictionary, method, query, scores } = self;
        let metric = dictionary.metric();

        extract_block(
            image,
            origin,
            Orientation::Identity,
            dictionary.block_size(),
            metric,
            query,
            None,
        );

        let query = query.as_slice();
        let entries = dictionary.iter_prototypes();

        let closest = match method {
            SearchMethod::SinglePass => first_max(entries.map(|entry| metric.score(query, entry))),
            SearchMethod::Precomputed => {
                scores.clear();
                scores.extend(entries.map(|entry| metric.score(query, entry)));
                first_max(scores.iter().copied())
            }
        };

        #[allow(clippy::cast_possible_truncation)]
        {
            closest as u32
        }
    }
}

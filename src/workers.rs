//! Static division of the block search between workers.
//!
//! The blocks of a frame are dealt out round-robin: the block with row-major sequence number
//! `m` goes to worker `m % workers`. Each worker owns a [`Searcher`] and writes its results
//! into its own slots of a shared array of atomics, so no locking is needed and the output
//! does not depend on the number of workers or on scheduling.

use crate::{
    dictionary::Dictionary,
    search::{SearchMethod, Searcher},
    BlockGrid, BlockOrigin, Image, Similarity, WorkerCount,
};
use std::sync::atomic::{AtomicU32, Ordering};

/// A block assigned to a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// The top-left corner of the block in the input image.
    pub origin: BlockOrigin,
    /// The row-major sequence number of the block, i.e., its slot in the results.
    pub slot: usize,
}

/// Deals the blocks of `grid` out to `workers` workers in round-robin order.
///
/// The returned `Vec` has one entry per worker, and each worker's assignments are in
/// increasing slot order. Workers may receive no blocks if there are fewer blocks than workers.
#[must_use]
pub fn partition(grid: &BlockGrid, workers: WorkerCount) -> Vec<Vec<Assignment>> {
    let workers = workers.get();
    let per_worker = grid.len().div_ceil(workers);

    let mut assignments = (0..workers)
        .map(|_| Vec::with_capacity(per_worker))
        .collect::<Vec<_>>();

    for (slot, origin) in grid.origins().enumerate() {
        assignments[slot % workers].push(Assignment { origin, slot });
    }

    log::trace!(
        "partitioned {} blocks between {workers} workers ({per_worker} at most each)",
        grid.len(),
    );

    assignments
}

/// Resolves one worker's assignments, storing each result in its slot.
fn run_worker<M: Similarity>(
    dictionary: &Dictionary<M>,
    image: &Image,
    method: SearchMethod,
    assignments: &[Assignment],
    results: &[AtomicU32],
) {
    let mut searcher = Searcher::new(dictionary, method);
    for &Assignment { origin, slot } in assignments {
        let index = searcher.nearest(image, origin);
        results[slot].store(index, Ordering::Relaxed);
    }
}

/// Allocates one zeroed result slot for every assignment.
fn result_slots(assignments: &[Vec<Assignment>]) -> Vec<AtomicU32> {
    let len = assignments.iter().map(Vec::len).sum::<usize>();
    (0..len).map(|_| AtomicU32::new(0)).collect()
}

/// Runs every worker in turn on the current thread and returns the dictionary index chosen
/// for each slot.
///
/// # Panics
/// Panics if an assigned block does not lie within `image`.
#[must_use]
pub fn resolve<M: Similarity>(
    dictionary: &Dictionary<M>,
    image: &Image,
    method: SearchMethod,
    assignments: &[Vec<Assignment>],
) -> Vec<u32> {
    let results = result_slots(assignments);
    for worker in assignments {
        run_worker(dictionary, image, method, worker, &results);
    }
    results.into_iter().map(AtomicU32::into_inner).collect()
}

/// Runs the workers in parallel and returns the dictionary index chosen for each slot.
///
/// Workers after the first are spawned onto the current [`rayon`] thread pool, while the first
/// worker runs on the calling thread. At most one worker per pool thread, plus the caller,
/// runs at a time; the remaining workers queue until a pool thread is free.
/// This function returns once every worker has finished.
///
/// The results are identical to those of [`resolve`].
///
/// # Panics
/// Panics if an assigned block does not lie within `image`.
#[cfg(feature = "threads")]
#[must_use]
pub fn resolve_par<M: Similarity>(
    dictionary: &Dictionary<M>,
    image: &Image,
    method: SearchMethod,
    assignments: &[Vec<Assignment>],
) -> Vec<u32> {
    let results = result_slots(assignments);

    if let Some((first, rest)) = assignments.split_first() {
        let results = results.as_slice();
        rayon::in_place_scope(|scope| {
            for worker in rest {
                scope.spawn(move |_| run_worker(dictionary, image, method, worker, results));
            }
            run_worker(dictionary, image, method, first, results);
        });
    }

    results.into_iter().map(AtomicU32::into_inner).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        metric::{AbsoluteDifference, TrigCosine},
        tests::*,
        transform::{AngleTransform, ChannelTransform},
        BlockSize,
    };

    #[test]
    fn round_robin_partition() {
        let grid = BlockGrid::new(40, 16, BlockSize::new(8).unwrap());
        let assignments = partition(&grid, WorkerCount::new(3).unwrap());

        assert_eq!(assignments.len(), 3);
        let slots = assignments
            .iter()
            .map(|worker| worker.iter().map(|a| a.slot).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(slots, vec![vec![0, 3, 6, 9], vec![1, 4, 7], vec![2, 5, 8]]);

        for worker in &assignments {
            for assignment in worker {
                assert_eq!(Some(assignment.origin), grid.origin(assignment.slot));
            }
        }
    }

    #[test]
    fn more_workers_than_blocks() {
        let grid = BlockGrid::new(16, 8, BlockSize::new(8).unwrap());
        let assignments = partition(&grid, WorkerCount::new(5).unwrap());
        let sizes = assignments.iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(sizes, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn empty_grid() {
        let grid = BlockGrid::new(7, 7, BlockSize::new(8).unwrap());
        let assignments = partition(&grid, WorkerCount::DEFAULT);
        assert!(assignments.iter().all(Vec::is_empty));

        let palette = random_image(8, 8, 0);
        let metric = AbsoluteDifference::new(ChannelTransform::Rgb);
        let dictionary = Dictionary::build(&palette, BlockSize::new(8).unwrap(), metric).unwrap();
        let image = Image::filled(7, 7, RED);
        assert!(resolve(&dictionary, &image, SearchMethod::SinglePass, &assignments).is_empty());
    }

    #[test]
    fn worker_count_does_not_change_results() {
        let palette = gradient_image(64, 48, 31);
        let input = random_image(72, 40, 32);
        let block = BlockSize::new(8).unwrap();
        let grid = input.block_grid(block);
        let metric = TrigCosine::new(AngleTransform::Rgb);
        let dictionary = Dictionary::build(&palette, block, metric).unwrap();

        let single = resolve(
            &dictionary,
            &input,
            SearchMethod::SinglePass,
            &partition(&grid, WorkerCount::new(1).unwrap()),
        );
        assert_eq!(single.len(), grid.len());

        for workers in [2, 5, 8, 100] {
            let assignments = partition(&grid, WorkerCount::new(workers).unwrap());
            let results = resolve(&dictionary, &input, SearchMethod::Precomputed, &assignments);
            assert_eq!(results, single);
        }
    }

    #[cfg(feature = "threads")]
    #[test]
    fn parallel_matches_sequential() {
        let palette = gradient_image(48, 48, 41);
        let input = gradient_image(64, 32, 42);
        let block = BlockSize::new(4).unwrap();
        let grid = input.block_grid(block);
        let metric = AbsoluteDifference::new(ChannelTransform::Rgb);
        let dictionary = Dictionary::build(&palette, block, metric).unwrap();

        for workers in [1, 3, 8] {
            let assignments = partition(&grid, WorkerCount::new(workers).unwrap());
            let sequential = resolve(&dictionary, &input, SearchMethod::SinglePass, &assignments);
            let parallel = resolve_par(&dictionary, &input, SearchMethod::SinglePass, &assignments);
            assert_eq!(sequential, parallel);
        }
    }

    #[cfg(feature = "threads")]
    #[test]
    fn more_workers_than_pool_threads() {
        let palette = gradient_image(32, 32, 43);
        let input = random_image(48, 40, 44);
        let block = BlockSize::new(8).unwrap();
        let grid = input.block_grid(block);
        let metric = TrigCosine::new(AngleTransform::Luma);
        let dictionary = Dictionary::build(&palette, block, metric).unwrap();
        let assignments = partition(&grid, WorkerCount::new(12).unwrap());
        let sequential = resolve(&dictionary, &input, SearchMethod::Precomputed, &assignments);

        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let pooled = pool.install(|| {
            resolve_par(&dictionary, &input, SearchMethod::Precomputed, &assignments)
        });
        assert_eq!(pooled, sequential);

        let outside = std::thread::scope(|scope| {
            scope
                .spawn(|| resolve_par(&dictionary, &input, SearchMethod::Precomputed, &assignments))
                .join()
                .unwrap()
        });
        assert_eq!(outside, sequential);
    }
}

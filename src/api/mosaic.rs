//! Contains the [`Mosaic`] context for the high level API.

use super::engine::Engine;
use crate::{BlockSize, Image, MosaicOptions, PipelineError};

/// A palette image and the options used to rebuild input frames out of its blocks.
///
/// The dictionary of palette blocks is built lazily: on the first call to [`Mosaic::build`],
/// [`Mosaic::process`], or [`Mosaic::process_par`]. It is then reused for every later frame,
/// so a single [`Mosaic`] should be kept around when processing a sequence of frames.
///
/// # Examples
/// ```
/// # use tessera::{pack_rgb, Image, Mosaic, MosaicOptions, BlockSize};
/// # fn main() -> Result<(), tessera::PipelineError> {
/// let red = pack_rgb(255, 0, 0);
/// let blue = pack_rgb(0, 0, 255);
///
/// // a palette with one blue and one red 4x4 block
/// let palette = Image::from_fn(8, 4, |x, _| if x < 4 { blue } else { red });
/// let options = MosaicOptions::new().block_size(BlockSize::new(4).unwrap());
/// let mut mosaic = Mosaic::new(palette, options)?;
///
/// // trailing pixels that do not fill a whole block are dropped
/// let frame = Image::filled(10, 5, pack_rgb(250, 10, 10));
/// let output = mosaic.process(&frame)?;
/// assert_eq!(output, Image::filled(8, 4, red));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Mosaic {
    /// The image whose blocks make up every output.
    palette: Image,
    /// The configured options.
    options: MosaicOptions,
    /// The dictionary, once built.
    engine: Option<Engine>,
}

/// Checks that `image` holds at least one whole block.
fn check_image(image: &Image, role: &'static str, block_size: BlockSize) -> Result<(), PipelineError> {
    if image.is_empty() {
        Err(PipelineError::EmptyImage { role })
    } else if image.block_grid(block_size).is_empty() {
        let (width, height) = image.dimensions();
        Err(PipelineError::ImageTooSmall { role, width, height, block_size })
    } else {
        Ok(())
    }
}

impl Mosaic {
    /// Creates a new [`Mosaic`] without building its dictionary.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `palette` is empty ([`PipelineError::EmptyImage`]).
    /// - `palette` does not contain a whole block ([`PipelineError::ImageTooSmall`]).
    /// - the metric does not support the transform ([`PipelineError::IncompatibleTransform`]).
    pub fn new(palette: Image, options: MosaicOptions) -> Result<Self, PipelineError> {
        check_image(&palette, "palette", options.get_block_size())?;

        let metric = options.get_metric();
        let transform = options.get_transform();
        if !metric.supports(transform) {
            return Err(PipelineError::IncompatibleTransform { metric, transform });
        }

        Ok(Self { palette, options, engine: None })
    }

    /// The options of this [`Mosaic`].
    #[must_use]
    pub const fn options(&self) -> &MosaicOptions {
        &self.options
    }

    /// The palette image.
    #[must_use]
    pub const fn palette(&self) -> &Image {
        &self.palette
    }

    /// Returns whether the dictionary has been built.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.engine.is_some()
    }

    /// The number of dictionary entries, or `None` if the dictionary has not been built yet.
    #[must_use]
    pub fn dictionary_len(&self) -> Option<usize> {
        self.engine.as_ref().map(Engine::len)
    }

    /// Builds the dictionary if it has not been built already.
    ///
    /// # Errors
    /// Returns [`PipelineError::Allocation`] if the dictionary cannot be allocated.
    pub fn build(&mut self) -> Result<(), PipelineError> {
        self.engine()?;
        Ok(())
    }

    /// Returns the dictionary, building it first if necessary.
    fn engine(&mut self) -> Result<&Engine, PipelineError> {
        let engine: &Engine = match &mut self.engine {
            Some(engine) => engine,
            engine @ None => engine.insert(Engine::build(&self.palette, &self.options)?),
        };
        Ok(engine)
    }

    /// Runs one frame through the pipeline.
    fn run(&mut self, image: &Image, parallel: bool) -> Result<Image, PipelineError> {
        let options = self.options;
        check_image(image, "input", options.get_block_size())?;

        let engine = self.engine()?;
        let output = engine.process(image, &options, parallel)?;

        log::debug!(
            "resynthesized a {}x{} frame into {}x{} with {} workers",
            image.width(),
            image.height(),
            output.width(),
            output.height(),
            options.get_workers(),
        );

        Ok(output)
    }

    /// Rebuilds `image` out of palette blocks on the current thread.
    ///
    /// The output has the dimensions of `image` rounded down to a multiple of the block size.
    /// The dictionary is built first if it has not been built already.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `image` is empty ([`PipelineError::EmptyImage`]).
    /// - `image` does not contain a whole block ([`PipelineError::ImageTooSmall`]).
    /// - a buffer cannot be allocated ([`PipelineError::Allocation`]).
    pub fn process(&mut self, image: &Image) -> Result<Image, PipelineError> {
        self.run(image, false)
    }

    /// Rebuilds `image` out of palette blocks, dividing the work between parallel workers.
    ///
    /// The output is identical to that of [`Mosaic::process`].
    ///
    /// # Errors
    /// See [`Mosaic::process`].
    #[cfg(feature = "threads")]
    pub fn process_par(&mut self, image: &Image) -> Result<Image, PipelineError> {
        self.run(image, true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{search::SearchMethod, tests::*, Metric, Transform, WorkerCount};

    fn options(metric: Metric, transform: Transform) -> MosaicOptions {
        MosaicOptions::new().metric(metric).transform(transform)
    }

    #[test]
    fn self_palette_reproduces_input() {
        let image = random_image(40, 24, 61);

        for (metric, transform) in [
            (Metric::AbsoluteDifference, Transform::Rgb),
            (Metric::Xor, Transform::Rgb),
            (Metric::Cosine, Transform::RgbAngles),
        ] {
            let mut mosaic = Mosaic::new(image.clone(), options(metric, transform)).unwrap();
            let output = mosaic.process(&image).unwrap();
            assert_eq!(output, image, "{metric} / {transform}");
        }
    }

    #[test]
    fn self_palette_of_cropped_input() {
        let image = random_image(37, 21, 62);
        let palette = image.crop(0, 0, 32, 16).unwrap();
        let mut mosaic = Mosaic::new(palette.clone(), MosaicOptions::new()).unwrap();

        let output = mosaic.process(&image).unwrap();
        assert_eq!(output, palette);
    }

    #[test]
    fn output_is_truncated_to_whole_blocks() {
        let palette = gradient_image(32, 32, 63);
        let mut mosaic = Mosaic::new(palette, MosaicOptions::new()).unwrap();
        let output = mosaic.process(&random_image(21, 13, 64)).unwrap();
        assert_eq!(output.dimensions(), (16, 8));
    }

    #[test]
    fn red_query_picks_red_block() {
        let palette = Image::from_fn(16, 8, |x, _| if x < 8 { BLUE } else { RED });
        let input = Image::filled(8, 8, crate::pack_rgb(240, 20, 20));

        for (metric, transform) in [
            (Metric::Cosine, Transform::RgbAngles),
            (Metric::NormalizedCosine, Transform::Rgb),
            (Metric::AbsoluteDifference, Transform::Rgb),
            (Metric::Xor, Transform::Rgb),
        ] {
            let mut mosaic = Mosaic::new(palette.clone(), options(metric, transform)).unwrap();
            let output = mosaic.process(&input).unwrap();
            assert_eq!(output, Image::filled(8, 8, RED), "{metric}");
        }
    }

    #[test]
    fn worker_count_and_search_method_do_not_change_output() {
        let palette = gradient_image(48, 40, 65);
        let input = random_image(56, 32, 66);
        let base = options(Metric::Cosine, Transform::LumaAngles);

        let expected = Mosaic::new(palette.clone(), base.workers(WorkerCount::new(1).unwrap()))
            .unwrap()
            .process(&input)
            .unwrap();

        for workers in [2, 8] {
            for search in [SearchMethod::SinglePass, SearchMethod::Precomputed] {
                let options = base.workers(WorkerCount::new(workers).unwrap()).search(search);
                let mut mosaic = Mosaic::new(palette.clone(), options).unwrap();
                assert_eq!(mosaic.process(&input).unwrap(), expected);

                #[cfg(feature = "threads")]
                assert_eq!(mosaic.process_par(&input).unwrap(), expected);
            }
        }
    }

    #[test]
    fn dictionary_is_built_once() {
        let palette = random_image(24, 16, 67);
        let mut mosaic = Mosaic::new(palette, MosaicOptions::new()).unwrap();
        assert!(!mosaic.is_built());
        assert_eq!(mosaic.dictionary_len(), None);

        mosaic.build().unwrap();
        assert!(mosaic.is_built());
        assert_eq!(mosaic.dictionary_len(), Some(6 * 6));

        let input = random_image(16, 16, 68);
        let first = mosaic.process(&input).unwrap();
        let second = mosaic.process(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(mosaic.dictionary_len(), Some(6 * 6));
    }

    #[test]
    fn invalid_images_are_rejected() {
        let options = MosaicOptions::new();

        assert!(matches!(
            Mosaic::new(Image::default(), options),
            Err(PipelineError::EmptyImage { role: "palette" })
        ));
        assert!(matches!(
            Mosaic::new(Image::filled(7, 100, RED), options),
            Err(PipelineError::ImageTooSmall { role: "palette", width: 7, height: 100, .. })
        ));

        let mut mosaic = Mosaic::new(Image::filled(8, 8, RED), options).unwrap();
        assert!(matches!(
            mosaic.process(&Image::filled(0, 5, RED)),
            Err(PipelineError::EmptyImage { role: "input" })
        ));
        assert!(matches!(
            mosaic.process(&Image::filled(20, 4, RED)),
            Err(PipelineError::ImageTooSmall { role: "input", .. })
        ));
        assert!(!mosaic.is_built());
    }

    #[test]
    fn incompatible_transform_is_rejected() {
        let palette = random_image(8, 8, 69);
        for (metric, transform) in [
            (Metric::Cosine, Transform::Rgb),
            (Metric::Cosine, Transform::Luma),
            (Metric::AbsoluteDifference, Transform::RgbAngles),
            (Metric::Xor, Transform::LumaAngles),
            (Metric::NormalizedCosine, Transform::RgbAngles),
        ] {
            let result = Mosaic::new(palette.clone(), options(metric, transform));
            assert!(matches!(
                result,
                Err(PipelineError::IncompatibleTransform { metric: m, transform: t })
                    if m == metric && t == transform
            ));
        }
    }
}

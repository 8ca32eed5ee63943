#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{fmt::Display, time::Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tessera::{
    codec,
    frames::FrameSequence,
    BlockSize, Metric, Mosaic, MosaicOptions, SearchMethod, Transform, WorkerCount,
};

#[derive(Copy, Clone, ValueEnum)]
enum CliMetric {
    Cosine,
    NormalizedCosine,
    AbsoluteDifference,
    Xor,
}

impl From<CliMetric> for Metric {
    fn from(value: CliMetric) -> Self {
        match value {
            CliMetric::Cosine => Metric::Cosine,
            CliMetric::NormalizedCosine => Metric::NormalizedCosine,
            CliMetric::AbsoluteDifference => Metric::AbsoluteDifference,
            CliMetric::Xor => Metric::Xor,
        }
    }
}

impl Display for CliMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CliMetric::Cosine => "cosine",
                CliMetric::NormalizedCosine => "normalized-cosine",
                CliMetric::AbsoluteDifference => "absolute-difference",
                CliMetric::Xor => "xor",
            }
        )
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum CliTransform {
    Rgb,
    Luma,
    RgbAngles,
    LumaAngles,
}

impl From<CliTransform> for Transform {
    fn from(value: CliTransform) -> Self {
        match value {
            CliTransform::Rgb => Transform::Rgb,
            CliTransform::Luma => Transform::Luma,
            CliTransform::RgbAngles => Transform::RgbAngles,
            CliTransform::LumaAngles => Transform::LumaAngles,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum CliSearch {
    SinglePass,
    Precomputed,
}

impl From<CliSearch> for SearchMethod {
    fn from(value: CliSearch) -> Self {
        match value {
            CliSearch::SinglePass => SearchMethod::SinglePass,
            CliSearch::Precomputed => SearchMethod::Precomputed,
        }
    }
}

impl Display for CliSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CliSearch::SinglePass => "single-pass",
                CliSearch::Precomputed => "precomputed",
            }
        )
    }
}

#[derive(Parser)]
pub struct Options {
    /// Input frame path, optionally numbered with a `%d` style marker.
    #[arg(long = "in", default_value = "1.bmp")]
    input: String,

    /// The palette image whose blocks make up the output.
    #[arg(long, default_value = "2.bmp")]
    pattern: String,

    /// Output frame path, optionally numbered with a `%d` style marker.
    #[arg(long, default_value = "3.bmp")]
    out: String,

    /// With 1, only decode and re-encode each frame. The palette is not loaded.
    #[arg(long, default_value_t = 0)]
    convert: u8,

    #[arg(long, default_value_t = BlockSize::DEFAULT, value_parser = parse_block_size)]
    block_size: BlockSize,

    #[arg(long, default_value_t = CliMetric::AbsoluteDifference)]
    metric: CliMetric,

    /// Defaults to the full color transform of the metric.
    #[arg(long)]
    transform: Option<CliTransform>,

    #[arg(short, long, default_value_t = WorkerCount::DEFAULT.into_inner())]
    workers: u16,

    #[arg(long, default_value_t = CliSearch::SinglePass)]
    search: CliSearch,
}

fn parse_block_size(s: &str) -> Result<BlockSize, String> {
    let side: u32 = s.parse().map_err(|e| format!("{e}"))?;
    BlockSize::new(side).ok_or_else(|| format!("{side} is not a power of two between 2 and 64"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Options {
        input,
        pattern,
        out,
        convert,
        block_size,
        metric,
        transform,
        workers,
        search,
    } = Options::parse();

    let metric = Metric::from(metric);
    let options = MosaicOptions::new()
        .block_size(block_size)
        .metric(metric)
        .transform(transform.map_or_else(|| metric.default_transform(), Transform::from))
        .workers(WorkerCount::from_clamped(workers))
        .search(search.into());

    // convert mode never reads the palette
    let mut mosaic = if convert != 0 {
        None
    } else {
        let palette = codec::decode(&pattern)
            .with_context(|| format!("failed to load the palette image {pattern}"))?;
        Some(Mosaic::new(palette, options).context("invalid configuration")?)
    };

    for frame in FrameSequence::new(input, out) {
        let start = Instant::now();

        let image = codec::decode(&frame.input)
            .with_context(|| format!("failed to load frame {}", frame.input.display()))?;

        let output = match mosaic.as_mut() {
            None => image,
            Some(mosaic) => mosaic
                .process_par(&image)
                .with_context(|| format!("failed to process frame {}", frame.index))?,
        };

        codec::encode(&output, &frame.output)
            .with_context(|| format!("failed to save frame {}", frame.output.display()))?;

        println!(
            "Processed frame {}, ({}, {pattern}) => {} (+{:.6})",
            frame.index,
            frame.input.display(),
            frame.output.display(),
            start.elapsed().as_secs_f64(),
        );
    }

    Ok(())
}

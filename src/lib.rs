//! A library that rebuilds images out of the blocks of another image.
//!
//! `tessera` tiles an input image with square blocks and replaces each block with the most
//! similar block found in a fixed "palette" image. The palette is searched exhaustively:
//! every block of the palette is considered under six rotations and reflections.
//! The result is a mosaic of the input made entirely out of palette material.
//!
//! # Features
//! To reduce dependencies and compile times, `tessera` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes [`Mosaic::process_par`], which divides the block search between
//!   workers. The first worker runs on the calling thread and the rest on the current
//!   [`rayon`] thread pool, so the pool size bounds how many run at once.
//! - `image`: enables integration with the [`image`] crate, which is also used to read and
//!   write bitmap files in the [`codec`] module.
//!
//! # High-Level API
//! To get started, see [`Mosaic`] and [`MosaicOptions`]:
//! ```no_run
//! # use tessera::{codec, Metric, Mosaic, MosaicOptions, Transform};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let palette = codec::decode("palette.bmp")?;
//!
//! let options = MosaicOptions::new()
//!     .metric(Metric::Cosine)
//!     .transform(Transform::RgbAngles);
//!
//! let mut mosaic = Mosaic::new(palette, options)?;
//!
//! // The palette dictionary is built on the first frame and reused afterwards.
//! for path in ["frame1.bmp", "frame2.bmp"] {
//!     let frame = codec::decode(path)?;
//!     let output = mosaic.process_par(&frame)?;
//!     codec::encode(&output, path.replace("frame", "out"))?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The lower level building blocks (feature extraction, the metrics, the dictionary, and
//! the search) are available in their own modules.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod error;
mod traits;
mod types;

pub mod codec;
pub mod dictionary;
pub mod extract;
pub mod frames;
pub mod metric;
pub mod orientation;
pub mod reconstruct;
pub mod search;
pub mod transform;
pub mod workers;

pub use api::*;
pub use error::PipelineError;
pub use orientation::Orientation;
pub use search::SearchMethod;
pub use traits::*;
pub use transform::Transform;
pub use types::*;

/// The smallest supported block size, as the base two logarithm of the side length (`2 x 2`).
pub const MIN_BLOCK_SIZE_LOG: u8 = 1;

/// The largest supported block size, as the base two logarithm of the side length (`64 x 64`).
pub const MAX_BLOCK_SIZE_LOG: u8 = 6;

/// The number of orientations each palette block is stored under.
pub const ORIENTATIONS: usize = Orientation::ALL.len();

//! Reading and writing images from and to files.
//!
//! Two formats are supported, chosen by file extension (see [`Format::from_path`]):
//! - Raw: a little-endian `u32` width, a `u32` height, and then `width * height`
//!   little-endian `u32` pixels in row-major order, without padding.
//! - Bitmap: 24-bit BMP files, read and written through the [`image`] crate
//!   (needs the `image` feature).

use crate::Image;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
    fmt::Display,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
#[cfg(feature = "image")]
use image::ImageFormat;

/// The supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Raw little-endian dimensions and pixels.
    Raw,
    /// 24-bit bitmap.
    Bitmap,
}

impl Format {
    /// Returns [`Format::Raw`] if the extension of `path` is `bin`, or [`Format::Bitmap`] otherwise.
    ///
    /// # Examples
    /// ```
    /// # use tessera::codec::Format;
    /// assert_eq!(Format::from_path("frames/0001.bin"), Format::Raw);
    /// assert_eq!(Format::from_path("palette.bmp"), Format::Bitmap);
    /// assert_eq!(Format::from_path("no_extension"), Format::Bitmap);
    /// ```
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension() {
            Some(ext) if ext.eq_ignore_ascii_case("bin") => Format::Raw,
            _ => Format::Bitmap,
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Format::Raw => "raw",
                Format::Bitmap => "bitmap",
            }
        )
    }
}

/// Errors that can occur while reading or writing an image.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The file does not exist.
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The data ended before the whole image was read.
    #[error("the image data ended unexpectedly")]
    Truncated,

    /// The image dimensions cannot be represented.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// The width from the image header.
        width: u32,
        /// The height from the image header.
        height: u32,
    },

    /// Any other I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// An error from the bitmap codec.
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// The format needs a disabled crate feature.
    #[error("the {0} format is not supported without the `image` feature")]
    UnsupportedFormat(Format),
}

/// Maps an early end of input to [`CodecError::Truncated`].
fn read_error(error: io::Error) -> CodecError {
    if error.kind() == io::ErrorKind::UnexpectedEof {
        CodecError::Truncated
    } else {
        CodecError::Io(error)
    }
}

/// Reads an image in the raw format.
///
/// # Errors
/// Returns [`CodecError::Truncated`] if `reader` ends early,
/// [`CodecError::InvalidDimensions`] if the pixel count does not fit in a `u32`,
/// or [`CodecError::Io`] for any other read error.
pub fn read_raw(mut reader: impl Read) -> Result<Image, CodecError> {
    let width = reader.read_u32::<LittleEndian>().map_err(read_error)?;
    let height = reader.read_u32::<LittleEndian>().map_err(read_error)?;
    let len = width
        .checked_mul(height)
        .ok_or(CodecError::InvalidDimensions { width, height })?;

    let mut pixels = Vec::with_capacity((len as usize).min(1 << 20));
    for _ in 0..len {
        pixels.push(reader.read_u32::<LittleEndian>().map_err(read_error)?);
    }

    Ok(Image::from_parts(width, height, pixels))
}

/// Writes an image in the raw format.
///
/// # Errors
/// Returns [`CodecError::Io`] if writing fails.
pub fn write_raw(image: &Image, mut writer: impl Write) -> Result<(), CodecError> {
    writer.write_u32::<LittleEndian>(image.width())?;
    writer.write_u32::<LittleEndian>(image.height())?;
    for &pixel in image.pixels() {
        writer.write_u32::<LittleEndian>(pixel)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "image")]
fn read_bitmap(reader: BufReader<File>) -> Result<Image, CodecError> {
    let image = image::load(reader, ImageFormat::Bmp)?.into_rgb8();
    Ok(Image::from(&image))
}

#[cfg(not(feature = "image"))]
#[allow(clippy::needless_pass_by_value)]
fn read_bitmap(_reader: BufReader<File>) -> Result<Image, CodecError> {
    Err(CodecError::UnsupportedFormat(Format::Bitmap))
}

#[cfg(feature = "image")]
fn write_bitmap(image: &Image, path: &Path) -> Result<(), CodecError> {
    let (width, height) = image.dimensions();
    if image.is_empty() {
        return Err(CodecError::InvalidDimensions { width, height });
    }
    image.to_rgbimage().save_with_format(path, ImageFormat::Bmp)?;
    Ok(())
}

#[cfg(not(feature = "image"))]
fn write_bitmap(_image: &Image, _path: &Path) -> Result<(), CodecError> {
    Err(CodecError::UnsupportedFormat(Format::Bitmap))
}

/// Reads the image at `path`, in the format given by its extension.
///
/// # Errors
/// Returns [`CodecError::NotFound`] if the file does not exist, or any error from reading
/// the format (see [`read_raw`]).
pub fn decode(path: impl AsRef<Path>) -> Result<Image, CodecError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|error| {
        if error.kind() == io::ErrorKind::NotFound {
            CodecError::NotFound(path.to_path_buf())
        } else {
            CodecError::Io(error)
        }
    })?;

    let reader = BufReader::new(file);
    let image = match Format::from_path(path) {
        Format::Raw => read_raw(reader)?,
        Format::Bitmap => read_bitmap(reader)?,
    };

    log::debug!(
        "decoded {}x{} image from {}",
        image.width(),
        image.height(),
        path.display(),
    );

    Ok(image)
}

/// Writes `image` to `path`, in the format given by its extension.
///
/// # Errors
/// Returns [`CodecError::Io`] or [`CodecError::Image`] if writing fails, or
/// [`CodecError::InvalidDimensions`] if an empty image is written as a bitmap.
pub fn encode(image: &Image, path: impl AsRef<Path>) -> Result<(), CodecError> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Format::Raw => write_raw(image, BufWriter::new(File::create(path)?))?,
        Format::Bitmap => write_bitmap(image, path)?,
    }

    log::debug!(
        "encoded {}x{} image to {}",
        image.width(),
        image.height(),
        path.display(),
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn raw_layout() {
        let image = Image::new(2, 1, vec![0x0011_2233, 0x00AA_BBCC]).unwrap();
        let mut buf = Vec::new();
        write_raw(&image, &mut buf).unwrap();
        assert_eq!(
            buf,
            [2, 0, 0, 0, 1, 0, 0, 0, 0x33, 0x22, 0x11, 0, 0xCC, 0xBB, 0xAA, 0]
        );
        assert_eq!(read_raw(buf.as_slice()).unwrap(), image);
    }

    #[test]
    fn raw_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.bin");
        let image = random_image(13, 7, 71);

        encode(&image, &path).unwrap();
        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.dimensions(), (13, 7));
        assert_eq!(decoded, image);
    }

    #[test]
    fn truncated_raw_data() {
        let image = random_image(4, 4, 72);
        let mut buf = Vec::new();
        write_raw(&image, &mut buf).unwrap();

        buf.truncate(buf.len() - 3);
        assert!(matches!(read_raw(buf.as_slice()), Err(CodecError::Truncated)));

        buf.truncate(6);
        assert!(matches!(read_raw(buf.as_slice()), Err(CodecError::Truncated)));
    }

    #[test]
    fn oversized_raw_header() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(1 << 16).unwrap();
        buf.write_u32::<LittleEndian>(1 << 16).unwrap();
        assert!(matches!(
            read_raw(buf.as_slice()),
            Err(CodecError::InvalidDimensions { width: 65536, height: 65536 })
        ));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bmp");
        match decode(&path) {
            Err(CodecError::NotFound(missing)) => assert_eq!(missing, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[cfg(feature = "image")]
    #[test]
    fn bitmap_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.bmp");
        // odd width exercises the row padding
        let image = random_image(7, 5, 73);

        encode(&image, &path).unwrap();
        assert_eq!(decode(&path).unwrap(), image);
    }

    #[cfg(feature = "image")]
    #[test]
    fn empty_bitmap_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bmp");
        assert!(matches!(
            encode(&Image::default(), &path),
            Err(CodecError::InvalidDimensions { width: 0, height: 0 })
        ));
    }
}

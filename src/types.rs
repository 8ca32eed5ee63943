//! Contains the image and block geometry types needed across the crate.

use crate::{MAX_BLOCK_SIZE_LOG, MIN_BLOCK_SIZE_LOG};
use palette::Srgb;
use std::fmt::Display;
#[cfg(feature = "image")]
use {
    image::RgbImage,
    palette::cast::{ComponentsAs, IntoComponents},
};

/// Packs 8-bit red, green, and blue channels into the low 24 bits of a `u32` (`0x00RRGGBB`).
#[must_use]
pub const fn pack_rgb(red: u8, green: u8, blue: u8) -> u32 {
    ((red as u32) << 16) | ((green as u32) << 8) | blue as u32
}

/// Splits a packed color into its red, green, and blue channels.
///
/// Any bits above the low 24 bits are ignored.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn unpack_rgb(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

/// An in-memory raster of packed 24-bit colors.
///
/// Pixels are stored row-major, and each pixel keeps its color in the low 24 bits
/// (see [`pack_rgb`]). The length of the pixel buffer is always `width * height`.
///
/// # Examples
/// ```
/// # use tessera::{pack_rgb, Image};
/// let red = pack_rgb(255, 0, 0);
/// let image = Image::filled(16, 8, red);
/// assert_eq!(image.dimensions(), (16, 8));
/// assert_eq!(image.pixel(3, 5), red);
///
/// // mismatched buffer lengths are rejected
/// assert!(Image::new(4, 4, vec![0; 15]).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Image {
    /// The width in pixels.
    width: u32,
    /// The height in pixels.
    height: u32,
    /// The row-major pixel buffer.
    pixels: Vec<u32>,
}

impl Image {
    /// Creates a new [`Image`] from a row-major pixel buffer.
    /// Returns `None` if the length of `pixels` is not equal to `width * height`.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        if pixels.len() == len {
            Some(Self { width, height, pixels })
        } else {
            None
        }
    }

    /// Creates an image from a buffer already known to hold `width * height` pixels.
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self { width, height, pixels }
    }

    /// Creates an image where every pixel is `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Creates an image by calling `color(x, y)` for every pixel in row-major order.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut color: impl FnMut(u32, u32) -> u32) -> Self {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| color(x, y))
            .collect();

        Self { width, height, pixels }
    }

    /// Creates a new [`Image`] from a slice of colors.
    /// Returns `None` if the length of `colors` is not equal to `width * height`.
    #[must_use]
    pub fn from_srgb(colors: &[Srgb<u8>], width: u32, height: u32) -> Option<Self> {
        let pixels = colors
            .iter()
            .map(|c| pack_rgb(c.red, c.green, c.blue))
            .collect();

        Self::new(width, height, pixels)
    }

    /// Returns the pixels of this image as [`Srgb`] colors.
    #[must_use]
    pub fn to_srgb(&self) -> Vec<Srgb<u8>> {
        self.pixels
            .iter()
            .map(|&p| {
                let [r, g, b] = unpack_rgb(p);
                Srgb::new(r, g, b)
            })
            .collect()
    }

    /// The width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The `(width, height)` of the image.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns whether the image has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The row-major pixel buffer.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Consumes the image, returning its row-major pixel buffer.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside of the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Returns row `y` of the image.
    ///
    /// # Panics
    /// Panics if `y` is not less than the height of the image.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u32] {
        let width = self.width as usize;
        let start = y as usize * width;
        &self.pixels[start..(start + width)]
    }

    /// Copies out the `width * height` region starting at `(x, y)`.
    /// Returns `None` if the region does not lie within the image.
    #[must_use]
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if x.checked_add(width)? > self.width || y.checked_add(height)? > self.height {
            return None;
        }

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for row in y..(y + height) {
            let row = self.row(row);
            pixels.extend_from_slice(&row[(x as usize)..((x + width) as usize)]);
        }

        Some(Self { width, height, pixels })
    }

    /// Returns the grid of whole blocks covering this image.
    ///
    /// Trailing columns and rows that do not fill a whole block are not part of the grid.
    #[must_use]
    pub const fn block_grid(&self, block: BlockSize) -> BlockGrid {
        BlockGrid::new(self.width, self.height, block)
    }
}

#[cfg(feature = "image")]
impl From<&RgbImage> for Image {
    fn from(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = width as usize * height as usize;
        let colors: &[Srgb<u8>] = image.as_raw()[..(pixels * 3)].components_as();
        Self {
            width,
            height,
            pixels: colors
                .iter()
                .map(|c| pack_rgb(c.red, c.green, c.blue))
                .collect(),
        }
    }
}

#[cfg(feature = "image")]
impl Image {
    /// Converts this image into an [`RgbImage`].
    #[must_use]
    pub fn to_rgbimage(&self) -> RgbImage {
        let buf: Vec<u8> = self.to_srgb().into_components();

        #[allow(clippy::expect_used)]
        {
            // the buffer holds exactly width * height * 3 components
            RgbImage::from_vec(self.width, self.height, buf).expect("large enough buffer")
        }
    }
}

/// The side length of the square blocks that images are tiled with.
///
/// This is a simple new type wrapper around the base two logarithm of the side length,
/// with the invariant that it lies in `MIN_BLOCK_SIZE_LOG..=MAX_BLOCK_SIZE_LOG`
/// (block sides from `2` to `64` pixels).
///
/// # Examples
/// ```
/// # use tessera::BlockSize;
/// let block = BlockSize::new(16).unwrap();
/// assert_eq!(block.side(), 16);
/// assert_eq!(block.align(37), 32);
///
/// // sides must be powers of two
/// assert!(BlockSize::new(12).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BlockSize(u8);

impl BlockSize {
    /// The default block size of `8 x 8` pixels.
    pub const DEFAULT: Self = Self(3);

    /// Creates a [`BlockSize`] from a side length in pixels.
    /// Returns `None` if `side` is not a power of two in the supported range.
    #[must_use]
    pub const fn new(side: u32) -> Option<Self> {
        if side.is_power_of_two() {
            #[allow(clippy::cast_possible_truncation)]
            Self::from_log2(side.trailing_zeros() as u8)
        } else {
            None
        }
    }

    /// Creates a [`BlockSize`] from the base two logarithm of its side length.
    /// Returns `None` if `log2` is outside of the supported range.
    #[must_use]
    pub const fn from_log2(log2: u8) -> Option<Self> {
        if MIN_BLOCK_SIZE_LOG <= log2 && log2 <= MAX_BLOCK_SIZE_LOG {
            Some(Self(log2))
        } else {
            None
        }
    }

    /// The base two logarithm of the side length.
    #[must_use]
    pub const fn log2(self) -> u8 {
        self.0
    }

    /// The side length in pixels.
    #[must_use]
    pub const fn side(self) -> u32 {
        1 << self.0
    }

    /// The number of pixels in one block.
    #[must_use]
    pub const fn area(self) -> usize {
        1 << (2 * self.0)
    }

    /// Truncates `value` down to a multiple of the side length.
    #[must_use]
    pub const fn align(self, value: u32) -> u32 {
        (value >> self.0) << self.0
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for BlockSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.side())
    }
}

/// The top-left corner of a block, aligned to the block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockOrigin {
    /// The column of the top-left pixel.
    pub x: u32,
    /// The row of the top-left pixel.
    pub y: u32,
}

/// The whole blocks that fit inside a `width * height` region, visited in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    /// The block size.
    block: BlockSize,
    /// The number of whole blocks per row.
    columns: u32,
    /// The number of whole blocks per column.
    rows: u32,
}

impl BlockGrid {
    /// Creates the grid of whole blocks for a `width * height` region.
    #[must_use]
    pub const fn new(width: u32, height: u32, block: BlockSize) -> Self {
        Self {
            block,
            columns: width >> block.log2(),
            rows: height >> block.log2(),
        }
    }

    /// The block size of this grid.
    #[must_use]
    pub const fn block_size(&self) -> BlockSize {
        self.block
    }

    /// The number of blocks per row.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// The number of blocks per column.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// The block-aligned `(width, height)` covered by this grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns << self.block.log2(), self.rows << self.block.log2())
    }

    /// The total number of blocks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Returns whether the grid contains no blocks.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the origin of the `index`-th block in row-major order,
    /// or `None` if `index` is not less than [`BlockGrid::len`].
    #[must_use]
    pub const fn origin(&self, index: usize) -> Option<BlockOrigin> {
        if index < self.len() {
            Some(self.origin_of(index))
        } else {
            None
        }
    }

    /// `index` must be less than `self.len()`.
    #[allow(clippy::cast_possible_truncation)]
    const fn origin_of(&self, index: usize) -> BlockOrigin {
        let column = (index % self.columns as usize) as u32;
        let row = (index / self.columns as usize) as u32;
        BlockOrigin {
            x: column << self.block.log2(),
            y: row << self.block.log2(),
        }
    }

    /// Iterates over the block origins in row-major order.
    pub fn origins(&self) -> impl ExactSizeIterator<Item = BlockOrigin> + '_ {
        (0..self.len()).map(|i| self.origin_of(i))
    }
}

/// The number of workers that the blocks of a frame are divided between.
///
/// This is a simple new type wrapper around `u16` with the invariant that it is at least `1`.
///
/// # Examples
/// ```
/// # use tessera::WorkerCount;
/// let workers = WorkerCount::from(4);
/// assert_eq!(workers.into_inner(), 4);
/// assert_eq!(WorkerCount::from_clamped(0).into_inner(), 1);
/// assert!(WorkerCount::new(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct WorkerCount(u16);

impl WorkerCount {
    /// The default number of workers, `8`.
    pub const DEFAULT: Self = Self(8);

    /// Creates a [`WorkerCount`], returning `None` if `count` is zero.
    #[must_use]
    pub const fn new(count: u16) -> Option<Self> {
        if count == 0 {
            None
        } else {
            Some(Self(count))
        }
    }

    /// Creates a [`WorkerCount`] by clamping `count` to be at least `1`.
    #[must_use]
    pub const fn from_clamped(count: u16) -> Self {
        if count == 0 {
            Self(1)
        } else {
            Self(count)
        }
    }

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// The worker count as a `usize`.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for WorkerCount {
    fn from(value: u8) -> Self {
        Self::from_clamped(value.into())
    }
}

impl Display for WorkerCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

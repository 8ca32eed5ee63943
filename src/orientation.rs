//! The dihedral remappings that blocks are sampled under.

/// One of the six rotations or reflections of a square block.
///
/// Orientations change the order in which the pixels of a block are visited.
/// Input blocks are only ever read with [`Orientation::Identity`],
/// while every palette block is stored under all of [`Orientation::ALL`].
/// Since the raw pixels are stored in the same visiting order as the features,
/// a match against a reoriented palette block is reproduced faithfully in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// The block as is.
    #[default]
    Identity,
    /// The block rotated by 180 degrees.
    Rotate180,
    /// The block mirrored along its main diagonal.
    Transpose,
    /// The block mirrored along its anti-diagonal.
    AntiTranspose,
    /// The block mirrored top to bottom.
    FlipVertical,
    /// The block mirrored left to right.
    FlipHorizontal,
}

impl Orientation {
    /// All orientations, in the order they are stored in a dictionary.
    pub const ALL: [Self; 6] = [
        Self::Identity,
        Self::Rotate180,
        Self::Transpose,
        Self::AntiTranspose,
        Self::FlipVertical,
        Self::FlipHorizontal,
    ];

    /// The index of this orientation in [`Orientation::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the orientation at `index` in [`Orientation::ALL`], if any.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Maps the local offset `(lx, ly)` inside a block with side `side`
    /// to the offset of the pixel that is sampled there.
    #[inline]
    #[must_use]
    pub const fn remap(self, side: u32, lx: u32, ly: u32) -> (u32, u32) {
        let last = side - 1;
        match self {
            Self::Identity => (lx, ly),
            Self::Rotate180 => (last - lx, last - ly),
            Self::Transpose => (ly, lx),
            Self::AntiTranspose => (last - ly, last - lx),
            Self::FlipVertical => (lx, last - ly),
            Self::FlipHorizontal => (last - lx, ly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_round_trip() {
        for (i, orientation) in Orientation::ALL.into_iter().enumerate() {
            assert_eq!(orientation.index(), i);
            assert_eq!(Orientation::from_index(i), Some(orientation));
        }
        assert_eq!(Orientation::from_index(6), None);
    }

    #[test]
    fn remaps_are_permutations() {
        let side = 4;
        for orientation in Orientation::ALL {
            let mut seen = vec![false; 16];
            for ly in 0..side {
                for lx in 0..side {
                    let (tx, ty) = orientation.remap(side, lx, ly);
                    assert!(tx < side && ty < side);
                    let i = (ty * side + tx) as usize;
                    assert!(!seen[i], "{orientation:?} visits ({tx}, {ty}) twice");
                    seen[i] = true;
                }
            }
        }
    }

    #[test]
    fn remaps_match_transforms() {
        // corners of a 3x3 block: top-left, top-right, bottom-left
        let side = 3;
        let corners = |o: Orientation| [o.remap(side, 0, 0), o.remap(side, 2, 0), o.remap(side, 0, 2)];

        assert_eq!(corners(Orientation::Identity), [(0, 0), (2, 0), (0, 2)]);
        assert_eq!(corners(Orientation::Rotate180), [(2, 2), (0, 2), (2, 0)]);
        assert_eq!(corners(Orientation::Transpose), [(0, 0), (0, 2), (2, 0)]);
        assert_eq!(corners(Orientation::AntiTranspose), [(2, 2), (2, 0), (0, 2)]);
        assert_eq!(corners(Orientation::FlipVertical), [(0, 2), (2, 2), (0, 0)]);
        assert_eq!(corners(Orientation::FlipHorizontal), [(2, 0), (0, 0), (2, 2)]);
    }
}

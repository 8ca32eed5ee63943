//! Numbered frame sequences.
//!
//! Input and output paths may contain a printf-style integer marker (`%d`, `%4d`, or `%04d`)
//! that is replaced with the frame number. `%%` stands for a literal percent sign.

use std::path::{Path, PathBuf};

/// A parsed integer marker.
struct Marker {
    /// The byte range of the marker in the pattern.
    start: usize,
    end: usize,
    /// Whether to pad with zeros instead of spaces.
    zero_pad: bool,
    /// The minimum width of the number.
    width: usize,
}

/// Finds the first integer marker in `pattern`.
fn find_marker(pattern: &str) -> Option<Marker> {
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }

        let start = i;
        i += 1;
        if bytes.get(i) == Some(&b'%') {
            i += 1;
            continue;
        }

        let zero_pad = bytes.get(i) == Some(&b'0');
        if zero_pad {
            i += 1;
        }

        let digits = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }

        if bytes.get(i) == Some(&b'd') {
            let width = pattern.get(digits..i).and_then(|w| w.parse().ok()).unwrap_or(0);
            return Some(Marker { start, end: i + 1, zero_pad, width });
        }
    }
    None
}

/// Replaces every `%%` in `text` with `%`.
fn unescape(text: &str) -> String {
    text.replace("%%", "%")
}

/// Replaces the first integer marker of `pattern` with `index`.
///
/// Returns `None` if `pattern` has no marker.
///
/// # Examples
/// ```
/// # use tessera::frames::substitute;
/// assert_eq!(substitute("frame%d.bmp", 7).as_deref(), Some("frame7.bmp"));
/// assert_eq!(substitute("frame%04d.bin", 7).as_deref(), Some("frame0007.bin"));
/// assert_eq!(substitute("100%%_%3d.bmp", 7).as_deref(), Some("100%_  7.bmp"));
/// assert_eq!(substitute("frame.bmp", 7), None);
/// ```
#[must_use]
pub fn substitute(pattern: &str, index: u32) -> Option<String> {
    let Marker { start, end, zero_pad, width } = find_marker(pattern)?;

    let number = if zero_pad {
        format!("{index:0width$}")
    } else {
        format!("{index:>width$}")
    };

    let before = pattern.get(..start)?;
    let after = pattern.get(end..)?;
    Some(format!("{}{number}{}", unescape(before), unescape(after)))
}

/// One frame of a [`FrameSequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame number, starting at `1`.
    pub index: u32,
    /// The path to read the frame from.
    pub input: PathBuf,
    /// The path to write the processed frame to.
    pub output: PathBuf,
}

/// An iterator over the frames of a numbered input pattern.
///
/// If the input pattern has an integer marker, frames are numbered from `1`, and the
/// sequence ends at the first frame whose input file does not exist.
/// The output pattern is numbered the same way, or used as is if it has no marker.
///
/// If the input pattern has no marker, the sequence has exactly one frame
/// (or none, if the input file does not exist).
#[derive(Debug, Clone)]
pub struct FrameSequence {
    /// The input path pattern.
    input: String,
    /// The output path pattern.
    output: String,
    /// The number of the next frame.
    index: u32,
    /// Whether the sequence has ended.
    done: bool,
}

impl FrameSequence {
    /// Creates a new [`FrameSequence`] from an input and output path pattern.
    #[must_use]
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            index: 1,
            done: false,
        }
    }
}

impl Iterator for FrameSequence {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }

        let index = self.index;
        let (input, output) = if let Some(input) = substitute(&self.input, index) {
            let output = substitute(&self.output, index).unwrap_or_else(|| self.output.clone());
            (input, output)
        } else {
            self.done = true;
            (self.input.clone(), self.output.clone())
        };

        if !Path::new(&input).exists() {
            log::trace!("frame sequence ended at {input}");
            self.done = true;
            return None;
        }

        self.index += 1;
        Some(Frame {
            index,
            input: input.into(),
            output: output.into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::codec;
    use std::fs;

    #[test]
    fn markers() {
        assert_eq!(substitute("%d", 12).unwrap(), "12");
        assert_eq!(substitute("a%5d", 12).unwrap(), "a   12");
        assert_eq!(substitute("a%05d", 12).unwrap(), "a00012");
        assert_eq!(substitute("%02d", 123).unwrap(), "123");
        assert_eq!(substitute("%d_%d", 3).unwrap(), "3_%d");
        assert_eq!(substitute("%%d%d", 3).unwrap(), "%d3");
        assert_eq!(substitute("50%s_%d", 3).unwrap(), "50%s_3");
        assert!(substitute("%%d", 3).is_none());
        assert!(substitute("plain.bmp", 3).is_none());
        assert!(substitute("trailing%", 3).is_none());
    }

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn numbered_sequence_stops_at_first_gap() {
        let dir = tempfile::tempdir().unwrap();
        for i in [1, 2, 3, 5] {
            touch(&dir.path().join(format!("in{i:03}.bin")));
        }

        let input = dir.path().join("in%03d.bin");
        let output = dir.path().join("out%d.bmp");
        let frames = FrameSequence::new(input.to_str().unwrap(), output.to_str().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(frames.len(), 3);
        for (frame, i) in frames.iter().zip(1..) {
            assert_eq!(frame.index, i);
            assert_eq!(frame.input, dir.path().join(format!("in{i:03}.bin")));
            assert_eq!(frame.output, dir.path().join(format!("out{i}.bmp")));
        }
    }

    #[test]
    fn unnumbered_output_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("1.bmp"));
        touch(&dir.path().join("2.bmp"));

        let input = dir.path().join("%d.bmp");
        let output = dir.path().join("out.bmp");
        let frames = FrameSequence::new(input.to_str().unwrap(), output.to_str().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|frame| frame.output == output));
    }

    #[test]
    fn single_frame_without_marker() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("1.bmp");
        let output = dir.path().join("3.bmp");

        let mut frames = FrameSequence::new(input.to_str().unwrap(), output.to_str().unwrap());
        assert!(frames.next().is_none());

        touch(&input);
        let frames = FrameSequence::new(input.to_str().unwrap(), output.to_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            frames,
            vec![Frame { index: 1, input, output }],
        );
    }

    #[test]
    fn passthrough_needs_no_palette() {
        let dir = tempfile::tempdir().unwrap();
        // smaller than any block, and no palette image anywhere
        let inputs = [
            crate::tests::random_image(4, 4, 71),
            crate::tests::random_image(16, 9, 72),
        ];
        for (image, i) in inputs.iter().zip(1..) {
            codec::encode(image, dir.path().join(format!("{i}.bin"))).unwrap();
        }

        let input = dir.path().join("%d.bin");
        let output = dir.path().join("out%02d.bin");
        let mut count = 0;
        for frame in FrameSequence::new(input.to_str().unwrap(), output.to_str().unwrap()) {
            let image = codec::decode(&frame.input).unwrap();
            codec::encode(&image, &frame.output).unwrap();
            count += 1;
        }

        assert_eq!(count, inputs.len());
        assert!(!dir.path().join("2.bmp").exists());
        for (image, i) in inputs.iter().zip(1..) {
            let decoded = codec::decode(dir.path().join(format!("out{i:02}.bin"))).unwrap();
            assert_eq!(&decoded, image);
        }
    }
}

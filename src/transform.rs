//! Per-pixel feature transforms.
//!
//! A transform turns one packed color into a fixed number of feature values.
//! The raw channel transforms ([`ChannelTransform`]) keep the 8-bit channel values and are
//! used by the integer and normalized cosine metrics.
//! The angular transforms ([`AngleTransform`]) scale each channel into `[0, π]` and store the
//! sine and cosine of that angle, so that an inner product of two features behaves like the
//! cosine of the angle between them.

use crate::unpack_rgb;
use std::{f64::consts::PI, fmt::Display};

/// The BT.601 luma of a packed color, truncated to an integer in `0..=255`.
#[inline]
fn luma(color: u32) -> u8 {
    let [r, g, b] = unpack_rgb(color);
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        y as u8
    }
}

/// The BT.601 luma of a packed color without truncation.
#[inline]
fn luma_exact(color: u32) -> f64 {
    let [r, g, b] = unpack_rgb(color);
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

/// Scales a channel value in `0..=255` to an angle in `[0, π]`.
#[inline]
fn angle(value: f64) -> f64 {
    PI * value / 255.0
}

/// The set of supported per-pixel feature transforms.
///
/// Each variant produces [`Transform::channels`] feature values per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transform {
    /// The red, green, and blue channel values (3 features).
    #[default]
    Rgb,
    /// The luma of the color (1 feature).
    Luma,
    /// The sine and cosine of each channel scaled into `[0, π]` (6 features).
    RgbAngles,
    /// The sine and cosine of the luma scaled into `[0, π]` (2 features).
    LumaAngles,
}

impl Transform {
    /// The number of feature values produced per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Transform::Rgb => 3,
            Transform::Luma => 1,
            Transform::RgbAngles => 6,
            Transform::LumaAngles => 2,
        }
    }

    /// Returns the raw channel transform, if this is one.
    #[must_use]
    pub const fn as_channels(self) -> Option<ChannelTransform> {
        match self {
            Transform::Rgb => Some(ChannelTransform::Rgb),
            Transform::Luma => Some(ChannelTransform::Luma),
            Transform::RgbAngles | Transform::LumaAngles => None,
        }
    }

    /// Returns the angular transform, if this is one.
    #[must_use]
    pub const fn as_angles(self) -> Option<AngleTransform> {
        match self {
            Transform::RgbAngles => Some(AngleTransform::Rgb),
            Transform::LumaAngles => Some(AngleTransform::Luma),
            Transform::Rgb | Transform::Luma => None,
        }
    }
}

impl Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Transform::Rgb => "rgb",
                Transform::Luma => "luma",
                Transform::RgbAngles => "rgb-angles",
                Transform::LumaAngles => "luma-angles",
            }
        )
    }
}

/// Transforms that keep 8-bit channel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelTransform {
    /// Red, green, and blue.
    Rgb,
    /// Truncated luma.
    Luma,
}

impl ChannelTransform {
    /// The number of feature values produced per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            ChannelTransform::Rgb => 3,
            ChannelTransform::Luma => 1,
        }
    }

    /// Writes the channel values of `color` into `out`.
    #[inline]
    pub fn write_int(self, color: u32, out: &mut [i32]) {
        match self {
            ChannelTransform::Rgb => {
                let [r, g, b] = unpack_rgb(color);
                out[0] = r.into();
                out[1] = g.into();
                out[2] = b.into();
            }
            ChannelTransform::Luma => out[0] = luma(color).into(),
        }
    }

    /// Writes the channel values of `color` into `out` as floats.
    #[inline]
    pub fn write_real(self, color: u32, out: &mut [f64]) {
        match self {
            ChannelTransform::Rgb => {
                let [r, g, b] = unpack_rgb(color);
                out[0] = r.into();
                out[1] = g.into();
                out[2] = b.into();
            }
            ChannelTransform::Luma => out[0] = luma(color).into(),
        }
    }
}

/// Transforms that store each value as a point on the unit circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleTransform {
    /// Red, green, and blue as three sines followed by three cosines.
    Rgb,
    /// Luma as a sine followed by a cosine.
    Luma,
}

impl AngleTransform {
    /// The number of feature values produced per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            AngleTransform::Rgb => 6,
            AngleTransform::Luma => 2,
        }
    }

    /// Writes the sines and cosines for `color` into `out`.
    #[inline]
    pub fn write(self, color: u32, out: &mut [f64]) {
        match self {
            AngleTransform::Rgb => {
                let [r, g, b] = unpack_rgb(color);
                for (c, value) in [r, g, b].into_iter().enumerate() {
                    let (sin, cos) = angle(value.into()).sin_cos();
                    out[c] = sin;
                    out[c + 3] = cos;
                }
            }
            AngleTransform::Luma => {
                let (sin, cos) = angle(luma_exact(color)).sin_cos();
                out[0] = sin;
                out[1] = cos;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack_rgb;

    #[test]
    fn channel_counts_agree() {
        for transform in [
            Transform::Rgb,
            Transform::Luma,
            Transform::RgbAngles,
            Transform::LumaAngles,
        ] {
            let channels = transform
                .as_channels()
                .map(ChannelTransform::channels)
                .or(transform.as_angles().map(AngleTransform::channels));
            assert_eq!(channels, Some(transform.channels()));
        }
    }

    #[test]
    fn rgb_channels() {
        let mut out = [0; 3];
        ChannelTransform::Rgb.write_int(pack_rgb(1, 2, 3) | 0xFF00_0000, &mut out);
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn luma_is_truncated() {
        let mut out = [0; 1];
        ChannelTransform::Luma.write_int(pack_rgb(255, 255, 255), &mut out);
        // 0.299 + 0.587 + 0.114 rounds just below 1.0 in floating point
        assert!(out[0] == 254 || out[0] == 255);

        ChannelTransform::Luma.write_int(pack_rgb(100, 0, 0), &mut out);
        assert_eq!(out[0], 29);

        let mut real = [0.0; 1];
        ChannelTransform::Luma.write_real(pack_rgb(100, 0, 0), &mut real);
        assert_eq!(real[0], 29.0);
    }

    #[test]
    fn angles_are_on_the_unit_circle() {
        let mut out = [0.0; 6];
        AngleTransform::Rgb.write(pack_rgb(0, 255, 51), &mut out);
        for c in 0..3 {
            let norm = out[c] * out[c] + out[c + 3] * out[c + 3];
            assert!((norm - 1.0).abs() < 1e-12);
        }
        // red = 0 => angle 0, green = 255 => angle π
        assert!(out[0].abs() < 1e-12 && (out[3] - 1.0).abs() < 1e-12);
        assert!(out[1].abs() < 1e-12 && (out[4] + 1.0).abs() < 1e-12);
    }
}

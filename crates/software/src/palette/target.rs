//! Computes what each palette slot ought to contain.

use super::{PALETTE_SIZE, REFERENCE_PALETTE};
use crate::color::Rgb;
use wmidi::U7;

/// First slot whose color is supplied by the host rather than the reference palette.
pub const HOST_COLORS_START: usize = 70;
/// Number of host-supplied slots, i.e. slots 70 through 96.
pub const HOST_COLORS_LEN: usize = 27;

/// A color as the host describes it, each channel between 0.0 and 1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostColor {
    /// Red channel.
    pub red: f32,
    /// Green channel.
    pub green: f32,
    /// Blue channel.
    pub blue: f32,
}

impl HostColor {
    /// Constructs a [`HostColor`].
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    fn to_rgb(self) -> Rgb {
        let scale = |channel: f32| libm::roundf(channel.clamp(0.0, 1.0) * 255.0) as u16;
        Rgb::new(scale(self.red), scale(self.green), scale(self.blue))
    }
}

/// The palette the device should end up holding.
///
/// Slots 70 through 96 mirror the host's semantic colors (track and clip colors); all others come from
/// [`REFERENCE_PALETTE`]. White is not part of the target; it is carried over from whatever the device reports.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPalette {
    entries: [Rgb; PALETTE_SIZE],
}

impl TargetPalette {
    /// A target made entirely of the reference palette.
    pub fn reference() -> Self {
        Self {
            entries: REFERENCE_PALETTE,
        }
    }

    /// A target with the host's colors in slots 70 through 96.
    pub fn with_host_colors(host: &[HostColor; HOST_COLORS_LEN]) -> Self {
        let mut entries = REFERENCE_PALETTE;
        entries[HOST_COLORS_START..HOST_COLORS_START + HOST_COLORS_LEN]
            .iter_mut()
            .zip(host)
            .for_each(|(entry, color)| *entry = color.to_rgb());
        Self { entries }
    }

    /// The target color for slot `index`.
    pub fn entry(&self, index: U7) -> Rgb {
        self.entries[usize::from(u8::from(index))]
    }
}

impl Default for TargetPalette {
    fn default() -> Self {
        Self::reference()
    }
}

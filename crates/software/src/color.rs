//! Color types shared by the palette synchronizer and its wire messages.
//!
//! Palette channels travel as 14-bit values even though the device only ever reports 8-bit colors; nothing here
//! assumes the narrower range.

use crate::sysex::{
    HEADER_LEN, MANUFACTURER_ID, MessageBuilder, SYSEX_END, SYSEX_START, SysexMessage,
    VendorHeader, command, join_u14,
};
use wmidi::U7;

/// Exact length of a palette entry report, vendor header and `F7` included.
pub const REPORT_LEN: usize = 17;

/// Number of retries after which a [`ColorRecord`] should be given up on.
pub const MAX_RETRIES: u8 = 10;

/// An RGB triple. White is tracked separately because it is never computed by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    /// Red channel.
    pub red: u16,
    /// Green channel.
    pub green: u16,
    /// Blue channel.
    pub blue: u16,
}

impl Rgb {
    /// Constructs an [`Rgb`].
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }
}

/// A palette color paired with the number of times it has been changed since it was first recorded.
///
/// This is a "push until acknowledged" helper: callers [`update`][Self::update] it each time they learn of a different
/// color and stop once [`has_max_retries_reached`][Self::has_max_retries_reached] says so. The white channel comes from
/// the device and never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorRecord {
    red: u16,
    green: u16,
    blue: u16,
    white: u16,
    retries: u8,
}

/// A decoded palette entry report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteReport {
    /// The palette slot the report describes.
    pub index: U7,
    /// The slot's contents as reported.
    pub record: ColorRecord,
}

impl ColorRecord {
    /// Constructs a [`ColorRecord`] with no retries.
    pub const fn new(rgb: Rgb, white: u16) -> Self {
        Self {
            red: rgb.red,
            green: rgb.green,
            blue: rgb.blue,
            white,
            retries: 0,
        }
    }

    /// Returns `true` if `payload` is a palette entry report, i.e. exactly [`REPORT_LEN`] bytes carrying the vendor
    /// header, the report discriminator, 7-bit data, and a terminating `F7`.
    ///
    /// The outbound "set" command uses a different discriminator and is rejected here.
    pub fn is_valid(payload: &[u8]) -> bool {
        payload.len() == REPORT_LEN
            && payload[0] == SYSEX_START
            && payload[1..4] == MANUFACTURER_ID
            && payload[HEADER_LEN] == command::GET_PALETTE_ENTRY
            && payload[REPORT_LEN - 1] == SYSEX_END
            && U7::try_from_bytes(&payload[1..REPORT_LEN - 1]).is_ok()
    }

    /// Decodes a palette entry report, or returns `None` if [`is_valid`][Self::is_valid] rejects it.
    pub fn parse(payload: &[u8]) -> Option<PaletteReport> {
        if !Self::is_valid(payload) {
            return None;
        }

        // command, index, then four channels split into (low, high)
        let fields = &payload[HEADER_LEN + 1..REPORT_LEN - 1];
        let channel = |n: usize| join_u14(fields[1 + 2 * n], fields[2 + 2 * n]);

        Some(PaletteReport {
            index: U7::from_u8_lossy(fields[0]),
            record: Self::new(Rgb::new(channel(0), channel(1), channel(2)), channel(3)),
        })
    }

    /// The RGB portion of the record.
    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.red, self.green, self.blue)
    }

    /// The white channel, as constructed.
    pub fn white(&self) -> u16 {
        self.white
    }

    /// How many times [`update`][Self::update] has changed the color.
    pub fn retries(&self) -> u8 {
        self.retries
    }

    /// Replaces the RGB channels if they differ from `rgb`, counting a retry. Returns whether anything changed.
    pub fn update(&mut self, rgb: Rgb) -> bool {
        if self.rgb() == rgb {
            return false;
        }

        self.red = rgb.red;
        self.green = rgb.green;
        self.blue = rgb.blue;
        self.retries = self.retries.saturating_add(1);
        true
    }

    /// Returns `true` once the record has been updated more than [`MAX_RETRIES`] times.
    pub fn has_max_retries_reached(&self) -> bool {
        self.retries > MAX_RETRIES
    }

    /// Serializes the record as a "set palette entry" message for slot `index`.
    pub fn create_update_message(&self, header: &VendorHeader, index: U7) -> SysexMessage {
        MessageBuilder::new(header, command::SET_PALETTE_ENTRY)
            .byte(u8::from(index))
            .u14(self.red)
            .u14(self.green)
            .u14(self.blue)
            .u14(self.white)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysex::U14_MAX;

    const HEADER: VendorHeader = [0xF0, 0x00, 0x21, 0x1D, 0x01, 0x01];

    fn report(index: u8, rgbw: [u16; 4]) -> std::vec::Vec<u8> {
        let mut message = HEADER.to_vec();
        message.push(command::GET_PALETTE_ENTRY);
        message.push(index);
        for value in rgbw {
            message.extend_from_slice(&crate::sysex::split_u14(value));
        }
        message.push(SYSEX_END);
        message
    }

    #[test]
    fn is_valid_accepts_report() {
        assert!(ColorRecord::is_valid(&report(3, [255, 0, 12, 64])));
    }

    #[test]
    fn is_valid_rejects_wrong_length() {
        let mut long = report(3, [255, 0, 12, 64]);
        long.insert(8, 0);
        assert!(!ColorRecord::is_valid(&long), "18 bytes should be rejected");

        let short = report(3, [255, 0, 12, 64]);
        assert!(!ColorRecord::is_valid(&short[..16]), "16 bytes should be rejected");
    }

    #[test]
    fn is_valid_rejects_set_discriminator() {
        let record = ColorRecord::new(Rgb::new(1, 2, 3), 4);
        let set = record.create_update_message(&HEADER, U7::from_u8_lossy(9));
        assert_eq!(REPORT_LEN, set.len(), "Expected left but got right");
        assert!(!ColorRecord::is_valid(&set), "Set messages are not reports");
    }

    #[test]
    fn parse_joins_fourteen_bit_channels() {
        let parsed = ColorRecord::parse(&report(127, [16383, 128, 0, 300])).unwrap();
        assert_eq!(U7::from_u8_lossy(127), parsed.index, "Expected left but got right");
        assert_eq!(
            Rgb::new(16383, 128, 0),
            parsed.record.rgb(),
            "Expected left but got right"
        );
        assert_eq!(300, parsed.record.white(), "Expected left but got right");
        assert_eq!(0, parsed.record.retries(), "Expected left but got right");
    }

    #[test]
    fn update_message_round_trips_through_parse() {
        let record = ColorRecord::new(Rgb::new(8191, 77, 16000), 129);
        let mut message = record.create_update_message(&HEADER, U7::from_u8_lossy(42));
        message[HEADER_LEN] = command::GET_PALETTE_ENTRY;

        let parsed = ColorRecord::parse(&message).unwrap();
        assert_eq!(U7::from_u8_lossy(42), parsed.index, "Expected left but got right");
        assert_eq!(record, parsed.record, "Expected left but got right");
    }

    #[test]
    fn every_channel_value_and_index_survives_the_wire() {
        for value in 0..=U14_MAX {
            let index = (value % 128) as u8;
            let record = ColorRecord::new(
                Rgb::new(value, U14_MAX - value, value.rotate_left(7) & U14_MAX),
                (value / 3) | 1,
            );
            let mut message = record.create_update_message(&HEADER, U7::from_u8_lossy(index));
            message[HEADER_LEN] = command::GET_PALETTE_ENTRY;

            let parsed = ColorRecord::parse(&message).unwrap();
            assert_eq!(index, u8::from(parsed.index), "Expected left but got right");
            assert_eq!(record, parsed.record, "Expected left but got right");
        }
    }

    #[test]
    fn update_ignores_identical_color() {
        let mut record = ColorRecord::new(Rgb::new(10, 20, 30), 40);
        assert!(!record.update(Rgb::new(10, 20, 30)));
        assert_eq!(0, record.retries(), "Expected left but got right");
    }

    #[test]
    fn update_counts_changes_and_keeps_white() {
        let mut record = ColorRecord::new(Rgb::new(10, 20, 30), 40);
        assert!(record.update(Rgb::new(11, 20, 30)));
        assert_eq!(1, record.retries(), "Expected left but got right");
        assert_eq!(Rgb::new(11, 20, 30), record.rgb(), "Expected left but got right");
        assert_eq!(40, record.white(), "Expected left but got right");
    }

    #[test]
    fn max_retries_reached_after_eleven_changes() {
        let mut record = ColorRecord::new(Rgb::new(0, 0, 0), 0);
        for n in 1..=u16::from(MAX_RETRIES) {
            record.update(Rgb::new(n, 0, 0));
            assert!(
                !record.has_max_retries_reached(),
                "Should still be retrying after {} changes",
                n
            );
        }
        record.update(Rgb::new(0, 0, 0));
        assert!(record.has_max_retries_reached());
    }
}

//! Framing shared by every vendor SysEx message the controller understands.
//!
//! All vendor messages share the shape `F0 00 21 1D <device id> 01 <command> <data…> F7`. Data bytes are 7-bit; values
//! wider than that travel as a [14-bit split](split_u14), low half first.

use tinyvec::ArrayVec;
use wmidi::{MidiMessage, U7};

/// Opens every SysEx message.
pub const SYSEX_START: u8 = 0xF0;
/// Terminates every SysEx message.
pub const SYSEX_END: u8 = 0xF7;
/// Three-byte manufacturer id carried by vendor messages and identity replies.
pub const MANUFACTURER_ID: [u8; 3] = [0x00, 0x21, 0x1D];
/// Length of the vendor header, `F0` included.
pub const HEADER_LEN: usize = 6;
/// Largest outbound message this crate ever builds (a velocity curve chunk needs 25 bytes).
pub const MAX_MESSAGE_LEN: usize = 32;
/// Largest value representable by a 14-bit split.
pub const U14_MAX: u16 = 0x3FFF;

/// The six bytes which prefix every vendor message, e.g. `F0 00 21 1D 01 01`.
pub type VendorHeader = [u8; HEADER_LEN];

/// A complete outbound SysEx message, `F0` through `F7`.
pub type SysexMessage = ArrayVec<[u8; MAX_MESSAGE_LEN]>;

/// Command ids, i.e. the byte following the vendor header.
pub mod command {
    /// Host→device: overwrite one palette slot.
    pub const SET_PALETTE_ENTRY: u8 = 0x03;
    /// Host→device request and device→host report for one palette slot.
    pub const GET_PALETTE_ENTRY: u8 = 0x04;
    /// Host→device: make the device re-render LEDs from its palette memory.
    pub const REAPPLY_PALETTE: u8 = 0x05;
    /// Host→device: global LED brightness, one 7-bit value.
    pub const SET_LED_BRIGHTNESS: u8 = 0x06;
    /// Host→device: display backlight brightness, one 14-bit value.
    pub const SET_DISPLAY_BRIGHTNESS: u8 = 0x08;
    /// Host→device: pad thresholds and channel pressure bounds.
    pub const SET_PAD_PARAMETERS: u8 = 0x1B;
    /// Host→device: channel or polyphonic aftertouch.
    pub const SET_AFTERTOUCH_MODE: u8 = 0x1E;
    /// Host→device: one 16-entry chunk of the velocity curve.
    pub const SET_VELOCITY_CURVE: u8 = 0x20;
}

/// Splits a value into two 7-bit bytes, low half first. Values above [`U14_MAX`] saturate.
pub fn split_u14(value: u16) -> [u8; 2] {
    let value = value.min(U14_MAX);
    [(value % 128) as u8, (value / 128) as u8]
}

/// Inverse of [`split_u14`]: `low + (high << 7)`. Stray high bits in either byte are ignored.
pub fn join_u14(low: u8, high: u8) -> u16 {
    u16::from(u8::from(U7::from_u8_lossy(low))) + (u16::from(u8::from(U7::from_u8_lossy(high))) << 7)
}

/// Returns the data bytes between `F0` and `F7`, or `None` if `message` is not a well-formed SysEx message.
pub fn sysex_data(message: &[u8]) -> Option<&[u8]> {
    match MidiMessage::from_bytes(message) {
        Ok(MidiMessage::SysEx(data)) => Some(U7::data_to_bytes(data)),
        _ => None,
    }
}

/// Incrementally assembles a vendor message.
///
/// Data bytes are masked to 7 bits on the way in so that no payload can ever be mistaken for a status byte.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    data: SysexMessage,
}

impl MessageBuilder {
    /// Starts a message with the given vendor header and command id.
    pub fn new(header: &VendorHeader, command: u8) -> Self {
        let mut data = SysexMessage::new();
        data.extend_from_slice(header);
        data.push(command);
        Self { data }
    }

    /// Appends one 7-bit data byte.
    pub fn byte(mut self, value: u8) -> Self {
        self.data.push(u8::from(U7::from_u8_lossy(value)));
        self
    }

    /// Appends several 7-bit data bytes.
    pub fn bytes(self, values: &[u8]) -> Self {
        values.iter().fold(self, |builder, &value| builder.byte(value))
    }

    /// Appends a value as a 14-bit split.
    pub fn u14(self, value: u16) -> Self {
        self.bytes(&split_u14(value))
    }

    /// Terminates the message.
    pub fn finish(mut self) -> SysexMessage {
        self.data.push(SYSEX_END);
        self.data
    }
}

/// Destination for outbound SysEx, typically a MIDI output port.
pub trait SysexSink {
    /// Transport failure type.
    type Error;

    /// Sends one complete message, `F0` through `F7`.
    fn send(&mut self, message: &[u8]) -> Result<(), Self::Error>;
}

impl<S: SysexSink + ?Sized> SysexSink for &mut S {
    type Error = S::Error;

    fn send(&mut self, message: &[u8]) -> Result<(), Self::Error> {
        (**self).send(message)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: VendorHeader = [0xF0, 0x00, 0x21, 0x1D, 0x01, 0x01];

    #[test]
    fn split_u14_orders_low_then_high() {
        assert_eq!([0x7F, 0x7F], split_u14(16383), "Expected left but got right");
        assert_eq!([0x00, 0x01], split_u14(128), "Expected left but got right");
        assert_eq!([0x2C, 0x02], split_u14(300), "Expected left but got right");
    }

    #[test]
    fn split_u14_saturates() {
        assert_eq!([0x7F, 0x7F], split_u14(u16::MAX), "Expected left but got right");
    }

    #[test]
    fn join_u14_reverses_split() {
        for value in 0..=U14_MAX {
            let [low, high] = split_u14(value);
            assert_eq!(value, join_u14(low, high), "Expected left but got right");
        }
    }

    #[test]
    fn sysex_data_strips_framing() {
        assert_eq!(
            Some(&[0x7E, 0x7F, 0x06, 0x01][..]),
            sysex_data(&[0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7]),
            "Expected left but got right"
        );
    }

    #[test]
    fn sysex_data_rejects_channel_messages() {
        assert_eq!(None, sysex_data(&[0x90, 0x3C, 0x64]), "Expected left but got right");
    }

    #[test]
    fn builder_frames_message() {
        let message = MessageBuilder::new(&HEADER, command::SET_DISPLAY_BRIGHTNESS)
            .u14(200)
            .finish();
        assert_eq!(
            &[0xF0, 0x00, 0x21, 0x1D, 0x01, 0x01, 0x08, 0x48, 0x01, 0xF7][..],
            message.as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn builder_masks_data_bytes() {
        let message = MessageBuilder::new(&HEADER, command::SET_AFTERTOUCH_MODE)
            .byte(0xF7)
            .finish();
        assert!(message[7] < 0x80, "Data byte should have lost its high bit");
        assert_eq!(SYSEX_END, message[8], "Expected left but got right");
    }
}

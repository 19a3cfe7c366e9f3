//! Interprets the universal "device inquiry" handshake.
//!
//! The controller answers a standard identity request with a standard identity reply, except that the bytes trailing
//! the manufacturer/family/model block carry firmware version, build, serial number, and board revision in a layout
//! that depends on the hardware [`Generation`].
//!
//! The handshake is a diagnostic channel. Replies of an unexpected length are dropped without complaint.

use crate::{
    configuration::{Generation, GenerationProfile},
    sysex::{self, MANUFACTURER_ID, join_u14},
};

/// Broadcast identity request, `F0 7E 7F 06 01 F7`.
pub const IDENTITY_REQUEST: [u8; 6] = [0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7];

/// Length of the first generation's version block.
pub const MK1_PAYLOAD_LEN: usize = 10;
/// Length of the second generation's version block.
pub const MK2_PAYLOAD_LEN: usize = 24;

const UNIVERSAL_NON_REALTIME: u8 = 0x7E;
const GENERAL_INFORMATION: u8 = 0x06;
const IDENTITY_REPLY: u8 = 0x02;
/// Offset of the version block within the SysEx data (i.e. after `F0`): sub-ids, manufacturer, family, model.
const PAYLOAD_OFFSET: usize = 11;

/// Firmware and hardware details reported by the controller. Fields are `None` until a handshake succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceIdentity {
    /// Firmware major version.
    pub major_version: Option<u8>,
    /// Firmware minor version. Second-generation devices report it as two decimal digits, so it can exceed 127.
    pub minor_version: Option<u16>,
    /// Firmware build number.
    pub build_number: Option<u16>,
    /// Factory serial number.
    pub serial_number: Option<u64>,
    /// Board revision.
    pub board_revision: Option<u8>,
}

impl DeviceIdentity {
    /// Overwrites every field from a first-generation version block:
    /// major, minor, 14-bit build, 35-bit serial (five 7-bit bytes, least significant first), board revision.
    pub(crate) fn apply_mk1(&mut self, payload: &[u8]) {
        self.major_version = Some(payload[0]);
        self.minor_version = Some(u16::from(payload[1]));
        self.build_number = Some(join_u14(payload[2], payload[3]));
        self.serial_number = Some(
            payload[4..9]
                .iter()
                .enumerate()
                .fold(0_u64, |serial, (i, &byte)| serial | (u64::from(byte & 0x7F) << (7 * i))),
        );
        self.board_revision = Some(payload[9]);
    }

    /// Overwrites every field from a second-generation version block. Only the version is meaningful; the minor
    /// version arrives as two decimal digits, tens first.
    pub(crate) fn apply_mk2(&mut self, payload: &[u8]) {
        self.major_version = Some(payload[0]);
        self.minor_version = Some(u16::from(payload[2]) + u16::from(payload[1]) * 10);
        self.build_number = Some(0);
        self.serial_number = Some(0);
        self.board_revision = Some(0);
    }
}

/// Outcome of offering a message to the [`Handshake`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// The message is not an identity reply from this manufacturer.
    NotIdentity,
    /// An identity reply whose version block has the wrong length for the configured generation.
    Discarded,
    /// The identity was updated.
    Accepted,
}

/// Tracks whether the device has identified itself, and as what.
///
/// There is no way back to [`Handshake::is_identified`] returning `false`; a repeated handshake simply overwrites the
/// [`DeviceIdentity`].
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    identity: DeviceIdentity,
    identified: bool,
}

impl Handshake {
    /// Constructs a [`Handshake`] awaiting its first reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently reported identity.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns `true` once any reply has been accepted.
    pub fn is_identified(&self) -> bool {
        self.identified
    }

    /// Offers a raw SysEx message to the handshake.
    pub fn handle(&mut self, generation: &Generation, message: &[u8]) -> Reply {
        let Some(data) = sysex::sysex_data(message) else {
            return Reply::NotIdentity;
        };

        let is_reply = data.len() >= PAYLOAD_OFFSET
            && data[0] == UNIVERSAL_NON_REALTIME
            && data[2] == GENERAL_INFORMATION
            && data[3] == IDENTITY_REPLY
            && data[4..7] == MANUFACTURER_ID;
        if !is_reply {
            return Reply::NotIdentity;
        }

        let payload = &data[PAYLOAD_OFFSET..];
        if payload.len() != generation.identity_payload_len() {
            debug!(
                "Discarding identity reply with {} byte version block, expected {}",
                payload.len(),
                generation.identity_payload_len()
            );
            return Reply::Discarded;
        }

        generation.apply_identity(payload, &mut self.identity);
        self.identified = true;
        info!(
            "Device identified: firmware {}.{} build {}",
            self.identity.major_version.unwrap_or_default(),
            self.identity.minor_version.unwrap_or_default(),
            self.identity.build_number.unwrap_or_default()
        );
        Reply::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{Mk1, Mk2};
    use std::vec::Vec;

    fn reply(payload: &[u8]) -> Vec<u8> {
        let mut message = std::vec![
            0xF0, 0x7E, 0x01, 0x06, 0x02, 0x00, 0x21, 0x1D, 0x67, 0x32, 0x02, 0x00,
        ];
        message.extend_from_slice(payload);
        message.push(0xF7);
        message
    }

    #[test]
    fn new_is_awaiting() {
        let handshake = Handshake::new();
        assert!(!handshake.is_identified());
        assert_eq!(
            DeviceIdentity::default(),
            *handshake.identity(),
            "Expected left but got right"
        );
    }

    #[test]
    fn first_generation_reply() {
        let mut handshake = Handshake::new();
        let message = reply(&[1, 7, 0x2C, 0x02, 0x01, 0x02, 0x03, 0x04, 0x05, 3]);

        assert_eq!(
            Reply::Accepted,
            handshake.handle(&Mk1.into(), &message),
            "Expected left but got right"
        );
        assert!(handshake.is_identified());
        assert_eq!(
            DeviceIdentity {
                major_version: Some(1),
                minor_version: Some(7),
                build_number: Some(300),
                serial_number: Some(
                    0x01 | (0x02 << 7) | (0x03 << 14) | (0x04 << 21) | (0x05_u64 << 28)
                ),
                board_revision: Some(3),
            },
            *handshake.identity(),
            "Expected left but got right"
        );
    }

    #[test]
    fn serial_spans_thirty_five_bits() {
        let mut handshake = Handshake::new();
        let message = reply(&[0, 0, 0, 0, 0x7F, 0x7F, 0x7F, 0x7F, 0x7F, 0]);
        handshake.handle(&Mk1.into(), &message);
        assert_eq!(
            Some((1_u64 << 35) - 1),
            handshake.identity().serial_number,
            "Expected left but got right"
        );
    }

    #[test]
    fn second_generation_reply() {
        let mut handshake = Handshake::new();
        let mut payload = [0_u8; MK2_PAYLOAD_LEN];
        payload[0] = 2;
        payload[1] = 1;
        payload[2] = 4;

        assert_eq!(
            Reply::Accepted,
            handshake.handle(&Mk2.into(), &reply(&payload)),
            "Expected left but got right"
        );
        assert_eq!(
            DeviceIdentity {
                major_version: Some(2),
                minor_version: Some(14),
                build_number: Some(0),
                serial_number: Some(0),
                board_revision: Some(0),
            },
            *handshake.identity(),
            "Expected left but got right"
        );
    }

    #[test]
    fn second_generation_minor_version_is_not_clipped() {
        let mut handshake = Handshake::new();
        let mut payload = [0_u8; MK2_PAYLOAD_LEN];
        payload[1] = 0x7F;
        payload[2] = 0x7F;
        handshake.handle(&Mk2.into(), &reply(&payload));

        assert_eq!(
            Some(1397),
            handshake.identity().minor_version,
            "Expected left but got right"
        );
    }

    #[test]
    fn length_mismatch_is_discarded() {
        let mut handshake = Handshake::new();
        let message = reply(&[1, 7, 0x2C, 0x02, 0x01, 0x02, 0x03, 0x04, 0x05, 3]);

        assert_eq!(
            Reply::Discarded,
            handshake.handle(&Mk2.into(), &message),
            "Expected left but got right"
        );
        assert!(!handshake.is_identified());
    }

    #[test]
    fn rehandshake_overwrites() {
        let mut handshake = Handshake::new();
        handshake.handle(
            &Mk1.into(),
            &reply(&[1, 7, 0x2C, 0x02, 0x01, 0x02, 0x03, 0x04, 0x05, 3]),
        );
        handshake.handle(&Mk1.into(), &reply(&[1, 8, 0, 0, 0, 0, 0, 0, 0, 4]));

        assert_eq!(
            Some(8),
            handshake.identity().minor_version,
            "Expected left but got right"
        );
        assert_eq!(
            Some(0),
            handshake.identity().serial_number,
            "Expected left but got right"
        );
    }

    #[test]
    fn foreign_messages_are_not_identity() {
        let mut handshake = Handshake::new();
        assert_eq!(
            Reply::NotIdentity,
            handshake.handle(&Mk1.into(), &[0xF0, 0x00, 0x21, 0x1D, 0x01, 0x01, 0x05, 0xF7]),
            "Expected left but got right"
        );
        assert_eq!(
            Reply::NotIdentity,
            handshake.handle(&Mk1.into(), &[0x90, 0x3C, 0x64]),
            "Expected left but got right"
        );
    }
}

//! This crate contains architecture-agnostic logic for surface_link, a host-side companion for a MIDI pad controller
//! which carries an on-device color palette and a 960×160 USB graphics display.
//!
//! The controller speaks two closed protocols: vendor [SysEx](https://midi.org/midi-1-0) messages for configuration
//! (velocity curve, pad thresholds, brightness, palette memory) and USB bulk transfers for the display. This crate
//! reproduces both bit-exactly while leaving the transports themselves to the caller through the [`sysex::SysexSink`]
//! and [`display::BulkEndpoint`] traits.

#![deny(missing_docs)]
#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod color;
pub mod configuration;
pub mod display;
pub mod identity;
pub mod palette;
pub mod surface;
pub mod sysex;
pub mod velocity_curve;

//! MIDI port discovery and the SysEx transport built on it.

use anyhow::{Context, anyhow};
use log::{info, trace};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::sync::mpsc::{self, Receiver};
use surface_link_lib::sysex::SysexSink;
use wmidi::MidiMessage;

const CLIENT_NAME: &str = "surface_link";

/// Controller output port, wrapped to carry SysEx from the library.
pub struct MidiOut(MidiOutputConnection);

impl SysexSink for MidiOut {
    type Error = midir::SendError;

    fn send(&mut self, message: &[u8]) -> Result<(), Self::Error> {
        trace!("-> {message:02X?}");
        self.0.send(message)
    }
}

/// Connects to the first output port whose name contains `pattern`.
pub fn connect_output(pattern: &str) -> anyhow::Result<MidiOut> {
    let output = MidiOutput::new(CLIENT_NAME).context("MIDI output unavailable")?;
    let port = output
        .ports()
        .into_iter()
        .find(|port| output.port_name(port).is_ok_and(|name| name.contains(pattern)))
        .with_context(|| format!("no MIDI output port matching {pattern:?}"))?;
    let name = output.port_name(&port)?;
    info!("Sending to {name}");

    let connection = output
        .connect(&port, CLIENT_NAME)
        .map_err(|e| anyhow!("cannot open {name}: {e}"))?;
    Ok(MidiOut(connection))
}

/// Connects to the first input port whose name contains `pattern`, forwarding every message it receives.
///
/// The connection must be kept alive for messages to keep arriving.
pub fn connect_input(pattern: &str) -> anyhow::Result<(MidiInputConnection<()>, Receiver<Vec<u8>>)> {
    let mut input = MidiInput::new(CLIENT_NAME).context("MIDI input unavailable")?;
    input.ignore(Ignore::None);
    let port = input
        .ports()
        .into_iter()
        .find(|port| input.port_name(port).is_ok_and(|name| name.contains(pattern)))
        .with_context(|| format!("no MIDI input port matching {pattern:?}"))?;
    let name = input.port_name(&port)?;
    info!("Listening to {name}");

    let (sender, receiver) = mpsc::channel();
    let connection = input
        .connect(
            &port,
            CLIENT_NAME,
            move |_, message, _| {
                trace!("<- {message:02X?}");
                // the receiver only goes away on shutdown
                let _ = sender.send(message.to_vec());
            },
            (),
        )
        .map_err(|e| anyhow!("cannot open {name}: {e}"))?;
    Ok((connection, receiver))
}

/// Returns `true` if `message` is a control change pressing (non-zero value) the button mapped to `control`.
pub fn is_button_press(message: &[u8], control: u8) -> bool {
    matches!(
        MidiMessage::from_bytes(message),
        Ok(MidiMessage::ControlChange(_, function, value))
            if u8::from(function.0) == control && u8::from(value) > 0
    )
}

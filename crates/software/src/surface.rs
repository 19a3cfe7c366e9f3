//! The [`ControlSurface`] facade: one place to route inbound SysEx and to send configuration to the controller.
//!
//! The display is not part of the facade. Frames travel over their own USB endpoint on their own
//! schedule and share no state with the SysEx traffic; see [`crate::display::Display`].

use crate::{
    color::ColorRecord,
    configuration::{AftertouchMode, CycleConfig, Generation, GenerationProfile, Level, PadSettings},
    identity::{DeviceIdentity, Handshake, IDENTITY_REQUEST, Reply},
    palette::{PaletteSync, SyncEvent, TargetPalette},
    sysex::{MessageBuilder, SysexSink, command},
    velocity_curve::VelocityCurve,
};
use embassy_time::Instant;

/// Which component, if any, consumed an inbound message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Handled {
    /// The message was an identity reply.
    Identity(Reply),
    /// The message was a palette entry report.
    Palette(SyncEvent),
    /// The message was not meant for this crate.
    Ignored,
}

/// Host-side state of one attached controller, plus the sink through which it is configured.
pub struct ControlSurface<S> {
    sink: S,
    generation: Generation,
    handshake: Handshake,
    palette: PaletteSync,
    aftertouch: AftertouchMode,
}

impl<S: SysexSink> ControlSurface<S> {
    /// Constructs a [`ControlSurface`] aiming for the reference palette.
    pub fn new(sink: S, generation: Generation) -> Self {
        Self {
            sink,
            generation,
            handshake: Handshake::new(),
            palette: PaletteSync::new(generation.sysex_header(), TargetPalette::reference()),
            aftertouch: AftertouchMode::default(),
        }
    }

    /// The configured hardware generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The most recently reported [`DeviceIdentity`].
    pub fn identity(&self) -> &DeviceIdentity {
        self.handshake.identity()
    }

    /// The identity handshake.
    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    /// The palette synchronizer.
    pub fn palette(&self) -> &PaletteSync {
        &self.palette
    }

    /// The outbound sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Replaces the palette the next synchronization aims for, e.g. after the host's track colors change.
    pub fn set_target_palette(&mut self, target: TargetPalette) {
        self.palette.set_target(target);
    }

    /// Routes one inbound SysEx message: identity replies first, then, if this generation supports readback, palette
    /// entry reports. Anything else is ignored.
    pub fn handle_sysex(&mut self, now: Instant, message: &[u8]) -> Result<Handled, S::Error> {
        match self.handshake.handle(&self.generation, message) {
            Reply::NotIdentity => {}
            reply => return Ok(Handled::Identity(reply)),
        }

        if self.generation.palette_sync_enabled() {
            if let Some(report) = ColorRecord::parse(message) {
                return self
                    .palette
                    .handle_report(now, report, &mut self.sink)
                    .map(Handled::Palette);
            }
        }

        trace!("Ignoring SysEx message of {} bytes", message.len());
        Ok(Handled::Ignored)
    }

    /// Drives palette request timeouts. Call periodically; see [`PaletteSync::poll`].
    pub fn poll(&mut self, now: Instant) -> Result<SyncEvent, S::Error> {
        self.palette.poll(now, &mut self.sink)
    }

    /// Asks the controller to identify itself.
    pub fn request_identity(&mut self) -> Result<(), S::Error> {
        self.sink.send(&IDENTITY_REQUEST)
    }

    /// Reads back and corrects the whole palette. Does nothing on generations without palette readback.
    pub fn request_full_palette(&mut self, now: Instant) -> Result<(), S::Error> {
        if !self.generation.palette_sync_enabled() {
            debug!("Palette readback not supported by this generation");
            return Ok(());
        }
        self.palette.start(now, &mut self.sink)
    }

    /// Sends the pad strike thresholds along with the channel pressure bounds that match `sensitivity`.
    pub fn send_pad_threshold(
        &mut self,
        threshold0: u16,
        threshold1: u16,
        sensitivity: Level,
    ) -> Result<(), S::Error> {
        let (pressure_min, pressure_max) = self.generation.channel_pressure_bounds(sensitivity);
        let message = MessageBuilder::new(&self.generation.sysex_header(), command::SET_PAD_PARAMETERS)
            .u14(threshold0)
            .u14(threshold1)
            .u14(pressure_min)
            .u14(pressure_max)
            .finish();
        self.sink.send(&message)
    }

    /// Sets the display backlight, `level` between 0.0 and 1.0.
    pub fn send_display_brightness(&mut self, level: f32) -> Result<(), S::Error> {
        let message = MessageBuilder::new(
            &self.generation.sysex_header(),
            command::SET_DISPLAY_BRIGHTNESS,
        )
        .u14(scale(level, 255.0))
        .finish();
        self.sink.send(&message)
    }

    /// Sets the global LED brightness, `level` between 0.0 and 1.0.
    pub fn send_led_brightness(&mut self, level: f32) -> Result<(), S::Error> {
        let message = MessageBuilder::new(&self.generation.sysex_header(), command::SET_LED_BRIGHTNESS)
            .byte(scale(level, 127.0) as u8)
            .finish();
        self.sink.send(&message)
    }

    /// The aftertouch mode most recently sent to the device, or the device default before any was sent.
    pub fn aftertouch_mode(&self) -> AftertouchMode {
        self.aftertouch
    }

    /// Selects channel or polyphonic aftertouch.
    pub fn send_aftertouch_mode(&mut self, mode: AftertouchMode) -> Result<(), S::Error> {
        let message = MessageBuilder::new(&self.generation.sysex_header(), command::SET_AFTERTOUCH_MODE)
            .byte(mode.value())
            .finish();
        self.sink.send(&message)?;
        self.aftertouch = mode;
        Ok(())
    }

    /// Switches to the next aftertouch mode, returning it.
    pub fn cycle_aftertouch_mode(&mut self) -> Result<AftertouchMode, S::Error> {
        let mode = self.aftertouch.cycle();
        self.send_aftertouch_mode(mode)?;
        info!("Aftertouch mode switched to {}", mode.value());
        Ok(mode)
    }

    /// Generates and uploads the velocity curve for `settings`, returning it.
    pub fn send_velocity_curve(&mut self, settings: &PadSettings) -> Result<VelocityCurve, S::Error> {
        let curve = VelocityCurve::generate(settings);
        let header = self.generation.sysex_header();
        for message in curve.messages(&header) {
            self.sink.send(&message)?;
        }
        Ok(curve)
    }
}

/// Maps 0.0..=1.0 onto 0..=`max`, rounding to the nearest step.
fn scale(level: f32, max: f32) -> u16 {
    libm::roundf(level.clamp(0.0, 1.0) * max) as u16
}

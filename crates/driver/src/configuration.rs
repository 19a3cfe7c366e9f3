//! Command-line configuration.

use clap::{Parser, ValueEnum};
use surface_link_lib::configuration::{
    AftertouchMode, Generation, Level, Mk1, Mk2, PadSettings,
};

/// Keeps a MIDI pad controller's palette, velocity curve, and display in sync with this host.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Hardware generation of the attached controller.
    #[arg(long, value_enum, default_value_t = GenerationArg::Mk1)]
    pub generation: GenerationArg,

    /// Substring identifying the controller's MIDI ports.
    #[arg(long, default_value = "Push")]
    pub port: String,

    /// USB vendor id of the display.
    #[arg(long, default_value = "0x2982", value_parser = parse_hex_u16)]
    pub vendor_id: u16,

    /// USB product id of the display.
    #[arg(long, default_value = "0x1967", value_parser = parse_hex_u16)]
    pub product_id: u16,

    /// Pad sensitivity, 0 through 10.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub sensitivity: u8,

    /// Pad gain, 0 through 10.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub gain: u8,

    /// Pad dynamics, 0 through 10.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub dynamics: u8,

    /// Lower pad strike threshold.
    #[arg(long, default_value_t = 33)]
    pub threshold0: u16,

    /// Upper pad strike threshold.
    #[arg(long, default_value_t = 31)]
    pub threshold1: u16,

    /// Aftertouch reporting.
    #[arg(long, value_enum, default_value_t = AftertouchArg::Channel)]
    pub aftertouch: AftertouchArg,

    /// Control change number of a button which switches between aftertouch modes.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=127))]
    pub aftertouch_button: Option<u8>,

    /// Display and LED brightness, 0.0 through 1.0.
    #[arg(long, default_value_t = 1.0)]
    pub brightness: f32,

    /// Frames per second pushed to the display.
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Leave the display alone.
    #[arg(long)]
    pub no_display: bool,
}

impl Args {
    /// The pad settings selected on the command line.
    pub fn pad_settings(&self) -> PadSettings {
        PadSettings {
            sensitivity: Level::new(self.sensitivity),
            gain: Level::new(self.gain),
            dynamics: Level::new(self.dynamics),
        }
    }
}

/// Command-line spelling of [`Generation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenerationArg {
    /// First generation: palette readback, 10-byte identity.
    Mk1,
    /// Second generation: 24-byte identity, no palette readback.
    Mk2,
}

impl From<GenerationArg> for Generation {
    fn from(arg: GenerationArg) -> Self {
        match arg {
            GenerationArg::Mk1 => Mk1.into(),
            GenerationArg::Mk2 => Mk2.into(),
        }
    }
}

/// Command-line spelling of [`AftertouchMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AftertouchArg {
    /// One pressure value for the whole surface.
    Channel,
    /// One pressure value per pad.
    Poly,
}

impl From<AftertouchArg> for AftertouchMode {
    fn from(arg: AftertouchArg) -> Self {
        match arg {
            AftertouchArg::Channel => AftertouchMode::Channel,
            AftertouchArg::Poly => AftertouchMode::Polyphonic,
        }
    }
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hexadecimal id {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["surface_link"]);
        assert_eq!(GenerationArg::Mk1, args.generation, "Expected left but got right");
        assert_eq!(PadSettings::default(), args.pad_settings(), "Expected left but got right");
        assert_eq!(0x2982, args.vendor_id, "Expected left but got right");
    }

    #[test]
    fn aftertouch_button_is_optional() {
        assert_eq!(None, Args::parse_from(["surface_link"]).aftertouch_button);
        assert_eq!(
            Some(86),
            Args::parse_from(["surface_link", "--aftertouch-button", "86"]).aftertouch_button,
            "Expected left but got right"
        );
        assert!(Args::try_parse_from(["surface_link", "--aftertouch-button", "128"]).is_err());
    }

    #[test]
    fn levels_are_range_checked() {
        assert!(Args::try_parse_from(["surface_link", "--gain", "11"]).is_err());
    }

    #[test]
    fn hex_ids() {
        assert_eq!(Ok(0x1967), parse_hex_u16("0x1967"), "Expected left but got right");
        assert_eq!(Ok(0x1967), parse_hex_u16("1967"), "Expected left but got right");
        assert!(parse_hex_u16("zz").is_err());
    }

    #[test]
    fn generation_conversion() {
        assert_eq!(
            Generation::from(Mk2),
            Generation::from(GenerationArg::Mk2),
            "Expected left but got right"
        );
    }
}

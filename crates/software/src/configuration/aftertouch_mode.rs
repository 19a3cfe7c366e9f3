use num_derive::{FromPrimitive, ToPrimitive};

/// Determines how the controller reports pressure applied to pads after the initial strike.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AftertouchMode {
    /// A single pressure value for the whole surface, taken from whichever pad is pressed hardest.
    #[default]
    Channel,
    /// Each pad reports its own pressure as polyphonic key pressure.
    Polyphonic,
}

impl AftertouchMode {
    /// The data byte the device expects for this mode.
    pub fn value(&self) -> u8 {
        match self {
            Self::Channel => 0,
            Self::Polyphonic => 1,
        }
    }
}

impl super::CycleConfig for AftertouchMode {}

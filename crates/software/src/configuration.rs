//! Performer-facing settings, the hardware generations they are applied to, and a trait for cycling through them.

mod aftertouch_mode;
pub use aftertouch_mode::*;

mod generation;
pub use generation::*;

mod pad_settings;
pub use pad_settings::*;

use num_traits::{FromPrimitive, ToPrimitive};

/// Steps through a setting's variants in declaration order, wrapping around after the last one.
///
/// Lets one button on the controller walk through every option of a setting.
pub trait CycleConfig: FromPrimitive + ToPrimitive + Sized {
    /// The variant after this one, or the first variant if this is the last.
    fn cycle(self) -> Self {
        self.to_u8()
            .and_then(|position| Self::from_u8(position.wrapping_add(1)))
            .or_else(|| Self::from_u8(0))
            .unwrap_or(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_derive::{FromPrimitive, ToPrimitive};

    #[derive(Debug, Clone, Copy, ToPrimitive, FromPrimitive, PartialEq)]
    enum Speed {
        Slow,
        Medium,
        Fast,
    }
    impl CycleConfig for Speed {}

    #[test]
    fn cycle_visits_every_variant_then_wraps() {
        let visited = [
            Speed::Slow.cycle(),
            Speed::Slow.cycle().cycle(),
            Speed::Slow.cycle().cycle().cycle(),
        ];
        assert_eq!(
            [Speed::Medium, Speed::Fast, Speed::Slow],
            visited,
            "Expected left but got right"
        );
    }
}

/// A user-facing setting on an eleven-step scale, 0 through 10.
///
/// The curve generator and the channel pressure tables are indexed directly by this value, so the constructor saturates
/// rather than letting an out-of-range index reach them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Level(u8);

impl Level {
    /// The lowest setting.
    pub const MIN: Level = Level(0);
    /// The factory default.
    pub const MIDPOINT: Level = Level(5);
    /// The highest setting.
    pub const MAX: Level = Level(10);
    /// Number of distinct settings, i.e. the length of every table indexed by a [`Level`].
    pub const STEPS: usize = 11;

    /// Constructs a [`Level`], saturating at [`Level::MAX`].
    pub const fn new(value: u8) -> Self {
        if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Returns the setting as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::MIDPOINT
    }
}

impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

/// The three performer-facing knobs which shape how hard a pad must be struck to produce a given velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadSettings {
    /// How much force reaches full velocity. Higher settings reach it sooner.
    pub sensitivity: Level,
    /// Shifts the output velocity range (and its gamma) up or down.
    pub gain: Level,
    /// Bends the curve between linear and strongly S-shaped.
    pub dynamics: Level,
}

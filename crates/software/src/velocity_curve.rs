//! Converts [`PadSettings`] into the 128-entry velocity curve the controller applies to raw pad strikes.
//!
//! The device measures each strike as a "width" between 0 and 4064 in steps of 32 and looks up the MIDI velocity in a
//! table indexed by `width / 32`. The table is piecewise: a short linear ramp for the lightest touches, a cubic Bezier
//! section shaped by the dynamics setting and gamma-corrected by the gain setting, and a linear ramp up to full
//! velocity for anything beyond the sensitivity-dependent maximum width.

use crate::{
    configuration::{Level, PadSettings},
    sysex::{MessageBuilder, SysexMessage, VendorHeader, command},
};
use core::f64::consts::PI;

/// Number of entries in a velocity curve.
pub const CURVE_LEN: usize = 128;
/// Number of entries carried by each curve message.
pub const CHUNK_LEN: usize = 16;

/// Width represented by each table step.
const WIDTH_STEP: f64 = 32.0;
/// Width of the last table step.
const MAX_WIDTH: f64 = WIDTH_STEP * (CURVE_LEN - 1) as f64;
/// Widths below this belong to the initial linear ramp.
const MIN_WIDTH: f64 = 160.0;
const MIN_VELOCITY: f64 = 1.0;
const MAX_VELOCITY: f64 = 127.0;
/// Distance of the inner control points from the center of the unit square.
const CONTROL_RADIUS: f64 = 0.4;
/// Increment used when marching along the curve to find `t` for a given `x`.
const T_STEP: f64 = 0.0001;

/// Lookup tables which map each [`Level`] onto curve parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTables {
    /// Indexed by sensitivity: width at which the Bezier section ends.
    pub max_width: [f64; Level::STEPS],
    /// Indexed by sensitivity: lower bound for the inner control points' x coordinates.
    pub control_x_min: [f64; Level::STEPS],
    /// Indexed by sensitivity: upper bound for the inner control points' x coordinates.
    pub control_x_max: [f64; Level::STEPS],
    /// Indexed by gain: velocity at the start of the Bezier section.
    pub min_velocity: [f64; Level::STEPS],
    /// Indexed by gain: velocity at the end of the Bezier section.
    pub max_velocity: [f64; Level::STEPS],
    /// Indexed by gain: 0.5 leaves the curve untouched, lower values lift it, higher values sink it.
    pub gamma: [f64; Level::STEPS],
    /// Indexed by dynamics: rotation of the inner control points in degrees. Zero yields a straight line.
    pub alpha: [f64; Level::STEPS],
}

impl CurveTables {
    /// The factory calibration.
    pub const DEFAULT: CurveTables = CurveTables {
        max_width: [
            1700.0, 1660.0, 1590.0, 1510.0, 1420.0, 1300.0, 1170.0, 1030.0, 886.0, 739.0, 595.0,
        ],
        control_x_min: [0.05, 0.06, 0.07, 0.08, 0.09, 0.10, 0.11, 0.12, 0.13, 0.14, 0.15],
        control_x_max: [0.95, 0.94, 0.93, 0.92, 0.91, 0.90, 0.89, 0.88, 0.87, 0.86, 0.85],
        min_velocity: [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 3.0, 6.0, 11.0, 17.0, 25.0],
        max_velocity: [
            96.0, 102.0, 107.0, 111.0, 115.0, 118.0, 121.0, 124.0, 127.0, 127.0, 127.0,
        ],
        gamma: [0.70, 0.66, 0.62, 0.58, 0.54, 0.50, 0.46, 0.42, 0.38, 0.34, 0.30],
        alpha: [
            -45.0, -36.0, -27.0, -18.0, -9.0, 0.0, 9.0, 18.0, 27.0, 36.0, 45.0,
        ],
    };
}

impl Default for CurveTables {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

impl Point {
    fn on_circle(degrees: f64) -> Self {
        let radians = degrees * PI / 180.0;
        Self {
            x: 0.5 + CONTROL_RADIUS * libm::cos(radians),
            y: 0.5 + CONTROL_RADIUS * libm::sin(radians),
        }
    }
}

/// One coordinate of a cubic Bezier anchored at 0 and 1.
fn bezier(t: f64, c1: f64, c2: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * t * c1 + 3.0 * u * t * t * c2 + t * t * t
}

/// A complete velocity curve, every entry between 1 and 127.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCurve {
    values: [u8; CURVE_LEN],
}

impl VelocityCurve {
    /// Generates the curve for `settings` using the factory calibration.
    pub fn generate(settings: &PadSettings) -> Self {
        Self::generate_with(&CurveTables::DEFAULT, settings)
    }

    /// Generates the curve for `settings` using the given calibration.
    pub fn generate_with(tables: &CurveTables, settings: &PadSettings) -> Self {
        let sensitivity = settings.sensitivity.index();
        let gain = settings.gain.index();

        let max_width = tables.max_width[sensitivity];
        let min_velocity = tables.min_velocity[gain];
        let max_velocity = tables.max_velocity[gain];
        let exponent = libm::exp(-4.0 + 8.0 * tables.gamma[gain]);

        let alpha = tables.alpha[settings.dynamics.index()];
        let (x_min, x_max) = (
            tables.control_x_min[sensitivity],
            tables.control_x_max[sensitivity],
        );
        let mut p1 = Point::on_circle(225.0 - alpha);
        let mut p2 = Point::on_circle(45.0 - alpha);
        p1.x = p1.x.clamp(x_min, x_max);
        p2.x = p2.x.clamp(x_min, x_max);

        let mut values = [0_u8; CURVE_LEN];
        // x(t) is monotone, so each step can resume the search where the previous one stopped
        let mut t = 0.0;
        for (step, value) in values.iter_mut().enumerate() {
            let width = step as f64 * WIDTH_STEP;
            let velocity = if width < MIN_WIDTH {
                MIN_VELOCITY + (min_velocity - MIN_VELOCITY) * width / MIN_WIDTH
            } else if width > max_width {
                max_velocity
                    + (MAX_VELOCITY - max_velocity) * (width - max_width) / (MAX_WIDTH - max_width)
            } else {
                let x = (width - MIN_WIDTH) / (max_width - MIN_WIDTH);
                while t < 1.0 && bezier(t, p1.x, p2.x) < x {
                    t += T_STEP;
                }
                let y = bezier(t.min(1.0), p1.y, p2.y).clamp(0.0, 1.0);
                min_velocity + (max_velocity - min_velocity) * libm::pow(y, exponent)
            };
            *value = libm::round(velocity).clamp(MIN_VELOCITY, MAX_VELOCITY) as u8;
        }

        trace!(
            "Generated velocity curve for sensitivity {}, gain {}, dynamics {}",
            sensitivity,
            gain,
            settings.dynamics.index()
        );
        Self { values }
    }

    /// The curve, indexed by width step.
    pub fn values(&self) -> &[u8; CURVE_LEN] {
        &self.values
    }

    /// Splits the curve into the messages which upload it, each `20 <start index> <16 velocities>`.
    pub fn messages<'a>(&'a self, header: &'a VendorHeader) -> impl Iterator<Item = SysexMessage> + 'a {
        self.values
            .chunks(CHUNK_LEN)
            .enumerate()
            .map(move |(n, chunk)| {
                MessageBuilder::new(header, command::SET_VELOCITY_CURVE)
                    .byte((n * CHUNK_LEN) as u8)
                    .bytes(chunk)
                    .finish()
            })
    }
}

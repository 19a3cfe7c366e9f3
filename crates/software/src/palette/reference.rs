//! The factory palette: black, seven grays, then fifteen hues in eight shades each (four darkening, four fading
//! towards white).

use crate::color::Rgb;

use super::PALETTE_SIZE;

/// Colors the device should hold in every slot the host does not assign itself.
pub const REFERENCE_PALETTE: [Rgb; PALETTE_SIZE] = [
    Rgb::new(0, 0, 0), Rgb::new(36, 36, 36), Rgb::new(73, 73, 73), Rgb::new(109, 109, 109),
    Rgb::new(146, 146, 146), Rgb::new(182, 182, 182), Rgb::new(219, 219, 219), Rgb::new(255, 255, 255),
    Rgb::new(255, 0, 0), Rgb::new(191, 0, 0), Rgb::new(128, 0, 0), Rgb::new(64, 0, 0),
    Rgb::new(255, 102, 102), Rgb::new(255, 153, 153), Rgb::new(255, 191, 191), Rgb::new(255, 230, 230),
    Rgb::new(255, 102, 0), Rgb::new(191, 77, 0), Rgb::new(128, 51, 0), Rgb::new(64, 26, 0),
    Rgb::new(255, 163, 102), Rgb::new(255, 194, 153), Rgb::new(255, 217, 191), Rgb::new(255, 240, 230),
    Rgb::new(255, 204, 0), Rgb::new(191, 153, 0), Rgb::new(128, 102, 0), Rgb::new(64, 51, 0),
    Rgb::new(255, 224, 102), Rgb::new(255, 235, 153), Rgb::new(255, 242, 191), Rgb::new(255, 250, 230),
    Rgb::new(204, 255, 0), Rgb::new(153, 191, 0), Rgb::new(102, 128, 0), Rgb::new(51, 64, 0),
    Rgb::new(224, 255, 102), Rgb::new(235, 255, 153), Rgb::new(242, 255, 191), Rgb::new(250, 255, 230),
    Rgb::new(102, 255, 0), Rgb::new(76, 191, 0), Rgb::new(51, 128, 0), Rgb::new(25, 64, 0),
    Rgb::new(163, 255, 102), Rgb::new(194, 255, 153), Rgb::new(217, 255, 191), Rgb::new(240, 255, 230),
    Rgb::new(0, 255, 0), Rgb::new(0, 191, 0), Rgb::new(0, 128, 0), Rgb::new(0, 64, 0),
    Rgb::new(102, 255, 102), Rgb::new(153, 255, 153), Rgb::new(191, 255, 191), Rgb::new(230, 255, 230),
    Rgb::new(0, 255, 102), Rgb::new(0, 191, 77), Rgb::new(0, 128, 51), Rgb::new(0, 64, 26),
    Rgb::new(102, 255, 163), Rgb::new(153, 255, 194), Rgb::new(191, 255, 217), Rgb::new(230, 255, 240),
    Rgb::new(0, 255, 204), Rgb::new(0, 191, 153), Rgb::new(0, 128, 102), Rgb::new(0, 64, 51),
    Rgb::new(102, 255, 224), Rgb::new(153, 255, 235), Rgb::new(191, 255, 242), Rgb::new(230, 255, 250),
    Rgb::new(0, 204, 255), Rgb::new(0, 153, 191), Rgb::new(0, 102, 128), Rgb::new(0, 51, 64),
    Rgb::new(102, 224, 255), Rgb::new(153, 235, 255), Rgb::new(191, 242, 255), Rgb::new(230, 250, 255),
    Rgb::new(0, 102, 255), Rgb::new(0, 77, 191), Rgb::new(0, 51, 128), Rgb::new(0, 26, 64),
    Rgb::new(102, 163, 255), Rgb::new(153, 194, 255), Rgb::new(191, 217, 255), Rgb::new(230, 240, 255),
    Rgb::new(0, 0, 255), Rgb::new(0, 0, 191), Rgb::new(0, 0, 128), Rgb::new(0, 0, 64),
    Rgb::new(102, 102, 255), Rgb::new(153, 153, 255), Rgb::new(191, 191, 255), Rgb::new(230, 230, 255),
    Rgb::new(102, 0, 255), Rgb::new(76, 0, 191), Rgb::new(51, 0, 128), Rgb::new(25, 0, 64),
    Rgb::new(163, 102, 255), Rgb::new(194, 153, 255), Rgb::new(217, 191, 255), Rgb::new(240, 230, 255),
    Rgb::new(204, 0, 255), Rgb::new(153, 0, 191), Rgb::new(102, 0, 128), Rgb::new(51, 0, 64),
    Rgb::new(224, 102, 255), Rgb::new(235, 153, 255), Rgb::new(242, 191, 255), Rgb::new(250, 230, 255),
    Rgb::new(255, 0, 204), Rgb::new(191, 0, 153), Rgb::new(128, 0, 102), Rgb::new(64, 0, 51),
    Rgb::new(255, 102, 224), Rgb::new(255, 153, 235), Rgb::new(255, 191, 242), Rgb::new(255, 230, 250),
    Rgb::new(255, 0, 102), Rgb::new(191, 0, 77), Rgb::new(128, 0, 51), Rgb::new(64, 0, 26),
    Rgb::new(255, 102, 163), Rgb::new(255, 153, 194), Rgb::new(255, 191, 217), Rgb::new(255, 230, 240),
];

//! Pushes frames to the controller's 960×160 display over USB bulk transfers.
//!
//! The display expects 16-bit 5-6-5 pixels, blue in the high bits, each row followed by zero padding so that a frame
//! fills exactly [`WIRE_CAPACITY`] bytes. Every frame is preceded by a fixed 16-byte header sent as its own transfer.
//!
//! Only one frame may be in flight. A frame submitted while another is still being transferred is dropped rather than
//! queued, keeping the display current instead of backlogged.

use alloc::{boxed::Box, vec};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::Duration;

/// Display width in pixels.
pub const WIDTH: usize = 960;
/// Display height in pixels.
pub const HEIGHT: usize = 160;
/// Bytes per source pixel, ordered blue, green, red, alpha.
pub const SOURCE_BYTES_PER_PIXEL: usize = 4;
/// Exact length of a source bitmap.
pub const FRAME_LEN: usize = WIDTH * HEIGHT * SOURCE_BYTES_PER_PIXEL;
/// Size of the pixel transfer.
pub const WIRE_CAPACITY: usize = 20 * 16384;
/// Zero bytes appended to each packed row.
pub const ROW_PADDING: usize = (WIRE_CAPACITY - HEIGHT * WIDTH * 2) / HEIGHT;
/// Packed row length including padding.
pub const ROW_STRIDE: usize = WIDTH * 2 + ROW_PADDING;
/// Sent ahead of every frame.
pub const FRAME_HEADER: [u8; 16] = [
    0xEF, 0xCD, 0xAB, 0x89, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];
/// Timeout applied to each bulk transfer.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(1000);

/// A USB bulk OUT endpoint.
pub trait BulkEndpoint {
    /// Transport failure type.
    type Error;

    /// Writes `data`, giving up after `timeout`. Returns the number of bytes written.
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<usize, Self::Error>;
}

/// What became of a frame handed to [`Display::send`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameStatus {
    /// Both transfers were attempted. Transfer failures are logged, not reported.
    Sent,
    /// Another frame was still in flight; this one was dropped.
    Busy,
    /// No display endpoint was found when the [`Display`] was constructed.
    Unavailable,
    /// The bitmap was not [`FRAME_LEN`] bytes long.
    InvalidFrame,
}

/// Packs one pixel into 5-6-5 format, blue in the top five bits and red in the bottom five.
pub fn pack_pixel(blue: u8, green: u8, red: u8) -> u16 {
    (u16::from((blue & 0xF8) >> 3) << 11) | (u16::from((green & 0xFC) >> 2) << 5) | u16::from((red & 0xF8) >> 3)
}

/// Converts a B, G, R, A bitmap into the wire format: packed pixels little-endian, each row zero-padded to
/// [`ROW_STRIDE`]. Alpha is discarded.
///
/// `bitmap` must be [`FRAME_LEN`] bytes and `wire` [`WIRE_CAPACITY`] bytes.
pub fn transcode(bitmap: &[u8], wire: &mut [u8]) {
    for (row, wire_row) in bitmap
        .chunks_exact(WIDTH * SOURCE_BYTES_PER_PIXEL)
        .zip(wire.chunks_exact_mut(ROW_STRIDE))
    {
        let (pixels, padding) = wire_row.split_at_mut(WIDTH * 2);
        for (source, packed) in row
            .chunks_exact(SOURCE_BYTES_PER_PIXEL)
            .zip(pixels.chunks_exact_mut(2))
        {
            packed.copy_from_slice(&pack_pixel(source[0], source[1], source[2]).to_le_bytes());
        }
        padding.fill(0);
    }
}

struct Transfer<E> {
    endpoint: E,
    wire: Box<[u8]>,
}

/// The display, or the lack of one.
///
/// [`send`][Self::send] takes `&self` so that a single `Display` can be shared with whatever produces frames; the lock
/// around the endpoint and wire buffer is only ever tried, never waited on.
pub struct Display<E> {
    transfer: Option<Mutex<CriticalSectionRawMutex, Transfer<E>>>,
}

impl<E: BulkEndpoint> Display<E> {
    /// Constructs a [`Display`] which writes to `endpoint`, allocating its wire buffer up front.
    pub fn new(endpoint: E) -> Self {
        Self {
            transfer: Some(Mutex::new(Transfer {
                endpoint,
                wire: vec![0_u8; WIRE_CAPACITY].into_boxed_slice(),
            })),
        }
    }

    /// Constructs a [`Display`] for a device whose display endpoint could not be opened. Every frame is skipped.
    pub fn unavailable() -> Self {
        info!("Display endpoint unavailable, frames will be skipped");
        Self { transfer: None }
    }

    /// Returns `false` if this display was constructed [`unavailable`][Self::unavailable].
    pub fn is_available(&self) -> bool {
        self.transfer.is_some()
    }

    /// Transcodes and transfers `bitmap` unless a previous frame is still in flight.
    pub fn send(&self, bitmap: &[u8]) -> FrameStatus {
        let Some(transfer) = &self.transfer else {
            return FrameStatus::Unavailable;
        };

        if bitmap.len() != FRAME_LEN {
            warn!(
                "Ignoring frame of {} bytes, expected {}",
                bitmap.len(),
                FRAME_LEN
            );
            return FrameStatus::InvalidFrame;
        }

        // the guard is released on every path out of this function, failed transfers included
        let Ok(mut guard) = transfer.try_lock() else {
            trace!("Display busy, dropping frame");
            return FrameStatus::Busy;
        };
        let Transfer { endpoint, wire } = &mut *guard;

        transcode(bitmap, &mut wire[..]);
        if endpoint.write(&FRAME_HEADER, TRANSFER_TIMEOUT).is_err() {
            warn!("Display header transfer failed");
        }
        if endpoint.write(&wire[..], TRANSFER_TIMEOUT).is_err() {
            warn!("Display pixel transfer failed");
        }
        FrameStatus::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Mutex as StdMutex, mpsc},
        thread,
        vec::Vec,
    };

    type Writes = Arc<StdMutex<Vec<(Vec<u8>, Duration)>>>;

    #[derive(Default)]
    struct Recording {
        writes: Writes,
        fail: bool,
    }

    impl BulkEndpoint for Recording {
        type Error = ();

        fn write(&mut self, data: &[u8], timeout: Duration) -> Result<usize, Self::Error> {
            self.writes.lock().unwrap().push((data.to_vec(), timeout));
            if self.fail { Err(()) } else { Ok(data.len()) }
        }
    }

    /// Announces each write, then blocks until released.
    struct Blocking {
        writes: Writes,
        entered: mpsc::Sender<()>,
        release: mpsc::Receiver<()>,
    }

    impl BulkEndpoint for Blocking {
        type Error = ();

        fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<usize, Self::Error> {
            self.entered.send(()).unwrap();
            self.release.recv().unwrap();
            self.writes.lock().unwrap().push((data.to_vec(), TRANSFER_TIMEOUT));
            Ok(data.len())
        }
    }

    fn solid(blue: u8, green: u8, red: u8) -> Vec<u8> {
        [blue, green, red, 0xFF].repeat(WIDTH * HEIGHT)
    }

    #[test]
    fn padding_fills_capacity() {
        assert_eq!(128, ROW_PADDING, "Expected left but got right");
        assert_eq!(WIRE_CAPACITY, ROW_STRIDE * HEIGHT, "Expected left but got right");
    }

    #[test]
    fn pack_extremes() {
        assert_eq!(0xFFFF, pack_pixel(0xFF, 0xFF, 0xFF), "Expected left but got right");
        assert_eq!(0x0000, pack_pixel(0x00, 0x00, 0x00), "Expected left but got right");
    }

    #[test]
    fn pack_places_channels() {
        assert_eq!(0xF800, pack_pixel(0xFF, 0x00, 0x00), "Blue belongs in the high bits");
        assert_eq!(0x07E0, pack_pixel(0x00, 0xFF, 0x00), "Green belongs in the middle bits");
        assert_eq!(0x001F, pack_pixel(0x00, 0x00, 0xFF), "Red belongs in the low bits");
        assert_eq!(0x0000, pack_pixel(0x07, 0x03, 0x07), "Truncated bits should vanish");
    }

    #[test]
    fn transcode_writes_little_endian_rows_with_padding() {
        let mut bitmap = solid(0x00, 0x00, 0xFF);
        // second row starts with a blue pixel
        bitmap[WIDTH * SOURCE_BYTES_PER_PIXEL..WIDTH * SOURCE_BYTES_PER_PIXEL + 4]
            .copy_from_slice(&[0xFF, 0x00, 0x00, 0x00]);
        let mut wire = std::vec![0xAA_u8; WIRE_CAPACITY];

        transcode(&bitmap, &mut wire);

        assert_eq!(&[0x1F, 0x00], &wire[..2], "Expected left but got right");
        assert!(
            wire[WIDTH * 2..ROW_STRIDE].iter().all(|&b| b == 0),
            "Row padding should be zeroed"
        );
        assert_eq!(
            &[0x00, 0xF8],
            &wire[ROW_STRIDE..ROW_STRIDE + 2],
            "Expected left but got right"
        );
        assert!(wire[WIRE_CAPACITY - ROW_PADDING..].iter().all(|&b| b == 0));
    }

    #[test]
    fn send_writes_header_then_pixels() {
        let endpoint = Recording::default();
        let writes = endpoint.writes.clone();
        let display = Display::new(endpoint);

        assert_eq!(FrameStatus::Sent, display.send(&solid(0xFF, 0xFF, 0xFF)));

        let writes = writes.lock().unwrap();
        assert_eq!(2, writes.len(), "Expected left but got right");
        assert_eq!(&FRAME_HEADER[..], writes[0].0.as_slice(), "Expected left but got right");
        assert_eq!(TRANSFER_TIMEOUT, writes[0].1, "Expected left but got right");
        assert_eq!(WIRE_CAPACITY, writes[1].0.len(), "Expected left but got right");
        assert_eq!(TRANSFER_TIMEOUT, writes[1].1, "Expected left but got right");
        assert!(writes[1].0[..WIDTH * 2].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn unavailable_display_skips_frames() {
        let display = Display::<Recording>::unavailable();
        assert!(!display.is_available());
        assert_eq!(
            FrameStatus::Unavailable,
            display.send(&solid(0, 0, 0)),
            "Expected left but got right"
        );
    }

    #[test]
    fn wrong_sized_frame_is_rejected() {
        let endpoint = Recording::default();
        let writes = endpoint.writes.clone();
        let display = Display::new(endpoint);

        assert_eq!(FrameStatus::InvalidFrame, display.send(&[0; 16]));
        assert!(writes.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_transfer_releases_display() {
        let endpoint = Recording {
            fail: true,
            ..Default::default()
        };
        let writes = endpoint.writes.clone();
        let display = Display::new(endpoint);

        assert_eq!(FrameStatus::Sent, display.send(&solid(0, 0, 0)));
        assert_eq!(FrameStatus::Sent, display.send(&solid(0, 0, 0)));
        assert_eq!(4, writes.lock().unwrap().len(), "Expected left but got right");
    }

    #[test]
    fn send_while_busy_is_dropped() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let writes = Writes::default();
        let display = Display::new(Blocking {
            writes: writes.clone(),
            entered: entered_tx,
            release: release_rx,
        });
        let white = solid(0xFF, 0xFF, 0xFF);
        let black = solid(0x00, 0x00, 0x00);

        thread::scope(|scope| {
            let first = scope.spawn(|| display.send(&white));

            // the header transfer of the first frame is now in flight
            entered_rx.recv().unwrap();
            assert_eq!(
                FrameStatus::Busy,
                display.send(&black),
                "Expected left but got right"
            );

            release_tx.send(()).unwrap();
            release_tx.send(()).unwrap();
            assert_eq!(FrameStatus::Sent, first.join().unwrap());
        });

        let writes = writes.lock().unwrap();
        assert_eq!(2, writes.len(), "Only the first frame should be transferred");
        assert!(
            writes[1].0[..WIDTH * 2].iter().all(|&b| b == 0xFF),
            "First frame's pixels should be untouched"
        );
    }
}
